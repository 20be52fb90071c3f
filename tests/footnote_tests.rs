//! Footnote collection order, labels, and back-reference anchors.

use namumark::{parse, MemorySource, Options, ParseContext};

fn parse_doc(source: &str) -> namumark::Document {
    let store = MemorySource::new();
    let mut ctx = ParseContext::new(None, &store, Options::default());
    parse(source, &mut ctx)
}

/// The ordering property: `a[*one]b[*two]c` yields ids 1 and 2 in order.
#[test]
fn ids_follow_first_occurrence_order() {
    let doc = parse_doc("a[*one]b[*two]c");
    assert_eq!(doc.footnotes.len(), 2);
    assert_eq!(doc.footnotes[0].id, 1);
    assert_eq!(doc.footnotes[0].label, "1");
    assert_eq!(doc.footnotes[1].id, 2);
    assert_eq!(doc.footnotes[1].label, "2");
}

#[test]
fn forward_and_back_anchors_match() {
    let store = MemorySource::new();
    let mut ctx = ParseContext::new(None, &store, Options::default());
    let html = namumark::to_html("a[*one]b[*two]c", &mut ctx);
    for id in 1..=2 {
        assert!(html.contains(&format!("id=\"r-{id}\"")));
        assert!(html.contains(&format!("href=\"#fn-{id}\"")));
        assert!(html.contains(&format!("id=\"fn-{id}\"")));
        assert!(html.contains(&format!("href=\"#r-{id}\"")));
    }
}

#[test]
fn custom_label_before_first_space() {
    let doc = parse_doc("claim[*출처 원문 인용]");
    assert_eq!(doc.footnotes[0].label, "출처");
    assert_eq!(
        doc.footnotes[0].content,
        vec![namumark::InlineNode::text("원문 인용")]
    );
}

#[test]
fn space_led_body_gets_numeric_label() {
    let doc = parse_doc("claim[* 본문 내용]");
    assert_eq!(doc.footnotes[0].label, "1");
    assert_eq!(
        doc.footnotes[0].content,
        vec![namumark::InlineNode::text("본문 내용")]
    );
}

#[test]
fn footnote_content_is_inline_parsed() {
    let doc = parse_doc("x[* see '''bold''' and [[link]]]");
    let content = &doc.footnotes[0].content;
    assert!(content
        .iter()
        .any(|node| matches!(node, namumark::InlineNode::Bold(_))));
    assert!(content
        .iter()
        .any(|node| matches!(node, namumark::InlineNode::InternalLink { .. })));
}

#[test]
fn footnotes_collect_across_blocks_and_cells() {
    let doc = parse_doc("para[*first]\n|| cell[*second] ||\n> quote[*third]");
    let labels: Vec<usize> = doc.footnotes.iter().map(|f| f.id).collect();
    assert_eq!(labels, vec![1, 2, 3]);
}

#[test]
fn included_documents_share_the_collector() {
    let mut store = MemorySource::new();
    store.insert("틀:각주", "included[*from template]");
    let mut ctx = ParseContext::new(None, &store, Options::default());
    let doc = parse("before[*local] [include(틀:각주)]", &mut ctx);
    assert_eq!(doc.footnotes.len(), 2);
    assert_eq!(doc.footnotes[0].content, vec![namumark::InlineNode::text("local")]);
    assert_eq!(
        doc.footnotes[1].content,
        vec![namumark::InlineNode::text("from template")]
    );
}

#[test]
fn unterminated_footnote_is_literal() {
    let doc = parse_doc("a[*never closed");
    assert!(doc.footnotes.is_empty());
}
