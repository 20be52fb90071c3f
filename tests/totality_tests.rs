//! Totality: every input parses to a tree, no panic, no hang.

use namumark::{parse, MemorySource, Options, ParseContext};
use proptest::prelude::*;

fn parses(source: &str) -> namumark::Document {
    let store = MemorySource::new();
    let mut ctx = ParseContext::new(None, &store, Options::default());
    parse(source, &mut ctx)
}

#[test]
fn empty_input_yields_empty_document() {
    let doc = parses("");
    assert!(doc.blocks.is_empty());
    assert!(doc.toc.is_empty());
    assert!(doc.footnotes.is_empty());
}

#[test]
fn unterminated_fence_is_not_fatal() {
    let doc = parses("{{{#!wiki style=\"x\"\nnever closed");
    assert!(!doc.blocks.is_empty());
}

#[test]
fn deeply_nested_brackets_terminate() {
    let mut source = String::new();
    for _ in 0..10_000 {
        source.push('[');
    }
    parses(&source);

    let mut source = String::new();
    for _ in 0..10_000 {
        source.push_str("[[");
    }
    parses(&source);
}

#[test]
fn deeply_nested_balanced_braces_terminate() {
    let depth = 10_000;
    let mut source = String::new();
    for _ in 0..depth {
        source.push_str("{{{");
    }
    source.push('x');
    for _ in 0..depth {
        source.push_str("}}}");
    }
    parses(&source);
}

#[test]
fn pathological_table_input() {
    let row = "||".repeat(500);
    let source = format!("{row}\n{row} {{{{{{\n}}}}}}");
    parses(&source);
}

#[test]
fn mixed_delimiter_soup() {
    parses("'''''~~__^^,,{{{[[[*[include([youtube(--]]}}}~~'''");
}

proptest! {
    /// Any string parses without panicking.
    #[test]
    fn arbitrary_input_parses(source in ".{0,400}") {
        parses(&source);
    }

    /// Wiki-flavored character soup parses without panicking.
    #[test]
    fn delimiter_soup_parses(source in "[\\[\\]{}|=*'~^,#> \n-]{0,300}") {
        parses(&source);
    }

    /// Parsing is deterministic: two parses of the same input with fresh
    /// contexts produce identical trees.
    #[test]
    fn parsing_is_deterministic(source in ".{0,200}") {
        let first = parses(&source);
        let second = parses(&source);
        prop_assert_eq!(first, second);
    }
}
