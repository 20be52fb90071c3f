//! namumark: a namu-style wiki markup parser and renderer.
//!
//! The engine turns raw markup into a typed [`Document`] tree — blocks,
//! inline nodes, table of contents, footnotes — and can render that tree
//! to HTML. Parsing is total: any input, including malformed or
//! adversarial markup, produces a tree without error; broken constructs
//! degrade to literal text and failed inclusions become inert markers.
//!
//! # Design Principles
//! - One explicit [`ParseContext`] per render: no global state, so
//!   concurrent renders never interfere.
//! - Leftmost-match inline dispatch: every construct nominates its
//!   earliest start, the winner is scanned with balanced-delimiter
//!   counting, and ties break on a fixed priority order.
//! - External collaborators ([`ContentSource`]) are synchronous traits;
//!   async hosts prefetch and answer from a cache. Link existence is
//!   resolved with one batched lookup per render.

pub mod block;
pub mod context;
pub mod document;
pub mod footnote;
pub mod include;
pub mod inline;
pub mod limits;
pub mod render;
pub mod table;
pub mod toc;

// Re-export primary types
pub use context::{collect_link_targets, ContentSource, MemorySource, Options, ParseContext};
pub use document::{Block, Document, Footnote, Include, InlineNode, TocEntry};
pub use render::{render, HtmlWriter};

use block::{parse_blocks, BlockScope};

/// Parse raw markup into a [`Document`].
///
/// An empty input yields an empty block list. The context must be fresh:
/// one context per render.
///
/// # Example
/// ```
/// use namumark::{parse, MemorySource, Options, ParseContext};
///
/// let source = MemorySource::new();
/// let mut ctx = ParseContext::new(None, &source, Options::default());
/// let doc = parse("= Title =\n'''bold''' text", &mut ctx);
/// assert_eq!(doc.toc.len(), 1);
/// ```
pub fn parse(source: &str, ctx: &mut ParseContext) -> Document {
    if source.is_empty() {
        return Document::default();
    }

    let lines: Vec<&str> = source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    // One batched existence lookup for every link target in the source.
    let targets = collect_link_targets(source);
    ctx.prime_existing(&targets);

    let scan = toc::scan_sections(&lines);
    let collapsed = ctx
        .options
        .collapsed
        .clone()
        .unwrap_or_else(|| scan.initially_collapsed.clone());
    let visible = toc::visibility(&lines, &scan.numbers, &collapsed);

    let scope = BlockScope {
        numbers: Some(&scan.numbers),
        visible: Some(&visible),
        collapsed: Some(&collapsed),
    };
    let blocks = parse_blocks(&lines, scope, ctx);

    Document {
        blocks,
        toc: scan.toc,
        footnotes: std::mem::take(&mut ctx.footnotes),
        categories: std::mem::take(&mut ctx.categories),
        redirect: ctx.redirect.take(),
    }
}

/// Parse markup and render it to HTML in one step.
///
/// This is the primary API for simple use cases.
pub fn to_html(source: &str, ctx: &mut ParseContext) -> String {
    let doc = parse(source, ctx);
    render::render(&doc)
}
