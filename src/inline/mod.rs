//! Inline parser.
//!
//! Every inline construct nominates its earliest possible start in the
//! remaining text; the leftmost candidate wins, with declaration order
//! breaking ties (so `'''bold'''` beats `''italic''` at the same offset).
//! A candidate that fails to complete — an unterminated footnote bracket
//! or `{{{` — drops out and the next candidate is tried; text claimed by
//! no construct degrades to a plain [`InlineNode::Text`].

pub mod braces;
pub mod links;
pub mod scan;

use crate::context::ParseContext;
use crate::document::InlineNode;
use crate::footnote;
use crate::include;
use crate::limits::MAX_INLINE_NESTING;

use scan::{balanced_end, bracket_close, find, find_ci};

/// Paired-delimiter span constructs, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Bold,
    Italic,
    Underline,
    Strike,
    DashStrike,
    Superscript,
    Subscript,
}

impl SpanKind {
    const ALL: [SpanKind; 7] = [
        SpanKind::Bold,
        SpanKind::Italic,
        SpanKind::Underline,
        SpanKind::Strike,
        SpanKind::DashStrike,
        SpanKind::Superscript,
        SpanKind::Subscript,
    ];

    fn delimiter(self) -> &'static str {
        match self {
            SpanKind::Bold => "'''",
            SpanKind::Italic => "''",
            SpanKind::Underline => "__",
            SpanKind::Strike => "~~",
            SpanKind::DashStrike => "--",
            SpanKind::Superscript => "^^",
            SpanKind::Subscript => ",,",
        }
    }

    fn wrap(self, children: Vec<InlineNode>) -> InlineNode {
        match self {
            SpanKind::Bold => InlineNode::Bold(children),
            SpanKind::Italic => InlineNode::Italic(children),
            SpanKind::Underline => InlineNode::Underline(children),
            SpanKind::Strike | SpanKind::DashStrike => InlineNode::Strike(children),
            SpanKind::Superscript => InlineNode::Superscript(children),
            SpanKind::Subscript => InlineNode::Subscript(children),
        }
    }
}

/// One construct candidate in the remaining text.
#[derive(Debug, Clone, Copy)]
enum Candidate {
    /// `[* ...]` — completion checked when tried.
    Footnote { at: usize },
    /// `[include(args)]`, complete.
    Include { at: usize, args: (usize, usize), end: usize },
    /// `{{{` — completion checked when tried.
    Brace { at: usize },
    /// `[youtube(args)]`, complete.
    Youtube { at: usize, args: (usize, usize), end: usize },
    /// `[[payload]]`, complete and balanced.
    WikiLink { at: usize, inner: (usize, usize), end: usize },
    /// `[br]`.
    Break { at: usize, end: usize },
    /// A paired-delimiter span, complete on one line.
    Span { at: usize, kind: SpanKind, inner: (usize, usize), end: usize },
}

impl Candidate {
    fn at(&self) -> usize {
        match *self {
            Candidate::Footnote { at }
            | Candidate::Include { at, .. }
            | Candidate::Brace { at }
            | Candidate::Youtube { at, .. }
            | Candidate::WikiLink { at, .. }
            | Candidate::Break { at, .. }
            | Candidate::Span { at, .. } => at,
        }
    }
}

/// Parse a text fragment into inline nodes.
pub fn parse_inline(text: &str, ctx: &mut ParseContext) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    if text.is_empty() {
        return nodes;
    }
    if ctx.inline_nesting >= MAX_INLINE_NESTING {
        nodes.push(InlineNode::text(text));
        return nodes;
    }
    ctx.inline_nesting += 1;

    let mut rest = text;
    'remaining: while !rest.is_empty() {
        for candidate in collect_candidates(rest) {
            if let Some((end, mut produced)) = try_candidate(rest, candidate, ctx) {
                let at = candidate.at();
                if at > 0 {
                    // No construct completes in the prefix (an earlier
                    // success would have been the winning candidate).
                    nodes.push(InlineNode::text(&rest[..at]));
                }
                nodes.append(&mut produced);
                rest = &rest[end..];
                continue 'remaining;
            }
        }
        nodes.push(InlineNode::text(rest));
        break;
    }

    ctx.inline_nesting -= 1;
    nodes
}

/// All candidates in the fragment, leftmost first; ties keep nomination
/// order, which is the construct priority.
fn collect_candidates(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    if let Some(at) = find(text, "[*") {
        candidates.push(Candidate::Footnote { at });
    }
    if let Some((at, args, end)) = find_macro(text, "[include(") {
        candidates.push(Candidate::Include { at, args, end });
    }
    if let Some(at) = find(text, "{{{") {
        candidates.push(Candidate::Brace { at });
    }
    if let Some((at, args, end)) = find_macro(text, "[youtube(") {
        candidates.push(Candidate::Youtube { at, args, end });
    }
    if let Some((at, inner, end)) = find_wiki_link(text) {
        candidates.push(Candidate::WikiLink { at, inner, end });
    }
    if let Some(at) = find_ci(text, "[br]") {
        candidates.push(Candidate::Break { at, end: at + 4 });
    }
    for kind in SpanKind::ALL {
        if let Some((at, inner, end)) = find_span(text, kind.delimiter()) {
            candidates.push(Candidate::Span { at, kind, inner, end });
        }
    }
    candidates.sort_by_key(Candidate::at);
    candidates
}

/// First complete `open ... )]` macro, single-line.
fn find_macro(text: &str, open: &str) -> Option<(usize, (usize, usize), usize)> {
    let mut from = 0;
    while let Some(rel) = find_ci(&text[from..], open) {
        let at = from + rel;
        let args_start = at + open.len();
        if let Some(close_rel) = find(&text[args_start..], ")]") {
            let args_end = args_start + close_rel;
            if !text[at..args_end].contains('\n') {
                return Some((at, (args_start, args_end), args_end + 2));
            }
        }
        from = at + open.len();
    }
    None
}

/// First complete `[[ ... ]]` with balanced nesting of the same kind.
fn find_wiki_link(text: &str) -> Option<(usize, (usize, usize), usize)> {
    // No closer anywhere means no opener can ever match; this keeps
    // bracket bombs (`[[[[...`) linear.
    find(text, "]]")?;
    let mut from = 0;
    while let Some(rel) = find(&text[from..], "[[") {
        let at = from + rel;
        if let Some(end) = balanced_end(text, at, "[[", "]]") {
            return Some((at, (at + 2, end - 2), end));
        }
        from = at + 2;
    }
    None
}

/// First complete single-line `delim ... delim` span.
fn find_span(text: &str, delimiter: &str) -> Option<(usize, (usize, usize), usize)> {
    let mut from = 0;
    while let Some(rel) = find(&text[from..], delimiter) {
        let at = from + rel;
        let inner_start = at + delimiter.len();
        let Some(close_rel) = find(&text[inner_start..], delimiter) else {
            return None;
        };
        let inner_end = inner_start + close_rel;
        if !text[inner_start..inner_end].contains('\n') {
            return Some((at, (inner_start, inner_end), inner_end + delimiter.len()));
        }
        from = at + delimiter.len();
    }
    None
}

/// Attempt one candidate. `None` means it failed to complete and the next
/// candidate should be tried.
fn try_candidate(
    text: &str,
    candidate: Candidate,
    ctx: &mut ParseContext,
) -> Option<(usize, Vec<InlineNode>)> {
    match candidate {
        Candidate::Footnote { at } => {
            let close = bracket_close(text, at)?;
            let raw = &text[at + 2..close];
            let (label, content_text) = footnote::split_label(raw);
            let content = parse_inline(content_text, ctx);
            let id = footnote::push(&mut ctx.footnotes, label, content);
            let label = ctx.footnotes[id - 1].label.clone();
            Some((close + 1, vec![InlineNode::FootnoteRef { id, label }]))
        }
        Candidate::Include { args, end, .. } => {
            let include = include::resolve(&text[args.0..args.1], ctx);
            Some((end, vec![InlineNode::Include(include)]))
        }
        Candidate::Brace { at } => {
            let end = balanced_end(text, at, "{{{", "}}}")?;
            let content = &text[at + 3..end - 3];
            Some((end, braces::brace_nodes(content, ctx)))
        }
        Candidate::Youtube { args, end, .. } => {
            Some((end, vec![youtube_node(&text[args.0..args.1])]))
        }
        Candidate::WikiLink { inner, end, .. } => {
            let node = links::wiki_link_node(&text[inner.0..inner.1], ctx);
            Some((end, vec![node]))
        }
        Candidate::Break { end, .. } => Some((end, vec![InlineNode::LineBreak])),
        Candidate::Span { kind, inner, end, .. } => {
            let children = parse_inline(&text[inner.0..inner.1], ctx);
            Some((end, vec![kind.wrap(children)]))
        }
    }
}

/// `[youtube(id, width=.., height=..)]`.
fn youtube_node(args: &str) -> InlineNode {
    let mut parts = args.split(',');
    let video_id = parts.next().unwrap_or("").trim().to_string();
    let mut width = "640px".to_string();
    let mut height = "360px".to_string();
    for part in parts {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("width=") {
            width = value.to_string();
        } else if let Some(value) = part.strip_prefix("height=") {
            height = value.to_string();
        }
    }
    InlineNode::YoutubeEmbed {
        video_id,
        width,
        height,
    }
}
