//! Footnote collection.
//!
//! Footnotes are discovered during inline parsing and accumulate on the
//! render context in first-occurrence order, nested inclusions included.
//! A footnote's body is parsed before the footnote is pushed, so a note
//! nested inside another note takes the earlier id.

use crate::document::{Footnote, InlineNode};

/// Split the raw body of `[* ... ]` into label and content text.
///
/// A body starting with a non-space is labeled: the text up to the first
/// space is the label, the remainder the content. Otherwise the single
/// leading space is stripped and the label defaults to the numeric id.
pub fn split_label(raw: &str) -> (Option<&str>, &str) {
    if raw.starts_with(' ') {
        return (None, &raw[1..]);
    }
    match raw.split_once(' ') {
        Some((label, content)) => (Some(label), content),
        None => (Some(raw), ""),
    }
}

/// Append a footnote with already-parsed content, returning its 1-based id.
pub fn push(sink: &mut Vec<Footnote>, label: Option<&str>, content: Vec<InlineNode>) -> usize {
    let id = sink.len() + 1;
    let label = match label {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => id.to_string(),
    };
    sink.push(Footnote { id, label, content });
    id
}
