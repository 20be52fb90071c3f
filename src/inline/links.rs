//! `[[ ... ]]` payload interpretation.
//!
//! One bracket syntax covers four constructs, disambiguated by the target:
//! file embeds (`파일:`/`File:`/`이미지:`), external URLs (`http(s)://`),
//! cross-wiki links (`!NW:`), and internal page links. The label after the
//! first top-level `|` is itself inline-parsed.

use percent_encoding::utf8_percent_encode;

use crate::context::ParseContext;
use crate::document::{ImageAlign, InlineNode, LinkTarget};
use crate::inline::parse_inline;
use crate::inline::scan::split_label_pipe;
use crate::render::COMPONENT_ENCODE;

/// Interpret a bracket payload (the text between `[[` and `]]`).
pub fn wiki_link_node(payload: &str, ctx: &mut ParseContext) -> InlineNode {
    let (target, label_raw) = split_label_pipe(payload);

    if let Some(filename) = image_filename(target) {
        return image_node(filename, label_raw.unwrap_or(""));
    }

    if has_url_scheme(target) {
        let label = match label_raw {
            Some(label_raw) => parse_inline(label_raw, ctx),
            None => vec![InlineNode::text(target)],
        };
        return InlineNode::ExternalLink {
            url: target.to_string(),
            label,
        };
    }

    if let Some(remote) = target.strip_prefix("!NW:") {
        // Cross-wiki target: always external, no existence check.
        let split = LinkTarget::split(remote);
        let mut url = format!(
            "https://namu.wiki/w/{}",
            utf8_percent_encode(&split.slug, COMPONENT_ENCODE)
        );
        if let Some(anchor) = &split.anchor {
            url.push('#');
            url.push_str(anchor);
        }
        let label = match label_raw {
            Some(label_raw) => parse_inline(label_raw, ctx),
            None => vec![InlineNode::text(remote)],
        };
        return InlineNode::ExternalLink { url, label };
    }

    let split = LinkTarget::split(target);
    let exists = ctx.slug_exists(&split.slug);
    let label = match label_raw {
        Some(label_raw) => parse_inline(label_raw, ctx),
        None => vec![InlineNode::text(target)],
    };
    InlineNode::InternalLink {
        target: split,
        exists,
        label,
    }
}

/// The filename of a file-embed target, if it is one.
fn image_filename(target: &str) -> Option<&str> {
    let after_marker = target
        .strip_prefix("파일:")
        .or_else(|| target.strip_prefix("이미지:"))
        .or_else(|| {
            (target.len() >= 5 && target.as_bytes()[..5].eq_ignore_ascii_case(b"file:"))
                .then(|| &target[5..])
        })?;
    // Anything after a second colon is discarded.
    Some(after_marker.split(':').next().unwrap_or(after_marker))
}

/// Build an image node from the `|`-separated option list.
fn image_node(filename: &str, options: &str) -> InlineNode {
    let mut width = None;
    let mut align = ImageAlign::Inline;
    for option in options.split('|') {
        let option = option.trim();
        if let Some(value) = option.strip_prefix("width=") {
            width = Some(if value.bytes().all(|b| b.is_ascii_digit()) && !value.is_empty() {
                format!("{value}px")
            } else {
                value.to_string()
            });
        } else if let Some(value) = option.strip_prefix("align=") {
            align = match value.to_ascii_lowercase().as_str() {
                "left" => ImageAlign::Left,
                "center" => ImageAlign::Center,
                "right" => ImageAlign::Right,
                _ => align,
            };
        }
    }
    InlineNode::Image {
        filename: filename.to_string(),
        width,
        align,
    }
}

fn has_url_scheme(target: &str) -> bool {
    let lower_prefix = |prefix: &[u8]| {
        target.len() >= prefix.len()
            && target.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix)
    };
    lower_prefix(b"http://") || lower_prefix(b"https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemorySource, Options};

    fn ctx_with(slugs: &[&str]) -> (MemorySource, Vec<String>) {
        let mut source = MemorySource::new();
        for slug in slugs {
            source.insert(*slug, "");
        }
        (source, slugs.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn internal_link_existence_coloring() {
        let (source, candidates) = ctx_with(&["Foo"]);
        let mut ctx = ParseContext::new(None, &source, Options::default());
        ctx.prime_existing(&candidates);

        match wiki_link_node("Foo", &mut ctx) {
            InlineNode::InternalLink { target, exists, .. } => {
                assert_eq!(target.slug, "Foo");
                assert!(exists);
            }
            other => panic!("unexpected {other:?}"),
        }
        match wiki_link_node("Bar", &mut ctx) {
            InlineNode::InternalLink { exists, .. } => assert!(!exists),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn anchor_splits_off_before_existence_check() {
        let (source, candidates) = ctx_with(&["Foo"]);
        let mut ctx = ParseContext::new(None, &source, Options::default());
        ctx.prime_existing(&candidates);

        match wiki_link_node("Foo#section", &mut ctx) {
            InlineNode::InternalLink { target, exists, label } => {
                assert_eq!(target.slug, "Foo");
                assert_eq!(target.anchor.as_deref(), Some("section"));
                assert!(exists);
                // Default label keeps the raw target, anchor included.
                assert_eq!(label, vec![InlineNode::text("Foo#section")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn external_link_regardless_of_slug_set() {
        let source = MemorySource::new();
        let mut ctx = ParseContext::new(None, &source, Options::default());
        match wiki_link_node("https://x.com|Text", &mut ctx) {
            InlineNode::ExternalLink { url, label } => {
                assert_eq!(url, "https://x.com");
                assert_eq!(label, vec![InlineNode::text("Text")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cross_wiki_link_builds_remote_url() {
        let source = MemorySource::new();
        let mut ctx = ParseContext::new(None, &source, Options::default());
        match wiki_link_node("!NW:문서#부분", &mut ctx) {
            InlineNode::ExternalLink { url, .. } => {
                assert!(url.starts_with("https://namu.wiki/w/"));
                assert!(url.ends_with("#부분"));
                assert!(!url.contains("문서"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn image_with_width_and_align() {
        match image_node("a.png", "width=120|align=center") {
            InlineNode::Image { filename, width, align } => {
                assert_eq!(filename, "a.png");
                assert_eq!(width.as_deref(), Some("120px"));
                assert_eq!(align, ImageAlign::Center);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn image_prefixes() {
        assert_eq!(image_filename("파일:a.png"), Some("a.png"));
        assert_eq!(image_filename("File:b.jpg"), Some("b.jpg"));
        assert_eq!(image_filename("file:c.gif"), Some("c.gif"));
        assert_eq!(image_filename("이미지:d.png"), Some("d.png"));
        assert_eq!(image_filename("Document"), None);
    }
}
