//! Inline `{{{ ... }}}` forms.
//!
//! The discriminator decides the shape: `#!raw` (verbatim span), `#!wiki`
//! (styled container), `#!folding` (collapsible region), `#color` /
//! `#hex` (colored span), `±N` (sized span). A bare group just splices its
//! inline-parsed content.

use crate::block::parse_fragment;
use crate::context::ParseContext;
use crate::document::{Block, InlineNode};
use crate::inline::parse_inline;

/// Interpret the content between `{{{` and `}}}`.
pub fn brace_nodes(content: &str, ctx: &mut ParseContext) -> Vec<InlineNode> {
    if let Some(inner) = content.strip_prefix("#!raw") {
        // At most one whitespace separator is consumed; the rest is verbatim.
        let inner = strip_one_space(inner);
        return vec![InlineNode::RawSpan(inner.to_string())];
    }

    if let Some(rest) = content.strip_prefix("#!folding") {
        let rest = rest.trim();
        let (summary, body) = folding_summary(rest);
        let children = parse_block_fragment(body, ctx);
        return vec![InlineNode::Embedded(Box::new(Block::FoldingSection {
            summary,
            children,
        }))];
    }

    if let Some(rest) = content.strip_prefix("#!wiki") {
        let (style, body) = wiki_style(rest);
        let children = parse_block_fragment(body.trim(), ctx);
        return vec![InlineNode::Embedded(Box::new(Block::StyledContainer {
            style,
            children,
        }))];
    }

    if content.trim_start().starts_with('#') {
        let (color_def, inner) = match content.split_once(' ') {
            Some((color_def, inner)) => (color_def, inner),
            None => (content, ""),
        };
        let color = normalize_color(color_def);
        let children = parse_inline(inner, ctx);
        return vec![InlineNode::ColoredSpan { color, children }];
    }

    if let Some((step, inner)) = size_step(content) {
        let children = parse_inline(inner, ctx);
        return vec![InlineNode::SizedSpan { step, children }];
    }

    // Bare group: splice the inline-parsed content.
    parse_inline(content, ctx)
}

fn parse_block_fragment(body: &str, ctx: &mut ParseContext) -> Vec<Block> {
    let lines: Vec<&str> = body.split('\n').collect();
    parse_fragment(&lines, ctx)
}

fn strip_one_space(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some(ch) if ch.is_whitespace() => chars.as_str(),
        _ => text,
    }
}

/// `[title]` leads the folding body when present; the brackets stay part
/// of the displayed summary.
fn folding_summary(rest: &str) -> (String, &str) {
    if rest.starts_with('[') {
        if let Some(end) = rest.find(']') {
            return (rest[..=end].to_string(), rest[end + 1..].trim_start());
        }
    }
    ("more".to_string(), rest)
}

/// Split `#!wiki`'s remainder into CSS declarations and body.
pub fn wiki_style(rest: &str) -> (Vec<(String, String)>, &str) {
    let trimmed = rest.trim_start();
    if let Some(after) = trimmed.strip_prefix("style=\"") {
        if let Some(close) = after.find('"') {
            return (parse_css_declarations(&after[..close]), &after[close + 1..]);
        }
    }
    (Vec::new(), rest)
}

/// `key: value; key: value` pairs; incomplete rules are dropped.
pub fn parse_css_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|rule| {
            let (key, value) = rule.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            (!key.is_empty() && !value.is_empty())
                .then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// `+1`..`+5` / `-1`..`-5` followed by whitespace.
fn size_step(content: &str) -> Option<(i8, &str)> {
    let trimmed = content.trim_start();
    let mut chars = trimmed.chars();
    let sign = match chars.next()? {
        '+' => 1i8,
        '-' => -1i8,
        _ => return None,
    };
    let digit = chars.next()?;
    if !('1'..='5').contains(&digit) {
        return None;
    }
    let rest = chars.as_str();
    let separator = rest.chars().next()?;
    if !separator.is_whitespace() {
        return None;
    }
    let step = sign * (digit as u8 - b'0') as i8;
    Some((step, &rest[separator.len_utf8()..]))
}

/// First comma-separated value wins; `#transparent` maps to the CSS
/// keyword; a non-hex `#name` drops the `#`.
fn normalize_color(color_def: &str) -> String {
    let value = color_def.split(',').next().unwrap_or("").trim();
    if value == "#transparent" {
        return "transparent".to_string();
    }
    if let Some(body) = value.strip_prefix('#') {
        let is_hex = (3..=8).contains(&body.len()) && body.bytes().all(|b| b.is_ascii_hexdigit());
        if !is_hex {
            return body.to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemorySource, Options};

    fn parse(content: &str) -> Vec<InlineNode> {
        let source = MemorySource::new();
        let mut ctx = ParseContext::new(None, &source, Options::default());
        brace_nodes(content, &mut ctx)
    }

    #[test]
    fn raw_span_is_verbatim() {
        let nodes = parse("#!raw '''not bold'''");
        assert_eq!(
            nodes,
            vec![InlineNode::RawSpan("'''not bold'''".to_string())]
        );
    }

    #[test]
    fn hex_color_span() {
        let nodes = parse("#ff0000 red text");
        match &nodes[0] {
            InlineNode::ColoredSpan { color, children } => {
                assert_eq!(color, "#ff0000");
                assert_eq!(children, &vec![InlineNode::text("red text")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn named_color_drops_hash() {
        match &parse("#red text")[0] {
            InlineNode::ColoredSpan { color, .. } => assert_eq!(color, "red"),
            other => panic!("unexpected {other:?}"),
        }
        match &parse("#transparent text")[0] {
            InlineNode::ColoredSpan { color, .. } => assert_eq!(color, "transparent"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dark_mode_color_variant_is_dropped() {
        match &parse("#fff,#000 text")[0] {
            InlineNode::ColoredSpan { color, .. } => assert_eq!(color, "#fff"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn size_steps() {
        match &parse("+3 big")[0] {
            InlineNode::SizedSpan { step, children } => {
                assert_eq!(*step, 3);
                assert_eq!(children, &vec![InlineNode::text("big")]);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &parse("-2 small")[0] {
            InlineNode::SizedSpan { step, .. } => assert_eq!(*step, -2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn size_needs_separator_and_range() {
        // No whitespace after the digit, or a digit out of range: bare group.
        assert_eq!(parse("+6 huge"), vec![InlineNode::text("+6 huge")]);
        assert_eq!(parse("+1x"), vec![InlineNode::text("+1x")]);
    }

    #[test]
    fn folding_summary_keeps_brackets() {
        let nodes = parse("#!folding [펼치기]\nhidden line");
        match &nodes[0] {
            InlineNode::Embedded(block) => match block.as_ref() {
                Block::FoldingSection { summary, children } => {
                    assert_eq!(summary, "[펼치기]");
                    assert_eq!(children.len(), 1);
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wiki_container_parses_style() {
        let nodes = parse("#!wiki style=\"border: 1px solid red; margin: 0\"\ncontent");
        match &nodes[0] {
            InlineNode::Embedded(block) => match block.as_ref() {
                Block::StyledContainer { style, children } => {
                    assert_eq!(
                        style,
                        &vec![
                            ("border".to_string(), "1px solid red".to_string()),
                            ("margin".to_string(), "0".to_string()),
                        ]
                    );
                    assert!(!children.is_empty());
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_group_splices_content() {
        let nodes = parse("just '''bold''' text");
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[1], InlineNode::Bold(_)));
    }
}
