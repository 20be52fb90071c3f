//! Block parser: a line state machine over the document source.
//!
//! Lines are consumed top to bottom. Fenced regions (`{{{#!raw`,
//! `{{{#!wiki`, `{{{#!folding`) and table runs span multiple lines and
//! track `{{{`/`}}}` depth so nested payloads cannot terminate them early;
//! everything else is decided per line. No malformed construct aborts the
//! parse: an unterminated fence falls through to paragraph handling and
//! the inline parser renders it as literal text.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::ParseContext;
use crate::document::{Block, InlineNode, LinkTarget};
use crate::inline::braces::wiki_style;
use crate::inline::parse_inline;
use crate::inline::scan::{brace_delta, strip_last_fence};
use crate::limits::MAX_BLOCK_NESTING;
use crate::table::parse_table;
use crate::toc;

/// Document-level context for one block-parse pass. Sub-parses (fenced
/// regions, inclusions) run with the default scope: headings there carry
/// no section number and collapse state comes from their own marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockScope<'s> {
    /// Line index → dotted section number, from the up-front heading scan.
    pub numbers: Option<&'s FxHashMap<usize, String>>,
    /// Per-line visibility under the current collapse state.
    pub visible: Option<&'s [bool]>,
    /// Currently collapsed section ids.
    pub collapsed: Option<&'s FxHashSet<String>>,
}

/// Parse a fragment with no document-level scope (inclusions, fenced
/// region bodies).
pub fn parse_fragment(lines: &[&str], ctx: &mut ParseContext) -> Vec<Block> {
    parse_blocks(lines, BlockScope::default(), ctx)
}

/// Parse lines into blocks.
pub fn parse_blocks(lines: &[&str], scope: BlockScope, ctx: &mut ParseContext) -> Vec<Block> {
    if ctx.block_nesting >= MAX_BLOCK_NESTING {
        // Too deep; emit literal paragraphs without further recursion.
        return lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Block::Paragraph(vec![InlineNode::text(line.trim())]))
            .collect();
    }
    ctx.block_nesting += 1;

    let mut blocks = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        if scope.visible.is_some_and(|visible| !visible[index]) {
            index += 1;
            continue;
        }
        let line = lines[index];
        let trimmed = line.trim();

        if let Some(summary_raw) = trimmed.strip_prefix("{{{#!folding") {
            // Title comes from the opening line; the body starts below it.
            if let Some((content, next)) = gather_below(lines, index + 1) {
                let summary = match summary_raw.trim() {
                    "" => "more".to_string(),
                    summary => summary.to_string(),
                };
                let children = parse_owned_fragment(&content, ctx);
                blocks.push(Block::FoldingSection { summary, children });
                index = next;
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix("{{{#!wiki") {
            let (style, first_rest) = wiki_style(rest);
            if let Some((content, next)) = gather_with_first(lines, index, first_rest, true, false)
            {
                let children = parse_owned_fragment(&content, ctx);
                blocks.push(Block::StyledContainer { style, children });
                index = next;
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix("{{{#!raw") {
            let first_rest = rest.trim_start();
            if let Some((content, next)) = gather_with_first(lines, index, first_rest, false, true)
            {
                blocks.push(Block::RawBlock(content.join("\n")));
                index = next;
                continue;
            }
        }

        if trimmed.starts_with("||") {
            let (table_lines, next) = gather_table(lines, index);
            blocks.push(parse_table(&table_lines, ctx));
            index = next;
            continue;
        }

        let number = scope.numbers.and_then(|numbers| numbers.get(&index));
        if let Some(block) = parse_line(line, number, scope.collapsed, ctx) {
            blocks.push(block);
        }
        index += 1;
    }

    ctx.block_nesting -= 1;
    blocks
}

fn parse_owned_fragment(lines: &[String], ctx: &mut ParseContext) -> Vec<Block> {
    let borrowed: Vec<&str> = lines.iter().map(String::as_str).collect();
    parse_fragment(&borrowed, ctx)
}

/// Collect a fenced body starting below the opening line (folding form).
/// Returns `None` when the fence never closes; the caller falls through
/// and the opening line degrades to a paragraph.
fn gather_below(lines: &[&str], start: usize) -> Option<(Vec<String>, usize)> {
    let mut depth = 1isize;
    let mut content = Vec::new();
    for (offset, line) in lines[start..].iter().enumerate() {
        depth += brace_delta(line);
        if depth <= 0 {
            let cleaned = strip_last_fence(line);
            if !cleaned.trim().is_empty() {
                content.push(cleaned);
            }
            return Some((content, start + offset + 1));
        }
        content.push(line.to_string());
    }
    None
}

/// Collect a fenced body whose opening line's remainder participates
/// (wiki and raw forms). `skip_empty_first` drops a blank opening
/// remainder; `keep_blank_close` keeps a blank closing line (raw regions
/// preserve it verbatim).
fn gather_with_first(
    lines: &[&str],
    open_index: usize,
    first_rest: &str,
    skip_empty_first: bool,
    keep_blank_close: bool,
) -> Option<(Vec<String>, usize)> {
    let mut depth = 1isize;
    let mut content = Vec::new();
    for (offset, line) in lines[open_index..].iter().enumerate() {
        let is_first = offset == 0;
        let text = if is_first { first_rest } else { line };
        depth += brace_delta(text);
        if depth <= 0 {
            let cleaned = strip_last_fence(text);
            let keep = if cleaned.trim().is_empty() {
                keep_blank_close && !is_first
            } else {
                true
            };
            if keep {
                content.push(cleaned);
            }
            return Some((content, open_index + offset + 1));
        }
        if is_first && skip_empty_first && text.trim().is_empty() {
            continue;
        }
        content.push(text.to_string());
    }
    None
}

/// Collect a run of table lines, brace-depth aware so a multi-line cell
/// cannot end the table early.
fn gather_table<'a>(lines: &[&'a str], start: usize) -> (Vec<&'a str>, usize) {
    let mut depth = 0isize;
    let mut taken = Vec::new();
    let mut index = start;
    while index < lines.len() {
        depth += brace_delta(lines[index]);
        taken.push(lines[index]);
        index += 1;
        if depth <= 0 && (index >= lines.len() || !lines[index].trim().starts_with("||")) {
            break;
        }
    }
    (taken, index)
}

/// Parse one non-region line.
fn parse_line(
    line: &str,
    number: Option<&String>,
    collapsed: Option<&FxHashSet<String>>,
    ctx: &mut ParseContext,
) -> Option<Block> {
    let trimmed = line.trim();

    if let Some(rest) = trimmed.strip_prefix("#redirect ") {
        let target = LinkTarget::split(rest.trim());
        let exists = ctx.slug_exists(&target.slug);
        if ctx.redirect.is_none() {
            ctx.redirect = Some(target.clone());
        }
        return Some(Block::RedirectDirective { target, exists });
    }

    if trimmed == "[목차]" {
        return Some(Block::TocPlaceholder);
    }
    if trimmed.eq_ignore_ascii_case("[clearfix]") {
        return Some(Block::ClearFix);
    }

    if let Some(heading) = toc::heading_line(trimmed) {
        let number = number.cloned();
        let id = number.as_deref().map(toc::section_id);
        let collapsed = match (&id, collapsed) {
            (Some(id), Some(set)) => set.contains(id),
            _ => heading.collapsed,
        };
        let text = parse_inline(heading.text, ctx);
        return Some(Block::Heading {
            level: heading.level,
            number,
            id,
            collapsed,
            text,
        });
    }

    if let Some((depth, content)) = list_item(line) {
        return Some(Block::ListItem {
            depth,
            content: parse_inline(content, ctx),
        });
    }

    if trimmed.is_empty() {
        return Some(Block::Blank);
    }

    if trimmed.starts_with("[[분류:") && trimmed.ends_with("]]") {
        let name = trimmed["[[분류:".len()..trimmed.len() - 2].trim();
        if !name.is_empty() {
            ctx.categories.push(name.to_string());
        }
        return None;
    }

    if trimmed.len() >= 4 && trimmed.bytes().all(|b| b == b'-') {
        return Some(Block::HorizontalRule);
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        return Some(Block::BlockQuote(parse_inline(rest.trim(), ctx)));
    }

    Some(Block::Paragraph(parse_inline(trimmed, ctx)))
}

/// `* item` with leading indentation; depth is the indent's character
/// count, mapped to a fixed unit by the renderer.
fn list_item(line: &str) -> Option<(usize, &str)> {
    let indent_end = line
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(at, _)| at)?;
    let depth = line[..indent_end].chars().count();
    let rest = line[indent_end..].strip_prefix('*')?;
    Some((depth, rest.trim_start()))
}
