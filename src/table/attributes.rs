//! The per-cell attribute mini-grammar.
//!
//! A cell may begin with a run of `<...>` tags: style keys (`bgcolor=`,
//! `width=`), scope-prefixed keys (`table…`, `row…`, `col…`), span
//! shorthands (`<-3>`, `<|2>`, `<^|2>`, `<v|2>`), and alignment shorthands
//! (`<(>`, `<:>`, `<)>`). The run ends at the first unrecognized tag,
//! which stays in the content verbatim. When no explicit alignment is
//! given it is inferred from the content's flanking spaces.

use crate::document::{CellStyle, StripeStyle, TableAlign, TableStyle, TextAlign, VerticalAlign};

/// Everything one cell contributes: its own style, scoped contributions,
/// spans, and the remaining content text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAttrs {
    pub cell: CellStyle,
    pub row: StripeStyle,
    pub column: StripeStyle,
    pub table: TableStyle,
    pub col_span: u32,
    pub row_span: u32,
    pub content: String,
}

/// A color value may carry a comma-separated dark-mode variant; only the
/// first value is kept.
pub fn color_value(raw: &str) -> String {
    raw.split(',').next().unwrap_or("").trim().to_string()
}

/// Bare digit sizes become pixels; anything else passes through.
pub fn size_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        Some(format!("{raw}px"))
    } else {
        Some(raw.to_string())
    }
}

/// Consume the leading `<...>` run of `raw` and interpret the remainder.
pub fn parse_cell_attributes(raw: &str) -> CellAttrs {
    let mut attrs = CellAttrs {
        col_span: 1,
        row_span: 1,
        ..CellAttrs::default()
    };
    let mut content = raw;

    loop {
        let ahead = content.trim_start();
        if !ahead.starts_with('<') {
            break;
        }
        let Some(end) = ahead.find('>') else {
            break;
        };
        let tag = &ahead[1..end];
        if !apply_tag(tag, &mut attrs) {
            break;
        }
        // Cut through the consumed tag, dropping whitespace before it.
        let cut = content.find('<').map(|at| at + tag.len() + 2);
        match cut {
            Some(cut) => content = &content[cut..],
            None => break,
        }
    }

    if attrs.cell.align.is_none() {
        attrs.cell.align = infer_alignment(content);
    }
    attrs.content = content.trim().to_string();
    attrs
}

/// Interpret one tag body. Returns false for an unrecognized tag, which
/// ends the attribute run.
fn apply_tag(tag: &str, attrs: &mut CellAttrs) -> bool {
    let lower = tag.trim().to_ascii_lowercase();

    if lower.starts_with("tablebordercolor=") {
        attrs.table.border_color = Some(color_value(value_of(tag)));
    } else if lower.starts_with("tablebgcolor=") {
        // Table background also seeds this cell's own background; a later
        // <bgcolor=..> in the same run overrides it.
        let color = color_value(value_of(tag));
        attrs.table.background = Some(color.clone());
        attrs.cell.background = Some(color);
    } else if let Some(value) = lower.strip_prefix("tablealign=") {
        attrs.table.align = table_align(value);
    } else if lower.starts_with("tablewidth=") {
        attrs.table.width = size_value(value_of(tag));
    } else if lower.starts_with("table") {
        apply_table_options(&tag.trim()[5..], attrs);
    } else if lower.starts_with("rowbgcolor=") {
        attrs.row.background = Some(color_value(value_of(tag)));
    } else if lower.starts_with("rowcolor=") {
        attrs.row.foreground = Some(color_value(value_of(tag)));
    } else if lower.starts_with("colbgcolor=") {
        attrs.column.background = Some(color_value(value_of(tag)));
    } else if lower.starts_with("colcolor=") {
        attrs.column.foreground = Some(color_value(value_of(tag)));
    } else if lower == "nopad" {
        attrs.cell.no_padding = true;
    } else if lower.starts_with("bgcolor=") {
        attrs.cell.background = Some(color_value(value_of(tag)));
    } else if tag.starts_with('#') {
        attrs.cell.background = Some(color_value(tag));
    } else if lower.starts_with("color=") {
        attrs.cell.foreground = Some(color_value(value_of(tag)));
    } else if let Some(rest) = tag.strip_prefix("^|") {
        attrs.cell.vertical_align = Some(VerticalAlign::Top);
        apply_row_span(rest, attrs);
    } else if let Some(rest) = tag.strip_prefix("v|") {
        attrs.cell.vertical_align = Some(VerticalAlign::Bottom);
        apply_row_span(rest, attrs);
    } else if let Some(rest) = tag.strip_prefix('|') {
        attrs.cell.vertical_align = Some(VerticalAlign::Middle);
        apply_row_span(rest, attrs);
    } else if tag == "(" {
        attrs.cell.align = Some(TextAlign::Left);
    } else if tag == ":" {
        attrs.cell.align = Some(TextAlign::Center);
    } else if tag == ")" {
        attrs.cell.align = Some(TextAlign::Right);
    } else if let Some(rest) = tag.strip_prefix('-') {
        match rest.parse::<u32>() {
            Ok(span) => attrs.col_span = span.max(1),
            Err(_) => return false,
        }
    } else if lower.starts_with("width=") {
        attrs.cell.width = size_value(value_of(tag));
    } else if lower.starts_with("height=") {
        attrs.cell.height = size_value(value_of(tag));
    } else {
        return false;
    }
    true
}

/// `<table k=v k=v ...>`: space-separated options applied to the table.
fn apply_table_options(options: &str, attrs: &mut CellAttrs) {
    for option in options.split_whitespace() {
        let Some((key, value)) = option.split_once('=') else {
            continue;
        };
        if value.contains('=') {
            continue;
        }
        match key.to_ascii_lowercase().as_str() {
            "bordercolor" => attrs.table.border_color = Some(color_value(value)),
            "bgcolor" => {
                let color = color_value(value);
                attrs.table.background = Some(color.clone());
                attrs.cell.background = Some(color);
            }
            "width" => attrs.table.width = size_value(value),
            "align" => {
                if let Some(align) = table_align(&value.to_ascii_lowercase()) {
                    attrs.table.align = Some(align);
                }
            }
            _ => {}
        }
    }
}

fn apply_row_span(digits: &str, attrs: &mut CellAttrs) {
    if let Ok(span) = digits.parse::<u32>() {
        attrs.row_span = span.max(1);
    }
}

fn table_align(value: &str) -> Option<TableAlign> {
    match value {
        "left" => Some(TableAlign::Left),
        "center" => Some(TableAlign::Center),
        "right" => Some(TableAlign::Right),
        _ => None,
    }
}

/// Everything after the first `=`, preserving the original casing.
fn value_of(tag: &str) -> &str {
    tag.split_once('=').map_or("", |(_, value)| value)
}

/// Content flanked by spaces on both sides centers; a leading space only
/// right-aligns; a trailing space only left-aligns.
fn infer_alignment(content: &str) -> Option<TextAlign> {
    let leading = content.starts_with(' ');
    let trailing = content.ends_with(' ');
    match (leading, trailing) {
        (true, true) => Some(TextAlign::Center),
        (true, false) => Some(TextAlign::Right),
        (false, true) => Some(TextAlign::Left),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgcolor_and_content() {
        let attrs = parse_cell_attributes("<bgcolor=#FF0000> A ");
        assert_eq!(attrs.cell.background.as_deref(), Some("#FF0000"));
        assert_eq!(attrs.content, "A");
        assert_eq!(attrs.cell.align, Some(TextAlign::Center));
    }

    #[test]
    fn bare_hash_is_background() {
        let attrs = parse_cell_attributes("<#ddd>x");
        assert_eq!(attrs.cell.background.as_deref(), Some("#ddd"));
        assert_eq!(attrs.content, "x");
    }

    #[test]
    fn spans_parse_and_clamp() {
        let attrs = parse_cell_attributes("<-3>wide");
        assert_eq!(attrs.col_span, 3);
        let attrs = parse_cell_attributes("<|2>tall");
        assert_eq!(attrs.row_span, 2);
        assert_eq!(attrs.cell.vertical_align, Some(VerticalAlign::Middle));
        let attrs = parse_cell_attributes("<-0>zero");
        assert_eq!(attrs.col_span, 1);
    }

    #[test]
    fn vertical_align_prefixes() {
        let attrs = parse_cell_attributes("<^|3>top");
        assert_eq!(attrs.cell.vertical_align, Some(VerticalAlign::Top));
        assert_eq!(attrs.row_span, 3);
        let attrs = parse_cell_attributes("<v|>bottom");
        assert_eq!(attrs.cell.vertical_align, Some(VerticalAlign::Bottom));
        assert_eq!(attrs.row_span, 1);
    }

    #[test]
    fn explicit_alignment_beats_inference() {
        let attrs = parse_cell_attributes("<)> padded ");
        assert_eq!(attrs.cell.align, Some(TextAlign::Right));
    }

    #[test]
    fn alignment_inference() {
        assert_eq!(
            parse_cell_attributes(" centered ").cell.align,
            Some(TextAlign::Center)
        );
        assert_eq!(
            parse_cell_attributes(" right").cell.align,
            Some(TextAlign::Right)
        );
        assert_eq!(
            parse_cell_attributes("left ").cell.align,
            Some(TextAlign::Left)
        );
        assert_eq!(parse_cell_attributes("none").cell.align, None);
    }

    #[test]
    fn table_scope_tags() {
        let attrs = parse_cell_attributes("<tablebordercolor=#888><tablewidth=400>x");
        assert_eq!(attrs.table.border_color.as_deref(), Some("#888"));
        assert_eq!(attrs.table.width.as_deref(), Some("400px"));

        let attrs = parse_cell_attributes("<tablealign=center>x");
        assert_eq!(attrs.table.align, Some(TableAlign::Center));
    }

    #[test]
    fn table_bgcolor_seeds_cell_background() {
        let attrs = parse_cell_attributes("<tablebgcolor=#eee>x");
        assert_eq!(attrs.table.background.as_deref(), Some("#eee"));
        assert_eq!(attrs.cell.background.as_deref(), Some("#eee"));

        // A later bgcolor on the same cell overrides the seed.
        let attrs = parse_cell_attributes("<tablebgcolor=#eee><bgcolor=#111>x");
        assert_eq!(attrs.table.background.as_deref(), Some("#eee"));
        assert_eq!(attrs.cell.background.as_deref(), Some("#111"));
    }

    #[test]
    fn grouped_table_options() {
        let attrs = parse_cell_attributes("<table bordercolor=#00f width=50% align=right>x");
        assert_eq!(attrs.table.border_color.as_deref(), Some("#00f"));
        assert_eq!(attrs.table.width.as_deref(), Some("50%"));
        assert_eq!(attrs.table.align, Some(TableAlign::Right));
    }

    #[test]
    fn row_and_column_scopes() {
        let attrs = parse_cell_attributes("<rowbgcolor=#fee><colcolor=blue>x");
        assert_eq!(attrs.row.background.as_deref(), Some("#fee"));
        assert_eq!(attrs.column.foreground.as_deref(), Some("blue"));
    }

    #[test]
    fn dark_mode_variant_is_dropped() {
        let attrs = parse_cell_attributes("<bgcolor=#fff,#222>x");
        assert_eq!(attrs.cell.background.as_deref(), Some("#fff"));
    }

    #[test]
    fn unknown_tag_stays_in_content() {
        let attrs = parse_cell_attributes("<mystery>text");
        assert_eq!(attrs.content, "<mystery>text");
        let attrs = parse_cell_attributes("<-x>text");
        assert_eq!(attrs.content, "<-x>text");
    }

    #[test]
    fn nopad_flag() {
        assert!(parse_cell_attributes("<nopad>x").cell.no_padding);
    }
}
