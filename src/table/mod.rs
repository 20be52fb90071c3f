//! Table engine: groups `||` rows into a styled grid.
//!
//! A logical row may span several physical lines when a cell carries an
//! unterminated `{{{` block, so both row merging and cell splitting track
//! brace depth. Style scoping: column < row < cell, with table-wide
//! attributes accepted from any cell in the table.

pub mod attributes;

use smallvec::SmallVec;

use crate::context::ParseContext;
use crate::document::{Block, StripeStyle, Table, TableCell, TableRow};
use crate::inline::parse_inline;
use crate::inline::scan::brace_delta;

use attributes::{parse_cell_attributes, CellAttrs};

/// Split one logical row into raw cell strings on `||`, ignoring `||`
/// inside `{{{ }}}` regions.
pub fn split_cells(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut buffer = String::new();
    let mut depth = 0isize;
    let bytes = row.as_bytes();
    let mut at = 0;
    while at < bytes.len() {
        if row[at..].starts_with("{{{") {
            depth += 1;
            buffer.push_str("{{{");
            at += 3;
        } else if row[at..].starts_with("}}}") {
            depth -= 1;
            buffer.push_str("}}}");
            at += 3;
        } else if depth == 0 && row[at..].starts_with("||") {
            cells.push(std::mem::take(&mut buffer));
            at += 2;
        } else {
            // Push the whole UTF-8 code point, not a single byte.
            let ch = row[at..].chars().next().unwrap_or('\u{FFFD}');
            buffer.push(ch);
            at += ch.len_utf8();
        }
    }
    cells.push(buffer);
    cells
}

/// Merge physical lines into logical rows: a row stays open while its
/// running brace depth is positive.
fn merge_rows(lines: &[&str]) -> Vec<String> {
    let mut rows = Vec::new();
    let mut buffer = String::new();
    let mut depth = 0isize;

    for line in lines {
        if buffer.is_empty() && depth == 0 {
            buffer.push_str(line);
        } else {
            buffer.push('\n');
            buffer.push_str(line);
        }
        depth += brace_delta(line);
        if depth <= 0 {
            rows.push(std::mem::take(&mut buffer));
            depth = 0;
        }
    }
    if !buffer.is_empty() {
        rows.push(buffer);
    }
    rows
}

/// Parse a run of `||` lines into a [`Block::Table`].
pub fn parse_table(lines: &[&str], ctx: &mut ParseContext) -> Block {
    let mut table = Table::default();

    for raw_row in merge_rows(lines) {
        let trimmed = raw_row.trim();
        let raw_cells = split_cells(trimmed);
        let last = raw_cells.len().saturating_sub(1);

        let mut parsed: SmallVec<[CellAttrs; 8]> = SmallVec::new();
        for (index, raw_cell) in raw_cells.iter().enumerate() {
            // A row wrapped in `||` pipes produces one empty leading and
            // trailing fragment; drop those, keep interior empties.
            if index == 0 && raw_cell.is_empty() && trimmed.starts_with("||") {
                continue;
            }
            if index == last && raw_cell.trim().is_empty() && trimmed.ends_with("||") {
                continue;
            }
            parsed.push(parse_cell_attributes(raw_cell));
        }

        // Table-wide attributes from any cell apply to the whole table.
        for attrs in &parsed {
            table.style.merge_from(&attrs.table);
        }
        // Column styles accumulate by cell index, later rows overriding.
        for (index, attrs) in parsed.iter().enumerate() {
            if attrs.column.is_empty() {
                continue;
            }
            if table.columns.len() <= index {
                table.columns.resize(index + 1, StripeStyle::default());
            }
            table.columns[index].merge_from(&attrs.column);
        }
        // Row style comes from the first cell that contributes one.
        let row_style = parsed
            .iter()
            .find(|attrs| !attrs.row.is_empty())
            .map(|attrs| attrs.row.clone())
            .unwrap_or_default();

        let cells = parsed
            .into_iter()
            .map(|attrs| TableCell {
                content: parse_inline(&attrs.content, ctx),
                col_span: attrs.col_span,
                row_span: attrs.row_span,
                style: attrs.cell,
            })
            .collect();

        table.rows.push(TableRow {
            cells,
            style: row_style,
        });
    }

    Block::Table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemorySource, Options, ParseContext};
    use crate::document::{InlineNode, TextAlign};

    fn parse(lines: &[&str]) -> Table {
        let source = MemorySource::new();
        let mut ctx = ParseContext::new(None, &source, Options::default());
        match parse_table(lines, &mut ctx) {
            Block::Table(table) => table,
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn splits_on_pipes_outside_braces() {
        let cells = split_cells("a||{{{x||y}}}||b");
        assert_eq!(cells, vec!["a", "{{{x||y}}}", "b"]);
    }

    #[test]
    fn basic_grid() {
        let table = parse(&["|| A || B ||", "|| C || D || E ||"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[1].cells.len(), 3);
    }

    #[test]
    fn styled_span_grid() {
        let table = parse(&["||<bgcolor=#FF0000> A ||<-2> B ||", "|| C || D || E ||"]);
        let first = &table.rows[0].cells[0];
        assert_eq!(first.style.background.as_deref(), Some("#FF0000"));
        assert_eq!(table.rows[0].cells[1].col_span, 2);
        assert_eq!(table.rows[1].cells.len(), 3);
    }

    #[test]
    fn multi_line_cell_stays_one_row() {
        let table = parse(&["|| start {{{#!wiki", "inner line", "}}} || next ||"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells.len(), 2);
    }

    #[test]
    fn table_attrs_from_any_cell() {
        let table = parse(&["|| a || b ||", "||<tablewidth=100%> c || d ||"]);
        assert_eq!(table.style.width.as_deref(), Some("100%"));
    }

    #[test]
    fn column_styles_accumulate_by_index() {
        let table = parse(&["||<colbgcolor=#eee> a || b ||"]);
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].background.as_deref(), Some("#eee"));
    }

    #[test]
    fn row_style_from_first_contributor() {
        let table = parse(&["|| a ||<rowbgcolor=#fee> b ||"]);
        assert_eq!(table.rows[0].style.background.as_deref(), Some("#fee"));
    }

    #[test]
    fn alignment_inferred_per_cell() {
        let table = parse(&["|| center || right|| left ||"]);
        let cells = &table.rows[0].cells;
        assert_eq!(cells[0].style.align, Some(TextAlign::Center));
        assert_eq!(cells[1].style.align, Some(TextAlign::Right));
        assert_eq!(cells[2].style.align, Some(TextAlign::Center));
    }

    #[test]
    fn cell_content_is_inline_parsed() {
        let table = parse(&["|| '''bold''' ||"]);
        let content = &table.rows[0].cells[0].content;
        assert!(matches!(content[0], InlineNode::Bold(_)));
    }

    #[test]
    fn interior_empty_cells_survive() {
        let table = parse(&["|| a |||| b ||"]);
        assert_eq!(table.rows[0].cells.len(), 3);
        assert!(table.rows[0].cells[1].content.is_empty());
    }
}
