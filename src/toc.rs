//! Section numbering, TOC generation, and collapse visibility.
//!
//! Headings are scanned once up front over the raw line list. Each heading
//! level owns a counter; a heading at level L increments counter L and
//! resets every deeper counter, yielding the dotted number string
//! (`= A =` → `1.`, a following `== B ==` → `1.1.`). All levels
//! participate in numbering; see DESIGN.md for the level-1 decision.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::document::TocEntry;
use crate::limits::MAX_HEADING_LEVEL;

/// A recognized heading line, before numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingLine<'a> {
    /// `=` count, 1-6.
    pub level: usize,
    /// Whether the title carried the `#title#` collapse marker.
    pub collapsed: bool,
    /// Title text between the fences, trimmed.
    pub text: &'a str,
}

/// Match `= title =` style heading lines, including the optional paired
/// `#` collapse marker: `=# title #=`.
///
/// The fence is the longest `=` run that still leaves a non-empty title;
/// `====` is therefore a level-1 heading titled `==`, not an empty
/// heading.
pub fn heading_line(line: &str) -> Option<HeadingLine<'_>> {
    let line = line.trim();
    let bytes = line.as_bytes();
    let lead = bytes.iter().take_while(|&&b| b == b'=').count();
    let trail = bytes.iter().rev().take_while(|&&b| b == b'=').count();
    if lead == 0 || trail == 0 {
        return None;
    }

    // Longest fence with a non-empty middle.
    let mut level = lead.min(trail);
    while level > 0 {
        if line.len() > level * 2 && !line[level..line.len() - level].trim().is_empty() {
            break;
        }
        level -= 1;
    }
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }

    let mut text = line[level..line.len() - level].trim();
    let mut collapsed = false;
    if text.len() >= 2 && text.starts_with('#') && text.ends_with('#') {
        collapsed = true;
        text = text[1..text.len() - 1].trim();
        if text.is_empty() {
            return None;
        }
    }
    Some(HeadingLine {
        level,
        collapsed,
        text,
    })
}

/// Anchor id for a dotted number string: `"2.1."` → `"s-2.1"`.
pub fn section_id(number: &str) -> String {
    format!("s-{}", number.trim_end_matches('.'))
}

/// Result of the up-front heading scan.
#[derive(Debug, Default)]
pub struct SectionScan {
    /// All headings in document order.
    pub toc: Vec<TocEntry>,
    /// Line index → dotted number string.
    pub numbers: FxHashMap<usize, String>,
    /// Section ids whose headings carry the `#title#` marker.
    pub initially_collapsed: FxHashSet<String>,
}

/// Walk all lines, numbering headings and collecting TOC entries.
pub fn scan_sections(lines: &[&str]) -> SectionScan {
    let mut scan = SectionScan::default();
    let mut counters = [0usize; MAX_HEADING_LEVEL];

    for (index, line) in lines.iter().enumerate() {
        let Some(heading) = heading_line(line) else {
            continue;
        };
        let slot = heading.level - 1;
        counters[slot] += 1;
        for deeper in counters.iter_mut().skip(slot + 1) {
            *deeper = 0;
        }

        let mut number = String::new();
        for counter in &counters[..=slot] {
            number.push_str(&counter.to_string());
            number.push('.');
        }

        let id = section_id(&number);
        if heading.collapsed {
            scan.initially_collapsed.insert(id.clone());
        }
        scan.toc.push(TocEntry {
            id,
            text: heading.text.to_string(),
            level: heading.level,
            number: number.clone(),
        });
        scan.numbers.insert(index, number);
    }
    scan
}

/// Per-line visibility under the given collapsed-section set.
///
/// Once a collapsed heading of level L is seen, every following line is
/// hidden until a heading of level <= L appears. Deeper headings inside a
/// hidden range stay hidden regardless of their own collapse state.
pub fn visibility(
    lines: &[&str],
    numbers: &FxHashMap<usize, String>,
    collapsed: &FxHashSet<String>,
) -> Vec<bool> {
    let mut visible = vec![true; lines.len()];
    let mut hide_below = 0usize;

    for (index, line) in lines.iter().enumerate() {
        match heading_line(line) {
            Some(heading) => {
                if hide_below > 0 && heading.level <= hide_below {
                    hide_below = 0;
                }
                if hide_below > 0 {
                    visible[index] = false;
                    continue;
                }
                let id = numbers.get(&index).map(|number| section_id(number));
                if id.is_some_and(|id| collapsed.contains(&id)) {
                    hide_below = heading.level;
                }
            }
            None => {
                if hide_below > 0 {
                    visible[index] = false;
                }
            }
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_basic_headings() {
        let h = heading_line("== Title ==").unwrap();
        assert_eq!(h.level, 2);
        assert_eq!(h.text, "Title");
        assert!(!h.collapsed);
    }

    #[test]
    fn matches_collapse_marker() {
        let h = heading_line("==# Hidden #==").unwrap();
        assert_eq!(h.level, 2);
        assert_eq!(h.text, "Hidden");
        assert!(h.collapsed);
    }

    #[test]
    fn single_sided_marker_stays_in_text() {
        let h = heading_line("==# Half ==").unwrap();
        assert!(!h.collapsed);
        assert_eq!(h.text, "# Half");
    }

    #[test]
    fn bare_fence_run_degrades() {
        // `====` backtracks to a level-1 heading titled `==`.
        let h = heading_line("====").unwrap();
        assert_eq!(h.level, 1);
        assert_eq!(h.text, "==");
    }

    #[test]
    fn mismatched_fences_take_shortest_side() {
        let h = heading_line("=== a ==").unwrap();
        assert_eq!(h.level, 2);
        assert_eq!(h.text, "= a");
    }

    #[test]
    fn rejects_non_headings() {
        assert!(heading_line("plain text").is_none());
        assert!(heading_line("= no close").is_none());
        assert!(heading_line("======= seven =======").is_none());
    }

    #[test]
    fn numbering_resets_deeper_counters() {
        let lines = ["= A =", "== B ==", "== C ==", "= D ="];
        let scan = scan_sections(&lines);
        let numbers: Vec<&str> = scan.toc.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, vec!["1.", "1.1.", "1.2.", "2."]);
        assert_eq!(scan.toc[1].id, "s-1.1");
        assert_eq!(scan.numbers[&3], "2.");
    }

    #[test]
    fn collapse_hides_until_shallower_heading() {
        let lines = ["=# H #=", "inside", "== deeper ==", "more", "= next ="];
        let scan = scan_sections(&lines);
        let visible = visibility(&lines, &scan.numbers, &scan.initially_collapsed);
        assert_eq!(visible, vec![true, false, false, false, true]);
    }

    #[test]
    fn toc_lists_collapsed_sections() {
        let lines = ["=# H #=", "== inner =="];
        let scan = scan_sections(&lines);
        assert_eq!(scan.toc.len(), 2);
        assert!(scan.initially_collapsed.contains("s-1"));
    }

    #[test]
    fn empty_collapsed_set_shows_everything() {
        let lines = ["=# H #=", "body"];
        let scan = scan_sections(&lines);
        let visible = visibility(&lines, &scan.numbers, &FxHashSet::default());
        assert_eq!(visible, vec![true, true]);
    }
}
