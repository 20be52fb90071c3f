//! Balanced scanners and marker search shared across the parsers.
//!
//! All wiki delimiters are ASCII, so byte-offset scanning over UTF-8 text
//! is safe: a multi-byte code point never contains an ASCII byte.

use memchr::memmem;

/// First occurrence of `needle`, case-insensitively (ASCII).
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    debug_assert!(needle.is_ascii());
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&at| h[at..at + n.len()].eq_ignore_ascii_case(n))
}

/// First occurrence of `needle` (case-sensitive, memmem-accelerated).
pub fn find(haystack: &str, needle: &str) -> Option<usize> {
    memmem::find(haystack.as_bytes(), needle.as_bytes())
}

/// Given `open` at byte offset `start`, find the end offset (exclusive) of
/// the matching `close`, counting nested `open`/`close` token pairs.
///
/// Returns `None` when unterminated; the caller degrades to literal text.
pub fn balanced_end(text: &str, start: usize, open: &str, close: &str) -> Option<usize> {
    debug_assert!(text[start..].starts_with(open));
    let mut depth = 0usize;
    let mut at = start;
    while at < text.len() {
        if text[at..].starts_with(open) {
            depth += 1;
            at += open.len();
        } else if text[at..].starts_with(close) {
            depth -= 1;
            at += close.len();
            if depth == 0 {
                return Some(at);
            }
        } else {
            // Advance one whole code point; delimiters are ASCII.
            at += text[at..].chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

/// Closing-bracket offset for a `[* ...]` footnote opened at `start`,
/// counting single `[`/`]` nesting. Returns the offset of the closing `]`.
pub fn bracket_close(text: &str, start: usize) -> Option<usize> {
    debug_assert!(text.as_bytes().get(start) == Some(&b'['));
    let mut depth = 0isize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Net `{{{` minus `}}}` token count of a line, non-overlapping left to
/// right. Used to carry fenced regions and table rows across lines.
pub fn brace_delta(line: &str) -> isize {
    let opens = memmem::find_iter(line.as_bytes(), b"{{{").count() as isize;
    let closes = memmem::find_iter(line.as_bytes(), b"}}}").count() as isize;
    opens - closes
}

/// Remove the last `}}}` on a fenced region's closing line; a line that
/// becomes blank is dropped entirely by the caller.
pub fn strip_last_fence(line: &str) -> String {
    match memmem::rfind(line.as_bytes(), b"}}}") {
        Some(at) => {
            let mut out = String::with_capacity(line.len() - 3);
            out.push_str(&line[..at]);
            out.push_str(&line[at + 3..]);
            out
        }
        None => line.to_string(),
    }
}

/// Split a wiki-link payload on the first `|` at bracket depth zero,
/// so image/link labels containing `[[...]]` stay intact.
pub fn split_label_pipe(payload: &str) -> (&str, Option<&str>) {
    let mut depth = 0isize;
    for (at, byte) in payload.as_bytes().iter().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => depth -= 1,
            b'|' if depth == 0 => return (&payload[..at], Some(&payload[at + 1..])),
            _ => {}
        }
    }
    (payload, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_find() {
        assert_eq!(find_ci("a [Include(x)]", "[include("), Some(2));
        assert_eq!(find_ci("nothing here", "[include("), None);
    }

    #[test]
    fn balanced_braces_nest() {
        let text = "{{{a{{{b}}}c}}}d";
        assert_eq!(balanced_end(text, 0, "{{{", "}}}"), Some(15));
    }

    #[test]
    fn unterminated_braces_fail() {
        assert_eq!(balanced_end("{{{open {{{deeper}}}", 0, "{{{", "}}}"), None);
    }

    #[test]
    fn balanced_link_brackets_nest() {
        let text = "[[a|[[파일:x.png]]]] tail";
        let end = balanced_end(text, 0, "[[", "]]").unwrap();
        assert_eq!(&text[..end], "[[a|[[파일:x.png]]]]");
    }

    #[test]
    fn footnote_bracket_counts_singles() {
        let text = "[*see [ref] end] tail";
        assert_eq!(bracket_close(text, 0), Some(15));
        assert_eq!(bracket_close("[*never closed", 0), None);
    }

    #[test]
    fn brace_delta_counts_tokens() {
        assert_eq!(brace_delta("{{{#!wiki"), 1);
        assert_eq!(brace_delta("a }}} b"), -1);
        assert_eq!(brace_delta("{{{ }}} {{{"), 1);
    }

    #[test]
    fn strips_only_last_fence() {
        assert_eq!(strip_last_fence("}}} tail }}}"), "}}} tail ");
        assert_eq!(strip_last_fence("no fence"), "no fence");
    }

    #[test]
    fn label_split_respects_nested_brackets() {
        let (target, label) = split_label_pipe("https://x.com|[[파일:a.png|width=10]]");
        assert_eq!(target, "https://x.com");
        assert_eq!(label, Some("[[파일:a.png|width=10]]"));

        let (target, label) = split_label_pipe("Foo");
        assert_eq!(target, "Foo");
        assert!(label.is_none());
    }
}
