//! Per-render parse context and external collaborators.
//!
//! One [`ParseContext`] lives for exactly one top-level render and its
//! recursive inclusions. All cross-cutting state — the existing-slug set,
//! the footnote sink, the visited-slug cycle guard — is threaded through
//! it explicitly; nothing is global, so concurrent renders of different
//! documents never interfere.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::document::{Footnote, LinkTarget};
use crate::limits::MAX_INCLUDE_DEPTH;

/// Content and existence lookups the engine consumes but does not own.
///
/// The engine is synchronous; an async host prefetches inclusion content
/// (concurrently, in any order) and answers [`fetch`](Self::fetch) from its
/// cache. [`collect_link_targets`] gives hosts the one batched candidate
/// list per render so existence checking costs O(1) round trips, not
/// O(links).
pub trait ContentSource {
    /// Raw markup for a stored page, or `None` if it does not exist.
    /// Used only by the inclusion resolver. Implementations map their own
    /// failures to `None`; the resolver turns that into an inert error
    /// marker rather than aborting the surrounding render.
    fn fetch(&self, slug: &str) -> Option<String>;

    /// Batched membership check: the subset of `candidates` that exist.
    /// Used for link-existence coloring.
    fn existing_slugs(&self, candidates: &[String]) -> Vec<String>;
}

/// In-memory [`ContentSource`] backed by a slug → markup map.
///
/// The CLI uses an empty one; tests seed it with fixture pages.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: FxHashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slug: impl Into<String>, markup: impl Into<String>) {
        self.pages.insert(slug.into(), markup.into());
    }
}

impl ContentSource for MemorySource {
    fn fetch(&self, slug: &str) -> Option<String> {
        self.pages.get(slug).cloned()
    }

    fn existing_slugs(&self, candidates: &[String]) -> Vec<String> {
        candidates
            .iter()
            .filter(|slug| self.pages.contains_key(slug.as_str()))
            .cloned()
            .collect()
    }
}

/// Render options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Inclusion recursion bound.
    pub max_include_depth: usize,
    /// Currently collapsed section ids. `None` means "use the initial set
    /// derived from `=# title #=` markers"; a host tracking toggles passes
    /// its own set.
    pub collapsed: Option<FxHashSet<String>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_include_depth: MAX_INCLUDE_DEPTH,
            collapsed: None,
        }
    }
}

/// State for one top-level render and its recursive inclusions.
pub struct ParseContext<'a> {
    /// Slug of the document being rendered, when it is a stored page.
    pub slug: Option<String>,
    /// Content/existence collaborator.
    pub source: &'a dyn ContentSource,
    /// Render options.
    pub options: Options,
    /// Slugs known to exist, primed once per render and extended per
    /// inclusion.
    pub existing: FxHashSet<String>,
    /// Footnote sink shared by the whole render, inclusions included.
    pub footnotes: Vec<Footnote>,
    /// Category tags collected from `[[분류:...]]` lines.
    pub categories: Vec<String>,
    /// First `#redirect` target seen, surfaced on the document.
    pub redirect: Option<LinkTarget>,
    /// Slugs on the current inclusion chain. Seeded with the current slug
    /// so a document can never transclude itself, directly or mutually.
    pub visited: FxHashSet<String>,
    /// Current inclusion depth.
    pub include_depth: usize,
    /// Current inline nesting depth (recursion guard).
    pub inline_nesting: usize,
    /// Current block-container nesting depth (recursion guard).
    pub block_nesting: usize,
}

impl<'a> ParseContext<'a> {
    pub fn new(slug: Option<&str>, source: &'a dyn ContentSource, options: Options) -> Self {
        let mut visited = FxHashSet::default();
        if let Some(slug) = slug {
            visited.insert(slug.to_string());
        }
        Self {
            slug: slug.map(str::to_string),
            source,
            options,
            existing: FxHashSet::default(),
            footnotes: Vec::new(),
            categories: Vec::new(),
            redirect: None,
            visited,
            include_depth: 0,
            inline_nesting: 0,
            block_nesting: 0,
        }
    }

    /// Issue one batched existence lookup for any of `candidates` not yet
    /// known, folding the hits into [`existing`](Self::existing).
    pub fn prime_existing(&mut self, candidates: &[String]) {
        let unknown: Vec<String> = candidates
            .iter()
            .filter(|slug| !self.existing.contains(slug.as_str()))
            .cloned()
            .collect();
        if unknown.is_empty() {
            return;
        }
        for found in self.source.existing_slugs(&unknown) {
            self.existing.insert(found);
        }
    }

    /// Existence test against the primed set.
    pub fn slug_exists(&self, slug: &str) -> bool {
        self.existing.contains(slug)
    }
}

/// Collect every distinct internal-link target in `source` so the host (or
/// [`crate::parse`]) can resolve existence in a single batched call.
///
/// Covers `[[target]]` / `[[target|label]]` links (anchor stripped) and a
/// leading `#redirect` target. File, category, external, and cross-wiki
/// targets are not pages and are skipped.
pub fn collect_link_targets(source: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut targets = Vec::new();
    let mut push = |slug: &str| {
        let slug = slug.trim();
        if !slug.is_empty() && seen.insert(slug.to_string()) {
            targets.push(slug.to_string());
        }
    };

    let bytes = source.as_bytes();
    let mut at = 0;
    while let Some(rel) = memchr::memmem::find(&bytes[at..], b"[[") {
        let open = at + rel + 2;
        let Some(close_rel) = memchr::memmem::find(&bytes[open..], b"]]") else {
            break;
        };
        let inner = &source[open..open + close_rel];
        at = open + close_rel + 2;

        let target = inner.split('|').next().unwrap_or("");
        let target = target.split('#').next().unwrap_or("").trim();
        if target.is_empty() || is_non_page_target(target) {
            continue;
        }
        push(target);
    }

    for line in source.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("#redirect ") {
            push(rest.split('#').next().unwrap_or(""));
        }
    }

    targets
}

/// Targets that name files, categories, external URLs, or cross-wiki pages
/// rather than local documents.
fn is_non_page_target(target: &str) -> bool {
    // Byte-wise prefix compare; slicing by prefix length could split a
    // multi-byte code point.
    let lower_prefix = |prefix: &str| {
        target.len() >= prefix.len()
            && target.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    };
    target.starts_with("파일:")
        || target.starts_with("이미지:")
        || target.starts_with("분류:")
        || lower_prefix("file:")
        || lower_prefix("http://")
        || lower_prefix("https://")
        || target.starts_with("!NW:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_unique_targets_without_anchors() {
        let targets =
            collect_link_targets("[[Foo]] and [[Foo#sec|x]] then [[Bar|label]]\n#redirect Baz#top");
        assert_eq!(targets, vec!["Foo", "Bar", "Baz"]);
    }

    #[test]
    fn skips_files_categories_and_urls() {
        let targets = collect_link_targets(
            "[[파일:a.png]] [[분류:카테고리]] [[https://example.com|x]] [[File:b.jpg]] [[!NW:원격 문서]]",
        );
        assert!(targets.is_empty());
    }

    #[test]
    fn memory_source_round_trip() {
        let mut src = MemorySource::new();
        src.insert("Foo", "'''bold'''");
        assert_eq!(src.fetch("Foo").as_deref(), Some("'''bold'''"));
        assert!(src.fetch("Bar").is_none());
        let found = src.existing_slugs(&["Foo".into(), "Bar".into()]);
        assert_eq!(found, vec!["Foo"]);
    }

    #[test]
    fn context_seeds_visited_with_own_slug() {
        let src = MemorySource::new();
        let ctx = ParseContext::new(Some("Self"), &src, Options::default());
        assert!(ctx.visited.contains("Self"));
    }
}
