//! Template inclusion: `[include(slug, key=value, ...)]`.
//!
//! Three pseudo-template slugs render fixed micro-layouts from their
//! parameters and never fetch content. Ordinary slugs fetch raw markup
//! through the [`ContentSource`](crate::ContentSource), substitute `@key@`
//! placeholders, and re-enter the block parser as a sub-document. Depth
//! and a visited-slug set bound the recursion; every failure mode resolves
//! to an inert tree node, never an error.

use rustc_hash::FxHashMap;

use crate::block::parse_fragment;
use crate::context::{collect_link_targets, ParseContext};
use crate::document::{DisambigEntry, Include};
use crate::limits::MAX_DISAMBIG_ENTRIES;

const DETAIL_TEMPLATE: &str = "틀:상세 내용";
const PARENT_TEMPLATE: &str = "틀:상위 문서";
const DISAMBIG_TEMPLATE: &str = "틀:다른 뜻";

/// Resolve one inclusion directive's raw argument string.
pub fn resolve(raw_args: &str, ctx: &mut ParseContext) -> Include {
    let mut parts = raw_args.split(',');
    let slug = parts.next().unwrap_or("").trim().to_string();

    let mut params: FxHashMap<String, String> = FxHashMap::default();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            params.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    match slug.as_str() {
        DETAIL_TEMPLATE => {
            let target = params
                .get("문서명")
                .cloned()
                .unwrap_or_else(|| "내용".to_string());
            let exists = target_exists(&target, ctx);
            Include::Detail { target, exists }
        }
        PARENT_TEMPLATE => {
            let target = params
                .get("문서명1")
                .cloned()
                .unwrap_or_else(|| "상위 문서".to_string());
            let exists = target_exists(&target, ctx);
            Include::Parent { target, exists }
        }
        DISAMBIG_TEMPLATE => {
            let mut pairs = Vec::new();
            for index in 1..=MAX_DISAMBIG_ENTRIES {
                let description = params.get(&format!("설명{index}"));
                let target = params.get(&format!("문서명{index}"));
                if let (Some(description), Some(target)) = (description, target) {
                    pairs.push((description.clone(), target.clone()));
                }
            }
            // One batched lookup for every referenced document.
            let targets: Vec<String> = pairs.iter().map(|(_, target)| target.clone()).collect();
            ctx.prime_existing(&targets);
            let entries = pairs
                .into_iter()
                .map(|(description, target)| {
                    let exists =
                        ctx.slug_exists(&target) || ctx.slug.as_deref() == Some(target.as_str());
                    DisambigEntry {
                        description,
                        target,
                        exists,
                    }
                })
                .collect();
            Include::Disambiguation { entries }
        }
        _ => resolve_document(slug, &params, ctx),
    }
}

fn target_exists(target: &str, ctx: &mut ParseContext) -> bool {
    ctx.prime_existing(std::slice::from_ref(&target.to_string()));
    ctx.slug_exists(target) || ctx.slug.as_deref() == Some(target)
}

/// Fetch, substitute, and recursively parse an ordinary transclusion.
fn resolve_document(
    slug: String,
    params: &FxHashMap<String, String>,
    ctx: &mut ParseContext,
) -> Include {
    if ctx.include_depth >= ctx.options.max_include_depth || ctx.visited.contains(&slug) {
        return Include::Skipped { slug };
    }

    let Some(raw) = ctx.source.fetch(&slug) else {
        return Include::Failed { slug };
    };

    let substituted = substitute_params(&raw, params);

    // Batch-resolve link targets the included markup introduces.
    let targets = collect_link_targets(&substituted);
    ctx.prime_existing(&targets);

    ctx.visited.insert(slug.clone());
    ctx.include_depth += 1;
    let lines: Vec<&str> = substituted
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let blocks = parse_fragment(&lines, ctx);
    ctx.include_depth -= 1;
    ctx.visited.remove(&slug);

    Include::Document { slug, blocks }
}

/// Replace every `@key@` token with its parameter value, verbatim.
/// Unmatched placeholders stay as-is.
fn substitute_params(raw: &str, params: &FxHashMap<String, String>) -> String {
    let mut text = raw.to_string();
    for (key, value) in params {
        text = text.replace(&format!("@{key}@"), value);
    }
    text
}
