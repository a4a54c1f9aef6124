//! Fenced-block extraction from instructional markdown.
//!
//! Extraction works on byte offsets so substitution can later replace a
//! fragment without touching any byte around it. Only fenced Python
//! blocks become units; every other block (and all prose) is recorded as
//! position data or context, never altered.

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Context;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::{DocumentBlock, ScannedDocument};
use crate::constants::{TIER_KEYWORD_CUES, TIER_MARKER_RE};
use crate::unit::{LanguageTag, SourceUnit, Tier};
use crate::utils::normalize_display_path;

/// Scans one document held in memory.
#[must_use]
pub fn scan_source(path: &Path, source: &str) -> ScannedDocument {
    let mut blocks = Vec::new();
    let mut prose = String::new();
    let mut pending_tier: Option<Tier> = None;
    let mut ordinal = 0usize;

    let mut in_code = false;
    let mut fence_info = String::new();
    let mut content: Option<Range<usize>> = None;

    for (event, range) in Parser::new(source).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code = true;
                fence_info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    // Indented blocks carry no language and are never units.
                    CodeBlockKind::Indented => String::new(),
                };
                content = None;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                finish_block(
                    path,
                    source,
                    &fence_info,
                    content.take(),
                    &mut prose,
                    &mut pending_tier,
                    &mut ordinal,
                    &mut blocks,
                );
            }
            Event::Text(text) => {
                if in_code {
                    extend(&mut content, range);
                } else {
                    prose.push_str(&text);
                    prose.push(' ');
                }
            }
            Event::Code(code) => {
                prose.push_str(&code);
                prose.push(' ');
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(captures) = TIER_MARKER_RE().captures(&html) {
                    pending_tier = Tier::from_marker(&captures[1]);
                }
            }
            Event::SoftBreak | Event::HardBreak => prose.push(' '),
            _ => {}
        }
    }

    ScannedDocument {
        path: path.to_path_buf(),
        source: source.to_owned(),
        blocks,
    }
}

/// Reads and scans one document from disk.
pub fn scan_file(path: &Path) -> anyhow::Result<ScannedDocument> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(scan_source(path, &source))
}

/// Scans a file or every markdown file under a directory.
///
/// Directory walks read files in parallel; results come back sorted by
/// path so unit ids and batch order stay deterministic.
pub fn scan_path(root: &Path, exclude_folders: &FxHashSet<String>) -> anyhow::Result<Vec<ScannedDocument>> {
    if root.is_file() {
        return Ok(vec![scan_file(root)?]);
    }
    let files = find_markdown_files(root, exclude_folders);
    files.par_iter().map(|path| scan_file(path)).collect()
}

/// Collects markdown files under `root`, honoring gitignore rules and
/// skipping excluded folders. Sorted for stable ordering.
#[must_use]
pub fn find_markdown_files(root: &Path, exclude_folders: &FxHashSet<String>) -> Vec<PathBuf> {
    let exclude = exclude_folders.clone();
    let walker = ignore::WalkBuilder::new(root)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy();
            !(is_dir && exclude.contains(name.as_ref()))
        })
        .build();

    let mut files: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md" | "markdown")
            )
        })
        .collect();
    files.sort();
    files
}

fn extend(content: &mut Option<Range<usize>>, range: Range<usize>) {
    match content {
        Some(existing) => {
            existing.start = existing.start.min(range.start);
            existing.end = existing.end.max(range.end);
        }
        None => *content = Some(range),
    }
}

#[allow(clippy::too_many_arguments)]
fn finish_block(
    path: &Path,
    source: &str,
    fence_info: &str,
    content: Option<Range<usize>>,
    prose: &mut String,
    pending_tier: &mut Option<Tier>,
    ordinal: &mut usize,
    blocks: &mut Vec<DocumentBlock>,
) {
    let language = LanguageTag::from_fence(fence_info);
    if !language.is_supported() {
        // An explicit marker survives a non-Python block in between.
        prose.clear();
        return;
    }
    let Some(range) = content else {
        prose.clear();
        return;
    };
    let fragment = &source[range.clone()];
    if fragment.trim().is_empty() {
        prose.clear();
        return;
    }

    *ordinal += 1;
    let tier = pending_tier
        .take()
        .or_else(|| cue_tier(prose))
        .unwrap_or_default();
    let id = format!("{}#{}", normalize_display_path(path), ordinal);
    let unit = SourceUnit::new(id, fragment, tier).with_context(prose.trim());
    blocks.push(DocumentBlock { unit, range });
    prose.clear();
}

/// Heuristic tier from prose cue words; the cue closest to the fragment
/// wins when several appear.
fn cue_tier(prose: &str) -> Option<Tier> {
    let lowered = prose.to_ascii_lowercase();
    let mut best: Option<(usize, u8)> = None;
    for (phrase, band) in TIER_KEYWORD_CUES() {
        if let Some(position) = lowered.rfind(phrase) {
            if best.map_or(true, |(at, _)| position > at) {
                best = Some((position, *band));
            }
        }
    }
    best.and_then(|(_, band)| Tier::from_band(band))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Loops\n\nA warm-up on summing values.\n\n```python\ndef total(xs):\n    return sum(xs)\n```\n\nNow in Rust for comparison:\n\n```rust\nfn main() {}\n```\n\n<!-- tier: 3 -->\nA harder variant.\n\n```python\ndef hard(xs):\n    return max(xs)\n```\n";

    #[test]
    fn test_only_python_blocks_become_units() {
        let doc = scan_source(Path::new("guide.md"), DOC);
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].unit.id, "guide.md#1");
        assert_eq!(doc.blocks[1].unit.id, "guide.md#2");
        assert_eq!(
            doc.blocks[0].unit.fragment,
            "def total(xs):\n    return sum(xs)\n"
        );
    }

    #[test]
    fn test_fragment_ranges_are_byte_exact() {
        let doc = scan_source(Path::new("guide.md"), DOC);
        for block in &doc.blocks {
            assert_eq!(&DOC[block.range.clone()], block.unit.fragment);
        }
    }

    #[test]
    fn test_tier_marker_beats_cues_and_default() {
        let doc = scan_source(Path::new("guide.md"), DOC);
        // "warm-up" cue resolves the first block, the explicit marker the second.
        assert_eq!(doc.blocks[0].unit.tier, Tier::Tier1);
        assert_eq!(doc.blocks[1].unit.tier, Tier::Tier3);
    }

    #[test]
    fn test_unmarked_block_defaults_to_tier2() {
        let source = "Some prose.\n\n```python\nx = 1\n```\n";
        let doc = scan_source(Path::new("d.md"), source);
        assert_eq!(doc.blocks[0].unit.tier, Tier::Tier2);
    }

    #[test]
    fn test_context_is_the_preceding_prose_only() {
        let doc = scan_source(Path::new("guide.md"), DOC);
        assert!(doc.blocks[0].unit.context.contains("warm-up on summing"));
        assert!(doc.blocks[1].unit.context.contains("harder variant"));
        // Prose before the first block never bleeds into the second.
        assert!(!doc.blocks[1].unit.context.contains("summing"));
    }

    #[test]
    fn test_marker_survives_intervening_non_python_block() {
        let source = "<!-- tier: 1 -->\n\n```text\nnot code\n```\n\n```python\nx = 1\n```\n";
        let doc = scan_source(Path::new("d.md"), source);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].unit.tier, Tier::Tier1);
    }

    #[test]
    fn test_blank_python_block_is_skipped() {
        let source = "```python\n\n```\n\n```python\nx = 1\n```\n";
        let doc = scan_source(Path::new("d.md"), source);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].unit.id, "d.md#1");
        assert_eq!(doc.blocks[0].unit.fragment, "x = 1\n");
    }

    #[test]
    fn test_inline_code_counts_as_context() {
        let source = "Implement `find_max` here.\n\n```python\ndef find_max(xs):\n    return max(xs)\n```\n";
        let doc = scan_source(Path::new("d.md"), source);
        assert!(doc.blocks[0].unit.context.contains("find_max"));
    }
}
