//! Document boundary: scanning instructional markdown into units and
//! writing converted copies back out.
//!
//! The contract both directions is byte preservation: every byte outside
//! a replaced Python fragment is carried through untouched, so diffs
//! against the source document show scaffold changes and nothing else.

mod scan;

pub use scan::{find_markdown_files, scan_file, scan_path, scan_source};

use std::ops::Range;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::constants::SCAFFOLD_FILE_SUFFIX;
use crate::unit::SourceUnit;

/// One fenced Python block pinned to its byte range in the document.
#[derive(Debug, Clone)]
pub struct DocumentBlock {
    pub unit: SourceUnit,
    /// Fragment bytes inside the document (fences excluded).
    pub range: Range<usize>,
}

/// A scanned document plus every unit lifted from it.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub path: PathBuf,
    pub source: String,
    pub blocks: Vec<DocumentBlock>,
}

impl ScannedDocument {
    /// Units in document order, detached for the batch pipeline.
    #[must_use]
    pub fn units(&self) -> Vec<SourceUnit> {
        self.blocks.iter().map(|b| b.unit.clone()).collect()
    }

    /// Rebuilds the document with fragments swapped for their scaffolds.
    ///
    /// `replacements` maps unit id to replacement fragment text; units
    /// without an entry keep their original fragment. All bytes outside
    /// the replaced ranges are emitted verbatim.
    #[must_use]
    pub fn substituted(&self, replacements: &FxHashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0usize;
        for block in &self.blocks {
            let Some(replacement) = replacements.get(&block.unit.id) else {
                continue;
            };
            out.push_str(&self.source[cursor..block.range.start]);
            out.push_str(replacement);
            cursor = block.range.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }

    /// Where the converted copy of this document belongs.
    #[must_use]
    pub fn output_path(&self, output_dir: Option<&Path>) -> PathBuf {
        scaffold_output_path(&self.path, output_dir)
    }
}

/// `guide.md` becomes `guide.scaffold.md`, beside the source by default
/// or under `output_dir` when given.
#[must_use]
pub fn scaffold_output_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "document".to_owned(), |s| s.to_string_lossy().into_owned());
    let file_name = format!("{stem}{SCAFFOLD_FILE_SUFFIX}");
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => source.with_file_name(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Guide\n\nIntro prose.\n\n```python\nx = 1\n```\n\nMiddle prose.\n\n```python\ny = 2\n```\n\nOutro.\n";

    #[test]
    fn test_substitution_preserves_every_other_byte() {
        let doc = scan_source(Path::new("guide.md"), DOC);
        let mut replacements = FxHashMap::default();
        replacements.insert("guide.md#1".to_owned(), "x = ...\n".to_owned());

        let output = doc.substituted(&replacements);
        assert_eq!(
            output,
            "# Guide\n\nIntro prose.\n\n```python\nx = ...\n```\n\nMiddle prose.\n\n```python\ny = 2\n```\n\nOutro.\n"
        );
    }

    #[test]
    fn test_no_replacements_reproduces_the_source() {
        let doc = scan_source(Path::new("guide.md"), DOC);
        assert_eq!(doc.substituted(&FxHashMap::default()), DOC);
    }

    #[test]
    fn test_output_path_beside_source_and_under_dir() {
        assert_eq!(
            scaffold_output_path(Path::new("docs/guide.md"), None),
            Path::new("docs/guide.scaffold.md")
        );
        assert_eq!(
            scaffold_output_path(Path::new("docs/guide.md"), Some(Path::new("out"))),
            Path::new("out/guide.scaffold.md")
        );
    }
}
