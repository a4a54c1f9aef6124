//! Command-level tests driving `run_convert`, `run_check` and
//! `run_init_in` the way the binary does, with output captured.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use scafpy::commands::{run_check, run_convert, run_init_in, ConvertOptions};
use tempfile::tempdir;

const LESSON: &str = "# Loops\n\nSum the values of a list into a running total.\n\n```python\ndef total(values: list[int]) -> int:\n    \"\"\"Sum the values.\"\"\"\n    result = 0\n    for value in values:\n        result = result + value\n    return result\n```\n\nDone.\n";

const BARE_LESSON: &str = "Try the mystery helper on some data.\n\n```python\ndef mystery(data):\n    return len(data)\n```\n";

const BROKEN_LESSON: &str = "A broken sample.\n\n```python\nvalue = \"unterminated\n```\n";

fn strip_ansi(text: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap();
    re.replace_all(text, "").to_string()
}

fn convert_in(root: &Path, options: &ConvertOptions) -> (i32, String) {
    let mut output = Vec::new();
    let code = run_convert(
        &[root.to_path_buf()],
        options,
        &AtomicBool::new(false),
        &mut output,
    )
    .unwrap();
    (code, strip_ansi(&String::from_utf8_lossy(&output)))
}

fn check_in(root: &Path, options: &ConvertOptions) -> (i32, String) {
    let mut output = Vec::new();
    let code = run_check(
        &[root.to_path_buf()],
        options,
        &AtomicBool::new(false),
        &mut output,
    )
    .unwrap();
    (code, strip_ansi(&String::from_utf8_lossy(&output)))
}

#[test]
fn test_convert_writes_the_scaffold_beside_the_source() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let (code, output) = convert_in(dir.path(), &ConvertOptions::default());
    assert_eq!(code, 0);
    assert!(output.contains("All 1 units converted."));
    assert!(output.contains("wrote"));
    assert!(output.contains("Conversion completed"));

    let scaffold = fs::read_to_string(dir.path().join("lesson.scaffold.md")).unwrap();
    assert!(scaffold.contains("```python\ndef total(values: list[int]) -> int:"));
    assert!(scaffold.contains("# TODO(1): initialize the working state"));
    assert!(!scaffold.contains("result = result + value"));
    // Prose on either side of the fragment is untouched.
    assert!(scaffold.starts_with("# Loops\n\nSum the values of a list into a running total.\n"));
    assert!(scaffold.ends_with("```\n\nDone.\n"));

    // The source document itself is never rewritten.
    let source = fs::read_to_string(dir.path().join("lesson.md")).unwrap();
    assert_eq!(source, LESSON);
}

#[test]
fn test_convert_json_emits_the_run_record() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let options = ConvertOptions {
        json: true,
        ..ConvertOptions::default()
    };
    let (code, output) = convert_in(dir.path(), &options);
    assert_eq!(code, 0);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["outcomes"][0]["status"], "Completed");
    assert_eq!(value["cancelled"], false);
    assert_eq!(value["snapshot"]["completed"], 1);
    let coverage = value["annotation_coverage"].as_f64().unwrap();
    assert!((coverage - 1.0).abs() < 1e-9);

    // JSON mode still writes the scaffold file.
    assert!(dir.path().join("lesson.scaffold.md").exists());
}

#[test]
fn test_convert_empty_tree_exits_zero() {
    let dir = tempdir().unwrap();

    let (code, output) = convert_in(dir.path(), &ConvertOptions::default());
    assert_eq!(code, 0);
    assert!(output.contains("No Python fragments found."));

    let options = ConvertOptions {
        json: true,
        ..ConvertOptions::default()
    };
    let (code, output) = convert_in(dir.path(), &options);
    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["outcomes"].as_array().unwrap().len(), 0);
}

#[test]
fn test_convert_respects_the_output_dir() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let options = ConvertOptions {
        output_dir: Some(dir.path().join("build")),
        ..ConvertOptions::default()
    };
    let (code, _) = convert_in(dir.path(), &options);
    assert_eq!(code, 0);
    assert!(dir.path().join("build/lesson.scaffold.md").exists());
    assert!(!dir.path().join("lesson.scaffold.md").exists());
}

#[test]
fn test_fail_on_review_gates_the_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), BARE_LESSON).unwrap();

    // 0.85 floor: the unannotated helper cannot clear it.
    let lenient = ConvertOptions {
        min_quality_score: Some(0.85),
        ..ConvertOptions::default()
    };
    let (code, output) = convert_in(dir.path(), &lenient);
    assert_eq!(code, 0);
    assert!(output.contains("add type annotations"));
    assert!(!dir.path().join("lesson.scaffold.md").exists());

    let strict = ConvertOptions {
        min_quality_score: Some(0.85),
        fail_on_review: true,
        ..ConvertOptions::default()
    };
    let (code, _) = convert_in(dir.path(), &strict);
    assert_eq!(code, 1);
}

#[test]
fn test_convert_cancelled_before_start_exits_one() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let mut output = Vec::new();
    let code = run_convert(
        &[dir.path().to_path_buf()],
        &ConvertOptions::default(),
        &AtomicBool::new(true),
        &mut output,
    )
    .unwrap();
    assert_eq!(code, 1);
    let output = strip_ansi(&String::from_utf8_lossy(&output));
    assert!(output.contains("Cancelled: remaining units were left untouched."));
    assert!(!dir.path().join("lesson.scaffold.md").exists());
}

#[test]
fn test_check_passes_on_a_clean_tree() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let (code, output) = check_in(dir.path(), &ConvertOptions::default());
    assert_eq!(code, 0);
    assert!(output.contains("units pass verification."));
    // Check never writes files.
    assert!(!dir.path().join("lesson.scaffold.md").exists());
}

#[test]
fn test_check_flags_an_unconvertible_fragment() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lesson.md"), BROKEN_LESSON).unwrap();

    let (code, output) = check_in(dir.path(), &ConvertOptions::default());
    assert_eq!(code, 1);
    assert!(output.contains("1 of 1 units need attention."));
    assert!(output.contains("analyze"));
}

#[test]
fn test_config_file_tier_override_reaches_the_scaffold() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(".scafpy.toml"),
        "[scafpy.per_file_tiers]\n\"**/*.md\" = 3\n",
    )
    .unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let (code, _) = convert_in(dir.path(), &ConvertOptions::default());
    assert_eq!(code, 0);

    let scaffold = fs::read_to_string(dir.path().join("lesson.scaffold.md")).unwrap();
    assert!(scaffold.contains("# Hint (conceptual):"));
    assert!(!scaffold.contains("# Hint (approach):"));
}

#[test]
fn test_cli_tier_beats_the_config_override() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(".scafpy.toml"),
        "[scafpy.per_file_tiers]\n\"**/*.md\" = 3\n",
    )
    .unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();

    let options = ConvertOptions {
        tier: Some(1),
        ..ConvertOptions::default()
    };
    let (code, _) = convert_in(dir.path(), &options);
    assert_eq!(code, 0);

    let scaffold = fs::read_to_string(dir.path().join("lesson.scaffold.md")).unwrap();
    assert!(scaffold.contains("# Hint (implementation):"));
    assert!(scaffold.contains("# Hint (resource):"));
}

#[test]
fn test_exclude_folders_skip_their_documents() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("drafts")).unwrap();
    fs::write(dir.path().join("lesson.md"), LESSON).unwrap();
    fs::write(dir.path().join("drafts/wip.md"), LESSON).unwrap();

    let options = ConvertOptions {
        exclude_folders: vec!["drafts".to_owned()],
        ..ConvertOptions::default()
    };
    let (code, _) = convert_in(dir.path(), &options);
    assert_eq!(code, 0);
    assert!(dir.path().join("lesson.scaffold.md").exists());
    assert!(!dir.path().join("drafts/wip.scaffold.md").exists());
}

#[test]
fn test_init_creates_and_then_skips_the_config_file() {
    let dir = tempdir().unwrap();

    let mut output = Vec::new();
    run_init_in(dir.path(), &mut output).unwrap();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("Created .scafpy.toml"));

    let config = fs::read_to_string(dir.path().join(".scafpy.toml")).unwrap();
    assert!(config.contains("[scafpy]"));
    assert!(config.contains("max_implementation_lines = 5"));

    let mut output = Vec::new();
    run_init_in(dir.path(), &mut output).unwrap();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("already exists - skipping."));
}

#[test]
fn test_init_appends_to_an_existing_pyproject() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"demo\"\n",
    )
    .unwrap();

    let mut output = Vec::new();
    run_init_in(dir.path(), &mut output).unwrap();

    let pyproject = fs::read_to_string(dir.path().join("pyproject.toml")).unwrap();
    assert!(pyproject.starts_with("[project]\nname = \"demo\"\n"));
    assert!(pyproject.contains("[tool.scafpy]"));
    assert!(!dir.path().join(".scafpy.toml").exists());
}
