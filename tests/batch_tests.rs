//! Batch Conversion Tests
//!
//! Exercises directory walking, output mirroring, drift checking, and
//! checksum manifests against real temp directories.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use avro2jsonschema::batch;
use avro2jsonschema::{BatchOptions, OutputFormat, DRAFT7_URI};

const USER: &str = r#"{
    "type": "record",
    "name": "User",
    "fields": [{ "name": "id", "type": "string" }]
}"#;

const EVENT: &str = r#"{
    "type": "record",
    "name": "Event",
    "fields": [{ "name": "at", "type": "long" }]
}"#;

/// Lay out a small schema tree: user.avsc at the root, event.avsc nested
fn write_tree(dir: &Path) -> PathBuf {
    let input = dir.join("schemas");
    fs::create_dir_all(input.join("nested")).unwrap();
    fs::write(input.join("user.avsc"), USER).unwrap();
    fs::write(input.join("nested").join("event.avsc"), EVENT).unwrap();
    input
}

#[test]
fn test_run_mirrors_directory_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let report = batch::run(&input, &output, &BatchOptions::default()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.converted.len(), 2);

    let stored = fs::read_to_string(output.join("user.schema.json")).unwrap();
    let document: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(document["$schema"], json!(DRAFT7_URI));
    assert_eq!(document["properties"]["id"], json!({ "type": "string" }));

    assert!(output.join("nested").join("event.schema.json").exists());
}

#[test]
fn test_run_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");
    fs::write(input.join("broken.avsc"), "{ not json").unwrap();

    let report = batch::run(&input, &output, &BatchOptions::default()).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].input.ends_with("broken.avsc"));
    assert!(!report.failed[0].reason.is_empty());

    // The broken sibling never blocks the others
    assert!(output.join("user.schema.json").exists());
}

#[test]
fn test_strict_mode_rejects_what_the_reference_parser_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("schemas");
    fs::create_dir_all(&input).unwrap();
    // Valid JSON, invalid Avro: a record needs fields
    fs::write(input.join("empty.avsc"), r#"{ "type": "record", "name": "Empty" }"#).unwrap();
    let output = dir.path().join("out");

    let strict = batch::run(&input, &output, &BatchOptions::default()).unwrap();
    assert_eq!(strict.failed.len(), 1);

    let mut relaxed = BatchOptions::default();
    relaxed.strict = false;
    let report = batch::run(&input, &output, &relaxed).unwrap();
    assert_eq!(report.failed.len(), 1, "own parser requires fields too");
}

#[test]
fn test_non_recursive_skips_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let mut options = BatchOptions::default();
    options.recursive = false;

    let report = batch::run(&input, &output, &options).unwrap();
    assert_eq!(report.converted.len(), 1);
    assert!(output.join("user.schema.json").exists());
    assert!(!output.join("nested").join("event.schema.json").exists());
}

#[test]
fn test_single_file_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let report = batch::run(&input.join("user.avsc"), &output, &BatchOptions::default()).unwrap();
    assert_eq!(report.converted.len(), 1);
    assert!(output.join("user.schema.json").exists());
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");

    let err = batch::run(&dir.path().join("nope"), &output, &BatchOptions::default()).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_check_is_clean_after_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");
    let options = BatchOptions::default();

    batch::run(&input, &output, &options).unwrap();

    let report = batch::check(&input, &output, &options).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.converted.len(), 2);
    assert!(report.drifted.is_empty());
}

#[test]
fn test_check_detects_tampering_without_repairing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");
    let options = BatchOptions::default();

    batch::run(&input, &output, &options).unwrap();

    let target = output.join("user.schema.json");
    let tampered = fs::read_to_string(&target).unwrap().replace("string", "integer");
    fs::write(&target, &tampered).unwrap();

    let report = batch::check(&input, &output, &options).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.drifted.len(), 1);
    assert!(!report.drifted[0].missing);
    assert!(report.drifted[0].diff.contains('-'));
    assert!(report.drifted[0].diff.contains('+'));
    assert!(report.drifted[0].output.ends_with("user.schema.json"));

    // A check never writes
    assert_eq!(fs::read_to_string(&target).unwrap(), tampered);
}

#[test]
fn test_check_reports_missing_documents() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let report = batch::check(&input, &output, &BatchOptions::default()).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.drifted.len(), 2);
    assert!(report.drifted.iter().all(|d| d.missing));
}

#[test]
fn test_checksums_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let mut options = BatchOptions::default();
    options.checksums = true;

    batch::run(&input, &output, &options).unwrap();

    let manifest = fs::read_to_string(output.join("checksums.sha256")).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2);

    for line in &lines {
        let (digest, path) = line.split_once("  ").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(path.ends_with(".schema.json"));
    }

    // Entries are sorted by relative path
    let paths: Vec<&str> = lines.iter().map(|l| l.split_once("  ").unwrap().1).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
}

#[test]
fn test_verified_run_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let mut options = BatchOptions::default();
    options.verify = true;

    let report = batch::run(&input, &output, &options).unwrap();
    assert!(report.is_clean());
}

#[test]
fn test_compact_output_renders_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path());
    let output = dir.path().join("out");

    let mut options = BatchOptions::default();
    options.format = OutputFormat::Compact;

    batch::run(&input, &output, &options).unwrap();

    let stored = fs::read_to_string(output.join("user.schema.json")).unwrap();
    assert!(!stored.contains('\n'));
}
