//! Batch conversion of `.avsc` files
//!
//! Walks an input file or directory, converts every Avro schema found, and
//! writes the generated documents under an output directory that mirrors
//! the input layout. Failures are isolated per file so one broken schema
//! never blocks the rest of a run. The same walk also backs drift
//! checking, which compares stored documents against what conversion
//! would produce now without writing anything.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use jsonschema::{Draft, JSONSchema};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use similar::{ChangeTag, TextDiff};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{ConvertConfig, OutputFormat};
use crate::converter::convert;
use crate::parser::{parse_schema, parse_schema_strict};

/// Options controlling a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Descend into subdirectories
    pub recursive: bool,

    /// Validate sources with the reference Avro parser first
    pub strict: bool,

    /// Compile every generated document against draft-07
    pub verify: bool,

    /// Write a checksums file next to the generated documents
    pub checksums: bool,

    /// Rendering of the generated JSON
    pub format: OutputFormat,

    /// Extension of source files to pick up
    pub source_extension: String,

    /// Extension given to generated documents
    pub target_extension: String,
}

impl BatchOptions {
    /// Build options from loaded configuration
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            recursive: config.input.recursive,
            strict: config.validation.strict_avro,
            verify: config.validation.verify_json_schema,
            checksums: config.output.checksums,
            format: config.output.format,
            source_extension: config.input.extension.clone(),
            target_extension: config.output.extension.clone(),
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

/// Outcome of a batch run or drift check
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    /// Files converted (or, for a check, found in sync)
    pub converted: Vec<ConvertedFile>,

    /// Files that could not be converted
    pub failed: Vec<FailedFile>,

    /// Stored documents that no longer match their source
    pub drifted: Vec<DriftedFile>,
}

/// A successfully converted source file
#[derive(Debug, Serialize)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// A source file that could not be converted
#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub input: PathBuf,
    pub reason: String,
}

/// A stored document that is missing or stale
#[derive(Debug, Serialize)]
pub struct DriftedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub diff: String,
    pub missing: bool,
}

impl BatchReport {
    fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            converted: Vec::new(),
            failed: Vec::new(),
            drifted: Vec::new(),
        }
    }

    /// True when nothing failed and nothing drifted
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.drifted.is_empty()
    }
}

/// Convert every schema under `input`, writing documents under `output_dir`
pub fn run(input: &Path, output_dir: &Path, options: &BatchOptions) -> anyhow::Result<BatchReport> {
    let files = collect_inputs(input, options)?;
    let mut report = BatchReport::new();
    let mut manifest = Vec::new();

    for file in &files {
        match process_one(input, file, output_dir, options) {
            Ok((output, rendered)) => {
                if options.checksums {
                    manifest.push(manifest_entry(output_dir, &output, &rendered));
                }
                report.converted.push(ConvertedFile {
                    input: file.clone(),
                    output,
                });
            }
            Err(e) => {
                warn!(input = %file.display(), error = %e, "conversion failed");
                report.failed.push(FailedFile {
                    input: file.clone(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    if options.checksums && !report.converted.is_empty() {
        write_checksums(output_dir, &mut manifest)?;
    }

    Ok(report)
}

/// Compare stored documents against what conversion would produce now.
///
/// Never writes. A document that is absent or differs from the freshly
/// converted text lands in the report's `drifted` list.
pub fn check(
    input: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> anyhow::Result<BatchReport> {
    let files = collect_inputs(input, options)?;
    let mut report = BatchReport::new();

    for file in &files {
        match check_one(input, file, output_dir, options) {
            Ok((output, None)) => report.converted.push(ConvertedFile {
                input: file.clone(),
                output,
            }),
            Ok((_, Some(drifted))) => report.drifted.push(drifted),
            Err(e) => {
                warn!(input = %file.display(), error = %e, "check failed");
                report.failed.push(FailedFile {
                    input: file.clone(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}

fn collect_inputs(input: &Path, options: &BatchOptions) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("input path does not exist: {}", input.display());
    }

    let mut walker = WalkDir::new(input);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == options.source_extension.as_str())
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    Ok(files)
}

fn process_one(
    input_root: &Path,
    input: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> anyhow::Result<(PathBuf, String)> {
    let rendered = convert_text(input, options)?;

    let output = output_path(input_root, input, output_dir, &options.target_extension)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&output, &rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;
    debug!(input = %input.display(), output = %output.display(), "converted");

    Ok((output, rendered))
}

fn check_one(
    input_root: &Path,
    input: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> anyhow::Result<(PathBuf, Option<DriftedFile>)> {
    let expected = convert_text(input, options)?;

    let output = output_path(input_root, input, output_dir, &options.target_extension)?;
    if !output.exists() {
        return Ok((
            output.clone(),
            Some(DriftedFile {
                input: input.to_path_buf(),
                output,
                diff: String::new(),
                missing: true,
            }),
        ));
    }

    let stored = fs::read_to_string(&output)
        .with_context(|| format!("failed to read {}", output.display()))?;
    if stored == expected {
        return Ok((output, None));
    }

    Ok((
        output.clone(),
        Some(DriftedFile {
            input: input.to_path_buf(),
            output,
            diff: diff_lines(&stored, &expected),
            missing: false,
        }),
    ))
}

/// Read, parse, convert, and render one source file
fn convert_text(input: &Path, options: &BatchOptions) -> anyhow::Result<String> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let schema = if options.strict {
        parse_schema_strict(&text)
    } else {
        parse_schema(&text)
    }
    .with_context(|| format!("failed to parse {}", input.display()))?;

    let document = Value::Object(convert(&schema));
    if options.verify {
        verify_draft7(&document)?;
    }

    render(&document, options.format)
}

fn render(value: &Value, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(rendered)
}

fn verify_draft7(value: &Value) -> anyhow::Result<()> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(value)
        .map_err(|e| anyhow::anyhow!("draft-07 compilation failed: {}", e))?;
    Ok(())
}

/// Map a source path to its document path under the output directory
fn output_path(
    input_root: &Path,
    input: &Path,
    output_dir: &Path,
    target_extension: &str,
) -> anyhow::Result<PathBuf> {
    let relative = if input == input_root {
        Path::new(input.file_name().context("input has no file name")?)
    } else {
        input.strip_prefix(input_root).with_context(|| {
            format!("{} is outside {}", input.display(), input_root.display())
        })?
    };

    Ok(output_dir.join(relative.with_extension(target_extension)))
}

fn diff_lines(stored: &str, expected: &str) -> String {
    let diff = TextDiff::from_lines(stored, expected);
    let mut rendered = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => continue,
        };
        rendered.push_str(&format!("{}{}", sign, change));
    }

    rendered
}

fn manifest_entry(output_dir: &Path, output: &Path, rendered: &str) -> (String, String) {
    let relative = output.strip_prefix(output_dir).unwrap_or(output);
    (hex_digest(rendered), relative.to_string_lossy().into_owned())
}

fn hex_digest(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

fn write_checksums(output_dir: &Path, entries: &mut Vec<(String, String)>) -> anyhow::Result<()> {
    entries.sort_by(|a, b| a.1.cmp(&b.1));

    let mut lines = String::new();
    for (digest, path) in entries.iter() {
        lines.push_str(&format!("{}  {}\n", digest, path));
    }

    let path = output_dir.join("checksums.sha256");
    fs::write(&path, lines).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
