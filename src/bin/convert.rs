//! Avro to JSON Schema conversion CLI
//!
//! Converts a single `.avsc` file or a directory tree of them into JSON
//! Schema draft-07 documents, and checks previously generated documents
//! for drift against their sources.
//!
//! Usage:
//!   avro2jsonschema schemas/ --output-dir build/json-schema
//!   avro2jsonschema schemas/ --output-dir build/json-schema --check
//!   avro2jsonschema --help

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use avro2jsonschema::batch::{self, BatchReport};
use avro2jsonschema::{BatchOptions, ConvertConfig, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "avro2jsonschema")]
#[command(about = "Convert Avro schemas to JSON Schema draft-07 documents")]
struct Cli {
    /// Avro schema file or directory to convert
    input: PathBuf,

    /// Directory to write generated documents into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Do not descend into subdirectories
    #[arg(long)]
    no_recursive: bool,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Skip validation with the reference Avro parser
    #[arg(long)]
    no_strict: bool,

    /// Compile every generated document against draft-07
    #[arg(long)]
    verify: bool,

    /// Write a checksums.sha256 file next to the generated documents
    #[arg(long)]
    checksums: bool,

    /// Compare stored documents against fresh conversion instead of writing
    #[arg(long)]
    check: bool,

    /// Write the report as JSON to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConvertConfig::load_from(cli.config.as_deref())?;
    let mut options = BatchOptions::from_config(&config);

    if cli.no_recursive {
        options.recursive = false;
    }
    if cli.no_strict {
        options.strict = false;
    }
    if cli.compact {
        options.format = OutputFormat::Compact;
    }
    if cli.verify {
        options.verify = true;
    }
    if cli.checksums {
        options.checksums = true;
    }

    let report = if cli.check {
        println!("🔍 Checking {:?} against {:?}\n", cli.input, cli.output_dir);
        batch::check(&cli.input, &cli.output_dir, &options)?
    } else {
        println!("📦 Converting {:?} into {:?}\n", cli.input, cli.output_dir);
        batch::run(&cli.input, &cli.output_dir, &options)?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_report(&report, cli.check);
    }

    if let Some(ref path) = cli.report {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("📝 Report written to {:?}", path);
    }

    // Exit code based on outcome
    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

/// Print human-readable report
fn print_text_report(report: &BatchReport, check: bool) {
    let label = if check { "in sync" } else { "converted" };

    for file in &report.converted {
        println!("✅ {}: {:?}", label, file.input);
    }

    for drifted in &report.drifted {
        if drifted.missing {
            println!("❌ missing: {:?}", drifted.output);
        } else {
            println!("⚠️  drift: {:?}", drifted.output);
            for line in drifted.diff.lines() {
                println!("   {}", line);
            }
        }
    }

    for failed in &report.failed {
        println!("❌ {:?}: {}", failed.input, failed.reason);
    }

    println!();
    println!("📊 Summary:");
    println!("   {}: {}", label, report.converted.len());
    if check {
        println!("   drifted: {}", report.drifted.len());
    }
    println!("   failed: {}", report.failed.len());
}
