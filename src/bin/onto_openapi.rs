//! Ontology to OpenAPI CLI
//!
//! Converts an RDF description of an HTTP API into an OpenAPI JSON document.
//!
//! Usage:
//!   onto-openapi api.ttl openapi.json
//!   onto-openapi ontologies/ specs/ --convention fine
//!   onto-openapi --help

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use onto_openapi::store::GraphFormat;
use onto_openapi::{Conversion, ConventionChoice, Converter, ConverterConfig, OutputFormat};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "onto-openapi")]
#[command(about = "Reconstruct an OpenAPI document from an RDF API description")]
struct Cli {
    /// Graph file (.ttl, .turtle, .nt) or a directory of graph files
    input: PathBuf,

    /// Output JSON file, or output directory when INPUT is a directory
    output: PathBuf,

    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Annotation convention (auto, coarse, fine)
    #[arg(long)]
    convention: Option<ConventionChoice>,

    /// Graph syntax (turtle, ntriples); defaults to the file extension
    #[arg(long)]
    format: Option<GraphFormat>,

    /// Write the effective configuration to this TOML file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Keep named references in the coarse convention instead of inlining them
    #[arg(long)]
    no_inline: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ConverterConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(convention) = cli.convention {
        config.conversion.convention = convention;
    }
    if cli.compact {
        config.output.format = OutputFormat::Compact;
    }
    if cli.no_inline {
        config.conversion.inline_references = false;
    }

    if let Some(path) = &cli.save_config {
        config.save(path).with_context(|| format!("saving configuration to {}", path.display()))?;
        println!("💾 Configuration written to {}", path.display());
    }

    let converter = Converter::new(config);

    if cli.input.is_dir() {
        return convert_directory(&converter, &cli.input, &cli.output, cli.format);
    }

    let conversion = converter.convert_file_as(&cli.input, cli.format)?;
    write_document(&converter, &conversion, &cli.output)?;
    print_summary(&cli.input, &cli.output, &conversion);
    Ok(())
}

/// Render and write; nothing is written unless rendering succeeded
fn write_document(converter: &Converter, conversion: &Conversion, output: &Path) -> anyhow::Result<()> {
    let json = conversion.document.to_json(converter.config().output.format)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

fn print_summary(input: &Path, output: &Path, conversion: &Conversion) {
    let report = &conversion.report;
    println!(
        "✅ {} -> {} ({} convention, {} schemas, {} operations)",
        input.display(),
        output.display(),
        report.convention,
        report.schema_count,
        report.operation_count
    );
    if !report.cycle_groups.is_empty() {
        println!("   ↻ {} reference cycle group(s) kept as $ref", report.cycle_groups.len());
    }
    for dangling in &report.dangling_refs {
        println!("   ⚠️  unresolved reference {}", dangling);
    }
}

/// Convert every graph file below `input` to `<output>/<stem>.json`
fn convert_directory(
    converter: &Converter,
    input: &Path,
    output: &Path,
    format: Option<GraphFormat>,
) -> anyhow::Result<()> {
    println!("📂 Converting graphs in {}", input.display());

    let files: Vec<PathBuf> = WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && GraphFormat::is_graph_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    if files.is_empty() {
        bail!("no graph files (.ttl, .turtle, .nt) found in {}", input.display());
    }

    let mut failures = 0;
    for file in &files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        let target = output.join(format!("{}.json", stem.to_string_lossy()));

        let result = converter
            .convert_file_as(file, format)
            .map_err(anyhow::Error::from)
            .and_then(|conversion| {
                write_document(converter, &conversion, &target)?;
                Ok(conversion)
            });

        match result {
            Ok(conversion) => print_summary(file, &target, &conversion),
            Err(e) => {
                failures += 1;
                eprintln!("❌ {}: {:#}", file.display(), e);
            }
        }
    }

    println!("\n📊 {} converted, {} failed", files.len() - failures, failures);
    if failures > 0 {
        bail!("{} of {} graph files failed to convert", failures, files.len());
    }
    Ok(())
}
