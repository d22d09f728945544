//! Template Extractor CLI
//!
//! Usage:
//!   extract-templates [OPTIONS] <PATHS>...
//!
//! Options:
//!   -c, --config <FILE>           Configuration file (TOML format)
//!   --template-base <PREFIX>      Prefix stripped from written references
//!   --extension <EXT>             Extension of extracted files
//!   -n, --dry-run                 Print a diff instead of writing
//!   -v, --verbose                 Increase log verbosity
//!   -h, --help                    Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use similar::TextDiff;
use walkdir::WalkDir;

use template_extractor::{
    extract_templates, extract_templates_with_sink, ExtractConfig, ExtractError, Extraction,
    FsSink, OccurrenceCounter,
};

#[derive(Parser)]
#[command(name = "extract-templates")]
#[command(about = "Move inline templates out of JavaScript object literals")]
struct Cli {
    /// Source files or directories to transform
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix stripped from the path written into the source
    #[arg(long)]
    template_base: Option<String>,

    /// Extension of extracted template files
    #[arg(long)]
    extension: Option<String>,

    /// Print a unified diff of each change; write nothing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Outcome of one source file
enum FileOutcome {
    Unchanged,
    Changed,
    Failed,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration, then let flags override it
    let mut config = match &cli.config {
        Some(path) => match ExtractConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ExtractConfig::default(),
    };
    if let Some(base) = cli.template_base {
        config = config.with_template_base(base);
    }
    if let Some(extension) = cli.extension {
        config = config.with_extension(extension);
    }

    let sources = collect_sources(&cli.paths, &config);
    if sources.is_empty() {
        eprintln!("No source files found");
        std::process::exit(1);
    }

    let mut counter = OccurrenceCounter::new();
    let mut changed = 0;
    let mut failed = 0;

    for path in &sources {
        match process_file(path, &mut counter, &config, cli.dry_run) {
            FileOutcome::Unchanged => {}
            FileOutcome::Changed => changed += 1,
            FileOutcome::Failed => failed += 1,
        }
    }

    let verb = if cli.dry_run { "would write" } else { "wrote" };
    println!(
        "{} file(s) changed, {} {} template(s), {} file(s) failed",
        changed,
        verb,
        counter.total(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Expand directories into the source files they contain
///
/// Explicitly named files are always taken; files found while walking are
/// filtered by extension.
fn collect_sources(paths: &[PathBuf], config: &ExtractConfig) -> Vec<PathBuf> {
    let mut sources = Vec::new();

    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && config.includes(entry.path()) {
                sources.push(entry.into_path());
            }
        }
    }

    sources
}

fn process_file(
    path: &Path,
    counter: &mut OccurrenceCounter,
    config: &ExtractConfig,
    dry_run: bool,
) -> FileOutcome {
    let filename = path.display().to_string();
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", filename, e);
            return FileOutcome::Failed;
        }
    };

    if dry_run {
        return match extract_templates(&source, path, counter, config) {
            Ok(extraction) => {
                print_diff(&filename, &source, &extraction);
                outcome(&extraction)
            }
            Err(e) => {
                report_error(&e, &source, &filename, &[]);
                FileOutcome::Failed
            }
        };
    }

    let mut sink = FsSink::new();
    let extraction = match extract_templates_with_sink(&source, path, counter, config, &mut sink) {
        Ok(extraction) => extraction,
        Err(e) => {
            report_error(&e, &source, &filename, sink.written());
            return FileOutcome::Failed;
        }
    };

    if extraction.is_changed() {
        if let Err(e) = fs::write(path, &extraction.source) {
            eprintln!("Error writing file '{}': {}", filename, e);
            report_orphans(sink.written());
            return FileOutcome::Failed;
        }
    }

    outcome(&extraction)
}

fn outcome(extraction: &Extraction) -> FileOutcome {
    if extraction.is_changed() {
        FileOutcome::Changed
    } else {
        FileOutcome::Unchanged
    }
}

fn report_error(error: &ExtractError, source: &str, filename: &str, written: &[PathBuf]) {
    eprintln!("{}", error.format(source, filename));
    eprintln!("Left '{}' unchanged", filename);
    report_orphans(written);
}

/// Templates written for a source that was not rewritten
fn report_orphans(written: &[PathBuf]) {
    for path in written {
        eprintln!("  template written but not referenced: {}", path.display());
    }
}

fn print_diff(filename: &str, source: &str, extraction: &Extraction) {
    if !extraction.is_changed() {
        return;
    }

    let diff = TextDiff::from_lines(source, extraction.source.as_str());
    print!(
        "{}",
        diff.unified_diff()
            .context_radius(3)
            .header(filename, filename)
    );

    for template in &extraction.templates {
        println!(
            "+++ {} ({}, {} bytes)",
            template.path.display(),
            template.kind,
            template.contents.len()
        );
    }
}
