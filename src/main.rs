use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bumpalo::Bump;
use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use puppet_parser::ast::sexpr::SExprFormatter;
use puppet_parser::lexer::Lexer;
use puppet_parser::line_index::LineIndex;
use puppet_parser::parser::parse_str;
use rayon::prelude::*;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Parse Puppet manifests and print their structure.
#[derive(Debug, ClapParser)]
#[command(name = "puppet-parser", version)]
struct Cli {
    /// Files or directories; directories are searched for `*.pp`. Reads stdin when empty.
    paths: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Sexpr)]
    format: Format,

    /// Only print the summary line.
    #[arg(short, long)]
    quiet: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Sexpr,
    Json,
    Tokens,
    Debug,
}

struct Report {
    label: String,
    output: String,
    partial: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    let mut skipped = 0;
    let reports = if cli.paths.is_empty() {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        vec![render("<stdin>".to_string(), &source, cli.format)?]
    } else {
        let files = collect_files(&cli.paths);
        debug!(count = files.len(), "parsing files");
        let reports = parse_files(&files, cli.format);
        skipped = files.len() - reports.len();
        reports
    };

    let partial = reports.iter().filter(|r| r.partial).count();
    for report in &reports {
        if !cli.quiet {
            if reports.len() > 1 {
                println!("==> {} <==", report.label);
            }
            println!("{}", report.output);
        }
        if report.partial {
            warn!(file = %report.label, "parse stopped early");
        }
    }
    eprintln!("Parsed {} file(s), {} partial, {} skipped", reports.len(), partial, skipped);
    Ok(())
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "puppet_parser=warn",
        1 => "puppet_parser=debug",
        _ => "puppet_parser=trace",
    }
}

fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && is_manifest(e.path()))
                    .map(|e| e.into_path()),
            );
        } else {
            files.push(path.clone());
        }
    }
    files
}

/// Parses every file in parallel. A file that cannot be read or rendered is
/// logged and left out of the result.
fn parse_files(files: &[PathBuf], format: Format) -> Vec<Report> {
    files
        .par_iter()
        .filter_map(|path| {
            let report = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
                .and_then(|source| render(path.display().to_string(), &source, format));
            match report {
                Ok(report) => Some(report),
                Err(error) => {
                    warn!(file = %path.display(), "skipping: {error:#}");
                    None
                }
            }
        })
        .collect()
}

fn is_manifest(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "pp")
}

fn render(label: String, source: &str, format: Format) -> Result<Report> {
    let arena = Bump::new();
    let manifest = parse_str(source, &arena);
    let output = match format {
        Format::Sexpr => SExprFormatter::format(&manifest.tree),
        Format::Json => serde_json::to_string_pretty(&manifest.tree)
            .with_context(|| format!("failed to serialize {label}"))?,
        Format::Debug => format!("{:#?}", manifest.tree),
        Format::Tokens => {
            let index = LineIndex::new(source);
            Lexer::tokenize(source)
                .iter()
                .map(|token| {
                    let (line, col) = index.line_col(token.span.start);
                    format!("{line}:{col} {:?} {:?}", token.kind, token.span.as_str(source))
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    Ok(Report {
        label,
        output,
        partial: manifest.is_partial(),
    })
}
