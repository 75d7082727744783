//! dirscope: disk usage analyser.
//!
//! Thin binary entry point. All logic lives in the `dirscope-core` crate.

use anyhow::{bail, Context};
use clap::Parser;
use dirscope_core::model::{parse_byte_size, FileTree, SizeFormat};
use dirscope_core::output::{self, OutputFormat};
use dirscope_core::scanner::progress::ScanProgress;
use dirscope_core::scanner::{start_scan, ScanOptions};
use dirscope_core::search::SearchQuery;
use dirscope_core::session::Session;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "dirscope")]
#[command(about = "Show where the disk space under a directory went")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Size format: bytes (1024-based), pow10 (1000-based) or none (raw)
    #[arg(long = "fmt", value_name = "FORMAT", default_value = "bytes", value_parser = parse_size_format)]
    fmt: SizeFormat,

    /// Keep entries in name order instead of sorting by size on disk
    #[arg(long = "no-sort")]
    no_sort: bool,

    /// Hide entries smaller than SIZE (e.g. 512, 100K, 10M, 2GB)
    #[arg(long = "thresh", value_name = "SIZE", value_parser = parse_threshold)]
    thresh: Option<u64>,

    /// Ignore-rule files, comma separated
    #[arg(long = "ignore", value_name = "FILE", value_delimiter = ',')]
    ignore: Vec<PathBuf>,

    /// Only show files whose name contains TEXT
    #[arg(long = "search", value_name = "TEXT")]
    search: Option<String>,

    /// Only show files whose name matches RE
    #[arg(long = "regex", value_name = "RE")]
    regex: Option<String>,

    /// Case-insensitive --search and --regex
    #[arg(long = "ignore-case")]
    ignore_case: bool,

    /// Show files that do NOT match --search / --regex
    #[arg(long = "invert")]
    invert: bool,

    /// Output format: text, json or csv
    #[arg(long = "output", value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
    output: OutputFormat,

    /// Worker threads (0 = twice the CPU count)
    #[arg(long = "threads", default_value_t = 0)]
    threads: usize,

    /// Verbose logging, including the compiled ignore rules
    #[arg(long = "debug")]
    debug: bool,
}

fn parse_size_format(s: &str) -> Result<SizeFormat, String> {
    SizeFormat::from_name(s).ok_or_else(|| format!("unknown size format {s:?} (bytes, pow10, none)"))
}

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_name(s).ok_or_else(|| format!("unknown output format {s:?} (text, json, csv)"))
}

fn parse_threshold(s: &str) -> Result<u64, String> {
    match parse_byte_size(s) {
        Ok(0) => Err("threshold must be greater than zero".to_string()),
        Ok(bytes) => Ok(bytes),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for the tree or export.
    tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    // Reject a bad regex before spending time on the scan.
    let query = SearchQuery::new(
        args.search.as_deref(),
        args.regex.as_deref(),
        args.ignore_case,
        args.invert,
    )
    .context("invalid search")?;

    let mut options = ScanOptions::new(&args.path)
        .with_size_threshold(args.thresh.unwrap_or(0))
        .sorted_by_size(!args.no_sort)
        .with_threads(args.threads);
    for file in &args.ignore {
        options = options.with_ignore_file(file);
    }

    let tree = wait_for_tree(options)?;

    let mut session = Session::new(tree, &args.path);
    session.format = args.fmt;
    session.apply_filter(query);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.output {
        OutputFormat::Text => {
            output::write_tree(session.view(), session.format, &mut out)?;
            writeln!(out, "{}", session.summary())?;
        }
        OutputFormat::Json => output::write_json(session.view(), &mut out)?,
        OutputFormat::Csv => output::write_csv(session.view(), session.base(), &mut out)?,
    }
    out.flush().context("failed to write output")?;
    Ok(())
}

/// Run the scan in the background and block until it finishes.
fn wait_for_tree(options: ScanOptions) -> anyhow::Result<FileTree> {
    let root = options.root.clone();
    let handle = start_scan(options).context("failed to start scan")?;

    for message in handle.progress_rx.iter() {
        match message {
            ScanProgress::Update {
                files_found,
                dirs_found,
                total_size,
                current_path,
            } => debug!("{files_found} files, {dirs_found} dirs, {total_size} bytes: {current_path}"),
            // Already logged by the walker.
            ScanProgress::Error { .. } => {}
            ScanProgress::Complete {
                tree,
                duration,
                error_count,
            } => {
                info!(
                    "Scanned {} in {:.2}s ({error_count} entries skipped)",
                    root.display(),
                    duration.as_secs_f64()
                );
                return Ok(*tree);
            }
            ScanProgress::Failed { message } => bail!("scan of {} failed: {message}", root.display()),
            ScanProgress::Cancelled => bail!("scan of {} was cancelled", root.display()),
        }
    }
    bail!("scan of {} ended without a result", root.display())
}
