//! hvenv CLI
//!
//! Extract embedded files from HomeVision .env archives.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hvenv::{extract_all_tags, DirSink, ExtractConfig, Extractor, ManifestEntry, MemorySink};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const ARCHIVE_EXTENSION: &str = "env";

#[derive(Parser, Debug)]
#[command(name = "hvenv")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "HomeVision .env archive extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract embedded files from one or more archives
    #[command(visible_alias = "x")]
    Extract {
        /// Archive files, or directories to search for .env files
        #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short = 'o', long, default_value = "final_output")]
        output: PathBuf,

        /// Print a summary table of extracted files
        #[arg(long)]
        summary: bool,

        /// Append the detected extension to names that have none
        #[arg(long)]
        append_ext: bool,

        /// Do not write the all_tags.txt catalog
        #[arg(long)]
        no_catalog: bool,
    },

    /// List the files an archive contains without writing them
    #[command(visible_alias = "t")]
    List {
        /// Archive file to list (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Print every tag-shaped token found in an archive
    Tags {
        /// Archive file to scan (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract { inputs, output, summary, append_ext, no_catalog } => {
            let mut config = ExtractConfig {
                append_extension: append_ext,
                ..Default::default()
            };
            if no_catalog {
                config.catalog_file = None;
            }
            extract_archives(inputs, output, config, summary)?;
        }
        Commands::List { input } => {
            list_archive(input, cli.verbose)?;
        }
        Commands::Tags { input } => {
            list_tags(input)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn extract_archives(inputs: Vec<PathBuf>, output: PathBuf, config: ExtractConfig, summary: bool) -> Result<()> {
    let inputs = collect_inputs(inputs);
    let manifest_path = output.join(&config.manifest_file);

    let sink = DirSink::create(&output)?;
    let mut extractor = Extractor::with_config(sink, config);
    let report = extractor.run(&inputs)?;

    println!(
        "Parsed {} files. Metadata saved to '{}'",
        extractor.manifest().len(),
        manifest_path.display()
    );

    if summary {
        println!();
        println!("Summary:");
        print_summary(extractor.manifest());
    }

    if !report.failures.is_empty() {
        for (path, err) in &report.failures {
            eprintln!("Error: {}: {:#}", path.display(), err);
        }
        anyhow::bail!("{} of {} inputs failed", report.failures.len(), inputs.len());
    }

    Ok(())
}

/// Expand directories into the .env files beneath them, sorted by path
fn collect_inputs(inputs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_archive(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            // Missing paths are kept so the run reports them
            files.push(input);
        }
    }

    files
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

fn read_input(input: Option<PathBuf>) -> Result<Vec<u8>> {
    if let Some(input_path) = input {
        fs::read(&input_path).with_context(|| format!("Failed to read: {}", input_path.display()))
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

fn list_archive(input: Option<PathBuf>, verbose: bool) -> Result<()> {
    let data = read_input(input)?;

    let config = ExtractConfig {
        catalog_file: None,
        ..Default::default()
    };
    let mut extractor = Extractor::with_config(MemorySink::new(), config);
    extractor.extract(&data)?;

    for entry in extractor.manifest() {
        if verbose {
            println!("{}  {}  {}  {}", entry.filename, entry.file_type, entry.size_bytes, entry.sha1);
        } else {
            println!("{}", entry.filename);
        }
    }

    Ok(())
}

fn list_tags(input: Option<PathBuf>) -> Result<()> {
    let data = read_input(input)?;

    for tag in extract_all_tags(&data) {
        println!("{}", tag);
    }

    Ok(())
}

/// Print the manifest as a GitHub-flavoured markdown table
fn print_summary(entries: &[ManifestEntry]) {
    let headers = ["Filename", "Type", "Size (bytes)"];
    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|e| [e.filename.clone(), e.file_type.clone(), e.size_bytes.to_string()])
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!(
        "| {:<w0$} | {:<w1$} | {:>w2$} |",
        headers[0],
        headers[1],
        headers[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    );
    println!(
        "|{}|{}|{}|",
        "-".repeat(widths[0] + 2),
        "-".repeat(widths[1] + 2),
        "-".repeat(widths[2] + 2)
    );
    for [name, kind, size] in &rows {
        println!(
            "| {:<w0$} | {:<w1$} | {:>w2$} |",
            name,
            kind,
            size,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
    }
}
