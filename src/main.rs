//! # doc-crawler CLI (`docrawl`)
//!
//! The `docrawl` binary walks a storage tree of documents, spreadsheets,
//! PDFs, and (nested) archives, and exports one CSV row per discovered
//! document.
//!
//! ## Usage
//!
//! ```bash
//! docrawl [--config ./crawler.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docrawl crawl` | Walk the storage tree and export the catalog CSV |
//! | `docrawl formats` | List supported formats and archive capabilities |
//!
//! ## Examples
//!
//! ```bash
//! # Crawl ./storage into ./output/extracted_data.csv
//! docrawl crawl
//!
//! # Crawl a specific tree into a specific sink
//! docrawl crawl --storage /data/docs --output /tmp/catalog.csv
//!
//! # Machine-readable progress on stderr
//! docrawl crawl --progress json
//! ```

mod archive;
mod config;
mod crawl;
mod export;
mod extract;
mod identity;
mod models;
mod progress;
mod session;
mod unpack;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::ArchiveFormat;
use crate::progress::ProgressMode;

/// doc-crawler CLI — catalog text from documents and nested archives
/// into a flat CSV.
#[derive(Parser)]
#[command(
    name = "docrawl",
    about = "Catalog text from documents, spreadsheets, PDFs, and nested archives into CSV",
    version,
    long_about = "doc-crawler walks a storage tree, recursively unpacks zip/7z/rar archives \
    into scratch space, extracts text from DOCX, XLSX, XLS, and PDF files, and exports one \
    ordered CSV row per discovered document with provenance and byte identity."
)]
struct Cli {
    /// Path to an optional configuration file (TOML).
    ///
    /// When absent, built-in defaults are used: storage root `storage`,
    /// output `output/extracted_data.csv`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Walk the storage tree and export the catalog.
    ///
    /// Archives are unpacked recursively into temporary scratch space;
    /// every supported leaf file becomes one CSV row. Files that fail to
    /// parse still produce a row carrying an error placeholder, and the
    /// command exits successfully even when some rows carry placeholders.
    Crawl {
        /// Storage root to walk (overrides config).
        #[arg(long, short = 's')]
        storage: Option<PathBuf>,

        /// Output CSV path (overrides config). Existing contents are
        /// replaced.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Progress reporting on stderr: `off`, `human`, or `json`.
        /// Defaults to `human` when stderr is a TTY, otherwise `off`.
        #[arg(long)]
        progress: Option<String>,
    },

    /// List supported document formats and archive capabilities.
    ///
    /// Shows which archive readers are present in this build and
    /// environment. Useful for verifying 7z/rar support before a run.
    Formats,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::Config::default(),
    };

    match cli.command {
        Commands::Crawl {
            storage,
            output,
            progress,
        } => {
            let mut cfg = cfg;
            if let Some(storage) = storage {
                cfg.storage.root = storage;
            }
            if let Some(output) = output {
                cfg.output.path = output;
            }
            let mode = match progress.as_deref() {
                Some(s) => ProgressMode::parse(s)
                    .ok_or_else(|| anyhow::anyhow!("Invalid progress mode: '{}'", s))?,
                None => ProgressMode::default_for_tty(),
            };

            let reporter = mode.reporter();
            let outcome = crawl::run_crawl(&cfg, reporter.as_ref())?;
            export::export_csv(&outcome.records, &cfg.output.path)?;

            println!("crawl {}", cfg.storage.root.display());
            println!("  files seen: {}", outcome.files_seen);
            println!("  archives unpacked: {}", outcome.archives_seen);
            println!("  scratch dirs released: {}", outcome.scratch_released);
            println!("  records: {}", outcome.records.len());
            println!("  exported: {}", cfg.output.path.display());
            println!("ok");
        }
        Commands::Formats => {
            let registry = archive::ReaderRegistry::detect();
            println!("{:<14} {:<12} AVAILABLE", "KIND", "FORMAT");
            for ext in ["docx", "doc", "pdf"] {
                println!("{:<14} {:<12} true", "document", ext);
            }
            for ext in ["xlsx", "xls"] {
                println!("{:<14} {:<12} true", "spreadsheet", ext);
            }
            for format in [ArchiveFormat::Zip, ArchiveFormat::SevenZ, ArchiveFormat::Rar] {
                println!(
                    "{:<14} {:<12} {}",
                    "archive",
                    format.name(),
                    registry.has(format)
                );
            }
        }
    }

    Ok(())
}
