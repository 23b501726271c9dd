//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod helpers;
mod init;
mod refresh;
mod suggestions;
mod tokens;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "annosuggest")]
#[command(about = "Annotation suggestions for historical document collections")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./annosuggest.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database URL or path (overrides data directory)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Minimum similarity for a match, in (0, 1]
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Longest word n-gram compared against candidate terms
    #[arg(long, global = true)]
    max_ngram: Option<usize>,

    /// Matcher worker threads
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Recompute suggestions for changed documents
    Refresh {
        /// Refresh only this document
        #[arg(short, long)]
        document: Option<i32>,
        /// Recompute even when nothing changed
        #[arg(short, long)]
        force: bool,
        /// Run continuously, refreshing on an interval
        #[arg(long)]
        daemon: bool,
        /// Seconds to wait between runs in daemon mode (default: 300)
        #[arg(long, default_value = "300")]
        interval: u64,
    },

    /// List stored suggestions for a document
    Suggestions {
        /// Document ID
        document_id: i32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the fragment covering a character range of a document
    Extract {
        /// Document ID
        document_id: i32,
        /// Start offset (inclusive)
        start: usize,
        /// End offset (exclusive)
        end: usize,
    },

    /// List the n-gram fragments the matcher sees for a document
    Tokens {
        /// Document ID
        document_id: i32,
        /// Longest n-gram (defaults to the configured value)
        #[arg(short, long)]
        ngram: Option<usize>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(db) = cli.database {
        config.database = Some(db);
    }
    if let Some(threshold) = cli.threshold {
        config.engine.threshold = threshold;
    }
    if let Some(max_ngram) = cli.max_ngram {
        config.engine.max_ngram = max_ngram;
    }
    if let Some(workers) = cli.workers {
        config.engine.workers = workers;
    }
    config.engine.validate()?;

    let settings = config.settings();

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Refresh {
            document,
            force,
            daemon,
            interval,
        } => refresh::cmd_refresh(&settings, &config.engine, document, force, daemon, interval).await,
        Commands::Suggestions { document_id, json } => {
            suggestions::cmd_suggestions(&settings, document_id, json).await
        }
        Commands::Extract {
            document_id,
            start,
            end,
        } => extract::cmd_extract(&settings, document_id, start, end).await,
        Commands::Tokens { document_id, ngram } => {
            tokens::cmd_tokens(
                &settings,
                document_id,
                ngram.unwrap_or(config.engine.max_ngram),
            )
            .await
        }
    }
}
