//! Triage CLI
//!
//! - `process`: merge the messages and categories CSVs into one SQLite table
//! - `verbs`: compute the leading-verb flag for a text column
//! - `inspect`: summarize a saved table

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use triage_etl::{CategoryPolicy, PipelineConfig};
use triage_text::{texts_to_verb_flags, NlpContext};

#[derive(Parser)]
#[command(name = "triage")]
#[command(author, version, about = "Triage: message/category merge pipeline and text features")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, clean and merge the two CSV sources, then save them to SQLite.
    ///
    /// Example: triage process disaster_messages.csv disaster_categories.csv DisasterResponse.db
    Process {
        /// CSV with `id`, `message` and `genre` columns
        messages: PathBuf,
        /// CSV with `id` and packed `categories` columns
        categories: PathBuf,
        /// SQLite database to write (created if missing)
        database: PathBuf,
        /// Destination table, replaced on every run
        #[arg(long)]
        table: Option<String>,
        /// Fail the whole run on the first malformed category token
        #[arg(long)]
        strict: bool,
        /// JSON pipeline configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Flag which messages open with a verb (or the retweet marker).
    Verbs {
        /// CSV with an `id` column and a text column
        input: PathBuf,
        /// Text column to evaluate
        #[arg(long, default_value = "message")]
        column: String,
        /// Output CSV (`id,starts_with_verb`); stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the row count and columns of a saved table.
    Inspect {
        database: PathBuf,
        #[arg(long, default_value = "merged")]
        table: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Process {
            messages,
            categories,
            database,
            table,
            strict,
            config,
        } => {
            let mut pipeline = match config {
                Some(path) => PipelineConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(table) = table {
                pipeline.table_name = table;
            }
            if strict {
                pipeline.category_policy = CategoryPolicy::Strict;
            }
            cmd_process(&messages, &categories, &database, &pipeline)?;
        }
        Commands::Verbs { input, column, out } => {
            cmd_verbs(&input, &column, out.as_deref())?;
        }
        Commands::Inspect { database, table } => {
            cmd_inspect(&database, &table)?;
        }
    }
    Ok(())
}

fn cmd_process(
    messages_path: &Path,
    categories_path: &Path,
    database: &Path,
    config: &PipelineConfig,
) -> Result<()> {
    println!(
        "{}\n    MESSAGES: {}\n    CATEGORIES: {}",
        "Loading data...".green().bold(),
        messages_path.display(),
        categories_path.display()
    );
    let (messages, categories) = triage_etl::load(messages_path, categories_path)?;

    println!("{}", "Cleaning data...".green().bold());
    let report = triage_etl::clean(messages, categories, config)?;
    for diagnostic in &report.malformed {
        println!("  {} {}", "skipped".yellow(), diagnostic);
    }
    println!(
        "  {} rows, {} genre columns, {} category columns",
        report.frame.len(),
        report.genre_columns.len(),
        report.category_columns.len()
    );

    println!(
        "{}\n    DATABASE: {}",
        "Saving data...".green().bold(),
        database.display()
    );
    triage_etl::save_with_types(
        &report.frame,
        &report.column_types(),
        database,
        &config.table_name,
    )?;

    println!("{}", "Cleaned data saved to database!".green().bold());
    Ok(())
}

fn cmd_verbs(input: &Path, column: &str, out: Option<&Path>) -> Result<()> {
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("opening {}", input.display()))?;
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow!("{} has no `{name}` column", input.display()))
    };
    let id_idx = find("id")?;
    let text_idx = find(column)?;

    let mut ids = Vec::new();
    let mut texts = Vec::new();
    for record in reader.records() {
        let record = record?;
        ids.push(record.get(id_idx).unwrap_or("").to_string());
        texts.push(record.get(text_idx).unwrap_or("").to_string());
    }

    let ctx = NlpContext::default();
    let flags = texts_to_verb_flags(&ctx, &texts);
    let flagged = flags.iter().filter(|f| **f).count();
    tracing::info!(texts = texts.len(), flagged, "computed leading-verb flags");

    let sink: Box<dyn Write> = match out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(["id", "starts_with_verb"])?;
    for (id, flag) in ids.iter().zip(&flags) {
        writer.write_record([id.as_str(), if *flag { "1" } else { "0" }])?;
    }
    writer.flush()?;

    if let Some(path) = out {
        eprintln!(
            "{} {}/{} texts → {}",
            "Flagged".green().bold(),
            flagged,
            texts.len(),
            path.display()
        );
    }
    Ok(())
}

fn cmd_inspect(database: &Path, table: &str) -> Result<()> {
    let frame = triage_etl::read_table(database, table)?;
    println!(
        "{} {} ({} rows)",
        "Table".green().bold(),
        table,
        frame.len()
    );
    for column in frame.columns() {
        println!("  {column}");
    }
    Ok(())
}
