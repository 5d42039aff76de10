mod cli;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use risdedupe::export::write_duplicates_csv;
use risdedupe::ris::sample_tag_lines;
use risdedupe::{SqliteStore, TagMapping, ingest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, IngestArgs, SampleArgs, StatsArgs};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sample(args) => run_sample(args),
        Commands::Ingest(args) => run_ingest(args),
        Commands::Stats(args) => run_stats(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Exports are not always valid UTF-8; undecodable bytes become U+FFFD.
fn read_export(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    let text = read_export(&args.file)?;
    let mut stdout = io::stdout().lock();
    for line in sample_tag_lines(&text) {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

fn run_ingest(args: IngestArgs) -> Result<()> {
    let mapping_json = fs::read_to_string(&args.mapping)
        .with_context(|| format!("failed to read mapping {}", args.mapping.display()))?;
    let mapping = TagMapping::from_json(&mapping_json)
        .with_context(|| format!("invalid mapping in {}", args.mapping.display()))?;
    let text = read_export(&args.file)?;

    let mut store = SqliteStore::open(&args.db)
        .with_context(|| format!("failed to open database {}", args.db.display()))?;
    let report = ingest(&text, &mapping, &args.source, &mut store)
        .with_context(|| format!("failed to ingest {}", args.file.display()))?;

    if let Some(path) = &args.duplicates_csv {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        write_duplicates_csv(BufWriter::new(file), report.duplicates())
            .with_context(|| format!("failed to write duplicates to {}", path.display()))?;
        info!(path = %path.display(), "wrote duplicate export");
    }

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let store = SqliteStore::open(&args.db)
        .with_context(|| format!("failed to open database {}", args.db.display()))?;
    let statistics = store.statistics().context("failed to collect statistics")?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &statistics)?;
    writeln!(stdout)?;
    Ok(())
}
