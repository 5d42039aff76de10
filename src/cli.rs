use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "risdedupe",
    version,
    about = "Ingest RIS citation exports into SQLite and classify duplicates across sources"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the first occurrence of every tag, the input for building a tag mapping
    Sample(SampleArgs),
    /// Parse a RIS file, classify its records and store the unique ones
    Ingest(IngestArgs),
    /// Print statistics about the stored records as JSON
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// RIS file to sample
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// RIS file to ingest
    pub file: PathBuf,

    #[arg(long, default_value = "citations.sqlite")]
    pub db: PathBuf,

    /// Label of the database the file was exported from, e.g. Scopus
    #[arg(long)]
    pub source: String,

    /// JSON file with the tag mapping for this export
    #[arg(long)]
    pub mapping: PathBuf,

    /// Also write full and partial duplicates to this CSV file
    #[arg(long)]
    pub duplicates_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[arg(long, default_value = "citations.sqlite")]
    pub db: PathBuf,
}
