use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Word document
    Docx,
    /// Plain text
    Text,
}

/// Classify bookings into UStVA reporting codes, sum them per code and
/// optionally reconcile them with a second dataset on `Belegnummer`.
#[derive(Debug, Parser)]
#[command(name = "ustva", version, about)]
pub struct Args {
    /// Main bookings file (.csv, .txt, .tsv, .xlsx, .xls, .ods)
    pub primary: PathBuf,

    /// Additional dataset to reconcile against
    #[arg(short, long)]
    pub secondary: Option<PathBuf>,

    /// Where to write the report (text reports go to stdout by default)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to ustva.toml in the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Docx)]
    pub format: OutputFormat,

    /// Also print the classified and reconciled records
    #[arg(long)]
    pub details: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match commands::run(&args, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            eprintln!("Fehler beim Verarbeiten der Datei: {e:#}");
            ExitCode::FAILURE
        }
    }
}
