use anyhow::Context;
use directories::ProjectDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use ustva_core::Table;
use ustva_engine::{Pipeline, PipelineConfig, Reconciliation, RunOutcome};
use ustva_report::{DocxWriter, ReportWriter, TextWriter};

use crate::{Args, OutputFormat};

pub const CONFIG_FILE_NAME: &str = "ustva.toml";

/// One complete run: load, process, print, save. Every failure comes back as
/// an error for `main` to present; nothing here exits or panics.
pub fn run<W: Write>(args: &Args, out: &mut W) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let pipeline = Pipeline::new(config);
    let outcome = pipeline.run_files(&args.primary, args.secondary.as_deref())?;

    print_summary(&outcome, out)?;
    if args.details {
        print_details(&outcome, out)?;
    }
    save_report(args, &pipeline.config().report.file_name, &outcome, out)
}

fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    if let Some(path) = explicit {
        return Ok(PipelineConfig::load(path)?);
    }
    let default_path = ProjectDirs::from("de", "ustva", "ustva")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file());
    match default_path {
        Some(path) => Ok(PipelineConfig::load(&path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn print_summary<W: Write>(outcome: &RunOutcome, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{:<10} {:>14}", "USt-KZ", "Summe EUR")?;
    for row in &outcome.aggregates {
        writeln!(out, "{:<10} {:>14}", row.code.as_str(), row.total.format_plain())?;
    }
    writeln!(out, "{:<10} {:>14}", "Gesamt", outcome.total.format_plain())?;

    if let Some(count) = outcome
        .reconciliation
        .as_ref()
        .and_then(Reconciliation::match_count)
    {
        writeln!(out, "\n{count} übereinstimmende Belegnummern gefunden")?;
    }
    for advisory in &outcome.advisories {
        writeln!(out, "\nHinweis: {advisory}")?;
    }
    Ok(())
}

fn print_details<W: Write>(outcome: &RunOutcome, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "\nAlle Buchungen im Detail:")?;
    write_table(outcome.classified.table(), out)?;

    if let Some(Reconciliation::Matched { table, .. }) = &outcome.reconciliation {
        writeln!(out, "\nAbgleich-Ergebnisse:")?;
        write_table(table, out)?;
    }
    Ok(())
}

fn write_table<W: Write>(table: &Table, out: &mut W) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

fn save_report<W: Write>(
    args: &Args,
    file_name: &str,
    outcome: &RunOutcome,
    out: &mut W,
) -> anyhow::Result<()> {
    let writer: Box<dyn ReportWriter> = match args.format {
        OutputFormat::Docx => Box::new(DocxWriter::new(file_name)),
        OutputFormat::Text => Box::new(TextWriter),
    };
    let bytes = writer.write(&outcome.report)?;

    let target = match (&args.output, args.format) {
        (Some(path), _) => path.clone(),
        (None, OutputFormat::Text) => {
            writeln!(out)?;
            out.write_all(&bytes)?;
            return Ok(());
        }
        (None, OutputFormat::Docx) => PathBuf::from(writer.file_name()),
    };

    std::fs::write(&target, &bytes)
        .with_context(|| format!("Bericht {} konnte nicht geschrieben werden", target.display()))?;
    tracing::info!(
        path = %target.display(),
        content_type = writer.content_type(),
        "report saved"
    );
    writeln!(out, "\nBericht gespeichert: {}", target.display())?;
    Ok(())
}
