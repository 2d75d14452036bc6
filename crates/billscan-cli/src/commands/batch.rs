//! Batch processing command for multiple bills.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use billscan_core::{BillScanner, DocumentKind};

use super::process::{format_record, BillRecord, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of scanning one file.
struct FileOutcome {
    path: PathBuf,
    record: Option<BillRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let scanner = Arc::new(BillScanner::from_config(&config)?);
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        let scanner = Arc::clone(&scanner);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let outcome = tokio::task::spawn_blocking(move || scan_file(&*scanner, path))
                .await
                .map_err(|e| anyhow::anyhow!("Scan task failed: {}", e));
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<FileOutcome>> = (0..files.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined?;
        let outcome = outcome?;

        if let Some(message) = &outcome.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", outcome.path.display(), message);
            } else {
                error!("Failed to process {}: {}", outcome.path.display(), message);
                tasks.abort_all();
                anyhow::bail!("Processing failed: {}", message);
            }
        }

        outcomes[index] = Some(outcome);
        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let results: Vec<FileOutcome> = outcomes.into_iter().flatten().collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(record) = &result.record {
                let output_path = output_path(output_dir, &result.path, args.format);
                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    } else {
        for record in results.iter().filter_map(|r| r.record.as_ref()) {
            println!("{}", format_record(record, args.format)?);
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    eprintln!(
        "{} Processed {} files in {:?} ({} failed)",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        failed
    );

    Ok(())
}

fn scan_file<R, P>(scanner: &BillScanner<R, P>, path: PathBuf) -> FileOutcome
where
    R: billscan_core::TextRecognizer,
    P: billscan_core::PageRasterizer,
{
    let start = Instant::now();
    let result = DocumentKind::from_path(&path)
        .ok_or_else(|| anyhow::anyhow!("Unsupported file type"))
        .and_then(|kind| {
            let data = fs::read(&path)?;
            Ok(scanner.scan(&data, kind)?)
        });
    let processing_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(scan) => FileOutcome {
            record: Some(BillRecord::new(&path, scan)),
            path,
            error: None,
            processing_time_ms,
        },
        Err(e) => FileOutcome {
            path,
            record: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

/// Per-file output path: `<dir>/<stem>.<ext>`.
fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bill");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "header", "date", "total", "error", "processing_time_ms"])?;

    for result in results {
        let (header, date, total) = match &result.record {
            Some(record) => (
                record.fields.header.clone(),
                record.fields.date.clone(),
                format!("{:.2}", record.fields.total),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        wtr.write_record([
            result.path.display().to_string(),
            header,
            date,
            total,
            result.error.clone().unwrap_or_default(),
            result.processing_time_ms.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("scans/bill-01.pdf"), OutputFormat::Csv),
            PathBuf::from("out/bill-01.csv")
        );
    }
}
