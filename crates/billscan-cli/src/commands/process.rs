//! Process command - scan a single bill and print its fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use billscan_core::{BillScanner, DocumentKind, ExtractedFields, ScanResult};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image, or already-recognized .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// MIME type of the input, overriding the file extension
    #[arg(long)]
    mime: Option<String>,

    /// Corrected header (replaces the extracted one)
    #[arg(long)]
    header: Option<String>,

    /// Corrected date (replaces the extracted one)
    #[arg(long)]
    date: Option<String>,

    /// Corrected total (replaces the extracted one)
    #[arg(long)]
    total: Option<Decimal>,

    /// Report problems with the final record
    #[arg(long)]
    validate: bool,

    /// Print the recognized text to stderr
    #[arg(long)]
    show_raw: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// One scanned bill as written to output.
#[derive(Debug, Serialize)]
pub struct BillRecord {
    pub file: String,
    #[serde(flatten)]
    pub fields: ExtractedFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_date: Option<NaiveDate>,
    pub kind: DocumentKind,
    pub pages: usize,
    pub processing_time_ms: u64,
}

impl BillRecord {
    pub fn new(path: &Path, result: ScanResult) -> Self {
        Self {
            file: path.display().to_string(),
            parsed_date: result.fields.parsed_date(),
            fields: result.fields,
            kind: result.metadata.kind,
            pages: result.metadata.page_count,
            processing_time_ms: result.metadata.processing_time_ms,
        }
    }

    /// Replace fields with a corrected copy.
    pub fn corrected(mut self, fields: ExtractedFields) -> Self {
        self.parsed_date = fields.parsed_date();
        self.fields = fields;
        self
    }
}

/// Resolve the document kind from an explicit MIME type or the extension.
pub fn document_kind(path: &Path, mime: Option<&str>) -> anyhow::Result<DocumentKind> {
    let kind = match mime {
        Some(mime) => DocumentKind::from_mime(mime),
        None => DocumentKind::from_path(path),
    };
    kind.ok_or_else(|| anyhow::anyhow!("Unsupported file type: {}", path.display()))
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    let kind = document_kind(&args.input, args.mime.as_deref())?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Scanning bill...");

    let data = fs::read(&args.input)?;
    let scanner = BillScanner::from_config(&config)?;
    let result = scanner.scan(&data, kind)?;

    pb.finish_and_clear();

    if args.show_raw {
        eprintln!("{}", style("Recognized text:").dim());
        eprintln!("{}", result.raw_text);
    }

    let mut record = BillRecord::new(&args.input, result);
    let fields = apply_corrections(record.fields.clone(), &args);
    if fields != record.fields {
        debug!("Applying manual corrections");
        record = record.corrected(fields);
    }

    if args.validate {
        let issues = record.fields.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn apply_corrections(mut fields: ExtractedFields, args: &ProcessArgs) -> ExtractedFields {
    if let Some(header) = &args.header {
        fields = fields.with_header(header);
    }
    if let Some(date) = &args.date {
        fields = fields.with_date(date);
    }
    if let Some(total) = args.total {
        fields = fields.with_total(total);
    }
    fields
}

pub fn format_record(record: &BillRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &BillRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["file", "header", "date", "total"])?;
    wtr.write_record([
        record.file.as_str(),
        record.fields.header.as_str(),
        record.fields.date.as_str(),
        &format!("{:.2}", record.fields.total),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &BillRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Business: {}\n", record.fields.header));
    match record.parsed_date {
        Some(parsed) => output.push_str(&format!("Date:     {} ({})\n", record.fields.date, parsed)),
        None => output.push_str(&format!("Date:     {}\n", record.fields.date)),
    }
    output.push_str(&format!("Total:    {:.2} AED\n", record.fields.total));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::ScanMetadata;

    fn record(text: &str) -> BillRecord {
        let result = ScanResult {
            fields: billscan_core::extract(text),
            raw_text: text.to_string(),
            metadata: ScanMetadata {
                kind: DocumentKind::Text,
                byte_len: text.len(),
                page_count: 1,
                processing_time_ms: 0,
            },
        };
        BillRecord::new(Path::new("bill.txt"), result)
    }

    #[test]
    fn test_json_flattens_fields() {
        let json = format_record(&record("Shop XYZ\n12/08/2024\nTOTAL 9.50"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["header"], "Shop XYZ");
        assert_eq!(value["date"], "12/08/2024");
        assert_eq!(value["total"], "9.50");
        assert_eq!(value["parsed_date"], "2024-08-12");
        assert_eq!(value["kind"], "text");
    }

    #[test]
    fn test_csv_output() {
        let csv = format_record(&record("Shop, XYZ\nAMOUNT 12.00"), OutputFormat::Csv).unwrap();

        assert_eq!(csv, "file,header,date,total\nbill.txt,\"Shop, XYZ\",Unknown,12.00\n");
    }

    #[test]
    fn test_text_output_without_date() {
        let text = format_record(&record(""), OutputFormat::Text).unwrap();

        assert_eq!(text, "Business: Unknown\nDate:     Unknown\nTotal:    0.00 AED\n");
    }

    #[test]
    fn test_document_kind_resolution() {
        assert_eq!(document_kind(Path::new("a.pdf"), None).unwrap(), DocumentKind::Pdf);
        assert_eq!(
            document_kind(Path::new("upload.bin"), Some("image/png")).unwrap(),
            DocumentKind::Image
        );
        assert!(document_kind(Path::new("a.doc"), None).is_err());
    }
}
