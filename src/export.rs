/// CSV export of the displayed attendance list

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::state::data::{format_confidence, local_date_time, AttendanceRecord};

pub const CSV_HEADERS: [&str; 6] = ["Student ID", "Name", "Time", "Status", "Confidence", "Class"];

/// Placeholder for missing optional columns
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer flush failed: {0}")]
    Flush(String),

    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// `attendance_2026-10-18.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("attendance_{}.csv", date.format("%Y-%m-%d"))
}

/// One CSV line per record, headers first
pub fn attendance_csv(records: &[AttendanceRecord]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for record in records {
        writer.write_record([
            record.student_id.clone(),
            record.student_name.clone(),
            local_date_time(&record.timestamp),
            record.status.to_string(),
            record
                .confidence
                .map(format_confidence)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            record
                .class_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| ExportError::Flush(e.to_string()))?;
    // Every field came from a String, so the buffer is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the exported text to the chosen destination
pub async fn write_csv(path: PathBuf, contents: String) -> Result<PathBuf, ExportError> {
    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    log::info!("💾 Exported attendance to {}", path.display());
    Ok(path)
}
