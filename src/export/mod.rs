use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::ProgressionOutcome;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// `path`, with the format's extension added when it has none
pub fn output_path(path: &Path, format: ExportFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.extension())
    }
}

/// Write `outcome` to `output_path` in the requested format
pub fn export_outcome<P: AsRef<Path>>(
    outcome: &ProgressionOutcome,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => json::export_outcome(outcome, output_path),
        ExportFormat::Csv => csv::export_workouts(&outcome.workouts, output_path),
        ExportFormat::Text => text::export_outcome(outcome, output_path),
    }
}

/// Render `outcome` in the requested format, for printing to stdout
pub fn render(outcome: &ProgressionOutcome, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => json::to_json_string(outcome),
        ExportFormat::Csv => {
            let mut buffer = Vec::new();
            csv::write_workouts(&outcome.workouts, &mut buffer)?;
            String::from_utf8(buffer).map_err(|e| ExportError::SerializationError(e.to_string()))
        }
        ExportFormat::Text => Ok(text::render_outcome(outcome)),
    }
}
