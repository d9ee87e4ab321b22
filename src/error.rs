//! Upload and configuration error types.
//!
//! Every failed upload is recoverable: the caller turns the error into a
//! [`StatusMessage`] and the inventory it was working on stays as it was.

use serde::Serialize;
use thiserror::Error;

use crate::reconcile::ReconcileSummary;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No sales rows detected")]
    EmptyInput,

    #[error("Could not find ItemName and Quantity columns")]
    NoRecognizedColumns,

    #[error("Unsupported file type: .{extension}. Please use CSV or XLSX.")]
    UnsupportedFileType { extension: String },

    #[error("Error processing file: {0}")]
    ParseFailure(String),

    #[error("Sales rows reference unknown items: {}", .0.join(", "))]
    UnmatchedItems(Vec<String>),

    #[error("A newer upload was started before this one finished")]
    Superseded,
}

impl UploadError {
    /// pdf/docx uploads are accepted by the picker but cannot be processed;
    /// they are surfaced as a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        match self {
            UploadError::UnsupportedFileType { extension } => {
                matches!(extension.as_str(), "pdf" | "docx")
            }
            UploadError::Superseded => true,
            _ => false,
        }
    }
}

/// Result type alias for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

/// The one-line message shown next to the upload control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusMessage {
    pub fn success(file_name: &str, summary: &ReconcileSummary) -> Self {
        let mut message = format!(
            "Successfully processed {}: {} of {} rows applied, inventory updated.",
            file_name, summary.rows_applied, summary.rows_received
        );
        if summary.rows_unmatched > 0 {
            message.push_str(&format!(
                " {} row(s) referenced unknown items.",
                summary.rows_unmatched
            ));
        }
        StatusMessage {
            kind: StatusKind::Success,
            message,
        }
    }

    pub fn failure(file_name: &str, error: &UploadError) -> Self {
        let kind = if error.is_warning() {
            StatusKind::Warning
        } else {
            StatusKind::Error
        };
        let message = match error {
            UploadError::UnsupportedFileType { extension }
                if matches!(extension.as_str(), "pdf" | "docx") =>
            {
                format!(
                    "File {} uploaded but processing for pdf/docx is not supported. Use CSV/XLSX.",
                    file_name
                )
            }
            UploadError::Superseded => {
                format!("{} was skipped: a newer upload was started first.", file_name)
            }
            UploadError::ParseFailure(reason) => {
                format!("Error processing {}: {}", file_name, reason)
            }
            other => format!("Error: {} in {}", other, file_name),
        };
        StatusMessage { kind, message }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_and_docx_are_warnings() {
        let pdf = UploadError::UnsupportedFileType {
            extension: "pdf".into(),
        };
        let exe = UploadError::UnsupportedFileType {
            extension: "exe".into(),
        };
        assert_eq!(StatusMessage::failure("a.pdf", &pdf).kind, StatusKind::Warning);
        assert_eq!(StatusMessage::failure("a.exe", &exe).kind, StatusKind::Error);
    }

    #[test]
    fn failure_messages_do_not_double_the_prefix() {
        let stale = StatusMessage::failure("first.csv", &UploadError::Superseded);
        assert_eq!(stale.kind, StatusKind::Warning);
        assert!(!stale.message.starts_with("Error"));
        assert!(stale.message.contains("first.csv"));

        let parse = UploadError::ParseFailure("bad zip".into());
        let status = StatusMessage::failure("sales.xlsx", &parse);
        assert_eq!(status.message, "Error processing sales.xlsx: bad zip");

        let empty = StatusMessage::failure("sales.csv", &UploadError::EmptyInput);
        assert_eq!(empty.message, "Error: No sales rows detected in sales.csv");
    }

    #[test]
    fn unmatched_items_lists_names() {
        let err = UploadError::UnmatchedItems(vec!["Lamp".into(), "Rug".into()]);
        assert_eq!(
            err.to_string(),
            "Sales rows reference unknown items: Lamp, Rug"
        );
    }
}
