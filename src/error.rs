//! Unified error hierarchy for LiftRS
//!
//! The progression core never fails: missing data degrades to documented
//! defaults. These errors cover the surfaces around it (input files,
//! configuration, exports) and integrate with the tracing system.

use thiserror::Error;

use crate::export::ExportError;

/// Top-level error type for all LiftRS operations
#[derive(Debug, Error)]
pub enum LiftRsError {
    /// Structurally malformed input (empty plan, zero-set exercise)
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for LiftRS operations
pub type Result<T> = std::result::Result<T, LiftRsError>;

impl LiftRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftRsError::Validation(_) => ErrorSeverity::Warning,
            LiftRsError::Configuration(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftRsError::Serialization(e) => {
                format!("Input file is not a valid progression request: {}", e)
            }
            LiftRsError::Validation(reason) => {
                format!("The workout plan cannot be regenerated: {}", reason)
            }
            LiftRsError::Configuration(reason) => {
                format!("Configuration problem ({}). Falling back to defaults may help.", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = LiftRsError::Validation("plan has no workouts".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = LiftRsError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_user_messages() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = LiftRsError::from(parse_err);
        assert!(err.user_message().contains("not a valid progression request"));

        let err = LiftRsError::Validation("exercise bench has 0 sets".to_string());
        assert!(err.user_message().contains("bench"));
    }
}
