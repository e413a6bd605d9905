//! Error handling for sndfx
//!
//! Every failure is recoverable at the caller boundary: the library never
//! terminates the process and leaves prior state untouched on error.

use thiserror::Error;

/// Result type alias for sndfx operations
pub type Result<T> = std::result::Result<T, SndfxError>;

/// Main error type for sndfx operations
#[derive(Error, Debug)]
pub enum SndfxError {
    // File Errors
    #[error("Unsupported audio file '{path}': {reason}")]
    Format { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Buffer Errors
    #[error("Audio buffer contains no samples")]
    EmptyBuffer,

    // Parameter Errors
    #[error("Invalid parameter '{param}' = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Unknown filter '{name}' (valid filters: reverb, chorus, pitchshifter)")]
    UnknownFilter { name: String },

    // Session Errors
    #[error("Cannot {operation}: no file loaded")]
    NoFileLoaded { operation: String },

    // Processing Errors
    #[error("Processing error: {reason}")]
    Processing { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SndfxError {
    /// Build an `InvalidParameter` error
    pub fn invalid_param(
        param: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        SndfxError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Build a `NoFileLoaded` error for the named operation
    pub fn no_file_loaded(operation: impl Into<String>) -> Self {
        SndfxError::NoFileLoaded {
            operation: operation.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SndfxError::Format { .. } => "FORMAT_ERROR",
            SndfxError::Io { .. } => "IO_ERROR",
            SndfxError::EmptyBuffer => "EMPTY_BUFFER",
            SndfxError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SndfxError::UnknownFilter { .. } => "UNKNOWN_FILTER",
            SndfxError::NoFileLoaded { .. } => "NO_FILE_LOADED",
            SndfxError::Processing { .. } => "PROCESSING_ERROR",
            SndfxError::Config { .. } => "CONFIG_ERROR",
            SndfxError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the caller can fix this error and retry the operation
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SndfxError::Processing { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SndfxError::Format { .. } => vec![
                "Only uncompressed *.wav files are supported",
                "Convert the file to 16-bit PCM WAV and try again",
            ],
            SndfxError::Io { .. } => vec![
                "Check the file path is correct",
                "Verify you have permission to read or write the location",
            ],
            SndfxError::EmptyBuffer => vec!["Load a file that contains audio before continuing"],
            SndfxError::InvalidParameter { .. } => vec![
                "Run with --list-filters to see valid parameter names and ranges",
                "Parameter values must be numbers",
            ],
            SndfxError::UnknownFilter { .. } => {
                vec!["Valid filter names: reverb, chorus, pitchshifter"]
            }
            SndfxError::NoFileLoaded { .. } => vec!["Load a *.wav file first"],
            SndfxError::Processing { .. } => vec![
                "The effect settings may be too extreme",
                "Try reducing feedback or room size",
            ],
            _ => vec![],
        }
    }

    /// Map a `hound` error into the taxonomy, attributing it to `path`
    pub(crate) fn from_wav(path: &std::path::Path, err: hound::Error) -> Self {
        let path = path.display().to_string();
        match err {
            // The file opened fine but ended early: a decoding failure, not an I/O one.
            hound::Error::IoError(source) if source.kind() == std::io::ErrorKind::UnexpectedEof => {
                SndfxError::Format {
                    path,
                    reason: "truncated WAV data".to_string(),
                }
            }
            hound::Error::IoError(source) => SndfxError::Io { path, source },
            other => SndfxError::Format {
                path,
                reason: other.to_string(),
            },
        }
    }
}
