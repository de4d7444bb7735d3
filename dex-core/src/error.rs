//! Core error types for dex
//!
//! Every failure the core can produce is a variant here. Filesystem errors
//! pass through untouched as `DexError::Io`.

use std::path::PathBuf;

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DexError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Decode error: {field} - {message}")]
    Decode { field: String, message: String },

    #[error("No metadata: {message}")]
    NoMetadata { message: String },

    #[error("Invalid task file '{}': {message}", path.display())]
    FileType { path: PathBuf, message: String },

    #[error("Flag '{0}' is already set")]
    DuplicateFlag(String),

    #[error("Flag '{0}' is not set")]
    MissingFlag(String),

    #[error("Refusing to overwrite existing file '{}'", .0.display())]
    Overwrite(PathBuf),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DexError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a no-metadata error
    pub fn no_metadata(message: impl Into<String>) -> Self {
        Self::NoMetadata {
            message: message.into(),
        }
    }

    /// Create a file type error
    pub fn file_type(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileType {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for the tolerated "file has no dexcode" condition.
    pub fn is_no_metadata(&self) -> bool {
        matches!(self, Self::NoMetadata { .. })
    }
}

impl From<confy::ConfyError> for DexError {
    fn from(err: confy::ConfyError) -> Self {
        Self::config_with_source("Failed to load configuration", err)
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, DexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_not_rewrapped() {
        let err: DexError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = DexError::validation("effort", "must be one of [1, 2, 3, 4, 5]");
        assert_eq!(
            err.to_string(),
            "Validation error: effort - must be one of [1, 2, 3, 4, 5]"
        );
    }

    #[test]
    fn test_no_metadata_is_distinguishable() {
        assert!(DexError::no_metadata("missing").is_no_metadata());
        assert!(!DexError::decode("status", "bad").is_no_metadata());
    }
}
