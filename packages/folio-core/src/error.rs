//! # Error Handling
//!
//! Error types for Folio Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Configuration Errors                                              │
//! │  │   └── InvalidConfig         - Config file or value rejected         │
//! │  │                                                                      │
//! │  ├── Upload Errors                                                     │
//! │  │   ├── UnsupportedType       - MIME type not in the kind policy      │
//! │  │   ├── TooLarge              - File exceeds the kind's size limit    │
//! │  │   └── ReadError             - File contents could not be read       │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── StorageUnavailable    - No persistent storage available       │
//! │  │   ├── StorageBlocked        - Schema upgrade held by another user   │
//! │  │   ├── StorageVersionConflict- On-disk schema is newer               │
//! │  │   ├── StorageWriteError     - Write failed (quota, I/O)             │
//! │  │   ├── StorageReadError      - Read failed                           │
//! │  │   ├── UnknownPartition      - Partition was never declared          │
//! │  │   └── InvalidPartition      - Partition spec is malformed           │
//! │  │                                                                      │
//! │  ├── Presentation Errors                                               │
//! │  │   └── InvalidDataUri        - Stored payload is not a data URI      │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      ├── Internal              - Should not happen                     │
//! │      └── SerializationError    - serde failure                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error is fatal to the page. Each one aborts a single unit of work
//! (one file, one record) and surfaces as a toast through
//! [`Error::user_message`].

use thiserror::Error;

use crate::media::encoding::format_file_size;

/// Result type alias for Folio Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Folio Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors (100-199)
    // ========================================================================

    /// Configuration could not be parsed or contains an invalid value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Upload Errors (200-299)
    // ========================================================================

    /// File MIME type is not allowed for the target partition
    #[error("Unsupported file type '{mime_type}' for {file}")]
    UnsupportedType {
        /// Original filename
        file: String,
        /// MIME type reported for the file
        mime_type: String,
    },

    /// File exceeds the size limit for the target partition
    #[error("{file} is {size} bytes, over the limit of {max} bytes")]
    TooLarge {
        /// Original filename
        file: String,
        /// Actual size in bytes
        size: u64,
        /// Limit in bytes
        max: u64,
    },

    /// File contents could not be read or decoded
    #[error("Failed to read {file}: {reason}")]
    ReadError {
        /// Original filename
        file: String,
        /// Underlying cause
        reason: String,
    },

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// The environment offers no persistent storage
    #[error("Local storage is unavailable: {0}")]
    StorageUnavailable(String),

    /// A schema upgrade is held by another connection
    #[error("Local storage is blocked by another connection: {0}")]
    StorageBlocked(String),

    /// The stored schema is newer than the one requested
    #[error("Stored schema version {found} is newer than requested version {requested}")]
    StorageVersionConflict {
        /// Version found on disk
        found: u32,
        /// Version requested by the caller
        requested: u32,
    },

    /// Failed to write to storage
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    /// Failed to read from storage
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Operation named a partition that was never declared at open
    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    /// Partition spec rejected at open
    #[error("Invalid partition spec: {0}")]
    InvalidPartition(String),

    // ========================================================================
    // Presentation Errors (500-599)
    // ========================================================================

    /// Stored payload is not a base64 data URI
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Configuration
    /// - 200-299: Upload
    /// - 400-499: Storage
    /// - 500-599: Presentation
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Configuration (100-199)
            Error::InvalidConfig(_) => 100,

            // Upload (200-299)
            Error::UnsupportedType { .. } => 200,
            Error::TooLarge { .. } => 201,
            Error::ReadError { .. } => 202,

            // Storage (400-499)
            Error::StorageUnavailable(_) => 400,
            Error::StorageBlocked(_) => 401,
            Error::StorageVersionConflict { .. } => 402,
            Error::StorageWriteError(_) => 403,
            Error::StorageReadError(_) => 404,
            Error::UnknownPartition(_) => 405,
            Error::InvalidPartition(_) => 406,

            // Presentation (500-599)
            Error::InvalidDataUri(_) => 500,

            // Internal (900-999)
            Error::Internal(_) => 900,
            Error::SerializationError(_) => 901,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors may go away if the user re-initiates the action
    /// later. Nothing is retried automatically.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::StorageBlocked(_)
                | Error::StorageWriteError(_)
                | Error::StorageReadError(_)
                | Error::ReadError { .. }
        )
    }

    /// Check if this error is a validation rejection (no I/O was attempted)
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::UnsupportedType { .. } | Error::TooLarge { .. })
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            Error::UnsupportedType { file, .. } => {
                format!("{} is not a supported format", file)
            }
            Error::TooLarge { file, max, .. } => {
                format!("{} is too large (max {})", file, format_file_size(*max))
            }
            Error::ReadError { file, .. } => format!("Error reading {}", file),
            Error::StorageUnavailable(_) | Error::StorageBlocked(_) => {
                "Database initialization failed. Some features may not work.".to_string()
            }
            Error::StorageWriteError(_) => "Error saving to local storage".to_string(),
            Error::StorageReadError(_) => "Error loading saved data".to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidDataUri(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("storage task failed: {}", err))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidConfig("x".into()).code(), 100);
        assert_eq!(
            Error::UnsupportedType {
                file: "a.exe".into(),
                mime_type: "application/x-msdownload".into()
            }
            .code(),
            200
        );
        assert_eq!(Error::StorageUnavailable("x".into()).code(), 400);
        assert_eq!(Error::InvalidDataUri("x".into()).code(), 500);
        assert_eq!(Error::Internal("x".into()).code(), 900);
    }

    #[test]
    fn test_rejection_messages_name_the_file() {
        let unsupported = Error::UnsupportedType {
            file: "notes.txt".into(),
            mime_type: "text/plain".into(),
        };
        assert_eq!(unsupported.user_message(), "notes.txt is not a supported format");
        assert!(unsupported.is_rejection());

        let too_large = Error::TooLarge {
            file: "cv.pdf".into(),
            size: 11 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        };
        assert_eq!(too_large.user_message(), "cv.pdf is too large (max 10 MB)");
        assert_ne!(unsupported.user_message(), too_large.user_message());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::StorageWriteError("quota".into()).is_recoverable());
        assert!(!Error::UnknownPartition("x".into()).is_recoverable());
        assert!(!Error::TooLarge { file: "a".into(), size: 2, max: 1 }.is_recoverable());
    }
}
