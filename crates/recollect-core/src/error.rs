//! Error types for recollect operations.
//!
//! Errors carry a structured code and, where useful, a suggestion for the
//! caller. Most public entry points on [`crate::MemoryManager`] never surface
//! these: they log and fall back to an empty result instead.

use thiserror::Error;

/// Result type alias for recollect operations.
pub type RecollectResult<T> = Result<T, RecollectError>;

/// Main error type for all recollect operations.
#[derive(Error, Debug)]
pub enum RecollectError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Memory not found.
    #[error("Memory not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        memory_id: Option<String>,
    },

    /// Storage backend operation failed.
    #[error("Store error: {message}")]
    Store {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValContentTooLong,
    ValInvalidConfidence,

    // Memory (MEM_xxx)
    MemNotFound,
    MemDuplicate,

    // Store (STO_xxx)
    StoOperationFailed,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValContentTooLong => "VAL_003",
            ErrorCode::ValInvalidConfidence => "VAL_004",
            ErrorCode::MemNotFound => "MEM_001",
            ErrorCode::MemDuplicate => "MEM_002",
            ErrorCode::StoOperationFailed => "STO_001",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl RecollectError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create a validation error with a specific code.
    pub fn validation_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Validation {
            message: message.into(),
            code,
            suggestion: None,
        }
    }

    /// Create a duplicate-id error.
    pub fn duplicate(memory_id: impl Into<String>) -> Self {
        Self::Validation {
            message: format!("Memory with id '{}' already exists", memory_id.into()),
            code: ErrorCode::MemDuplicate,
            suggestion: Some("Memories are immutable; delete the old one first".to_string()),
        }
    }

    /// Create a not found error.
    pub fn not_found(memory_id: impl Into<String>) -> Self {
        let id = memory_id.into();
        Self::NotFound {
            message: format!("Memory with id '{}' not found", id),
            code: ErrorCode::MemNotFound,
            memory_id: Some(id),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoOperationFailed,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Store { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Serialization(_) => ErrorCode::ParseInvalidJson,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::NotFound { .. } => Some("Please check the memory ID and ensure it exists"),
            Self::Store { .. } => Some("Please check that the storage backend is reachable"),
            Self::Database { .. } => Some("Please check the database path and file permissions"),
            Self::Configuration(_) => Some("Please check your recollect configuration file"),
            _ => None,
        }
    }

    /// Whether this error signals a duplicate memory id.
    pub fn is_duplicate(&self) -> bool {
        self.code() == ErrorCode::MemDuplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = RecollectError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
        assert!(err.suggestion().is_none());
    }

    #[test]
    fn test_not_found_error() {
        let err = RecollectError::not_found("test-id");
        assert_eq!(err.code(), ErrorCode::MemNotFound);
        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("test-id"));
    }

    #[test]
    fn test_duplicate_error() {
        let err = RecollectError::duplicate("mem-1");
        assert!(err.is_duplicate());
        assert_eq!(err.code().as_str(), "MEM_002");
        assert!(err.suggestion().unwrap().contains("immutable"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValInvalidInput.as_str(), "VAL_001");
        assert_eq!(ErrorCode::StoOperationFailed.as_str(), "STO_001");
        assert_eq!(ErrorCode::Internal.as_str(), "INT_001");
    }
}
