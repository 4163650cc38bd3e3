//! Error types for kubemind operations.
//!
//! Errors carry a structured [`ErrorCode`] and fall into four families:
//! transient store failures (dedup store, vector store, embedding provider,
//! network), configuration errors, data errors, and cancellation.

use thiserror::Error;

/// Result type alias for kubemind operations.
pub type KubeMindResult<T> = Result<T, KubeMindError>;

/// Main error type for all kubemind operations.
#[derive(Error, Debug)]
pub enum KubeMindError {
    /// Input validation failed (empty log, dimension mismatch, bad payload).
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Record not found.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        record_id: Option<String>,
    },

    /// Dedup store operation failed.
    #[error("Dedup store error: {message}")]
    DedupStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Vector store operation failed.
    #[error("Vector store error: {message}")]
    VectorStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding generation failed.
    #[error("Embedding error: {message}")]
    Embedding {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Operation cancelled by a shutdown signal.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// The resolution buffer has no reader left.
    #[error("Resolution buffer closed")]
    BufferClosed,

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
    ValEmptyLog,
    ValDimensionMismatch,

    // Records (REC_xxx)
    RecNotFound,

    // Dedup store (DDP_xxx)
    DdpConnectionFailed,
    DdpOperationFailed,

    // Vector store (VEC_xxx)
    VecConnectionFailed,
    VecOperationFailed,
    VecCollectionNotFound,

    // Embedding (EMB_xxx)
    EmbGenerationFailed,

    // Network (NET_xxx)
    NetConnectionFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValEmptyLog => "VAL_002",
            ErrorCode::ValDimensionMismatch => "VAL_003",
            ErrorCode::RecNotFound => "REC_001",
            ErrorCode::DdpConnectionFailed => "DDP_001",
            ErrorCode::DdpOperationFailed => "DDP_002",
            ErrorCode::VecConnectionFailed => "VEC_001",
            ErrorCode::VecOperationFailed => "VEC_002",
            ErrorCode::VecCollectionNotFound => "VEC_003",
            ErrorCode::EmbGenerationFailed => "EMB_001",
            ErrorCode::NetConnectionFailed => "NET_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl KubeMindError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create an error for an embedding whose length does not match the collection.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::Validation {
            message: format!(
                "embedding has {} dimensions, collection expects {}",
                actual, expected
            ),
            code: ErrorCode::ValDimensionMismatch,
            suggestion: Some(
                "Set embedding_dims to the dimension produced by the embedding model".to_string(),
            ),
        }
    }

    /// Create a not found error.
    pub fn not_found(record_id: impl Into<String>) -> Self {
        let id = record_id.into();
        Self::NotFound {
            message: format!("Record with id '{}' not found", id),
            code: ErrorCode::RecNotFound,
            record_id: Some(id),
        }
    }

    /// Create a dedup store error.
    pub fn dedup_store(message: impl Into<String>) -> Self {
        Self::DedupStore {
            message: message.into(),
            code: ErrorCode::DdpOperationFailed,
            source: None,
        }
    }

    /// Create a vector store error.
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
            code: ErrorCode::VecOperationFailed,
            source: None,
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            code: ErrorCode::EmbGenerationFailed,
            source: None,
        }
    }

    /// Create an API (network) error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled(operation.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::DedupStore { code, .. } => *code,
            Self::VectorStore { code, .. } => *code,
            Self::Embedding { code, .. } => *code,
            Self::Network { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether this error comes from an unreachable or failing external store.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::DedupStore { .. }
                | Self::VectorStore { .. }
                | Self::Embedding { .. }
                | Self::Network { .. }
        )
    }

    /// Whether this error reports a shutdown in progress rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("Please check the record ID and ensure it exists"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::DedupStore { .. } => Some("Please check your Redis connection settings"),
            Self::VectorStore { .. } => Some("Please check your vector store connection settings"),
            Self::Embedding { .. } => Some("Please check your embedding provider configuration"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = KubeMindError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = KubeMindError::dimension_mismatch(768, 3);
        assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
        assert!(err.to_string().contains("768"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_transient_family() {
        assert!(KubeMindError::dedup_store("down").is_transient());
        assert!(KubeMindError::vector_store("down").is_transient());
        assert!(KubeMindError::embedding("down").is_transient());
        assert!(KubeMindError::api("down").is_transient());
        assert!(!KubeMindError::Configuration("bad".into()).is_transient());
    }

    #[test]
    fn test_cancellation_is_not_transient() {
        let err = KubeMindError::cancelled("buffer write");
        assert!(err.is_cancellation());
        assert!(!err.is_transient());
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::DdpOperationFailed.as_str(), "DDP_002");
        assert_eq!(ErrorCode::RecNotFound.as_str(), "REC_001");
        assert_eq!(ErrorCode::ValEmptyLog.as_str(), "VAL_002");
        assert_eq!(KubeMindError::embedding("x").code().as_str(), "EMB_001");
        assert_eq!(KubeMindError::api("x").code().as_str(), "NET_001");
    }
}
