//! Error types for the work item core
//!
//! Provides error handling for:
//! - Precondition failures of manager operations
//! - Descriptor loading
//! - Collaborator (provider) failures
//! - Configuration
//!
//! Validation failures are not errors: they travel as
//! [`ErrorMessage`](workitems_model::ErrorMessage) lists inside results.

use std::path::PathBuf;

/// Main error type of manager operations
#[derive(Debug, thiserror::Error)]
pub enum WorkItemError {
    /// Required argument is blank
    #[error("invalid argument: '{name}' must not be blank")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
    },

    /// Data provider does not allow the operation
    #[error("operation not permitted: data provider does not allow {operation} operations")]
    NotPermitted {
        /// `read` or `write`
        operation: &'static str,
    },

    /// Descriptors could not be loaded
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Collaborator call failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Collaborator call did not finish in time
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Collaborator call that elapsed
        operation: &'static str,
        /// Configured limit
        timeout_ms: u64,
    },
}

impl WorkItemError {
    /// Create invalid argument error
    #[inline]
    #[must_use]
    pub fn invalid_argument(name: &'static str) -> Self {
        Self::InvalidArgument { name }
    }

    /// Check if the request itself was malformed or disallowed
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::NotPermitted { .. })
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Provider(ProviderError::Unavailable(_))
        )
    }
}

/// Errors while loading descriptors
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Two descriptors share a type name
    #[error("duplicate work item type: '{0}'")]
    DuplicateType(String),

    /// A type declares a property name twice
    #[error("duplicate property '{property}' in work item type '{work_item_type}'")]
    DuplicateProperty {
        /// Offending type
        work_item_type: String,
        /// Offending property
        property: String,
    },

    /// Descriptor file could not be parsed
    #[error("malformed descriptor file {path}: {message}")]
    Malformed {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// No parser for the file extension
    #[error("unsupported descriptor format: {0}")]
    UnsupportedFormat(PathBuf),

    /// IO error while reading descriptors
    #[error("io error reading {path}: {source}")]
    Io {
        /// File or directory path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Descriptor provider failed
    #[error("descriptor provider failed: {0}")]
    Provider(#[from] ProviderError),
}

impl DescriptorError {
    /// Create malformed file error
    pub fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Collaborator failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Backend unreachable or overloaded
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Requested entity or collection does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Write conflicts with stored state
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resolution not supported by this provider
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Any other provider failure
    #[error("internal provider error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for manager operations
pub type WorkItemResult<T> = Result<T, WorkItemError>;
