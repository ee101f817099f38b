//! Error types for the workspace sync system.
//!
//! This module provides the error hierarchy for every stage of a sync:
//! configuration loading, Terraform Cloud API calls and reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the workspace sync system.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terraform Cloud API errors.
    #[error("Terraform Cloud API error: {0}")]
    Tfc(#[from] TfcError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The workspace file was not found.
    #[error("Workspace file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The workspace file could not be parsed.
    #[error("Failed to parse workspace file: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Workspace validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// No API token could be found.
    #[error("No API token found for {hostname} (set TFE_TOKEN or run `terraform login`)")]
    MissingToken {
        /// Hostname the token was looked up for.
        hostname: String,
    },

    /// The Terraform CLI credentials file is unreadable.
    #[error("Invalid credentials file {path}: {message}")]
    InvalidCredentials {
        /// Path to the credentials file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },
}

/// Terraform Cloud API errors.
#[derive(Debug, Error)]
pub enum TfcError {
    /// The requested resource does not exist.
    #[error("{resource} not found: {name}")]
    NotFound {
        /// Kind of resource (workspace, variable, organization).
        resource: String,
        /// Name or id that was looked up.
        name: String,
    },

    /// Authentication or authorization failed.
    #[error("Terraform Cloud authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Terraform Cloud API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limited.
    #[error("Terraform Cloud API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("Network error communicating with Terraform Cloud: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from API.
    #[error("Invalid response from Terraform Cloud API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The desired variable set declares the same key twice.
    #[error("Duplicate variable key '{key}' in desired set for workspace {workspace}")]
    DuplicateKey {
        /// The duplicated key.
        key: String,
        /// Workspace name.
        workspace: String,
    },

    /// Reconciliation was aborted before any change was made.
    #[error("Reconciliation aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Returns true if this error reports a missing remote resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Tfc(TfcError::NotFound { .. }))
    }

    /// Returns true if retrying the same call later may succeed.
    ///
    /// Nothing in this crate retries; the classification is for callers
    /// that re-trigger reconciliation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Tfc(TfcError::RateLimited { .. } | TfcError::NetworkError { .. })
        )
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::Tfc(TfcError::RateLimited { retry_after_secs }) => Some(*retry_after_secs),
            Self::Tfc(TfcError::NetworkError { .. }) => Some(5),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl TfcError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }
}
