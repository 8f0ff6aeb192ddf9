//! Application-wide error types.
//!
//! Every variant carries the stable numeric code reported to API callers
//! alongside a human-readable message. Messages never contain database
//! detail; that goes to the log.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// HTTP method not supported by the route.
    #[error("{message}")]
    MethodNotAllowed {
        /// Numeric API code.
        code: u32,
        /// Human-readable message.
        message: String,
    },

    /// Malformed or semantically invalid request.
    #[error("{message}")]
    Validation {
        /// Numeric API code.
        code: u32,
        /// Human-readable message.
        message: String,
    },

    /// Resource not found.
    #[error("{message}")]
    NotFound {
        /// Numeric API code.
        code: u32,
        /// Human-readable message.
        message: String,
    },

    /// Business rule violation.
    #[error("{message}")]
    BusinessRule {
        /// Numeric API code.
        code: u32,
        /// Human-readable message.
        message: String,
    },

    /// Conflict (duplicate entry or exhausted concurrency retries).
    #[error("{message}")]
    Conflict {
        /// Numeric API code.
        code: u32,
        /// Human-readable message.
        message: String,
    },

    /// Database error.
    #[error("{message}")]
    Database {
        /// Numeric API code.
        code: u32,
        /// Human-readable message.
        message: String,
    },
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed { .. } => 405,
            Self::Validation { .. } | Self::BusinessRule { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Database { .. } => 500,
        }
    }

    /// Returns the string error kind for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::BusinessRule { .. } => "BUSINESS_RULE_VIOLATION",
            Self::Conflict { .. } => "CONFLICT",
            Self::Database { .. } => "DATABASE_ERROR",
        }
    }

    /// Returns the numeric code reported in the response envelope.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::MethodNotAllowed { code, .. }
            | Self::Validation { code, .. }
            | Self::NotFound { code, .. }
            | Self::BusinessRule { code, .. }
            | Self::Conflict { code, .. }
            | Self::Database { code, .. } => *code,
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::MethodNotAllowed { message, .. }
            | Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::BusinessRule { message, .. }
            | Self::Conflict { message, .. }
            | Self::Database { message, .. } => message,
        }
    }
}
