//! Error types for the Admiral system.

use std::collections::BTreeMap;

use thiserror::Error;

/// Per-field validation messages, keyed by field name.
///
/// A `BTreeMap` keeps field ordering stable so repeated submissions
/// render errors in the same order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller input failed schema validation. Reported per-field,
    /// never logged.
    #[error("Please review the form.")]
    Validation { field_errors: FieldErrors },

    /// No authenticated principal.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but lacking the required role.
    #[error("Admins only")]
    Forbidden,

    /// A unique constraint was violated at the store (e.g. duplicate
    /// email). Mapped to a fixed domain message by the caller.
    #[error("Unique constraint violation on {field}")]
    UniqueViolation { field: String },

    /// An intentionally user-facing condition: its message is safe to
    /// surface verbatim.
    #[error("{message}")]
    Public { message: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Convenience constructor for [`AppError::Public`].
    pub fn public(message: impl Into<String>) -> Self {
        AppError::Public {
            message: message.into(),
        }
    }

    /// Whether the error's own message may be shown to the caller
    /// instead of the generic fallback.
    pub fn is_public(&self) -> bool {
        matches!(self, AppError::Public { .. })
    }
}

pub type AppResult<T> = Result<T, AppError>;
