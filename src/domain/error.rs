//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::Role;

/// Domain errors represent business rule violations.
/// A failed operation never leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("workshop already rated by this student")]
    AlreadyRated,

    #[error("student already registered for this workshop")]
    AlreadyRegistered,

    #[error("student already applied to this internship")]
    AlreadyApplied,

    #[error("not eligible: {reason}")]
    NotEligible { reason: String },

    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("{role} is not allowed to {action}")]
    Forbidden { action: &'static str, role: Role },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{entity} {id} is still in use: {reason}")]
    InUse {
        entity: &'static str,
        id: u64,
        reason: String,
    },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_eligible(reason: impl Into<String>) -> Self {
        Self::NotEligible {
            reason: reason.into(),
        }
    }

    pub fn transition(
        entity: &'static str,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
