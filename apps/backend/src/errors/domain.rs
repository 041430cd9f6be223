//! Domain-level error type used across the engine, store and services.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Validation failures, rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidUsername,
    UsernameMismatch,
    InvalidDeck,
    InconsistentSession,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    User,
    Session,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// A save referred to a game that is no longer the stored one.
    StaleSession,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    StoreUnavailable,
    Timeout,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed input
    Validation(ValidationKind, String),
    /// Operation not permitted in the session's current state
    InvalidTransition(String),
    /// Semantic conflict with stored state
    Conflict(ConflictKind, String),
    /// Missing record
    NotFound(NotFoundKind, String),
    /// Backing store failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::InvalidTransition(d) => write!(f, "invalid transition: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn invalid_transition(detail: impl Into<String>) -> Self {
        Self::InvalidTransition(detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }
    pub fn store_unavailable(detail: impl Into<String>) -> Self {
        Self::Infra(InfraErrorKind::StoreUnavailable, detail.into())
    }

    /// True when the backing store could not be reached in time. Callers may
    /// retry these; they must never be read as "no data".
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            DomainError::Infra(InfraErrorKind::StoreUnavailable | InfraErrorKind::Timeout, _)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(..))
    }
}
