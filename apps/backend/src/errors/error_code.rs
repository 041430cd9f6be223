//! Error codes for the catcard backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Username empty, too long or containing control characters
    InvalidUsername,
    /// Saved session belongs to a different user than the request
    UsernameMismatch,
    /// Deck is not drawn from the fixed card set
    InvalidDeck,
    /// Session flags contradict each other or the deck
    InconsistentSession,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// User has never logged in
    UserNotFound,
    /// No saved session for the user
    SessionNotFound,
    /// General not found error
    NotFound,

    // Game state
    /// Draw on a finished game
    InvalidTransition,
    /// Save refers to a game that is no longer current
    StaleSession,
    /// Generic conflict
    Conflict,

    // System Errors
    /// Backing store unreachable
    StoreUnavailable,
    /// Backing store did not answer within the configured timeout
    StoreTimeout,
    /// Stored record could not be decoded
    DataCorruption,
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::UsernameMismatch => "USERNAME_MISMATCH",
            Self::InvalidDeck => "INVALID_DECK",
            Self::InconsistentSession => "INCONSISTENT_SESSION",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::UserNotFound => "USER_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::StaleSession => "STALE_SESSION",
            Self::Conflict => "CONFLICT",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
