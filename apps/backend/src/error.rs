use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// RFC 7807 body returned for every failed request.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Store unavailable: {detail}")]
    Unavailable { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Unavailable { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Unavailable { detail, .. }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid(code: ErrorCode, detail: String) -> Self {
        Self::Validation { code, detail }
    }

    pub fn bad_request(code: ErrorCode, detail: String) -> Self {
        Self::BadRequest { code, detail }
    }

    pub fn not_found(code: ErrorCode, detail: String) -> Self {
        Self::NotFound { code, detail }
    }

    pub fn internal(code: ErrorCode, detail: String) -> Self {
        Self::Internal { code, detail }
    }

    pub fn config(detail: String) -> Self {
        Self::Config { detail }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidUsername => ErrorCode::InvalidUsername,
                    ValidationKind::UsernameMismatch => ErrorCode::UsernameMismatch,
                    ValidationKind::InvalidDeck => ErrorCode::InvalidDeck,
                    ValidationKind::InconsistentSession => ErrorCode::InconsistentSession,
                    _ => ErrorCode::ValidationError,
                };
                AppError::Validation { code, detail }
            }
            DomainError::InvalidTransition(detail) => AppError::Conflict {
                code: ErrorCode::InvalidTransition,
                detail,
            },
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::StaleSession => ErrorCode::StaleSession,
                    _ => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::User => ErrorCode::UserNotFound,
                    NotFoundKind::Session => ErrorCode::SessionNotFound,
                    _ => ErrorCode::NotFound,
                };
                AppError::NotFound { code, detail }
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::StoreUnavailable => AppError::Unavailable {
                    code: ErrorCode::StoreUnavailable,
                    detail,
                },
                InfraErrorKind::Timeout => AppError::Unavailable {
                    code: ErrorCode::StoreTimeout,
                    detail,
                },
                InfraErrorKind::DataCorruption => AppError::Internal {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
                _ => AppError::Internal {
                    code: ErrorCode::InternalError,
                    detail,
                },
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://catcard.app/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id));
        if status == StatusCode::SERVICE_UNAVAILABLE {
            builder.insert_header(("retry-after", "1"));
        }
        builder.json(problem_details)
    }
}
