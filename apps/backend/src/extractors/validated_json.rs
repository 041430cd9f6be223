use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use bytes::BytesMut;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Saved games are a handful of cards; anything larger is not ours.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON body extractor whose failures come back as problem+json with
/// `BAD_REQUEST`, instead of actix's plain-text `JsonPayloadError`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        Box::pin(async move {
            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    warn!(error = %e, "Failed to read request body chunk");
                    AppError::bad_request(
                        ErrorCode::BadRequest,
                        "Failed to read request body".to_string(),
                    )
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            let parsed = serde_json::from_slice::<T>(&body).map_err(|e| {
                debug!(
                    error = %e,
                    content_type = %content_type,
                    body_size = body.len(),
                    "JSON parsing failed"
                );
                AppError::bad_request(ErrorCode::BadRequest, classify_json_error(&e))
            })?;

            Ok(ValidatedJson(parsed))
        })
    }
}

/// Short, client-safe description of a serde_json failure.
fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            format!("Invalid JSON at line {}", error.line())
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            // Data errors name the offending field or value, which is safe to echo.
            format!("Invalid request body: {error}")
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}
