use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub score: i64,
}

/// Usernames are identities as given; there is no password. The score
/// record is created on first login.
async fn login(
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let score = app_state.games().login(&body.username).await?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: format!("Welcome, {}", body.username),
        score,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)));
}
