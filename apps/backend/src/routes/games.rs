use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Card, Session};
use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameRequest {
    pub username: String,
    pub game_state: Session,
}

#[derive(Debug, Deserialize)]
pub struct EndGameRequest {
    pub username: String,
    #[serde(default)]
    pub won: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub success: bool,
    pub deck: Vec<Card>,
    pub score: i64,
    pub game_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    pub success: bool,
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct SaveGameResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EndGameResponse {
    pub success: bool,
    pub score: i64,
    pub won: bool,
}

async fn start_game(
    body: ValidatedJson<UsernameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let started = app_state.games().start_game(&body.username).await?;
    Ok(HttpResponse::Ok().json(StartGameResponse {
        success: true,
        deck: started.session.deck,
        score: started.score,
        game_id: started.session.game_id,
    }))
}

async fn draw(
    body: ValidatedJson<UsernameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.games().draw(&body.username).await?;
    Ok(HttpResponse::Ok().json(DrawResponse {
        success: true,
        session,
    }))
}

async fn save_game(
    body: ValidatedJson<SaveGameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let SaveGameRequest {
        username,
        game_state,
    } = body.into_inner();
    app_state.games().save_game(&username, game_state).await?;
    Ok(HttpResponse::Ok().json(SaveGameResponse {
        success: true,
        message: "Game saved",
    }))
}

async fn load_game(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.games().load_game(&path).await?;
    Ok(HttpResponse::Ok().json(session))
}

async fn end_game(
    body: ValidatedJson<EndGameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ended = app_state
        .games()
        .end_game(&body.username, body.won)
        .await?;
    Ok(HttpResponse::Ok().json(EndGameResponse {
        success: true,
        score: ended.score,
        won: ended.won,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/game")
            .route("/start", web::post().to(start_game))
            .route("/draw", web::post().to(draw))
            .route("/save", web::post().to(save_game))
            .route("/load/{username}", web::get().to(load_game))
            .route("/end", web::post().to(end_game)),
    );
}
