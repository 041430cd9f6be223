use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::state::app_state::AppState;

async fn get_leaderboard(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let entries = app_state.games().leaderboard().await?;
    Ok(HttpResponse::Ok().json(entries))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/leaderboard", web::get().to(get_leaderboard));
}
