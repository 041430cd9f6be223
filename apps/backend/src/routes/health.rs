use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::warn;

use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    store: &'static str,
    store_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    observers: usize,
}

/// Always 200 so a load balancer can tell "process up" from "store down";
/// `status` is `degraded` when the store does not answer.
async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    let (status, store_status, store_error) = match app_state.store().ping().await {
        Ok(()) => ("ok", "ok", None),
        Err(err) => {
            warn!(error = %err, "health check: store ping failed");
            ("degraded", "error", Some(err.to_string()))
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status,
        app_version: env!("CARGO_PKG_VERSION"),
        store: app_state.store().backend_name(),
        store_status,
        store_error,
        observers: app_state.broker().registry().connection_count(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
