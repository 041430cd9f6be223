use actix_web::{web, App, HttpServer};
use backend::config::AppConfig;
use backend::infra::state::build_state;
use backend::middleware::cors::cors_middleware;
use backend::middleware::request_trace::RequestTrace;
use backend::middleware::structured_logger::StructuredLogger;
use backend::middleware::trace_span::TraceSpan;
use backend::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let host = config.host.clone();
    let port = config.port;
    let origins = config.cors_allowed_origins.clone();

    let app_state = match build_state().with_config(config).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };
    info!(
        host = %host,
        port,
        store = app_state.store().backend_name(),
        "starting catcard backend"
    );

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
