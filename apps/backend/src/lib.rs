#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod trace_ctx;
pub mod ws;

pub use config::AppConfig;
pub use error::AppError;
pub use errors::ErrorCode;
pub use infra::state::{build_state, StateBuilder};
pub use middleware::cors::cors_middleware;
pub use middleware::request_trace::RequestTrace;
pub use middleware::structured_logger::StructuredLogger;
pub use middleware::trace_span::TraceSpan;
pub use services::GameService;
pub use state::app_state::AppState;
pub use store::{InMemoryStore, RedisStore, SessionStore};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    catcard_test_support::logging::init();
}
