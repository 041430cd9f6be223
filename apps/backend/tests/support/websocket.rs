use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use backend::middleware::request_trace::RequestTrace;
use backend::middleware::structured_logger::StructuredLogger;
use backend::middleware::trace_span::TraceSpan;
use backend::routes;
use backend::state::app_state::AppState;
use backend::ws::hub::ObserverRegistry;

/// Real server on an ephemeral port so a tungstenite client can connect.
pub async fn start_test_server(
    state: AppState,
) -> Result<
    (
        actix_web::dev::ServerHandle,
        std::net::SocketAddr,
        tokio::task::JoinHandle<Result<(), std::io::Error>>,
    ),
    Box<dyn std::error::Error>,
> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let server_handle = server.handle();
    let join = tokio::spawn(server);

    Ok((server_handle, addr, join))
}

pub async fn wait_for_observers(
    registry: &ObserverRegistry,
    expected: usize,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = tokio::time::Instant::now();
    loop {
        if registry.connection_count() == expected {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!(
                "timeout waiting for {expected} observers (got {})",
                registry.connection_count()
            )
            .into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
