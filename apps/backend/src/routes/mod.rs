use actix_web::web;

pub mod auth;
pub mod games;
pub mod health;
pub mod leaderboard;
pub mod realtime;

/// Register every route. `main` and the test servers share this so both
/// expose the same paths; middleware is applied by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);

    cfg.service(
        web::scope("/api")
            .configure(auth::configure_routes)
            .configure(games::configure_routes)
            .configure(leaderboard::configure_routes),
    );

    cfg.configure(realtime::configure_routes);
}
