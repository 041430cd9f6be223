use actix_web::web;

use crate::ws::session::upgrade;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws/leaderboard", web::get().to(upgrade));
}
