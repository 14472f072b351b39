// Route exports
pub mod export;
pub mod questions;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(questions::configure)
        .configure(export::configure);
}
