use actix_web::web;

use crate::handlers::{contact::handle_contact_request, system::health_check};

/// `/health` is the only fixed route; every other path and method lands on the
/// contact endpoint.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
    cfg.default_service(web::to(handle_contact_request));
}
