use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    version: &'static str,
    uptime: String,
    timestamp: String,
    start_at: String,
    rate_limit_store: &'static str,
    csrf_protection: &'static str,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let rate_limit_store = match state.rate_limiter.store() {
        Some(store) => match store.ping().await {
            Ok(()) => "OK",
            Err(e) => {
                tracing::warn!("Rate limit store health check failed: {}", e);
                "Unavailable"
            }
        },
        None => "Not configured",
    };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        rate_limit_store,
        csrf_protection: if state.csrf.is_some() { "enabled" } else { "disabled" },
    })
}
