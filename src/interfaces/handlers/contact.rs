use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::StreamExt;

use crate::{
    constants::CSRF_HEADER,
    entities::{contact::ContactSubmission, csrf::CsrfTokenResponse},
    errors::AppError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

/// Single entry point for the contact endpoint, dispatched on the method:
///
/// - `OPTIONS` answers the CORS preflight
/// - `GET` issues a CSRF token
/// - `POST` runs the submission through rate limiting, CSRF, validation and delivery
///
/// Anything else is a 405. CORS headers are added by the middleware.
pub async fn handle_contact_request(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let method = req.method();

    if method == Method::OPTIONS {
        Ok(HttpResponse::Ok().finish())
    } else if method == Method::GET {
        issue_csrf_token(&state)
    } else if method == Method::POST {
        submit_contact_form(&req, payload, &state).await
    } else {
        Err(AppError::MethodNotAllowed)
    }
}

fn issue_csrf_token(state: &AppState) -> Result<HttpResponse, AppError> {
    let csrf = state.csrf.as_ref().ok_or_else(|| {
        tracing::warn!("CSRF token requested but no secret is configured");
        AppError::CsrfNotConfigured
    })?;

    Ok(HttpResponse::Ok().json(CsrfTokenResponse {
        csrf_token: csrf.issue(),
    }))
}

async fn submit_contact_form(
    req: &HttpRequest,
    payload: web::Payload,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    let client_ip = get_client_ip(req);

    let decision = state.rate_limiter.check(&client_ip).await;
    if !decision.allowed {
        tracing::warn!(%client_ip, reset_at = decision.reset_at, "Rate limit exceeded");
        return Err(AppError::rate_limited(&decision, Utc::now().timestamp_millis()));
    }

    if let Some(csrf) = &state.csrf {
        let token = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok());

        csrf.verify(token)
            .inspect_err(|e| tracing::warn!(%client_ip, "CSRF check failed: {}", e))?;
    }

    let body = read_body(payload, state.max_body_bytes).await?;

    // A body that does not parse is reported as a server-side failure, not a 400.
    let submission: ContactSubmission = serde_json::from_slice(&body)
        .inspect_err(|e| tracing::error!("Failed to parse contact submission: {}", e))?;

    let response = state.contact_handler.submit(submission).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Collects the request body, giving up as soon as it grows past `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, AppError> {
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            tracing::warn!(limit, "Contact submission body too large");
            return Err(AppError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
