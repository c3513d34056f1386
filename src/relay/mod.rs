//! Relay request handler.
//!
//! The [`track_handler`] function serves `GET /{tracking_number}`: it
//! resolves the caller address, applies the fixed-window rate limit,
//! delegates to the direct-mode tracking client holding the server-side
//! API key, and reflects the client's effective status and JSON body to
//! the requester. The API key never appears in any response, and
//! internal errors are mapped to a best-effort JSON body without stack
//! detail.

pub mod rate_limit;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::relay::rate_limit::RATE_LIMIT_MESSAGE;
use crate::server::AppState;

pub async fn track_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(tracking_number): Path<String>,
    req_headers: HeaderMap,
) -> Response {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    let caller = client_key(&req_headers, addr);

    if !state.limiter.check(&caller) {
        state.stats.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            correlation_id = %correlation_id,
            caller = %caller,
            "rate limit reached"
        );
        return json_error(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE);
    }

    if tracking_number.trim().is_empty() {
        return missing_number_response();
    }

    tracing::info!(
        correlation_id = %correlation_id,
        id = %tracking_number,
        "tracking request"
    );

    match state.client.fetch(std::slice::from_ref(&tracking_number)).await {
        Ok(batch) => {
            state.stats.served.fetch_add(1, Ordering::Relaxed);
            let status =
                StatusCode::from_u16(batch.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            tracing::debug!(
                correlation_id = %correlation_id,
                status = %status,
                "upstream reflected"
            );
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                batch.body,
            )
                .into_response()
        }
        Err(e) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                correlation_id = %correlation_id,
                error = %e,
                "tracking lookup failed"
            );
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// `GET /` — no tracking number in the path.
pub async fn missing_number_handler() -> Response {
    missing_number_response()
}

fn missing_number_response() -> Response {
    (
        StatusCode::CONFLICT,
        axum::Json(serde_json::json!({ "returnMessage": "Missing tracking number" })),
    )
        .into_response()
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

/// The caller identity for rate limiting: first `X-Forwarded-For` entry
/// when deployed behind a reverse proxy, else the socket address.
fn client_key(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| addr.ip().to_string(), ToString::to_string)
}
