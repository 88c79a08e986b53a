//! Loopback-only origin policy and dashboard token checks.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use url::Url;

use crate::state::AppState;

/// CORS layer admitting only localhost origins.
///
/// Non-browser clients omit `Origin` entirely and are unaffected.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| {
            origin.to_str().is_ok_and(is_local_origin)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-ward-dashboard-token"),
        ])
}

/// Request guard: reject foreign browser origins, then enforce the
/// dashboard token when one is configured.
pub async fn guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(origin) = header_str(&request, header::ORIGIN) {
        if !origin.is_empty() && !is_local_origin(origin) {
            return reject(StatusCode::FORBIDDEN, "Origin not allowed");
        }
    }

    if let Some(expected) = state.token() {
        if presented_token(&request).as_deref() != Some(expected) {
            return reject(StatusCode::UNAUTHORIZED, "Missing or invalid dashboard token");
        }
    }

    next.run(request).await
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn header_str(request: &Request, name: header::HeaderName) -> Option<&str> {
    request
        .headers()
        .get(name)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .map(str::trim)
}

fn presented_token(request: &Request) -> Option<String> {
    if let Some(token) =
        header_str(request, header::HeaderName::from_static("x-ward-dashboard-token"))
            .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }
    let auth = header_str(request, header::AUTHORIZATION)?;
    let rest = auth
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .and_then(|_| auth.get(7..))?;
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn is_local_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin.trim()) else {
        return false;
    };
    matches!(
        url.host_str().map(str::to_ascii_lowercase).as_deref(),
        Some("localhost" | "127.0.0.1" | "[::1]" | "::1")
    )
}
