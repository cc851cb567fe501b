//! Admin API auth and rate-limiting: every non-public endpoint requires
//! a bearer token mapped to a role, and a per-client sliding-window
//! limiter applies across the whole router.
//!
//! Generalized from the reference implementation's inferred binary
//! read-only/mutating `is_read_only_method` check into a three-role
//! (viewer/operator/admin) table; token comparison stays constant-time
//! inside `ApiKeyStorePort::validate`, so this layer never touches the
//! raw token beyond extracting it from the header.

use crate::dto::ErrorResponse;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dnshield_domain::Role;
use std::net::SocketAddr;
use tracing::warn;

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

async fn require_role(required: Role, state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(token) = extract_bearer(headers) else {
        return Err((StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("missing bearer token"))).into_response());
    };
    let Some(record) = state.api_keys.validate(token) else {
        return Err((StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("invalid or revoked API key"))).into_response());
    };
    if !record.role.satisfies(required) {
        warn!(role = ?record.role, required = ?required, "API key lacks required role");
        return Err((StatusCode::FORBIDDEN, Json(ErrorResponse::new("insufficient role"))).into_response());
    }
    Ok(())
}

macro_rules! role_middleware {
    ($name:ident, $role:expr) => {
        pub async fn $name(State(state): State<AppState>, headers: HeaderMap, request: Request<Body>, next: Next) -> Response {
            match require_role($role, &state, &headers).await {
                Ok(()) => next.run(request).await,
                Err(response) => response,
            }
        }
    };
}

role_middleware!(require_view, Role::Viewer);
role_middleware!(require_operator, Role::Operator);
role_middleware!(require_admin, Role::Admin);

/// Sliding-window limiter reused from the DNS-query path for the admin
/// surface. `ConnectInfo` is only populated when the server is bound with
/// `into_make_service_with_connect_info`; its absence (e.g. under test)
/// is treated as unthrottled rather than a hard failure.
pub async fn rate_limit(State(state): State<AppState>, connect_info: Option<ConnectInfo<SocketAddr>>, request: Request<Body>, next: Next) -> Response {
    if let Some(ConnectInfo(addr)) = connect_info {
        if !state.rate_limiter.check(addr.ip()) {
            return (StatusCode::TOO_MANY_REQUESTS, Json(ErrorResponse::new("rate limit exceeded"))).into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_strips_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc123"));
    }

    #[test]
    fn test_extract_bearer_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
