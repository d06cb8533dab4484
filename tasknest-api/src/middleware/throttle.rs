/// Login throttle layer for the auth routes
///
/// Each attempt is counted against (route, client IP, claimed username)
/// before the handler runs, so a throttled client is rejected without the
/// password ever being checked. The username is peeked from the JSON body,
/// which is then handed on to the handler unchanged; requests without one
/// are counted per IP.
///
/// # Response
///
/// ```text
/// HTTP/1.1 429 Too Many Requests
/// Retry-After: 300
///
/// { "error": "rate_limit_exceeded",
///   "message": "Too many login attempts. Please try again later.",
///   "retry_after": 300 }
/// ```

use crate::{app::AppState, error::ApiError};
use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use tasknest_shared::auth::throttle::{ThrottleDecision, ThrottleKey};

/// Largest auth request body the throttle will buffer
const MAX_AUTH_BODY_BYTES: usize = 64 * 1024;

pub const RATE_LIMIT_MESSAGE: &str = "Too many login attempts. Please try again later.";

#[derive(Debug, Default, Deserialize)]
struct ClaimedIdentity {
    #[serde(default)]
    username: Option<String>,
}

/// Throttle for `POST /auth/login`
pub async fn throttle_login(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    throttle("login", state, req, next).await
}

/// Throttle for `POST /auth/register`
pub async fn throttle_register(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    throttle("register", state, req, next).await
}

async fn throttle(
    scope: &'static str,
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_AUTH_BODY_BYTES)
        .await
        .map_err(|_| ApiError::BadRequest("Request body too large".to_string()))?;

    let claimed: ClaimedIdentity = serde_json::from_slice(&bytes).unwrap_or_default();
    let key = ThrottleKey::new(scope, client_ip, claimed.username.as_deref());

    if let ThrottleDecision::Limited { retry_after } = state.throttle.check(&key) {
        tracing::warn!(key = %key, "Auth attempt throttled");
        return Err(ApiError::RateLimitExceeded {
            retry_after: whole_seconds(retry_after),
            message: RATE_LIMIT_MESSAGE.to_string(),
        });
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Rounds up, never below one second
fn whole_seconds(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds() {
        assert_eq!(whole_seconds(Duration::from_secs(300)), 300);
        assert_eq!(whole_seconds(Duration::from_millis(299_001)), 300);
        assert_eq!(whole_seconds(Duration::ZERO), 1);
    }

    #[test]
    fn test_claimed_identity_parsing() {
        let parsed: ClaimedIdentity = serde_json::from_slice(br#"{"username":"alice","password":"x"}"#).unwrap();
        assert_eq!(parsed.username.as_deref(), Some("alice"));

        let missing: ClaimedIdentity = serde_json::from_slice(br#"{"password":"x"}"#).unwrap();
        assert!(missing.username.is_none());

        let garbage: ClaimedIdentity = serde_json::from_slice(b"not json").unwrap_or_default();
        assert!(garbage.username.is_none());
    }
}
