/// Bearer-token authorization guard
///
/// Protected routes run [`authorize`] before the handler. It reads
/// `Authorization: Bearer <token>`, validates the token with the shared
/// [`TokenCodec`], and yields an [`AuthContext`] that the API layer stores in
/// the request extensions. The context lives and dies with that one request.
///
/// The header must be exactly two space-separated parts, the first being the
/// literal `Bearer`. Anything else (a missing header, `bearer x`,
/// `Bearer a b`, `Bearer` alone) is a malformed header, not a bad token.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use tasknest_shared::auth::middleware::authorize;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("a-very-long-secret-key-of-at-least-32-bytes");
/// let user_id = Uuid::new_v4();
/// let token = codec.issue(user_id, "alice")?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
///
/// let auth = authorize(&headers, &codec)?;
/// assert_eq!(auth.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{JwtError, TokenCodec};

/// Authenticated identity for the current request
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Token subject
    pub user_id: Uuid,

    /// Username carried in the token
    pub username: String,
}

/// Error type for the authorization guard
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Header absent, not UTF-8, or not `Bearer <token>`
    #[error("Missing or malformed authorization header")]
    MissingOrMalformedHeader,

    /// Token present but failed validation
    #[error("Invalid or expired token")]
    Unauthenticated(#[source] JwtError),
}

/// Pulls the token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingOrMalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MissingOrMalformedHeader),
    }
}

/// Validates the request's bearer token and returns who it belongs to
///
/// # Errors
///
/// - `MissingOrMalformedHeader` if the header is absent or malformed
/// - `Unauthenticated` for any token validation failure (bad signature,
///   wrong algorithm, expired, malformed)
pub fn authorize(headers: &HeaderMap, codec: &TokenCodec) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = codec.validate(token).map_err(AuthError::Unauthenticated)?;

    Ok(AuthContext {
        user_id: claims.sub,
        username: claims.username,
    })
}
