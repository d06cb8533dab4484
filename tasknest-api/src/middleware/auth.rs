/// Bearer-token guard layer
///
/// Runs [`authorize`] against the shared token codec and inserts the
/// resulting [`AuthContext`] into the request extensions. Handlers behind this
/// layer extract it with `Extension<AuthContext>`.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tasknest_shared::auth::middleware::{authorize, AuthContext};

/// JWT authentication middleware layer
///
/// # Errors
///
/// 401 Unauthorized if the header is missing or malformed, or the token is
/// invalid or expired.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context: AuthContext = authorize(req.headers(), &state.tokens).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), reason = %e, "Request not authorized");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
