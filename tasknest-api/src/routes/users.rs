/// Current-user endpoint
///
/// `GET /api/v1/user` returns the public view of the account the bearer
/// token was issued to.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use tasknest_shared::{auth::middleware::AuthContext, models::user::PublicUser};

/// Returns the authenticated user
///
/// # Errors
///
/// - `401 Unauthorized`: Token invalid, or its user no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(user.to_public()))
}
