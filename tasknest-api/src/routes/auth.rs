/// Authentication endpoints
///
/// - `POST /api/v1/auth/register` - Create an account and receive a token
/// - `POST /api/v1/auth/login` - Exchange username/password for a token
///
/// Both routes sit behind the login throttle and respond with the same shape:
///
/// ```json
/// { "token": "eyJ...", "user": { "id": "uuid", "username": "alice" } }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::password::{self, HashCost, PasswordError},
    models::user::{CreateUser, PublicUser, User},
};
use validator::{Validate, ValidationError, ValidationErrors};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 4, max = 255, message = "Username must be between 4 and 255 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "check_password_length"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Session token (Bearer)
    pub token: String,

    pub user: PublicUser,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Missing username/password, or too short
/// - `409 Conflict`: Username already taken
/// - `429 Too Many Requests`: Throttled
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    req.validate().map_err(validation_error)?;

    let password_hash = hash_off_thread(req.password, state.hash_cost()).await?;

    let user = state
        .store
        .insert_user(CreateUser {
            username: req.username,
            password_hash,
        })
        .await
        .map_err(|e| {
            tracing::info!(error = %e, "Registration rejected");
            ApiError::from(e)
        })?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(issue_session(&state, &user)?)))
}

/// Log in with username and password
///
/// Unknown usernames and wrong passwords produce the same 401 body.
///
/// # Errors
///
/// - `400 Bad Request`: Missing username or password
/// - `401 Unauthorized`: Invalid credentials
/// - `429 Too Many Requests`: Throttled
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;
    req.validate().map_err(validation_error)?;

    let Some(user) = state.store.find_user_by_username(&req.username).await? else {
        // Spend the same hashing time as a real check before failing
        let _ = hash_off_thread(req.password, state.hash_cost()).await;
        tracing::warn!("Login failed: unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify_password(&req.password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Password task failed: {}", e)))??;

    if !verified {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_session(&state, &user)?))
}

fn issue_session(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    Ok(AuthResponse {
        token: state.tokens.issue(user.id, &user.username)?,
        user: user.to_public(),
    })
}

/// Argon2 is CPU-bound; keep it off the async workers
async fn hash_off_thread(plaintext: String, cost: HashCost) -> ApiResult<String> {
    let result: Result<String, PasswordError> =
        tokio::task::spawn_blocking(move || password::hash_password(&plaintext, &cost))
            .await
            .map_err(|e| ApiError::InternalError(format!("Password task failed: {}", e)))?;

    Ok(result?)
}

fn check_password_length(plaintext: &str) -> Result<(), ValidationError> {
    password::validate_password_length(plaintext).map_err(|message| {
        let mut error = ValidationError::new("length");
        error.message = Some(message.into());
        error
    })
}

fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                ValidationErrorDetail::new(
                    field.to_string(),
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                )
            })
        })
        .collect();

    // HashMap order is arbitrary; keep responses stable
    details.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::ValidationError(details)
}
