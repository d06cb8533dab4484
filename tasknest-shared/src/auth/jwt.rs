/// Session token issuance and validation
///
/// A session token is a self-contained HS256 JWT carrying the user id, the
/// username it was issued for, and an expiry. Nothing about issued tokens is
/// stored server-side: a token is valid until it expires and there is no
/// revocation.
///
/// The signing secret is loaded once at startup and handed to a
/// [`TokenCodec`], which is then shared read-only through application state.
///
/// # Security
///
/// - **Algorithm**: HS256 only. Tokens whose header names any other
///   algorithm are rejected, even if their signature would verify.
/// - **Expiration**: Configurable, default 24 hours
/// - **Issuer**: Always "tasknest", checked on validation
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("a-very-long-secret-key-of-at-least-32-bytes");
/// let user_id = Uuid::new_v4();
///
/// let token = codec.issue(user_id, "alice")?;
/// let claims = codec.validate(&token)?;
///
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim written into and required on every token
pub const ISSUER: &str = "tasknest";

/// Default session lifetime
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signed with an algorithm other than HS256
    #[error("Token algorithm is not accepted")]
    WrongAlgorithm,

    /// Signature did not verify against the configured secret
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Structurally malformed, undecodable, or has the wrong issuer
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims
///
/// - `sub`: user id
/// - `username`: display handle at issue time
/// - `iss`: always [`ISSUER`]
/// - `iat` / `exp`: Unix timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `expires_in` from now
    ///
    /// A negative duration yields an already-expired token, which is how the
    /// expiry path is exercised in tests.
    pub fn new(user_id: Uuid, username: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and validates session tokens with one process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec with the default 24 hour lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Creates a codec with a custom token lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime applied by [`TokenCodec::issue`]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` / `username` expiring after the configured ttl
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, JwtError> {
        self.encode(&Claims::new(user_id, username, self.ttl))
    }

    /// Signs arbitrary claims with this codec's secret
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and returns its claims
    ///
    /// Verifies:
    /// - header algorithm is HS256
    /// - signature matches the configured secret
    /// - issuer is "tasknest"
    /// - token has not expired
    ///
    /// # Errors
    ///
    /// `Expired`, `WrongAlgorithm`, `InvalidSignature` or `Invalid`
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidAlgorithm => JwtError::WrongAlgorithm,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::Invalid(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}
