/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing with configurable cost
/// - [`jwt`]: Session token issuance and validation (HS256)
/// - [`throttle`]: Fixed-window login attempt limiter
/// - [`middleware`]: Bearer header parsing and the per-request `AuthContext`
/// - [`authorization`]: Task ownership checks and update sanitizing
///
/// # Request flow
///
/// ```text
/// register/login ──> throttle ──> handler ──> password ──> jwt::issue
/// protected      ──> middleware::authorize ──> handler
/// task by id     ──> ... ──> authorization::require_owned_task ──> store
/// ```
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use tasknest_shared::auth::password::{hash_password, verify_password, HashCost};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", &HashCost::minimal())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let codec = TokenCodec::new("a-very-long-secret-key-of-at-least-32-bytes");
/// let token = codec.issue(Uuid::new_v4(), "alice")?;
/// assert_eq!(codec.validate(&token)?.username, "alice");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod throttle;
