/// Middleware for the API server
///
/// - `auth`: Bearer-token guard for protected routes
/// - `throttle`: Attempt limiting for register/login

pub mod auth;
pub mod throttle;
