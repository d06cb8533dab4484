/// API route handlers
///
/// - `health`: Liveness and store connectivity
/// - `auth`: Register and login
/// - `users`: The authenticated user's profile
/// - `tasks`: Owner-scoped task CRUD

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
