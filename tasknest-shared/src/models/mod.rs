/// Database models for TaskNest
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `task`: Per-user tasks with soft deletion
///
/// Handlers do not call these directly; they go through
/// [`crate::store::CredentialStore`], whose Postgres implementation wraps
/// the functions here.

pub mod task;
pub mod user;
