//! # TaskNest Shared Library
//!
//! Auth primitives, models and storage used by the TaskNest API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, login throttling, the
//!   bearer guard and task ownership enforcement
//! - `models`: Database models and queries
//! - `store`: The `CredentialStore` abstraction with Postgres and in-memory
//!   implementations
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TaskNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
