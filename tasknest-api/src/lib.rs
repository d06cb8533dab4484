//! # TaskNest API Server Library
//!
//! HTTP surface of TaskNest: registration, login, and owner-scoped task
//! CRUD behind bearer tokens.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Bearer guard and login throttle layers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
