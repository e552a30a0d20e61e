//! # Taskwell Shared Library
//!
//! Storage, validation and authentication building blocks used by the
//! Taskwell API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models and owner-scoped repository operations
//! - `validation`: Pure input validation for tasks and accounts
//! - `auth`: Password hashing, JWT tokens, session lookup and the authorization gate

pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the Taskwell shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
