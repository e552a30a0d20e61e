//! # Taskwell API Server Library
//!
//! This library provides the HTTP layer of Taskwell: a per-user task
//! manager backed by PostgreSQL.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request body extraction
//! - `middleware`: Response post-processing
//! - `response`: Success envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
