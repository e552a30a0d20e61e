/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh and session
/// - `users`: Profile updates for the signed-in user
/// - `tasks`: Task CRUD, listing and statistics

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
