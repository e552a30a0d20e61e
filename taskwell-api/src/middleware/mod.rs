/// Middleware modules for the API server
///
/// - `error_details`: Exposes internal error details outside production

pub mod error_details;
