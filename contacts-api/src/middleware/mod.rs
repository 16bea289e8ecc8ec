/// Middleware modules for the API server
///
/// - `auth`: bearer token identity resolution
/// - `security`: security response headers

pub mod auth;
pub mod security;
