//! # Contacts Shared Library
//!
//! Domain types, persistence, caching and business logic used by the
//! Contacts API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens and identity resolution helpers
//! - `cache`: Identity cache (Redis and in-memory)
//! - `db`: Connection pool and migrations
//! - `models`: Database models and data structures
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `services`: Auth and contacts gateways, mailer, media uploads
//! - `error`: Service-level error taxonomy

pub mod auth;
pub mod cache;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the contacts shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
