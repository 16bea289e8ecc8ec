/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: embedded schema migrations
///
/// Queries live on the models in [`crate::models`].

pub mod migrations;
pub mod pool;
