/// Database models for the Contacts API
///
/// Each model carries its own PostgreSQL queries as associated functions.
/// The storage traits in [`crate::store`] wrap these for injection.
///
/// # Models
///
/// - `user`: User accounts, verification flag and avatar reference
/// - `contact`: Contacts owned by a single user
///
/// # Example
///
/// ```no_run
/// use contacts_shared::models::user::{User, CreateUser};
/// use contacts_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "testuser".to_string(),
///     email: "test@example.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod contact;
pub mod user;
