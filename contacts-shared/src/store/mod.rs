/// Storage traits for users and contacts
///
/// The gateways depend on these traits rather than on a concrete pool so the
/// backend is chosen once at startup:
///
/// - [`postgres`]: production backend on top of the model queries
/// - [`memory`]: in-process backend for tests and local experiments
///
/// Contact operations all take the owner's id; implementations must never
/// return or mutate a contact whose `user_id` differs.

use async_trait::async_trait;

use crate::models::{
    contact::{Contact, ContactData, ContactFilter, MonthDay},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryContactStore, MemoryUserStore};
pub use postgres::{PgContactStore, PgUserStore};

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated; carries the offending field or constraint
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts an unverified user; `Conflict` if the email exists
    async fn create(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Sets the verified flag; `None` if the user does not exist
    async fn mark_verified(&self, id: i64) -> StoreResult<Option<User>>;

    /// Replaces the avatar URL; `None` if the user does not exist
    async fn update_avatar(&self, id: i64, avatar_url: &str) -> StoreResult<Option<User>>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence for contacts, always scoped by owner
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create(&self, user_id: i64, data: ContactData) -> StoreResult<Contact>;

    async fn find(&self, id: i64, user_id: i64) -> StoreResult<Option<Contact>>;

    async fn list(&self, user_id: i64, filter: &ContactFilter) -> StoreResult<Vec<Contact>>;

    async fn update(&self, id: i64, user_id: i64, data: ContactData) -> StoreResult<Option<Contact>>;

    async fn delete(&self, id: i64, user_id: i64) -> StoreResult<bool>;

    /// Contacts with birthday month/day in `[from, to]`, ordered by month/day then id
    async fn birthdays_between(
        &self,
        user_id: i64,
        from: MonthDay,
        to: MonthDay,
    ) -> StoreResult<Vec<Contact>>;
}
