/// PostgreSQL-backed stores
///
/// Thin adapters from the storage traits to the model queries. Unique
/// violations become [`StoreError::Conflict`]; everything else stays a
/// database error.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ContactStore, StoreError, StoreResult, UserStore};
use crate::models::{
    contact::{Contact, ContactData, ContactFilter, MonthDay},
    user::{CreateUser, User},
};

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            return StoreError::Conflict(constraint);
        }
    }
    StoreError::Database(err)
}

/// User store on a PostgreSQL pool
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(map_unique_violation)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn mark_verified(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::mark_verified(&self.pool, id).await?)
    }

    async fn update_avatar(&self, id: i64, avatar_url: &str) -> StoreResult<Option<User>> {
        Ok(User::update_avatar(&self.pool, id, avatar_url).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

/// Contact store on a PostgreSQL pool
#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn create(&self, user_id: i64, data: ContactData) -> StoreResult<Contact> {
        Ok(Contact::create(&self.pool, user_id, data).await?)
    }

    async fn find(&self, id: i64, user_id: i64) -> StoreResult<Option<Contact>> {
        Ok(Contact::find_for_user(&self.pool, id, user_id).await?)
    }

    async fn list(&self, user_id: i64, filter: &ContactFilter) -> StoreResult<Vec<Contact>> {
        Ok(Contact::list_for_user(&self.pool, user_id, filter).await?)
    }

    async fn update(&self, id: i64, user_id: i64, data: ContactData) -> StoreResult<Option<Contact>> {
        Ok(Contact::update_for_user(&self.pool, id, user_id, data).await?)
    }

    async fn delete(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(Contact::delete_for_user(&self.pool, id, user_id).await?)
    }

    async fn birthdays_between(
        &self,
        user_id: i64,
        from: MonthDay,
        to: MonthDay,
    ) -> StoreResult<Vec<Contact>> {
        Ok(Contact::birthdays_between(&self.pool, user_id, from, to).await?)
    }
}
