/// In-memory stores
///
/// Behave like the PostgreSQL stores (sequential ids, unique emails,
/// owner scoping, case-insensitive substring filters, id ordering) without a
/// database. Used by the API tests and handy for local experiments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{ContactStore, StoreError, StoreResult, UserStore};
use crate::models::{
    contact::{Contact, ContactData, ContactFilter, MonthDay},
    user::{CreateUser, User},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory user store
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn modify<F>(&self, id: i64, f: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut table = lock(&self.users);
        table.rows.get_mut(&id).map(|user| {
            f(user);
            user.clone()
        })
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut table = lock(&self.users);

        if table.rows.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let user = User {
            id: table.allocate_id(),
            username: data.username,
            email: data.email,
            hashed_password: data.hashed_password,
            is_verified: false,
            avatar_url: None,
            created_at: Utc::now(),
        };
        table.rows.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(lock(&self.users).rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(lock(&self.users)
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn mark_verified(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.modify(id, |user| user.is_verified = true))
    }

    async fn update_avatar(&self, id: i64, avatar_url: &str) -> StoreResult<Option<User>> {
        Ok(self.modify(id, |user| user.avatar_url = Some(avatar_url.to_string())))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// In-memory contact store
#[derive(Default)]
pub struct MemoryContactStore {
    contacts: Mutex<Table<Contact>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_filter(contact: &Contact, filter: &ContactFilter) -> bool {
    filter.text_filters().into_iter().all(|(column, value)| {
        let field = match column {
            "first_name" => &contact.first_name,
            "last_name" => &contact.last_name,
            _ => &contact.email,
        };
        contains_ignore_case(field, value)
    })
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn create(&self, user_id: i64, data: ContactData) -> StoreResult<Contact> {
        let mut table = lock(&self.contacts);

        let contact = Contact {
            id: table.allocate_id(),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            phone: data.phone,
            birthday: data.birthday,
            additional_data: data.additional_data,
            user_id,
        };
        table.rows.insert(contact.id, contact.clone());

        Ok(contact)
    }

    async fn find(&self, id: i64, user_id: i64) -> StoreResult<Option<Contact>> {
        Ok(lock(&self.contacts)
            .rows
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: i64, filter: &ContactFilter) -> StoreResult<Vec<Contact>> {
        let skip = usize::try_from(filter.skip).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);

        Ok(lock(&self.contacts)
            .rows
            .values()
            .filter(|c| c.user_id == user_id && matches_filter(c, filter))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, user_id: i64, data: ContactData) -> StoreResult<Option<Contact>> {
        let mut table = lock(&self.contacts);

        Ok(table
            .rows
            .get_mut(&id)
            .filter(|c| c.user_id == user_id)
            .map(|contact| {
                contact.first_name = data.first_name;
                contact.last_name = data.last_name;
                contact.email = data.email;
                contact.phone = data.phone;
                contact.birthday = data.birthday;
                contact.additional_data = data.additional_data;
                contact.clone()
            }))
    }

    async fn delete(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let mut table = lock(&self.contacts);

        let owned = table.rows.get(&id).is_some_and(|c| c.user_id == user_id);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }

    async fn birthdays_between(
        &self,
        user_id: i64,
        from: MonthDay,
        to: MonthDay,
    ) -> StoreResult<Vec<Contact>> {
        let mut matches: Vec<Contact> = lock(&self.contacts)
            .rows
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| {
                let md = MonthDay::of(c.birthday);
                from <= md && md <= to
            })
            .cloned()
            .collect();

        matches.sort_by_key(|c| (MonthDay::of(c.birthday), c.id));
        Ok(matches)
    }
}
