/// Contact model and database operations
///
/// Every query here takes the owning `user_id` and filters on it, so a
/// contact belonging to someone else is indistinguishable from a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contacts (
///     id BIGSERIAL PRIMARY KEY,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(50) NOT NULL,
///     birthday DATE NOT NULL,
///     additional_data TEXT,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

/// Contact owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,

    /// Free-text note
    pub additional_data: Option<String>,

    /// Owner; not part of the public representation
    #[serde(skip_serializing, default)]
    pub user_id: i64,
}

/// Mutable contact fields, used for both create and full-replacement update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
}

/// Search and pagination options for listing contacts
///
/// Text filters are case-insensitive substring matches; `None` or an empty
/// string disables the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: None,
            skip: 0,
            limit: 100,
        }
    }
}

impl ContactFilter {
    /// Non-empty text filters as `(column, value)` pairs
    pub fn text_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("first_name", self.first_name.as_deref()),
            ("last_name", self.last_name.as_deref()),
            ("email", self.email.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| match value {
            Some(v) if !v.is_empty() => Some((column, v)),
            _ => None,
        })
        .collect()
    }
}

/// Month and day of a date, ordered chronologically within a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const FIRST: MonthDay = MonthDay { month: 1, day: 1 };
    pub const LAST: MonthDay = MonthDay { month: 12, day: 31 };

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Formats as `MM-DD`, matching `to_char(date, 'MM-DD')`
impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Builds an ILIKE pattern matching `value` as a literal substring
pub fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, email, phone, birthday, additional_data, user_id";

impl Contact {
    /// Inserts a contact owned by `user_id`
    pub async fn create(pool: &PgPool, user_id: i64, data: ContactData) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO contacts (first_name, last_name, email, phone, birthday, additional_data, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        );

        sqlx::query_as::<_, Contact>(&query)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.birthday)
            .bind(data.additional_data)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Finds a contact by id, only if owned by `user_id`
    pub async fn find_for_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM contacts WHERE id = $1 AND user_id = $2",
            CONTACT_COLUMNS
        );

        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists contacts owned by `user_id` matching `filter`, ordered by id
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        filter: &ContactFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let text_filters = filter.text_filters();

        let mut query = format!("SELECT {} FROM contacts WHERE user_id = $1", CONTACT_COLUMNS);
        let mut bind_count = 1;

        for (column, _) in &text_filters {
            bind_count += 1;
            query.push_str(&format!(" AND {} ILIKE ${}", column, bind_count));
        }
        query.push_str(&format!(
            " ORDER BY id LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Contact>(&query).bind(user_id);
        for (_, value) in text_filters {
            q = q.bind(like_pattern(value));
        }

        q.bind(filter.limit).bind(filter.skip).fetch_all(pool).await
    }

    /// Replaces the mutable fields of a contact owned by `user_id`
    ///
    /// Returns `None` if no such contact is owned by the user.
    pub async fn update_for_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        data: ContactData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE contacts
            SET first_name = $3, last_name = $4, email = $5, phone = $6,
                birthday = $7, additional_data = $8
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        );

        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(user_id)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.birthday)
            .bind(data.additional_data)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a contact owned by `user_id`
    ///
    /// Returns true if a row was removed.
    pub async fn delete_for_user(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Contacts whose birthday month/day lies in `[from, to]`, year ignored
    ///
    /// `from` must not be after `to`; wrapping ranges are split by the caller.
    pub async fn birthdays_between(
        pool: &PgPool,
        user_id: i64,
        from: MonthDay,
        to: MonthDay,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM contacts
            WHERE user_id = $1
              AND to_char(birthday, 'MM-DD') BETWEEN $2 AND $3
            ORDER BY to_char(birthday, 'MM-DD'), id
            "#,
            CONTACT_COLUMNS
        );

        sqlx::query_as::<_, Contact>(&query)
            .bind(user_id)
            .bind(from.to_string())
            .bind(to.to_string())
            .fetch_all(pool)
            .await
    }
}
