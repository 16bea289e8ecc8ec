/// Contacts gateway
///
/// Ownership-scoped CRUD, search and upcoming birthdays. Every call takes the
/// id of the resolved caller; a contact owned by someone else is reported as
/// `NotFound`.

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{ServiceError, ServiceResult},
    models::contact::{Contact, ContactData, ContactFilter, MonthDay},
    store::ContactStore,
};

/// Days ahead covered by the upcoming birthdays query, today included
pub const BIRTHDAY_WINDOW_DAYS: i64 = 7;

const CONTACT_NOT_FOUND: &str = "Contact not found";

/// Month/day ranges covering `[today, today + days]`
///
/// Returns one range, or two when the window wraps past December 31st. The
/// segment containing `today` comes first.
pub fn birthday_window(today: NaiveDate, days: i64) -> Vec<(MonthDay, MonthDay)> {
    let start = MonthDay::of(today);
    let end = MonthDay::of(today + Duration::days(days));

    if start <= end {
        vec![(start, end)]
    } else {
        vec![(start, MonthDay::LAST), (MonthDay::FIRST, end)]
    }
}

pub struct ContactsGateway {
    contacts: Arc<dyn ContactStore>,
}

impl ContactsGateway {
    pub fn new(contacts: Arc<dyn ContactStore>) -> Self {
        Self { contacts }
    }

    pub async fn create(&self, user_id: i64, data: ContactData) -> ServiceResult<Contact> {
        let contact = self.contacts.create(user_id, data).await?;
        debug!(user_id, contact_id = contact.id, "Contact created");
        Ok(contact)
    }

    pub async fn get(&self, user_id: i64, contact_id: i64) -> ServiceResult<Contact> {
        self.contacts
            .find(contact_id, user_id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn list(&self, user_id: i64, filter: &ContactFilter) -> ServiceResult<Vec<Contact>> {
        Ok(self.contacts.list(user_id, filter).await?)
    }

    /// Replaces all mutable fields of the contact
    pub async fn update(
        &self,
        user_id: i64,
        contact_id: i64,
        data: ContactData,
    ) -> ServiceResult<Contact> {
        self.contacts
            .update(contact_id, user_id, data)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, user_id: i64, contact_id: i64) -> ServiceResult<()> {
        if !self.contacts.delete(contact_id, user_id).await? {
            return Err(not_found());
        }

        debug!(user_id, contact_id, "Contact deleted");
        Ok(())
    }

    /// Birthdays in the next week, relative to the current UTC date
    pub async fn upcoming_birthdays(&self, user_id: i64) -> ServiceResult<Vec<Contact>> {
        self.upcoming_birthdays_from(user_id, Utc::now().date_naive())
            .await
    }

    pub async fn upcoming_birthdays_from(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> ServiceResult<Vec<Contact>> {
        let mut upcoming = Vec::new();

        for (from, to) in birthday_window(today, BIRTHDAY_WINDOW_DAYS) {
            upcoming.extend(self.contacts.birthdays_between(user_id, from, to).await?);
        }

        Ok(upcoming)
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound(CONTACT_NOT_FOUND.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryContactStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contact(first_name: &str, email: &str, birthday: NaiveDate) -> ContactData {
        ContactData {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            phone: "+380501234567".to_string(),
            birthday,
            additional_data: None,
        }
    }

    fn gateway() -> ContactsGateway {
        ContactsGateway::new(Arc::new(MemoryContactStore::new()))
    }

    #[test]
    fn test_window_within_year() {
        let window = birthday_window(date(2024, 3, 10), 7);
        assert_eq!(
            window,
            vec![(MonthDay { month: 3, day: 10 }, MonthDay { month: 3, day: 17 })]
        );
    }

    #[test]
    fn test_window_wraps_year_end() {
        let window = birthday_window(date(2024, 12, 28), 7);
        assert_eq!(
            window,
            vec![
                (MonthDay { month: 12, day: 28 }, MonthDay::LAST),
                (MonthDay::FIRST, MonthDay { month: 1, day: 4 }),
            ]
        );
    }

    #[test]
    fn test_window_ending_on_new_years_eve() {
        let window = birthday_window(date(2023, 12, 24), 7);
        assert_eq!(window, vec![(MonthDay { month: 12, day: 24 }, MonthDay::LAST)]);
    }

    #[tokio::test]
    async fn test_upcoming_birthdays_across_new_year() {
        let gw = gateway();
        gw.create(1, contact("Jan", "jan@example.com", date(1990, 1, 2))).await.unwrap();
        gw.create(1, contact("Early", "early@example.com", date(1985, 12, 20))).await.unwrap();
        gw.create(1, contact("Late", "late@example.com", date(2000, 12, 30))).await.unwrap();

        let upcoming = gw.upcoming_birthdays_from(1, date(2024, 12, 28)).await.unwrap();
        let names: Vec<&str> = upcoming.iter().map(|c| c.first_name.as_str()).collect();

        assert_eq!(names, vec!["Late", "Jan"]);
    }

    #[tokio::test]
    async fn test_upcoming_birthdays_window_is_inclusive() {
        let gw = gateway();
        gw.create(1, contact("Today", "t@example.com", date(1990, 6, 1))).await.unwrap();
        gw.create(1, contact("Edge", "e@example.com", date(1990, 6, 8))).await.unwrap();
        gw.create(1, contact("After", "a@example.com", date(1990, 6, 9))).await.unwrap();

        let upcoming = gw.upcoming_birthdays_from(1, date(2024, 6, 1)).await.unwrap();
        let names: Vec<&str> = upcoming.iter().map(|c| c.first_name.as_str()).collect();

        assert_eq!(names, vec!["Today", "Edge"]);
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let gw = gateway();
        let owned = gw.create(1, contact("Mine", "m@example.com", date(1990, 1, 1))).await.unwrap();

        assert!(matches!(gw.get(2, owned.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            gw.update(2, owned.id, contact("Stolen", "s@example.com", date(1990, 1, 1))).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(gw.delete(2, owned.id).await, Err(ServiceError::NotFound(_))));

        assert_eq!(gw.get(1, owned.id).await.unwrap().first_name, "Mine");
        assert!(gw.upcoming_birthdays_from(2, date(2024, 1, 1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let gw = gateway();
        let created = gw.create(1, contact("Ann", "ann@example.com", date(1990, 5, 5))).await.unwrap();
        assert_eq!(gw.get(1, created.id).await.unwrap(), created);

        let mut replacement = contact("Anna", "anna@example.com", date(1991, 6, 6));
        replacement.additional_data = Some("met at conference".to_string());
        let updated = gw.update(1, created.id, replacement.clone()).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name, "Anna");
        assert_eq!(updated.additional_data, replacement.additional_data);

        gw.delete(1, created.id).await.unwrap();
        assert!(matches!(gw.get(1, created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(gw.delete(1, created.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_case_insensitively() {
        let gw = gateway();
        gw.create(1, contact("Ann", "ann@example.com", date(1990, 5, 5))).await.unwrap();
        gw.create(1, contact("Bob", "bob@example.com", date(1990, 5, 5))).await.unwrap();

        let filter = ContactFilter {
            first_name: Some("aN".to_string()),
            ..Default::default()
        };
        let found = gw.list(1, &filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Ann");
    }
}
