/// Contact endpoints
///
/// All routes require a bearer token and only ever see the caller's own
/// contacts; another user's contact id answers 404.
///
/// # Endpoints
///
/// - `POST /contacts` - Create (201)
/// - `GET /contacts?skip&limit&first_name&last_name&email` - List and search
/// - `GET /contacts/birthdays/upcoming` - Birthdays within the next 7 days
/// - `GET /contacts/:id` - Read one
/// - `PUT /contacts/:id` - Replace all fields
/// - `DELETE /contacts/:id` - Delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    middleware::auth::CurrentUser,
    routes::{health::MessageResponse, ValidatedJson, ValidatedPath},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use contacts_shared::models::contact::{Contact, ContactData, ContactFilter};
use serde::Deserialize;
use validator::Validate;

/// Create/update request body
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 50))]
    pub phone: String,

    pub birthday: NaiveDate,

    #[serde(default)]
    pub additional_data: Option<String>,
}

impl From<ContactRequest> for ContactData {
    fn from(req: ContactRequest) -> Self {
        ContactData {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            birthday: req.birthday,
            additional_data: req.additional_data,
        }
    }
}

fn default_limit() -> i64 {
    100
}

/// List query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct ListParams {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    pub skip: i64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must not be negative"))]
    pub limit: i64,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl From<ListParams> for ContactFilter {
    fn from(params: ListParams) -> Self {
        ContactFilter {
            first_name: params.first_name,
            last_name: params.last_name,
            email: params.email,
            skip: params.skip,
            limit: params.limit,
        }
    }
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let contact = state.contacts.create(user.id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// List contacts, ordered by id
///
/// Text filters are case-insensitive substring matches and combine with AND.
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Contact>>> {
    let Query(params) = params.map_err(|rejection| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "query".to_string(),
            message: rejection.body_text(),
        }])
    })?;
    params.validate()?;

    let contacts = state.contacts.list(user.id, &params.into()).await?;
    Ok(Json(contacts))
}

pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Contact>>> {
    Ok(Json(state.contacts.upcoming_birthdays(user.id).await?))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedPath(contact_id): ValidatedPath<i64>,
) -> ApiResult<Json<Contact>> {
    Ok(Json(state.contacts.get(user.id, contact_id).await?))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedPath(contact_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> ApiResult<Json<Contact>> {
    let contact = state
        .contacts
        .update(user.id, contact_id, req.into())
        .await?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedPath(contact_id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.contacts.delete(user.id, contact_id).await?;
    Ok(Json(MessageResponse::new("Contact deleted successfully")))
}
