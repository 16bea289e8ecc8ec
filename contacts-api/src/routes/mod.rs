/// API route handlers
///
/// - `health`: welcome and health check endpoints
/// - `auth`: registration, login, profile, verification, avatar upload
/// - `contacts`: contact CRUD, search and upcoming birthdays
///
/// Extractors here turn axum's plain-text rejections into the JSON error body

pub mod auth;
pub mod contacts;
pub mod health;

use crate::error::{ApiError, ValidationErrorDetail};
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has been deserialized and validated
///
/// Malformed bodies and failed `validator` rules both become a 422
/// `validation_error` response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "body".to_string(),
                    message: rejection.body_text(),
                }])
            })?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Path parameters that failed to parse answer 422 `validation_error`
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "path".to_string(),
                    message: rejection.body_text(),
                }])
            })?;

        Ok(ValidatedPath(value))
    }
}
