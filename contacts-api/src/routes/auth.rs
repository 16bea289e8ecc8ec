/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user (201)
/// - `POST /auth/login` - Exchange credentials for a bearer token
/// - `GET /auth/me` - Current user (bearer)
/// - `POST /auth/verify/:user_id` - Mark the user's email as verified
/// - `POST /auth/avatar` - Upload an avatar, multipart field `file` (bearer)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
    routes::{health::MessageResponse, ValidatedJson, ValidatedPath},
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use contacts_shared::{models::user::User, services::AccessToken};
use serde::Deserialize;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Register a new user
///
/// Creates an unverified account and emails a verification link. Mail
/// delivery problems do not fail the request.
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AccessToken>> {
    let token = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(token))
}

pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

/// Verify a user's email
///
/// Repeating the call for an already verified user succeeds.
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedPath(user_id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth.verify_email(user_id).await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// Upload a new avatar
///
/// # Errors
///
/// - `400 Bad Request`: No `file` field in the multipart body
/// - `404 Not Found`: User disappeared during the upload
/// - `500 Internal Server Error`: Image host rejected or unreachable
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<Json<User>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("avatar").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        let updated = state.auth.update_avatar(&user, data, &filename).await?;
        return Ok(Json(updated));
    }

    Err(ApiError::BadRequest("Missing file field".to_string()))
}
