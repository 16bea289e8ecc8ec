/// Bearer authentication middleware
///
/// Resolves the `Authorization: Bearer <token>` header to a full user via
/// [`AuthGateway::resolve_identity`](contacts_shared::services::AuthGateway::resolve_identity)
/// and inserts it into request extensions as [`CurrentUser`].
///
/// | Condition                                   | Status |
/// |---------------------------------------------|--------|
/// | Header missing, not `Bearer`, or empty token | 403    |
/// | Invalid/expired token, unknown subject       | 401    |
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use contacts_api::middleware::auth::CurrentUser;
///
/// async fn handler(Extension(CurrentUser(user)): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.username)
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use contacts_shared::models::user::User;

use crate::{app::AppState, error::ApiError};

const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Authenticated user for the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extracts the token from an `Authorization` header value
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::Forbidden(NOT_AUTHENTICATED.to_string()))?;

    let user = state.auth.resolve_identity(token).await?;
    tracing::debug!(user_id = user.id, "Request authenticated");

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
