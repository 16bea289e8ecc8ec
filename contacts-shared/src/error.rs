/// Service-level error taxonomy
///
/// Every gateway operation returns `Result<T, ServiceError>`. Lower-level
/// errors (store, cache, token, password, media) are translated to the
/// nearest kind here so the HTTP layer only has to map four variants.
///
/// | Kind           | Typical cause                                      |
/// |----------------|----------------------------------------------------|
/// | `Conflict`     | Email already registered                           |
/// | `Unauthorized` | Bad credentials, invalid/expired token, no subject |
/// | `NotFound`     | Unknown contact/user under ownership scoping       |
/// | `Internal`     | Upstream failure (database, cache, media)          |

use crate::{
    auth::{jwt::JwtError, password::PasswordError},
    cache::CacheError,
    services::media::MediaError,
    store::StoreError,
};

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by the auth and contacts gateways
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Resource already exists (e.g., duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credentials or token rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource missing or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected upstream failure; message is for logs only
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Message used for every token/credential rejection during identity resolution
    pub const INVALID_CREDENTIALS: &'static str = "Could not validate credentials";

    pub fn unauthorized() -> Self {
        ServiceError::Unauthorized(Self::INVALID_CREDENTIALS.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => {
                ServiceError::Conflict(format!("Duplicate value for {}", field))
            }
            StoreError::Database(e) => ServiceError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        ServiceError::Internal(format!("Identity cache error: {}", err))
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ServiceError::Internal(msg),
            _ => ServiceError::unauthorized(),
        }
    }
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        ServiceError::Internal(format!("Error uploading avatar: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: ServiceError = StoreError::Conflict("email".to_string()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_jwt_errors_are_unauthorized() {
        let err: ServiceError = JwtError::Expired.into();
        assert!(matches!(err, ServiceError::Unauthorized(ref m) if m == ServiceError::INVALID_CREDENTIALS));

        let err: ServiceError = JwtError::MissingSubject.into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn test_jwt_create_error_is_internal() {
        let err: ServiceError = JwtError::CreateError("boom".to_string()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_media_error_is_internal() {
        let err: ServiceError = MediaError::NotConfigured.into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
