/// Auth gateway
///
/// Registration, login, bearer-token identity resolution, email verification
/// and avatar updates. The gateway owns the identity cache protocol:
///
/// - resolution always loads the canonical user from the store, then overlays
///   a cached snapshot or populates the cache on miss
/// - every user mutation invalidates `user:{id}` before returning
///
/// Cache read/write failures during resolution degrade to a miss; an
/// invalidation failure fails the mutating call.
///
/// Invalidation does not fence concurrent resolutions: a resolve that loaded
/// the user before a mutation can still `put` its older snapshot after the
/// invalidate. Such a snapshot lives at most one cache TTL.

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    auth::{
        identity::{merge, CachedIdentity},
        jwt::TokenIssuer,
        password::{hash_password, verify_password, PasswordError},
    },
    cache::IdentityCache,
    error::{ServiceError, ServiceResult},
    models::user::{CreateUser, User},
    services::{
        email::{verification_email_html, Mailer, VERIFICATION_SUBJECT},
        media::MediaStore,
    },
    store::{StoreError, UserStore},
};

/// Returned for both unknown email and wrong password
pub const INVALID_LOGIN: &str = "Incorrect email or password";

const ACCOUNT_EXISTS: &str = "User with this email already exists";
const USER_NOT_FOUND: &str = "User not found";

/// Access token returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    fn bearer(token: String) -> Self {
        Self {
            access_token: token,
            token_type: "bearer".to_string(),
        }
    }
}

pub struct AuthGateway {
    users: Arc<dyn UserStore>,
    cache: Arc<dyn IdentityCache>,
    mailer: Arc<dyn Mailer>,
    media: Arc<dyn MediaStore>,
    tokens: TokenIssuer,
    cache_ttl: Duration,
    base_url: String,
}

impl AuthGateway {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: Arc<dyn IdentityCache>,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaStore>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            users,
            cache,
            mailer,
            media,
            tokens,
            cache_ttl: crate::cache::DEFAULT_TTL,
            base_url: "http://localhost:8000".to_string(),
        }
    }

    /// Lifetime of cached identity snapshots
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Public base URL used in verification links
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Store connectivity, for health reporting
    pub async fn store_healthy(&self) -> bool {
        self.users.ping().await.is_ok()
    }

    /// Creates an unverified account and sends the verification email
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is already registered.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ServiceResult<User> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(ServiceError::Conflict(ACCOUNT_EXISTS.to_string()));
        }

        let hashed_password = hash_password(password)?;

        let user = self
            .users
            .create(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                hashed_password,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::Conflict(ACCOUNT_EXISTS.to_string()),
                other => other.into(),
            })?;

        info!(user_id = user.id, "User registered");

        let html = verification_email_html(&self.base_url, user.id);
        if let Err(e) = self.mailer.send(&user.email, VERIFICATION_SUBJECT, &html).await {
            warn!(user_id = user.id, error = %e, "Failed to send verification email");
        }

        Ok(user)
    }

    /// Exchanges credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AccessToken> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_LOGIN.to_string()))?;

        let matches = match verify_password(password, &user.hashed_password) {
            Ok(matches) => matches,
            Err(PasswordError::InvalidHash(e)) => {
                warn!(user_id = user.id, error = %e, "Stored password hash is corrupt");
                false
            }
            Err(e) => return Err(e.into()),
        };

        if !matches {
            debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(ServiceError::Unauthorized(INVALID_LOGIN.to_string()));
        }

        let token = self.tokens.mint(&user.email)?;
        Ok(AccessToken::bearer(token))
    }

    /// Resolves a bearer token to the current user
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an invalid or expired token, or when the subject
    /// no longer matches a user.
    pub async fn resolve_identity(&self, token: &str) -> ServiceResult<User> {
        let email = self.tokens.verify(token)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(ServiceError::unauthorized)?;

        match self.cache.get(user.id).await {
            Ok(Some(cached)) => {
                debug!(user_id = user.id, "Identity cache hit");
                return Ok(merge(user, &cached));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Identity cache read failed");
                return Ok(user);
            }
        }

        let snapshot = CachedIdentity::from(&user);
        if let Err(e) = self.cache.put(user.id, &snapshot, self.cache_ttl).await {
            warn!(user_id = user.id, error = %e, "Identity cache write failed");
        }

        Ok(user)
    }

    /// Marks the user's email as verified; repeating it is a no-op
    pub async fn verify_email(&self, user_id: i64) -> ServiceResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?;

        let user = if user.is_verified {
            debug!(user_id, "Email already verified");
            user
        } else {
            self.users
                .mark_verified(user_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?
        };

        self.cache.invalidate(user_id).await?;

        info!(user_id, "Email verified");
        Ok(user)
    }

    /// Uploads a new avatar and stores its URL on the user
    pub async fn update_avatar(&self, user: &User, data: Bytes, filename: &str) -> ServiceResult<User> {
        let url = self.media.upload_avatar(user.id, data, filename).await?;

        let updated = self
            .users
            .update_avatar(user.id, &url)
            .await?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?;

        self.cache.invalidate(user.id).await?;

        info!(user_id = user.id, "Avatar updated");
        Ok(updated)
    }
}
