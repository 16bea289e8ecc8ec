/// JWT access tokens
///
/// Tokens are HS256-signed and carry the user's email as the subject. The
/// subject is resolved back to a user record on every authenticated request,
/// so nothing else about the user is embedded in the token.
///
/// # Claims
///
/// - `sub`: user email
/// - `iss`: always `"contacts-api"`
/// - `iat`: issued-at (Unix seconds)
/// - `exp`: expiry (Unix seconds), 30 minutes after issue by default
///
/// # Example
///
/// ```
/// use contacts_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new("user@example.com"), secret)?;
/// assert_eq!(validate_token(&token, secret)?, "user@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required on every token
pub const ISSUER: &str = "contacts-api";

/// Default access token lifetime
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// Token is valid but carries no subject
    #[error("Token has no subject claim")]
    MissingSubject,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `email` with the default lifetime
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_expiration(email, Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES))
    }

    /// Creates claims for `email` expiring after `expires_in`
    ///
    /// A negative duration produces an already-expired token, which is
    /// useful in tests.
    pub fn with_expiration(email: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: Some(email.into()),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs `claims` with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its subject
///
/// Checks signature, expiry and issuer, then requires a non-empty `sub`.
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` is in the past
/// - `JwtError::InvalidIssuer` if `iss` is not [`ISSUER`]
/// - `JwtError::MissingSubject` if `sub` is absent or empty
/// - `JwtError::ValidationError` for a bad signature or malformed token
pub fn validate_token(token: &str, secret: &str) -> Result<String, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    match token_data.claims.sub {
        Some(sub) if !sub.is_empty() => Ok(sub),
        _ => Err(JwtError::MissingSubject),
    }
}

/// Mints and verifies access tokens with a fixed secret and lifetime
///
/// Built once at startup from configuration and shared by the auth gateway.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issues an access token whose subject is `email`
    pub fn mint(&self, email: &str) -> Result<String, JwtError> {
        create_token(&Claims::with_expiration(email, self.ttl), &self.secret)
    }

    /// Returns the subject email of a valid token
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        validate_token(token, &self.secret)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"***")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("user@example.com");

        assert_eq!(claims.sub.as_deref(), Some("user@example.com"));
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let token = create_token(&Claims::new("user@example.com"), SECRET).unwrap();

        let subject = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(subject, "user@example.com");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new("user@example.com"), SECRET).unwrap();

        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_tampered_token() {
        let token = create_token(&Claims::new("user@example.com"), SECRET).unwrap();
        let forged = create_token(&Claims::new("admin@example.com"), "forged-secret").unwrap();

        // Swap the payload of a genuine token for a forged one
        let genuine: Vec<&str> = token.split('.').collect();
        let other: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", genuine[0], other[1], genuine[2]);

        assert!(validate_token(&tampered, SECRET).is_err());
        assert!(validate_token("not-a-jwt", SECRET).is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration("user@example.com", Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_missing_subject() {
        let mut claims = Claims::new("user@example.com");
        claims.sub = None;
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::MissingSubject)
        ));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut claims = Claims::new("user@example.com");
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_token_issuer_roundtrip() {
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(5));
        let token = issuer.mint("user@example.com").unwrap();

        assert_eq!(issuer.verify(&token).unwrap(), "user@example.com");
        assert!(!format!("{:?}", issuer).contains(SECRET));
    }
}
