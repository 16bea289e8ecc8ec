/// Authentication primitives for the Contacts API
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access token minting and validation (subject = email)
/// - [`identity`]: Identity snapshot and the cache overlay used during
///   token-based identity resolution
///
/// # Example
///
/// ```no_run
/// use contacts_shared::auth::password::{hash_password, verify_password};
/// use contacts_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new("user@example.com");
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// let subject = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(subject, "user@example.com");
/// # Ok(())
/// # }
/// ```

pub mod identity;
pub mod jwt;
pub mod password;
