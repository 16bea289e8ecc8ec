/// Identity snapshot and cache overlay
///
/// A [`CachedIdentity`] is the denormalized projection of a [`User`] that the
/// identity cache stores under `user:{id}`. During token resolution the user
/// row is always loaded from the store first (the cache has no email index);
/// a cached snapshot then only overrides the mutable profile fields.
///
/// `id` and `email` are join keys and are always taken from the canonical
/// record, even if a snapshot disagrees.

use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Cached projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
}

impl From<&User> for CachedIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_verified: user.is_verified,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Overlays the cached mutable fields onto the canonical user record
///
/// Replaces `username`, `is_verified` and `avatar_url`; keeps everything
/// else, including `id` and `email`, from `canonical`.
pub fn merge(canonical: User, cached: &CachedIdentity) -> User {
    User {
        username: cached.username.clone(),
        is_verified: cached.is_verified,
        avatar_url: cached.avatar_url.clone(),
        ..canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn canonical() -> User {
        User {
            id: 1,
            username: "fresh".to_string(),
            email: "fresh@example.com".to_string(),
            hashed_password: "$argon2id$hash".to_string(),
            is_verified: true,
            avatar_url: Some("https://cdn.example.com/new.png".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_from_user() {
        let user = canonical();
        let snapshot = CachedIdentity::from(&user);

        assert_eq!(snapshot.id, user.id);
        assert_eq!(snapshot.username, user.username);
        assert_eq!(snapshot.email, user.email);
        assert_eq!(snapshot.is_verified, user.is_verified);
        assert_eq!(snapshot.avatar_url, user.avatar_url);
    }

    #[test]
    fn test_merge_overlays_mutable_fields() {
        let cached = CachedIdentity {
            id: 1,
            username: "stale".to_string(),
            email: "fresh@example.com".to_string(),
            is_verified: false,
            avatar_url: None,
        };

        let merged = merge(canonical(), &cached);

        assert_eq!(merged.username, "stale");
        assert!(!merged.is_verified);
        assert_eq!(merged.avatar_url, None);
    }

    #[test]
    fn test_merge_never_takes_id_or_email_from_cache() {
        let original = canonical();
        let cached = CachedIdentity {
            id: 999,
            username: "stale".to_string(),
            email: "someone-else@example.com".to_string(),
            is_verified: false,
            avatar_url: None,
        };

        let merged = merge(original.clone(), &cached);

        assert_eq!(merged.id, original.id);
        assert_eq!(merged.email, original.email);
        assert_eq!(merged.hashed_password, original.hashed_password);
        assert_eq!(merged.created_at, original.created_at);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(CachedIdentity::from(&canonical())).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["is_verified"], true);
        assert!(json.get("hashed_password").is_none());
    }
}
