use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// `salt$digest`, both hex encoded.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        password: &str,
        first_name: String,
        last_name: String,
    ) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = hex::encode(hash_password(&salt, password));

        User {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash: format!("{}${}", salt, digest),
            first_name,
            last_name,
            created_at: Utc::now(),
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Some((salt, digest)) = self.password_hash.split_once('$') else {
            return false;
        };
        match hex::decode(digest) {
            Ok(stored) => constant_time_eq(&hash_password(salt, password), &stored),
            Err(_) => false,
        }
    }
}

fn hash_password(salt: &str, password: &str) -> [u8; 32] {
    Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize()
        .into()
}

// Inspects every byte so the time taken does not depend on where the
// digests first differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// An authenticated identity as seen by the game service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub username: String,
}

impl Caller {
    pub fn new(user_id: &str, username: &str) -> Self {
        Caller {
            user_id: user_id.to_string(),
            username: username.to_string(),
        }
    }
}

/// The part of a user that is safe to hand back over the API.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(password: &str) -> User {
        User::new(
            "tester".to_string(),
            "test@example.com".to_string(),
            password,
            "Test".to_string(),
            "User".to_string(),
        )
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user("password123");

        assert_eq!(user.username, "tester");
        assert_eq!(user.email, "test@example.com");
        assert!(!user.id.is_empty());
        assert!(!user.password_hash.contains("password123"));
    }

    #[test]
    fn test_verify_password() {
        let user = create_test_user("password123");

        assert!(user.verify_password("password123"));
        assert!(!user.verify_password("password124"));
        assert!(!user.verify_password(""));
    }

    #[test]
    fn test_same_password_different_salt() {
        let first = create_test_user("password123");
        let second = create_test_user("password123");

        assert_ne!(first.password_hash, second.password_hash);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let mut user = create_test_user("password123");
        user.password_hash = "no-separator".to_string();

        assert!(!user.verify_password("password123"));

        let (salt, _) = create_test_user("password123")
            .password_hash
            .split_once('$')
            .map(|(salt, digest)| (salt.to_string(), digest.to_string()))
            .unwrap();
        user.password_hash = format!("{}$not-hex", salt);
        assert!(!user.verify_password("password123"));
        user.password_hash = format!("{}$abcd", salt);
        assert!(!user.verify_password("password123"));
    }

    #[test]
    fn test_digest_comparison() {
        let digest = hash_password("salt", "password123");

        assert!(constant_time_eq(&digest, &hash_password("salt", "password123")));
        assert!(!constant_time_eq(&digest, &hash_password("pepper", "password123")));
        assert!(!constant_time_eq(&digest, &digest[..31]));
    }

    #[test]
    fn test_profile_hides_password() {
        let user = create_test_user("password123");
        let profile = UserProfile::from(&user);

        let serialized = serde_json::to_string(&profile).unwrap();
        assert!(!serialized.contains("password"));
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.username, user.username);
    }
}
