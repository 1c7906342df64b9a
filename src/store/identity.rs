//! Identity provider

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Profile of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user id
    pub uid: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Trait for the authentication service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// User behind a session token, if signed in
    async fn current_user(&self, token: &str) -> Option<UserProfile>;

    /// End the session behind `token`
    async fn sign_out(&self, token: &str) -> Result<(), IdentityError>;

    /// Overwrite display name and avatar of `uid`
    async fn update_profile(&self, uid: &str, update: ProfileUpdate) -> Result<UserProfile, IdentityError>;
}

/// In-memory identity provider
#[derive(Default)]
pub struct InMemoryIdentity {
    /// Session token -> uid
    sessions: DashMap<String, String>,
    /// uid -> profile
    users: DashMap<String, UserProfile>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and sign them in under `token`
    pub fn sign_in(&self, token: &str, profile: UserProfile) {
        self.sessions.insert(token.to_string(), profile.uid.clone());
        self.users.insert(profile.uid.clone(), profile);
    }

    /// Look up a profile by uid
    pub fn user(&self, uid: &str) -> Option<UserProfile> {
        self.users.get(uid).map(|u| u.clone())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn current_user(&self, token: &str) -> Option<UserProfile> {
        let uid = self.sessions.get(token)?.clone();
        self.user(&uid)
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        self.sessions
            .remove(token)
            .map(|_| ())
            .ok_or(IdentityError::NotSignedIn)
    }

    async fn update_profile(&self, uid: &str, update: ProfileUpdate) -> Result<UserProfile, IdentityError> {
        let mut user = self
            .users
            .get_mut(uid)
            .ok_or_else(|| IdentityError::UnknownUser(uid.to_string()))?;
        user.display_name = update.display_name;
        user.avatar_url = update.avatar_url;
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserProfile {
        UserProfile {
            uid: "u-alice".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
            email: Some("alice@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_current_user_by_token() {
        let identity = InMemoryIdentity::new();
        identity.sign_in("t1", alice());

        assert_eq!(identity.current_user("t1").await, Some(alice()));
        assert_eq!(identity.current_user("nope").await, None);
    }

    #[tokio::test]
    async fn test_sign_out_twice_fails() {
        let identity = InMemoryIdentity::new();
        identity.sign_in("t1", alice());

        assert!(identity.sign_out("t1").await.is_ok());
        assert!(matches!(identity.sign_out("t1").await, Err(IdentityError::NotSignedIn)));
        assert_eq!(identity.current_user("t1").await, None);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let identity = InMemoryIdentity::new();
        identity.sign_in("t1", alice());

        let updated = identity
            .update_profile(
                "u-alice",
                ProfileUpdate {
                    display_name: "Al".to_string(),
                    avatar_url: Some("memory://avatar/u-alice".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name, "Al");
        assert_eq!(identity.user("u-alice").unwrap().avatar_url.as_deref(), Some("memory://avatar/u-alice"));
        assert!(identity
            .update_profile("ghost", ProfileUpdate { display_name: "x".into(), avatar_url: None })
            .await
            .is_err());
    }
}
