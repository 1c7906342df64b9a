//! Profile editing and sign-out

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AVATAR_PATH;
use crate::error::{IdentityError, ProfileError};
use crate::store::{BlobStore, IdentityProvider, ProfileUpdate, UserProfile};

/// Unsaved edits of the profile view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEditState {
    /// Display name being edited
    pub name: String,
    /// Newly picked avatar image, not uploaded yet
    pub pending_avatar: Option<Vec<u8>>,
}

impl ProfileEditState {
    /// Start editing from the stored profile
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.display_name.clone(),
            pending_avatar: None,
        }
    }
}

/// Profile operations against the identity provider and blob store
#[derive(Clone)]
pub struct ProfileService {
    identity: Arc<dyn IdentityProvider>,
    blobs: Arc<dyn BlobStore>,
}

impl ProfileService {
    pub fn new(identity: Arc<dyn IdentityProvider>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { identity, blobs }
    }

    /// Save the edits of `user`.
    ///
    /// A pending avatar is uploaded to `avatar/{uid}` first and its URL
    /// replaces the current one. Edits stay in place when saving fails so the
    /// user can retry.
    pub async fn save(&self, user: &UserProfile, edit: &mut ProfileEditState) -> Result<UserProfile, ProfileError> {
        if user.uid.is_empty() {
            return Err(ProfileError::NotSignedIn);
        }

        let display_name = edit.name.trim().to_string();
        if display_name.is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let avatar_url = match &edit.pending_avatar {
            Some(bytes) => {
                let path = format!("{}/{}", AVATAR_PATH, user.uid);
                Some(self.blobs.upload(&path, bytes.clone()).await?)
            }
            None => user.avatar_url.clone(),
        };

        let updated = self
            .identity
            .update_profile(&user.uid, ProfileUpdate { display_name, avatar_url })
            .await?;

        edit.name = updated.display_name.clone();
        edit.pending_avatar = None;
        info!("Profile of {} updated", updated.uid);
        Ok(updated)
    }

    /// End the session behind `token`
    pub async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        self.identity.sign_out(token).await.inspect_err(|e| {
            warn!("Sign-out failed: {}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryBlobStore, InMemoryIdentity};

    fn bob() -> UserProfile {
        UserProfile {
            uid: "u-bob".to_string(),
            display_name: "Bob".to_string(),
            avatar_url: Some("memory://old.png".to_string()),
            email: Some("bob@example.com".to_string()),
        }
    }

    fn setup() -> (Arc<InMemoryIdentity>, Arc<InMemoryBlobStore>, ProfileService) {
        let identity = Arc::new(InMemoryIdentity::new());
        identity.sign_in("t-bob", bob());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let service = ProfileService::new(identity.clone(), blobs.clone());
        (identity, blobs, service)
    }

    #[tokio::test]
    async fn test_save_name_keeps_avatar() {
        let (identity, _, service) = setup();
        let mut edit = ProfileEditState::from_profile(&bob());
        edit.name = "  Bobby ".to_string();

        let updated = service.save(&bob(), &mut edit).await.unwrap();

        assert_eq!(updated.display_name, "Bobby");
        assert_eq!(updated.avatar_url.as_deref(), Some("memory://old.png"));
        assert_eq!(identity.user("u-bob").unwrap().display_name, "Bobby");
        assert_eq!(edit.name, "Bobby");
    }

    #[tokio::test]
    async fn test_save_uploads_new_avatar() {
        let (_, blobs, service) = setup();
        let mut edit = ProfileEditState::from_profile(&bob());
        edit.pending_avatar = Some(vec![0xFF, 0xD8]);

        let updated = service.save(&bob(), &mut edit).await.unwrap();

        assert_eq!(updated.avatar_url.as_deref(), Some("memory://avatar/u-bob"));
        assert_eq!(blobs.get("avatar/u-bob"), Some(vec![0xFF, 0xD8]));
        assert_eq!(edit.pending_avatar, None);
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_edits() {
        let (identity, blobs, service) = setup();
        blobs.set_online(false);
        let mut edit = ProfileEditState::from_profile(&bob());
        edit.name = "Robert".to_string();
        edit.pending_avatar = Some(vec![1]);

        let err = service.save(&bob(), &mut edit).await.unwrap_err();

        assert!(matches!(err, ProfileError::Upload(_)));
        assert_eq!(edit.pending_avatar, Some(vec![1]));
        assert_eq!(identity.user("u-bob").unwrap().display_name, "Bob");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let (_, _, service) = setup();
        let mut edit = ProfileEditState { name: "   ".to_string(), pending_avatar: None };
        assert!(matches!(service.save(&bob(), &mut edit).await, Err(ProfileError::EmptyName)));
    }

    #[tokio::test]
    async fn test_unknown_user_update_fails() {
        let (_, _, service) = setup();
        let mut ghost = bob();
        ghost.uid = "u-ghost".to_string();
        let mut edit = ProfileEditState::from_profile(&ghost);
        assert!(matches!(service.save(&ghost, &mut edit).await, Err(ProfileError::Update(_))));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let (_, _, service) = setup();
        assert!(service.sign_out("t-bob").await.is_ok());
        assert!(service.sign_out("t-bob").await.is_err());
    }
}
