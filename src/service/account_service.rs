//! Accounts and profile pictures

use bytes::Bytes;
use log::{info, warn};
use std::sync::Arc;

use crate::error::{GalleryError, Result};
use crate::records::{NewUser, UserProfile, UserStore};
use crate::service::{validate_upload, MediaFile};
use crate::storage::key::sanitize;
use crate::storage::{LocalObjectStore, MediaKind, ObjectStore};

pub struct AccountService {
    users: Arc<UserStore>,
    pictures: Arc<LocalObjectStore>,
    max_profile_picture_bytes: usize,
}

impl AccountService {
    pub fn new(users: Arc<UserStore>, pictures: Arc<LocalObjectStore>, max_profile_picture_bytes: usize) -> Self {
        Self {
            users,
            pictures,
            max_profile_picture_bytes,
        }
    }

    pub fn signup(&self, new_user: NewUser) -> Result<UserProfile> {
        self.users.signup(new_user).map(UserProfile::from)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        self.users.authenticate(username, password).map(UserProfile::from)
    }

    pub fn is_username_available(&self, username: &str) -> bool {
        self.users.is_username_available(username)
    }

    pub fn is_email_available(&self, email: &str) -> bool {
        self.users.is_email_available(email)
    }

    /// Store `<username>_profile<ext>` and record it on the user.
    ///
    /// The picture may be uploaded before the account exists; in that case
    /// only the file is stored and the name is returned for signup to use.
    pub async fn upload_profile_picture(
        &self,
        username: &str,
        original_file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String> {
        validate_upload(MediaKind::Image, content_type, &data, self.max_profile_picture_bytes)?;
        let owner = sanitize(username.trim());
        if owner.is_empty() {
            return Err(GalleryError::invalid("Username is required"));
        }
        let extension = original_file_name
            .rfind('.')
            .map(|idx| sanitize(&original_file_name[idx..]))
            .unwrap_or_default();
        let file_name = format!("{}_profile{}", owner, extension);

        self.pictures.put(&file_name, content_type, data).await?;

        match self.users.set_profile_picture(username, &file_name) {
            Ok(_) => info!("Profile picture for {} stored as {}", username.trim(), file_name),
            Err(e) if e.is_not_found() => {
                warn!("Profile picture {} stored for unregistered user {}", file_name, username.trim())
            }
            Err(e) => return Err(e),
        }
        Ok(file_name)
    }

    pub async fn profile_picture(&self, file_name: &str) -> Result<MediaFile> {
        let data = self.pictures.get(file_name).await?;
        Ok(MediaFile::new(file_name, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> AccountService {
        AccountService::new(
            Arc::new(UserStore::open(dir.path()).unwrap()),
            Arc::new(LocalObjectStore::new(dir.path().join("profile-pictures"))),
            16,
        )
    }

    fn ann() -> NewUser {
        NewUser {
            username: "ann".to_string(),
            email: "Ann@Example.com".to_string(),
            password: "pw".to_string(),
            full_name: "Ann Example".to_string(),
            profile_picture: None,
        }
    }

    #[test]
    fn test_signup_and_login() {
        let dir = TempDir::new().unwrap();
        let accounts = service(&dir);

        let profile = accounts.signup(ann()).unwrap();
        assert_eq!(profile.email, "ann@example.com");
        assert!(!accounts.is_username_available("ann"));
        assert!(!accounts.is_email_available("ANN@example.com"));

        let logged_in = accounts.login("ann", "pw").unwrap();
        assert!(logged_in.last_login_at.is_some());
        assert!(matches!(accounts.login("ann", "nope"), Err(GalleryError::BadPassword)));
    }

    #[tokio::test]
    async fn test_profile_picture_round_trip() {
        let dir = TempDir::new().unwrap();
        let accounts = service(&dir);
        accounts.signup(ann()).unwrap();

        let name = accounts
            .upload_profile_picture("ann", "me at the beach.PNG", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert_eq!(name, "ann_profile.PNG");
        assert_eq!(accounts.login("ann", "pw").unwrap().profile_picture.as_deref(), Some(name.as_str()));

        let media = accounts.profile_picture(&name).await.unwrap();
        assert_eq!(media.content_type, "image/png");
        assert_eq!(media.data, Bytes::from_static(b"png"));
    }

    #[tokio::test]
    async fn test_profile_picture_before_signup() {
        let dir = TempDir::new().unwrap();
        let accounts = service(&dir);
        let name = accounts
            .upload_profile_picture("newbie", "face.jpg", "image/jpeg", Bytes::from_static(b"jpg"))
            .await
            .unwrap();
        assert_eq!(name, "newbie_profile.jpg");
        assert!(accounts.profile_picture(&name).await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_picture_validation() {
        let dir = TempDir::new().unwrap();
        let accounts = service(&dir);
        let too_big = Bytes::from(vec![1u8; 17]);
        assert!(accounts.upload_profile_picture("ann", "a.png", "image/png", too_big).await.is_err());
        assert!(accounts
            .upload_profile_picture("ann", "a.mp3", "audio/mpeg", Bytes::from_static(b"x"))
            .await
            .is_err());
        assert!(accounts
            .upload_profile_picture("日本", "a.png", "image/png", Bytes::from_static(b"x"))
            .await
            .is_err());
        assert!(accounts.profile_picture("missing.png").await.unwrap_err().is_not_found());
    }
}
