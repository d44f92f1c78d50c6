//! Accounts (`users.json`)

use log::{info, warn};
use std::path::Path;

use crate::error::{DuplicateField, GalleryError, Result};
use crate::records::{required, NewUser, RecordStore, User};

pub struct UserStore {
    records: RecordStore<User>,
}

fn fold_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            records: RecordStore::open(data_dir.join("users.json"))?,
        })
    }

    /// Create an account; username and case-folded email must both be unused
    pub fn signup(&self, new_user: NewUser) -> Result<User> {
        let username = required("Username", &new_user.username)?;
        let email = fold_email(&required("Email", &new_user.email)?);
        // Only checked for blankness; stored exactly as given
        required("Password", &new_user.password)?;
        let password = new_user.password;
        let full_name = required("Full name", &new_user.full_name)?;
        let profile_picture = new_user
            .profile_picture
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let user = self.records.transact(|batch| {
            if batch.find(|u| u.username == username).is_some() {
                return Err(GalleryError::Duplicate(DuplicateField::Username));
            }
            if batch.find(|u| u.email == email).is_some() {
                return Err(GalleryError::Duplicate(DuplicateField::Email));
            }
            let now = batch.now();
            Ok(batch.insert(User {
                id: 0,
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
                full_name: full_name.clone(),
                profile_picture: profile_picture.clone(),
                created_at: now,
                last_login_at: None,
            }))
        })?;

        info!("User {} registered (id {})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and record the login time
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let result = self.records.transact(|batch| {
            let now = batch.now();
            let Some(user) = batch.find(|u| u.username == username) else {
                return Err(GalleryError::not_found(format!("User {}", username)));
            };
            if user.password != password {
                return Err(GalleryError::BadPassword);
            }
            let id = user.id;
            batch
                .update_where(|u| u.id == id, |u| u.last_login_at = Some(now))
                .ok_or_else(|| GalleryError::not_found(format!("User {}", username)))
        });

        match &result {
            Ok(user) => info!("User {} logged in", user.username),
            Err(e) => warn!("Login failed for {}: {}", username, e),
        }
        result
    }

    pub fn is_username_available(&self, username: &str) -> bool {
        self.find_by_username(username).is_none()
    }

    pub fn is_email_available(&self, email: &str) -> bool {
        self.find_by_email(email).is_none()
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let username = username.trim();
        self.records.find(|u| u.username == username)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let email = fold_email(email);
        self.records.find(|u| u.email == email)
    }

    pub fn list_all(&self) -> Vec<User> {
        self.records.load_all()
    }

    pub fn delete_by_id(&self, id: u64) -> Result<()> {
        match self.records.remove_where(|u| u.id == id)? {
            0 => Err(GalleryError::not_found(format!("User {}", id))),
            _ => {
                info!("User {} deleted", id);
                Ok(())
            }
        }
    }

    pub fn set_profile_picture(&self, username: &str, file_name: &str) -> Result<User> {
        let username = username.trim();
        self.records
            .update_where(|u| u.username == username, |u| u.profile_picture = Some(file_name.to_string()))?
            .ok_or_else(|| GalleryError::not_found(format!("User {}", username)))
    }
}
