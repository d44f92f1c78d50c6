//! Record types persisted in the JSON collections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub photo_name: String,
    pub comment_text: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(photo_name: impl Into<String>, comment_text: impl Into<String>, author_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            photo_name: photo_name.into(),
            comment_text: comment_text.into(),
            author_name: author_name.into(),
            created_at: Utc::now(),
        }
    }
}

impl Record for Comment {
    fn id(&self) -> u64 {
        self.id
    }

    fn stamp(&mut self, id: u64, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: u64,
    pub photo_name: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(photo_name: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            photo_name: photo_name.into(),
            user_name: user_name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_pair(&self, photo_name: &str, user_name: &str) -> bool {
        self.photo_name == photo_name && self.user_name == user_name
    }
}

impl Record for Like {
    fn id(&self) -> u64 {
        self.id
    }

    fn stamp(&mut self, id: u64, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

/// Stored account, including the credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Record for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn stamp(&mut self, id: u64, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

/// Signup input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// User as returned to callers, without the password
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile::from(&user)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: 0,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

impl Record for Message {
    fn id(&self) -> u64 {
        self.id
    }

    fn stamp(&mut self, id: u64, now: DateTime<Utc>) {
        self.id = id;
        self.timestamp = now;
    }
}
