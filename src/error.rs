//! Error type shared by the object stores, record stores and services

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use thiserror::Error;

/// Field that collided during signup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::Username => write!(f, "Username"),
            DuplicateField::Email => write!(f, "Email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(DuplicateField),

    #[error("Invalid username or password")]
    BadPassword,

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Object store backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;

impl GalleryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        GalleryError::NotFound(what.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        GalleryError::Invalid(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GalleryError::NotFound(_))
    }
}

impl ResponseError for GalleryError {
    fn status_code(&self) -> StatusCode {
        match self {
            GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::Duplicate(_) => StatusCode::CONFLICT,
            GalleryError::BadPassword => StatusCode::UNAUTHORIZED,
            GalleryError::Invalid(_) => StatusCode::BAD_REQUEST,
            GalleryError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
            GalleryError::Config(_) | GalleryError::Io(_) | GalleryError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal causes stay in the log, not in the response body
        let message = match self {
            GalleryError::Config(_) | GalleryError::Io(_) | GalleryError::Serialization(_) => {
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": message,
        }))
    }
}
