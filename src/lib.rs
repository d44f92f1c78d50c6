// src/lib.rs

pub mod app_state;
pub mod config;
pub mod error;
pub mod logging;
pub mod records;
pub mod service;
pub mod storage;

pub use app_state::AppState;
pub use config::AppConfig;
pub use error::{GalleryError, Result};
