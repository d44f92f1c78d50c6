//! Logger initialization

use log::{info, warn};

use crate::config::LoggingConfig;

/// Which logger ended up installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingBackend {
    Log4rs,
    EnvLogger,
    /// Another logger was installed first (tests, embedding binaries)
    AlreadyInitialized,
}

/// Install log4rs from the configured file, or env_logger (`RUST_LOG`,
/// default `info`) when the file is missing or invalid
pub fn init_logging(config: &LoggingConfig) -> LoggingBackend {
    let path = &config.config_file;
    let log4rs_error = if path.exists() {
        match log4rs::init_file(path, Default::default()) {
            Ok(()) => {
                info!("Logging configured from {}", path.display());
                return LoggingBackend::Log4rs;
            }
            Err(e) => Some(e.to_string()),
        }
    } else {
        None
    };

    let installed = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_ok();
    match log4rs_error {
        Some(e) => warn!("Could not load log config {}: {}. Using env_logger.", path.display(), e),
        None => warn!("Log config {} not found, using env_logger", path.display()),
    }
    if installed {
        LoggingBackend::EnvLogger
    } else {
        LoggingBackend::AlreadyInitialized
    }
}
