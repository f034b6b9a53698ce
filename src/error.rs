use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Stranger service error: {0}")]
    Stranger(#[from] StrangerError),

    #[error("Command handling timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure to obtain the startup configuration.
///
/// Only a human-readable reason is carried; the underlying cause is logged
/// where the error is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to open \"{0}\"")]
    Io(String),

    #[error("Failed to parse \"{0}\"")]
    Parse(String),

    #[error("Failed to obtain parameters: {0}")]
    MissingField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Io,
    Parse,
    MissingField,
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::Io(_) => ConfigErrorKind::Io,
            ConfigError::Parse(_) => ConfigErrorKind::Parse,
            ConfigError::MissingField(_) => ConfigErrorKind::MissingField,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrangerError {
    #[error("No stranger with telegram_id {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl StrangerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StrangerError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
