//! Admin control plane of a random-chat pairing bot.
//!
//! Loads the startup configuration and lets privileged users run
//! administrative commands against the registry of strangers.

pub mod admin;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod message;
pub mod sender;
pub mod stranger;

pub use config::Configuration;
pub use error::{BotError, ConfigError, ConfigErrorKind, SenderError, StrangerError};
pub use message::Message;
