//! Admin command handling for privileged chats.

pub mod commands;
pub mod handler;
pub mod router;

pub use commands::*;
pub use handler::{AdminHandler, CommandHandler, SessionContext};
pub use router::{CommandRouter, SessionFactory, DEFAULT_COMMAND_TIMEOUT};
