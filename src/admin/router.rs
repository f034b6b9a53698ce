//! Privileged command routing.
//!
//! Commands from admin chats go through an [`AdminHandler`]; everything else
//! goes straight to the chat's regular command handler.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::admin::handler::{AdminHandler, CommandHandler, SessionContext};
use crate::error::BotError;
use crate::message::Message;
use crate::sender::NotificationSender;
use crate::stranger::StrangerService;

/// Default time a single command may take before it is abandoned
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Provides the per-chat collaborators of a session.
pub trait SessionFactory: Send + Sync {
    fn sender(&self, chat_id: i64) -> Arc<dyn NotificationSender>;

    /// Handler for commands that are not admin commands.
    fn command_handler(&self, chat_id: i64) -> Arc<dyn CommandHandler>;
}

pub struct CommandRouter {
    admins: HashSet<i64>,
    registry: Arc<dyn StrangerService>,
    sessions: Arc<dyn SessionFactory>,
    timeout: Duration,
}

impl CommandRouter {
    pub fn new(
        admins: impl IntoIterator<Item = i64>,
        registry: Arc<dyn StrangerService>,
        sessions: Arc<dyn SessionFactory>,
        timeout: Duration,
    ) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            registry,
            sessions,
            timeout,
        }
    }

    pub fn is_admin(&self, chat_id: i64) -> bool {
        self.admins.contains(&chat_id)
    }

    /// Handles one inbound command, bounded by the configured timeout.
    pub async fn dispatch(&self, message: Message) -> Result<(), BotError> {
        let chat_id = message.chat_id;
        let fallback = self.sessions.command_handler(chat_id);

        let handling = async {
            if self.is_admin(chat_id) {
                debug!("Routing /{} from admin {}", message.command, chat_id);
                let ctx = SessionContext {
                    chat_id,
                    timeout: self.timeout,
                };
                let handler = AdminHandler::new(
                    ctx,
                    self.registry.clone(),
                    self.sessions.sender(chat_id),
                    fallback,
                );
                handler.handle_command(&message).await
            } else {
                fallback.handle_command(&message).await
            }
        };

        tokio::time::timeout(self.timeout, handling)
            .await
            .map_err(|_| BotError::Timeout(self.timeout))?
    }
}
