//! Admin command handler.
//!
//! Runs admin commands for one privileged chat against the stranger
//! registry and reports the outcome back to that chat.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::admin::commands::*;
use crate::error::BotError;
use crate::message::Message;
use crate::sender::NotificationSender;
use crate::stranger::StrangerService;

/// Anything able to handle a command message.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle_command(&self, message: &Message) -> Result<(), BotError>;
}

/// Per-conversation context supplied by the surrounding framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub chat_id: i64,
    /// How long the framework lets one command run
    pub timeout: Duration,
}

/// Handles admin commands for a single privileged chat.
pub struct AdminHandler {
    ctx: SessionContext,
    registry: Arc<dyn StrangerService>,
    sender: Arc<dyn NotificationSender>,
    /// Receives every command that is not an admin command
    fallback: Arc<dyn CommandHandler>,
}

impl AdminHandler {
    pub fn new(
        ctx: SessionContext,
        registry: Arc<dyn StrangerService>,
        sender: Arc<dyn NotificationSender>,
        fallback: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            ctx,
            registry,
            sender,
            fallback,
        }
    }

    async fn handle_clear(&self, telegram_id: i64) -> Result<(), BotError> {
        let stranger = match self.registry.get_stranger(telegram_id).await {
            Ok(stranger) => stranger,
            Err(e) if e.is_not_found() => {
                info!("Admin {} tried to clear unknown stranger {}", self.ctx.chat_id, telegram_id);
                self.notify(&clear_not_found(telegram_id, &e)).await;
                self.notify(CLEAR_USAGE).await;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        stranger.end_talk().await?;
        info!("Admin {} cleared stranger {}", self.ctx.chat_id, stranger.telegram_id());
        self.notify(&cleared(telegram_id)).await;
        Ok(())
    }

    async fn handle_pay(
        &self,
        telegram_id: i64,
        amount: i64,
        reason: &str,
    ) -> Result<(), BotError> {
        let stranger = match self.registry.get_stranger(telegram_id).await {
            Ok(stranger) => stranger,
            Err(e) if e.is_not_found() => {
                info!("Admin {} tried to pay unknown stranger {}", self.ctx.chat_id, telegram_id);
                self.notify(&pay_not_found(&e)).await;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // Failures here are not ours to recover from
        stranger.pay(amount, reason).await?;
        info!(
            "Admin {} paid {} to stranger {} ({})",
            self.ctx.chat_id,
            amount,
            stranger.telegram_id(),
            reason
        );
        self.notify(PAY_SUCCESS).await;
        Ok(())
    }

    async fn reject(&self, name: AdminCommandName, error: ArgumentError) -> Result<(), BotError> {
        info!("Rejected /{} arguments from {}: {:?}", name, self.ctx.chat_id, error);
        for text in error.notifications() {
            self.notify(&text).await;
        }
        Ok(())
    }

    /// Sends a notification, logging instead of failing on delivery errors.
    async fn notify(&self, text: &str) {
        if let Err(e) = self.sender.send_notification(text).await {
            warn!("Failed to notify chat {}: {}", self.ctx.chat_id, e);
        }
    }
}

#[async_trait]
impl CommandHandler for AdminHandler {
    async fn handle_command(&self, message: &Message) -> Result<(), BotError> {
        let Some(name) = AdminCommandName::from_name(&message.command) else {
            return self.fallback.handle_command(message).await;
        };

        match AdminCommand::parse(name, message.command_args.as_deref()) {
            Ok(AdminCommand::Clear { telegram_id }) => self.handle_clear(telegram_id).await,
            Ok(AdminCommand::Pay {
                telegram_id,
                amount,
                reason,
            }) => self.handle_pay(telegram_id, amount, &reason).await,
            Err(e) => self.reject(name, e).await,
        }
    }
}
