//! Line-oriented console front end.
//!
//! Stands in for the messaging platform: every input line is treated as a
//! chat message from one chat, and notifications are written to an output
//! stream.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::admin::{CommandHandler, CommandRouter, SessionFactory};
use crate::error::BotError;
use crate::message::Message;
use crate::sender::{ConsoleSender, NotificationSender};

/// Sessions whose notifications all go to one shared writer.
pub struct ConsoleSessions<W> {
    out: Arc<Mutex<W>>,
}

impl<W> ConsoleSessions<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }
}

impl<W> SessionFactory for ConsoleSessions<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn sender(&self, chat_id: i64) -> Arc<dyn NotificationSender> {
        Arc::new(ConsoleSender::new(chat_id, self.out.clone()))
    }

    fn command_handler(&self, chat_id: i64) -> Arc<dyn CommandHandler> {
        Arc::new(UnknownCommandHandler {
            sender: self.sender(chat_id),
        })
    }
}

/// Regular command handler of the console: it knows no commands.
struct UnknownCommandHandler {
    sender: Arc<dyn NotificationSender>,
}

#[async_trait]
impl CommandHandler for UnknownCommandHandler {
    async fn handle_command(&self, message: &Message) -> Result<(), BotError> {
        let text = format!("Unknown command: /{}", message.command);
        if let Err(e) = self.sender.send_notification(&text).await {
            error!("Failed to reply to chat {}: {}", message.chat_id, e);
        }
        Ok(())
    }
}

/// Reads commands from `input` until EOF, dispatching each as sent by `chat_id`.
pub async fn run<R>(router: &CommandRouter, chat_id: i64, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(message) = Message::parse(chat_id, &line) else {
            debug!("Ignoring non-command input: {:?}", line);
            continue;
        };

        if let Err(e) = router.dispatch(message).await {
            error!("Command failed: {}", e);
        }
    }

    Ok(())
}
