//! Notification senders.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::SenderError;

/// Sends one-way text notifications to a single chat.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_notification(&self, text: &str) -> Result<(), SenderError>;
}

/// Writes notifications for one chat as lines to an async writer.
pub struct ConsoleSender<W> {
    chat_id: i64,
    out: Arc<Mutex<W>>,
}

impl<W> ConsoleSender<W> {
    pub fn new(chat_id: i64, out: Arc<Mutex<W>>) -> Self {
        Self { chat_id, out }
    }
}

#[async_trait]
impl<W> NotificationSender for ConsoleSender<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_notification(&self, text: &str) -> Result<(), SenderError> {
        let line = format!("[{}] {}\n", self.chat_id, text);
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}
