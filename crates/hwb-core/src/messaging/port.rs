use async_trait::async_trait;

use crate::{domain::ChatId, Result};

/// Outbound messenger port.
///
/// Telegram is the only implementation; the core never sees teloxide types.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send plain text to a chat. Failures surface as `Error::Notification`.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
