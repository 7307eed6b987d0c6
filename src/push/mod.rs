//! Push-messaging delivery capability.

mod line;

pub use line::LinePushClient;

use anyhow::Result;
use async_trait::async_trait;

/// Sends a text message to a user over a push-messaging channel.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_text(&self, user_id: &str, text: &str) -> Result<()>;
}
