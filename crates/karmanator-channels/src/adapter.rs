use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Locally generated message ID.
    pub id: String,
    /// Channel identifier (e.g., "irc").
    pub channel: String,
    /// Sender identifier (an IRC nick).
    pub sender: String,
    /// Room the message was posted in (None for direct messages).
    pub group: Option<String>,
    /// Raw text content.
    pub text: String,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        sender: impl Into<String>,
        group: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel: channel.into(),
            sender: sender.into(),
            group,
            text: text.into(),
        }
    }

    /// Where a reply belongs: the room, or the sender for a direct message.
    pub fn reply_target(&self) -> &str {
        self.group.as_deref().unwrap_or(&self.sender)
    }
}

/// An outgoing message to send via a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Target channel.
    pub channel: String,
    /// Target room or nick.
    pub target: String,
    pub text: String,
}

/// Events emitted by a channel adapter.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A new message arrived.
    Message(IncomingMessage),
    /// The channel connected successfully.
    Connected,
    /// The channel disconnected.
    Disconnected(Option<String>),
}

/// Trait implemented by each channel adapter.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique identifier for this channel instance.
    fn id(&self) -> &str;

    /// Channel type name (e.g., "irc", "terminal").
    fn channel_type(&self) -> &str;

    /// Start the channel adapter. Returns a receiver for incoming events.
    async fn start(&mut self) -> karmanator_core::Result<mpsc::Receiver<ChannelEvent>>;

    /// Send a message through this channel.
    async fn send(&self, message: OutgoingMessage) -> karmanator_core::Result<()>;

    /// Stop the channel adapter gracefully.
    async fn stop(&mut self) -> karmanator_core::Result<()>;

    /// Check if the channel is currently connected.
    fn is_connected(&self) -> bool;
}
