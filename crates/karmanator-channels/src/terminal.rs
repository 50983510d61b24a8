use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::adapter::*;

/// The room every terminal message is posted in.
pub const TERMINAL_ROOM: &str = "#local";

/// Terminal channel — each stdin line is a message in [`TERMINAL_ROOM`] from
/// the local user, and replies are printed to stdout. `exit`/`quit` or EOF
/// ends the session.
pub struct TerminalChannel {
    id: String,
    sender: String,
    connected: Arc<AtomicBool>,
}

impl TerminalChannel {
    pub fn new(id: String, sender: String) -> Self {
        Self {
            id,
            sender,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Channel for TerminalChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel_type(&self) -> &str {
        "terminal"
    }

    async fn start(&mut self) -> karmanator_core::Result<mpsc::Receiver<ChannelEvent>> {
        let (event_tx, event_rx) = mpsc::channel(256);
        let channel_id = self.id.clone();
        let sender = self.sender.clone();
        let connected = self.connected.clone();
        connected.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let _ = event_tx.send(ChannelEvent::Connected).await;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        debug!(error = %e, "stdin read failed");
                        break;
                    }
                };
                let trimmed = line.trim();
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }
                let msg = IncomingMessage::new(
                    channel_id.clone(),
                    sender.clone(),
                    Some(TERMINAL_ROOM.to_string()),
                    line,
                );
                if event_tx.send(ChannelEvent::Message(msg)).await.is_err() {
                    break;
                }
            }
            connected.store(false, Ordering::SeqCst);
            let _ = event_tx.send(ChannelEvent::Disconnected(None)).await;
        });

        Ok(event_rx)
    }

    async fn send(&self, message: OutgoingMessage) -> karmanator_core::Result<()> {
        println!("[{}] {}", message.target, message.text);
        Ok(())
    }

    async fn stop(&mut self) -> karmanator_core::Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
