use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use karmanator_channels::{Channel, ChannelEvent, IncomingMessage};

use crate::dispatcher::Dispatcher;

/// Runs registered channels and feeds their messages to the [`Dispatcher`]
/// strictly one at a time.
pub struct BotRuntime {
    dispatcher: Dispatcher,
    channels: Vec<Box<dyn Channel>>,
}

impl BotRuntime {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            channels: Vec::new(),
        }
    }

    /// Register a channel adapter. Channels are started by [`BotRuntime::run`].
    pub fn add_channel(&mut self, channel: Box<dyn Channel>) {
        info!(
            channel = channel.id(),
            channel_type = channel.channel_type(),
            "registered channel"
        );
        self.channels.push(channel);
    }

    /// Start every channel and process events until all channels close or
    /// Ctrl-C is received. Channels are stopped before returning.
    pub async fn run(self) -> karmanator_core::Result<()> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("received Ctrl-C, shutting down"),
                Err(e) => error!(error = %e, "failed to listen for Ctrl-C, shutting down"),
            }
        })
        .await
    }

    /// Like [`BotRuntime::run`], but stops when `shutdown` completes. The
    /// future is polled across events, so a shutdown that fires while a
    /// message is being handled takes effect right after it.
    pub async fn run_until<F>(mut self, shutdown: F) -> karmanator_core::Result<()>
    where
        F: Future<Output = ()>,
    {
        let (aggregate_tx, mut aggregate_rx) = mpsc::channel::<(String, ChannelEvent)>(1024);

        let mut started = 0usize;
        for channel in self.channels.iter_mut() {
            let channel_id = channel.id().to_string();
            match channel.start().await {
                Ok(mut rx) => {
                    started += 1;
                    let tx = aggregate_tx.clone();
                    tokio::spawn(async move {
                        while let Some(event) = rx.recv().await {
                            if tx.send((channel_id.clone(), event)).await.is_err() {
                                break;
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(channel = %channel_id, error = %e, "failed to start channel");
                }
            }
        }
        drop(aggregate_tx);

        if started == 0 {
            return Err(karmanator_core::KarmaError::Channel {
                channel: "runtime".into(),
                reason: "no channel could be started".into(),
            });
        }

        info!(channels = started, "karmanator running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                event = aggregate_rx.recv() => {
                    match event {
                        Some((channel_id, event)) => self.handle_event(&channel_id, event).await,
                        None => {
                            info!("all channels closed");
                            break;
                        }
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        for channel in self.channels.iter_mut() {
            if let Err(e) = channel.stop().await {
                warn!(channel = channel.id(), error = %e, "failed to stop channel");
            }
        }
        Ok(())
    }

    async fn handle_event(&self, channel_id: &str, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(msg) => self.handle_message(channel_id, &msg).await,
            ChannelEvent::Connected => {
                info!(channel = %channel_id, "channel connected");
            }
            ChannelEvent::Disconnected(reason) => {
                warn!(channel = %channel_id, ?reason, "channel disconnected");
            }
        }
    }

    async fn handle_message(&self, channel_id: &str, msg: &IncomingMessage) {
        let replies = self.dispatcher.dispatch(msg);
        if replies.is_empty() {
            return;
        }

        let Some(channel) = self.channels.iter().find(|c| c.id() == channel_id) else {
            warn!(channel = channel_id, "channel not found for response");
            return;
        };

        for reply in replies {
            debug!(to = %reply.target, text = %reply.text, "sending reply");
            if let Err(e) = channel.send(reply).await {
                warn!(channel = channel_id, error = %e, "failed to send reply");
            }
        }
    }
}
