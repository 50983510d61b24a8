use tracing::{debug, error};

use karmanator_channels::{IncomingMessage, OutgoingMessage};
use karmanator_store::{KarmaBackend, KarmaStore};

use crate::classifier::{Classification, classify};
use crate::engine::KarmaEngine;

/// Routes one incoming message through the classifier and the engine.
#[derive(Debug, Clone)]
pub struct Dispatcher<S = KarmaStore> {
    engine: KarmaEngine<S>,
}

impl<S: KarmaBackend> Dispatcher<S> {
    pub fn new(engine: KarmaEngine<S>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &KarmaEngine<S> {
        &self.engine
    }

    /// Handle a message and return the replies to send, in order.
    ///
    /// Store failures are logged and the operation that hit them produces no
    /// reply; the remaining awards in the same message are still attempted.
    pub fn dispatch(&self, msg: &IncomingMessage) -> Vec<OutgoingMessage> {
        let target = msg.reply_target();
        let reply = |text: String| OutgoingMessage {
            channel: msg.channel.clone(),
            target: target.to_string(),
            text,
        };

        match classify(&msg.text) {
            Classification::QueryOne(name) => match self.engine.query_one(&name) {
                Ok(text) => vec![reply(text)],
                Err(e) => {
                    error!(error = %e, name = %name, "karma query failed");
                    vec![]
                }
            },
            Classification::QueryTop => match self.engine.query_top() {
                Ok(Some(text)) => vec![reply(text)],
                Ok(None) => vec![],
                Err(e) => {
                    error!(error = %e, "top karma query failed");
                    vec![]
                }
            },
            Classification::Awards(awards) => awards
                .iter()
                .filter_map(|award| {
                    match self.engine.award(&msg.sender, &award.name, award.kind) {
                        Ok(text) => Some(reply(text)),
                        Err(e) => {
                            error!(
                                error = %e,
                                name = %award.name,
                                kind = %award.kind,
                                "karma award failed"
                            );
                            None
                        }
                    }
                })
                .collect(),
            Classification::Unmatched => {
                debug!(sender = %msg.sender, "message ignored");
                vec![]
            }
        }
    }
}
