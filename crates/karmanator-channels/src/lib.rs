//! # karmanator-channels
//!
//! Channel adapter system. Each adapter bridges a chat transport to the
//! Karmanator runtime: it delivers incoming messages as [`ChannelEvent`]s and
//! sends replies back to a room.
//!
//! | Channel  | Use                                       |
//! |----------|-------------------------------------------|
//! | IRC      | `karmanator start` — the real deployment  |
//! | Terminal | `karmanator chat` — try the bot locally   |

pub mod adapter;
pub mod irc;
pub mod terminal;

pub use adapter::{Channel, ChannelEvent, IncomingMessage, OutgoingMessage};
