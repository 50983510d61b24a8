//! # karmanator-runtime
//!
//! The bot runtime — turns chat messages into karma awards and query replies.
//!
//! ```text
//!              ┌─────────────┐
//!              │   Channels   │  ← IRC, terminal
//!              └──────┬───────┘
//!                     │ IncomingMessage (one at a time)
//!                     ▼
//!              ┌──────────────┐
//!              │  Dispatcher  │
//!              │              │
//!              │ 1. Classify  │  ← !karma / !topkarma / name++ tokens
//!              │ 2. Apply     │  ← KarmaEngine: load → update → save
//!              │ 3. Reply     │  ← OutgoingMessage to the room
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐
//!              │  KarmaStore  │  ← karma.yaml
//!              └──────────────┘
//! ```

pub mod classifier;
pub mod dispatcher;
pub mod engine;
pub mod runtime;

pub use classifier::{Classification, classify};
pub use dispatcher::Dispatcher;
pub use engine::{KarmaEngine, TOP_COUNT, rank};
pub use runtime::BotRuntime;
