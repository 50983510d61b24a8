//! # karmanator-config
//!
//! Configuration system for the Karmanator bot. Reads from `karmanator.toml`
//! and environment variables, in that precedence order.

pub mod schema;
pub mod loader;

pub use schema::KarmaConfig;
pub use schema::{ConfigWarning, IrcConfig, LoggingConfig, StoreConfig, WarningSeverity};
pub use loader::ConfigLoader;
