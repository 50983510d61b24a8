//! # karmanator-core
//!
//! Core types and primitives for the Karmanator karma bot.
//! This crate defines the shared vocabulary used by every other crate in the workspace.

pub mod error;
pub mod types;

pub use error::{KarmaError, Result};
pub use types::*;
