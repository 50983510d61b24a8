//! # karmanator-cli
//!
//! Command-line interface for the Karmanator bot.
//!
//! ## Commands
//!
//! - `karmanator start` — Connect to IRC and run the bot
//! - `karmanator chat` — Run the bot against the terminal
//! - `karmanator show <name>` — Print one name's karma
//! - `karmanator top` — Print the top karma list
//! - `karmanator config` — Show the effective configuration

pub mod commands;

pub use commands::Cli;
