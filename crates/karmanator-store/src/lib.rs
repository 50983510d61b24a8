//! # karmanator-store
//!
//! Persistence for karma counters. The store file is the sole source of
//! truth: every read loads it fresh and every award rewrites it whole.

pub mod backend;
pub mod store;

pub use backend::KarmaBackend;
pub use store::KarmaStore;
