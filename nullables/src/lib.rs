//! Nullable infrastructure for deterministic testing.
//!
//! In-memory stand-ins for the store's external capabilities, wired through
//! the same public traits the real backends implement.

pub mod client;
pub mod storage;

pub use client::NullChainClient;
pub use storage::NullStorage;
