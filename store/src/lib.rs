//! The txwatch transaction store.
//!
//! Tracks transactions submitted by a user across accounts and chains,
//! persists them through a [`txwatch_storage::TableStorage`] adapter,
//! watches pending ones to completion via a [`ChainClient`] and emits
//! change events so dependent consumers can stay in sync.
//!
//! The store runs background confirmation watches on the ambient tokio
//! runtime; construct and drive it from within one.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod store;

mod watcher;

pub use client::{ChainClient, ClientError, Receipt, ReceiptStatus};
pub use config::StoreConfig;
pub use error::StoreError;
pub use events::{event, StoreEvent};
pub use store::{ChangeSubscription, StoreContext, TransactionsStore};

pub use txwatch_emitter::Subscription;
