//! Fundamental types for txwatch.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: transaction hashes, user addresses, chain ids, timestamps and
//! the transaction record itself.

pub mod address;
pub mod chain;
pub mod error;
pub mod hash;
pub mod record;
pub mod time;

pub use address::UserAddress;
pub use chain::ChainId;
pub use error::TypeError;
pub use hash::TxHash;
pub use record::{Meta, NewTransaction, TransactionRecord, TxStatus};
pub use time::Timestamp;
