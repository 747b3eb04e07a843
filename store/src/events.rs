//! Store events delivered through the owned event emitter.

use txwatch_emitter::EventKey;
use txwatch_types::TransactionRecord;

/// Event-name strings, usable with [`crate::TransactionsStore::on`].
pub mod event {
    pub const MOUNTED: &str = "mounted";
    pub const ADDED: &str = "added";
    pub const UPDATED: &str = "updated";
    pub const REMOVED: &str = "removed";
    pub const CLEARED: &str = "cleared";
}

/// A state change emitted by the transaction store.
#[derive(Clone, Debug)]
pub enum StoreEvent {
    /// The store was mounted; carries the mounted partition's current
    /// sequence, absent when the partition has never been written.
    Mounted(Option<Vec<TransactionRecord>>),
    /// A transaction was inserted.
    Added(TransactionRecord),
    /// A watched transaction's status was resolved.
    Updated(TransactionRecord),
    /// A transaction was explicitly removed.
    Removed(TransactionRecord),
    /// A partition was cleared.
    Cleared,
}

impl EventKey for StoreEvent {
    fn key(&self) -> &'static str {
        match self {
            StoreEvent::Mounted(_) => event::MOUNTED,
            StoreEvent::Added(_) => event::ADDED,
            StoreEvent::Updated(_) => event::UPDATED,
            StoreEvent::Removed(_) => event::REMOVED,
            StoreEvent::Cleared => event::CLEARED,
        }
    }
}
