//! Partitioned transaction table and the abstract storage trait.
//!
//! Every storage backend (JSON file, in-memory for testing) implements
//! [`TableStorage`]. The store crate depends only on the trait.

pub mod error;
pub mod table;

pub use error::StorageError;
pub use table::PartitionedTable;

/// Persistence adapter for the partitioned table.
///
/// The table is exclusively owned by the transaction store; an adapter only
/// serializes and deserializes it. The backing store may be shared with
/// other processes (e.g. another browser tab over the same file), so every
/// store mutation re-loads before writing back.
///
/// A missing or corrupt persisted value is not an error: `load` returns an
/// empty table for it. Genuine backend failures (I/O) propagate.
pub trait TableStorage: Send + Sync {
    fn load(&self) -> Result<PartitionedTable, StorageError>;
    fn save(&self, table: &PartitionedTable) -> Result<(), StorageError>;
}
