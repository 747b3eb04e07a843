//! Nullable storage — thread-safe in-memory table persistence for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use txwatch_storage::{PartitionedTable, StorageError, TableStorage};

/// An in-memory [`TableStorage`] for testing.
///
/// Clones share the same backing table, which makes a clone behave like a
/// second tab over the same persisted store. Failure injection covers the
/// adapter-error propagation paths.
#[derive(Clone)]
pub struct NullStorage {
    table: Arc<Mutex<PartitionedTable>>,
    fail_loads: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
}

impl NullStorage {
    pub fn new() -> Self {
        Self::with_table(PartitionedTable::new())
    }

    /// Start from a pre-populated table (a previously persisted store).
    pub fn with_table(table: PartitionedTable) -> Self {
        Self {
            table: Arc::new(Mutex::new(table)),
            fail_loads: Arc::new(AtomicBool::new(false)),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The currently persisted table.
    pub fn snapshot(&self) -> PartitionedTable {
        self.table.lock().unwrap().clone()
    }

    /// Overwrite the persisted table directly, as another process would.
    pub fn write_externally(&self, table: PartitionedTable) {
        *self.table.lock().unwrap() = table;
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl Default for NullStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStorage for NullStorage {
    fn load(&self) -> Result<PartitionedTable, StorageError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("null storage: load failure".into()));
        }
        Ok(self.table.lock().unwrap().clone())
    }

    fn save(&self, table: &PartitionedTable) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("null storage: save failure".into()));
        }
        *self.table.lock().unwrap() = table.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txwatch_types::{ChainId, Timestamp, TransactionRecord, TxHash, TxStatus, UserAddress};

    fn record() -> TransactionRecord {
        TransactionRecord {
            hash: TxHash::new([1; 32]),
            status: TxStatus::Pending,
            min_confirmations: 1,
            chain_id: ChainId::new(1),
            sent_at: Timestamp::new(0),
            meta: Default::default(),
        }
    }

    #[test]
    fn clones_share_the_backing_table() {
        let tab_a = NullStorage::new();
        let tab_b = tab_a.clone();

        let mut table = PartitionedTable::new();
        table.upsert_front(
            &UserAddress::new("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
            record(),
            None,
        );
        tab_a.save(&table).unwrap();

        assert_eq!(tab_b.load().unwrap(), table);
    }

    #[test]
    fn failure_injection() {
        let storage = NullStorage::new();
        storage.fail_loads(true);
        assert!(storage.load().is_err());

        storage.fail_loads(false);
        storage.fail_saves(true);
        assert!(storage.save(&PartitionedTable::new()).is_err());
        assert!(storage.load().is_ok());
    }
}
