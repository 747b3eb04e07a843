//! The partitioned transaction table — the sole persisted aggregate.
//!
//! Maps user address → chain id → ordered records, most-recent-first.
//! All mutations are pure partition transforms; the store decides when to
//! re-load and persist around them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use txwatch_types::{ChainId, TransactionRecord, TxHash, TxStatus, UserAddress};

/// user → chain → most-recent-first record sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionedTable {
    users: BTreeMap<UserAddress, BTreeMap<ChainId, Vec<TransactionRecord>>>,
}

impl PartitionedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record sequence for one (user, chain) partition, if any.
    pub fn partition(&self, user: &UserAddress, chain: ChainId) -> Option<&[TransactionRecord]> {
        self.users
            .get(user)
            .and_then(|chains| chains.get(&chain))
            .map(Vec::as_slice)
    }

    /// Find a record by hash within one partition.
    pub fn find(
        &self,
        user: &UserAddress,
        chain: ChainId,
        hash: TxHash,
    ) -> Option<&TransactionRecord> {
        self.partition(user, chain)?.iter().find(|tx| tx.hash == hash)
    }

    /// Replace one partition's sequence with the result of `set`, creating
    /// the partition lazily. The transform receives the current sequence
    /// (empty if the partition does not exist yet).
    pub fn update_partition(
        &mut self,
        user: &UserAddress,
        chain: ChainId,
        set: impl FnOnce(Vec<TransactionRecord>) -> Vec<TransactionRecord>,
    ) {
        let chains = self.users.entry(user.clone()).or_default();
        let current = chains.remove(&chain).unwrap_or_default();
        chains.insert(chain, set(current));
    }

    /// Insert `record` at the front of its partition, removing any prior
    /// record with the same hash, then truncate the partition to `bound`
    /// entries (`None` keeps everything). The bound applies to the whole
    /// partition regardless of status, so it can evict an older pending
    /// record once the partition grows past the limit.
    pub fn upsert_front(
        &mut self,
        user: &UserAddress,
        record: TransactionRecord,
        bound: Option<usize>,
    ) {
        let chain = record.chain_id;
        self.update_partition(user, chain, |mut txs| {
            txs.retain(|tx| tx.hash != record.hash);
            txs.insert(0, record);
            if let Some(bound) = bound {
                txs.truncate(bound);
            }
            txs
        });
    }

    /// Remove a record by hash. Returns the removed record, or `None` if the
    /// partition holds no record with that hash (table unchanged).
    pub fn remove(
        &mut self,
        user: &UserAddress,
        chain: ChainId,
        hash: TxHash,
    ) -> Option<TransactionRecord> {
        let chains = self.users.get_mut(user)?;
        let txs = chains.get_mut(&chain)?;
        let idx = txs.iter().position(|tx| tx.hash == hash)?;
        Some(txs.remove(idx))
    }

    /// Replace one partition's sequence with empty.
    pub fn clear_partition(&mut self, user: &UserAddress, chain: ChainId) {
        self.update_partition(user, chain, |_| Vec::new());
    }

    /// Set the status of the record with `hash` and move it to the front of
    /// its partition. Returns the updated record, or `None` if the partition
    /// no longer contains that hash (removed or cleared meanwhile — the
    /// record is not resurrected).
    pub fn resolve(
        &mut self,
        user: &UserAddress,
        chain: ChainId,
        hash: TxHash,
        status: TxStatus,
    ) -> Option<TransactionRecord> {
        let mut record = self.remove(user, chain, hash)?;
        record.status = status;
        let updated = record.clone();
        self.update_partition(user, chain, |mut txs| {
            txs.insert(0, record);
            txs
        });
        Some(updated)
    }

    pub fn is_empty(&self) -> bool {
        self.users
            .values()
            .all(|chains| chains.values().all(Vec::is_empty))
    }
}
