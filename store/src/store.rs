//! The transaction store — keyed, persistent, event-driven.
//!
//! One store instance owns the partitioned table, an event emitter and the
//! pending-watch registry. Mutations always re-read the persisted table
//! first, apply a pure partition transform, write back and refresh the
//! in-memory snapshot. Writers within one process are serialized (the whole
//! read-modify-write cycle runs under one lock); across processes sharing
//! the same backing store the model is last-writer-wins (eventual, not
//! linearizable, consistency).

use crate::client::{ChainClient, Receipt};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::events::{event, StoreEvent};
use crate::watcher::{self, WatchRegistry};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use txwatch_emitter::{EventEmitter, Handler, Subscription};
use txwatch_storage::{PartitionedTable, TableStorage};
use txwatch_types::{
    ChainId, NewTransaction, Timestamp, TransactionRecord, TxHash, TxStatus, UserAddress,
};

/// The active (user, chain, client) triple.
///
/// Replaced wholesale on `mount`/`unmount`; every context-dependent
/// operation reads it once at the start of the call.
#[derive(Clone)]
pub struct StoreContext {
    pub user: UserAddress,
    pub chain_id: ChainId,
    pub client: Arc<dyn ChainClient>,
}

/// In-memory snapshot of the persisted table plus the per-partition `Arc`
/// slices handed to readers. Snapshots are invalidated on every table
/// replacement, so reads of an unchanged partition stay pointer-equal
/// (reference-based change detection in consumers).
pub(crate) struct TableCache {
    table: PartitionedTable,
    snapshots: BTreeMap<(UserAddress, ChainId), Arc<[TransactionRecord]>>,
}

impl TableCache {
    fn new(table: PartitionedTable) -> Self {
        Self {
            table,
            snapshots: BTreeMap::new(),
        }
    }

    fn replace(&mut self, table: PartitionedTable) {
        self.table = table;
        self.snapshots.clear();
    }
}

pub(crate) struct Inner {
    pub(crate) config: StoreConfig,
    pub(crate) storage: Arc<dyn TableStorage>,
    /// Guards the cached table. Writers hold this lock for their whole
    /// load-transform-save cycle, so in-process mutations are serialized;
    /// last-writer-wins only applies across processes.
    pub(crate) table: Mutex<TableCache>,
    pub(crate) ctx: Mutex<Option<StoreContext>>,
    pub(crate) emitter: EventEmitter<StoreEvent>,
    pub(crate) watches: Mutex<WatchRegistry>,
    /// Shared empty snapshot for missing and empty partitions.
    empty: Arc<[TransactionRecord]>,
}

impl Inner {
    /// The single write path: re-read the persisted table (another process
    /// may have written it), apply `transform`, and persist only if the
    /// transform reports a change. The table lock is held throughout, so a
    /// concurrent writer in this process cannot interleave its own cycle
    /// and overwrite this one's result.
    pub(crate) fn mutate<T>(
        &self,
        transform: impl FnOnce(&mut PartitionedTable) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        let mut cache = self.table.lock().unwrap();
        let mut table = self.storage.load()?;
        match transform(&mut table) {
            Some(out) => {
                self.storage.save(&table)?;
                cache.replace(table);
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }

    /// Apply a confirmed receipt to the partition captured at watch
    /// creation. A record removed or cleared in the meantime is not
    /// resurrected and emits nothing.
    pub(crate) fn apply_receipt(
        &self,
        user: &UserAddress,
        chain: ChainId,
        receipt: Receipt,
    ) -> Result<(), StoreError> {
        let status = TxStatus::from(receipt.status);
        let updated =
            self.mutate(|table| table.resolve(user, chain, receipt.transaction_hash, status))?;
        match updated {
            Some(tx) => {
                tracing::debug!(hash = %tx.hash, chain = %chain, status = %tx.status, "transaction resolved");
                self.emitter.emit(StoreEvent::Updated(tx));
            }
            None => {
                tracing::debug!(hash = %receipt.transaction_hash, chain = %chain, "resolved transaction no longer tracked");
            }
        }
        Ok(())
    }

    fn context(&self) -> Result<StoreContext, StoreError> {
        self.ctx.lock().unwrap().clone().ok_or(StoreError::NotMounted)
    }
}

/// A keyed, persistent, event-driven cache of transaction records.
///
/// Cheap to clone; clones share the same state. Background confirmation
/// watches are spawned on the ambient tokio runtime, so the store must be
/// used from within one.
#[derive(Clone)]
pub struct TransactionsStore {
    inner: Arc<Inner>,
}

impl TransactionsStore {
    /// Create a store over the given persistence adapter, loading the
    /// current table. Adapter failures propagate.
    pub fn new(storage: Arc<dyn TableStorage>, config: StoreConfig) -> Result<Self, StoreError> {
        let table = storage.load()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                storage,
                table: Mutex::new(TableCache::new(table)),
                ctx: Mutex::new(None),
                emitter: EventEmitter::new(),
                watches: Mutex::new(WatchRegistry::new()),
                empty: Vec::new().into(),
            }),
        })
    }

    /// Set the active (user, chain, client) context, re-read the table from
    /// persistence, re-attach a confirmation watch for every pending record
    /// in the mounted partition and emit `mounted` with the partition's
    /// current sequence.
    ///
    /// Mounting again simply replaces the context; watches in flight from a
    /// previous context continue and resolve against the (user, chain) they
    /// were created for.
    pub fn mount(
        &self,
        client: Arc<dyn ChainClient>,
        user: UserAddress,
        chain_id: ChainId,
    ) -> Result<(), StoreError> {
        let inner = &self.inner;
        let partition = {
            let mut cache = inner.table.lock().unwrap();
            let table = inner.storage.load()?;
            cache.replace(table);
            cache
                .table
                .partition(&user, chain_id)
                .map(<[TransactionRecord]>::to_vec)
        };

        *inner.ctx.lock().unwrap() = Some(StoreContext {
            user: user.clone(),
            chain_id,
            client: Arc::clone(&client),
        });

        if let Some(records) = &partition {
            for tx in records.iter().filter(|tx| tx.is_pending()) {
                watcher::spawn_watch(inner, &client, &user, tx);
            }
        }

        tracing::debug!(user = %user, chain = %chain_id, "store mounted");
        inner.emitter.emit(StoreEvent::Mounted(partition));
        Ok(())
    }

    /// Clear the context, forget all pending watches and drop every emitter
    /// subscription.
    ///
    /// The underlying receipt waits are not cancelled — only the local
    /// bookkeeping forgets them. A watch resolving afterwards still updates
    /// the persisted table of whichever partition it belongs to.
    pub fn unmount(&self) {
        *self.inner.ctx.lock().unwrap() = None;
        let forgotten = {
            let mut watches = self.inner.watches.lock().unwrap();
            let count = watches.len();
            watches.clear();
            count
        };
        self.inner.emitter.clear();
        tracing::debug!(forgotten_watches = forgotten, "store unmounted");
    }

    /// Validate and insert a new transaction into the mounted partition,
    /// persist, emit `added` and schedule a confirmation watch.
    ///
    /// The record is prepended; any prior record with the same hash is
    /// replaced, and the partition is truncated to the configured bound.
    /// Returns the stored record.
    pub fn add_transaction(&self, new_tx: NewTransaction) -> Result<TransactionRecord, StoreError> {
        let ctx = self.inner.context()?;
        let hash: TxHash = new_tx.hash.parse().map_err(StoreError::InvalidHash)?;

        let record = TransactionRecord {
            hash,
            status: TxStatus::Pending,
            min_confirmations: new_tx
                .min_confirmations
                .unwrap_or(self.inner.config.min_confirmations),
            chain_id: new_tx.chain_id.unwrap_or(ctx.chain_id),
            sent_at: Timestamp::now(),
            meta: new_tx.meta.unwrap_or_default(),
        };

        let bound = self.inner.config.max_completed_transactions;
        self.inner.mutate(|table| {
            table.upsert_front(&ctx.user, record.clone(), bound);
            Some(())
        })?;

        tracing::debug!(hash = %record.hash, chain = %record.chain_id, "transaction added");
        self.inner.emitter.emit(StoreEvent::Added(record.clone()));
        watcher::spawn_watch(&self.inner, &ctx.client, &ctx.user, &record);
        Ok(record)
    }

    /// The mounted partition's record sequence, most-recent-first.
    ///
    /// Pure read of the in-memory snapshot. Fails with
    /// [`StoreError::NotMounted`] before `mount`.
    pub fn get_transactions(&self) -> Result<Arc<[TransactionRecord]>, StoreError> {
        let ctx = self.inner.context()?;
        Ok(self.get_transactions_for(&ctx.user, ctx.chain_id))
    }

    /// The record sequence for an explicit (user, chain) partition.
    ///
    /// Repeated reads of an unchanged partition return the same allocation;
    /// missing and empty partitions share one empty allocation. A mutation
    /// invalidates the partition's snapshot, so consumers can detect change
    /// by reference.
    pub fn get_transactions_for(
        &self,
        user: &UserAddress,
        chain_id: ChainId,
    ) -> Arc<[TransactionRecord]> {
        let mut cache = self.inner.table.lock().unwrap();
        let key = (user.clone(), chain_id);
        if let Some(snapshot) = cache.snapshots.get(&key) {
            return Arc::clone(snapshot);
        }
        let snapshot = match cache.table.partition(user, chain_id) {
            Some(records) if !records.is_empty() => Arc::<[TransactionRecord]>::from(records),
            _ => return Arc::clone(&self.inner.empty),
        };
        cache.snapshots.insert(key, Arc::clone(&snapshot));
        snapshot
    }

    /// Remove a transaction by hash from the mounted partition.
    ///
    /// A no-op for unknown hashes: no event, table untouched. Does not
    /// cancel an in-flight watch for that hash; a later resolution is
    /// silently dropped. Returns the removed record, if any.
    pub fn remove_transaction(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let ctx = self.inner.context()?;
        self.remove_transaction_for(hash, &ctx.user, ctx.chain_id)
    }

    /// Remove a transaction by hash from an explicit partition.
    pub fn remove_transaction_for(
        &self,
        hash: TxHash,
        user: &UserAddress,
        chain_id: ChainId,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let removed = self
            .inner
            .mutate(|table| table.remove(user, chain_id, hash))?;
        if let Some(tx) = &removed {
            tracing::debug!(hash = %tx.hash, chain = %chain_id, "transaction removed");
            self.inner.emitter.emit(StoreEvent::Removed(tx.clone()));
        }
        Ok(removed)
    }

    /// Replace the mounted partition's sequence with empty, persist and
    /// emit `cleared`.
    pub fn clear_transactions(&self) -> Result<(), StoreError> {
        let ctx = self.inner.context()?;
        self.clear_transactions_for(&ctx.user, ctx.chain_id)
    }

    /// Clear an explicit partition.
    pub fn clear_transactions_for(
        &self,
        user: &UserAddress,
        chain_id: ChainId,
    ) -> Result<(), StoreError> {
        self.inner.mutate(|table| {
            table.clear_partition(user, chain_id);
            Some(())
        })?;
        tracing::debug!(user = %user, chain = %chain_id, "partition cleared");
        self.inner.emitter.emit(StoreEvent::Cleared);
        Ok(())
    }

    /// Subscribe to a single event by name (see [`crate::events::event`]).
    pub fn on(
        &self,
        event: &str,
        handler: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> Subscription<StoreEvent> {
        self.inner.emitter.on_fn(event, handler)
    }

    /// Subscribe to a single delivery of one event.
    pub fn once(
        &self,
        event: &str,
        handler: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> Subscription<StoreEvent> {
        self.inner.emitter.once(event, Arc::new(handler))
    }

    /// Subscribe `callback` to every table-changing event (`added`,
    /// `updated`, `removed`, `cleared`). Paired with
    /// [`TransactionsStore::get_transactions`] this forms the
    /// subscribe-with-snapshot shape reactive bindings expect.
    pub fn on_transactions_change(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> ChangeSubscription {
        let handler: Handler<StoreEvent> = Arc::new(move |_| callback());
        let subs = [event::UPDATED, event::ADDED, event::REMOVED, event::CLEARED]
            .into_iter()
            .map(|name| self.inner.emitter.on(name, Arc::clone(&handler)))
            .collect();
        ChangeSubscription { subs }
    }

    /// Whether a confirmation watch is currently outstanding for `hash`.
    pub fn is_watching(&self, hash: TxHash) -> bool {
        self.inner.watches.lock().unwrap().contains(hash)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }
}

/// Aggregate unsubscribe for [`TransactionsStore::on_transactions_change`]:
/// one call removes all four underlying registrations.
pub struct ChangeSubscription {
    subs: Vec<Subscription<StoreEvent>>,
}

impl ChangeSubscription {
    pub fn unsubscribe(self) {
        for sub in self.subs {
            sub.unsubscribe();
        }
    }
}
