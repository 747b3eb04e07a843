//! Confirmation-watch scheduling and the pending-watch registry.
//!
//! At most one watch is outstanding per hash process-wide, independent of
//! user and chain. The registry is consulted before spawning; a second
//! request while one is in flight attaches to the existing watch instead of
//! issuing a second receipt wait.
//!
//! Watches are detached tokio tasks. There is no cancellation primitive:
//! `unmount` only clears the registry, and a cleared watch may still
//! resolve and update the table of the partition captured at its creation.

use crate::client::ChainClient;
use crate::store::Inner;
use std::collections::HashMap;
use std::sync::Arc;
use txwatch_types::{TransactionRecord, TxHash, UserAddress};

/// In-memory bookkeeping of outstanding watches. Never persisted.
///
/// Entries carry a generation id so a watch that resolves after the
/// registry was cleared (and a new watch was attached for the same hash)
/// cannot evict its successor's entry.
pub(crate) struct WatchRegistry {
    entries: HashMap<TxHash, u64>,
    next_id: u64,
}

impl WatchRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn contains(&self, hash: TxHash) -> bool {
        self.entries.contains_key(&hash)
    }

    /// Register a new watch for `hash`. Returns `None` if one is already
    /// outstanding (the caller attaches to it), otherwise the generation id
    /// the watch task must present on completion.
    pub(crate) fn begin(&mut self, hash: TxHash) -> Option<u64> {
        if self.entries.contains_key(&hash) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(hash, id);
        Some(id)
    }

    /// Forget a resolved watch, but only if the entry still belongs to the
    /// presenting generation.
    pub(crate) fn complete(&mut self, hash: TxHash, id: u64) {
        if self.entries.get(&hash) == Some(&id) {
            self.entries.remove(&hash);
        }
    }

    /// Forget every watch without cancelling the underlying tasks.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Schedule a confirmation watch for `tx` unless one is already
/// outstanding for its hash. The watch resolves against the (user, chain)
/// captured here, unaffected by later context changes.
pub(crate) fn spawn_watch(
    inner: &Arc<Inner>,
    client: &Arc<dyn ChainClient>,
    user: &UserAddress,
    tx: &TransactionRecord,
) {
    let hash = tx.hash;
    let mut watches = inner.watches.lock().unwrap();
    let id = match watches.begin(hash) {
        Some(id) => id,
        None => return,
    };

    let wait = client.wait_for_receipt(hash, tx.min_confirmations);
    let user = user.clone();
    let chain = tx.chain_id;
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        match wait.await {
            Ok(receipt) => {
                if let Err(e) = inner.apply_receipt(&user, chain, receipt) {
                    tracing::warn!(hash = %hash, chain = %chain, "failed to apply receipt: {e}");
                }
            }
            // Not retried; the record stays pending until a remount
            // re-attaches a watch.
            Err(e) => {
                tracing::warn!(hash = %hash, chain = %chain, "receipt wait failed: {e}");
            }
        }
        inner.watches.lock().unwrap().complete(hash, id);
    });
}
