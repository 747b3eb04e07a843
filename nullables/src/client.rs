//! Nullable chain client — receipt resolution controlled by the test.

use futures_util::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use txwatch_store::{ChainClient, ClientError, Receipt, ReceiptStatus};
use txwatch_types::TxHash;

type Waiter = oneshot::Sender<Result<Receipt, ClientError>>;

struct ClientState {
    waiters: HashMap<TxHash, Vec<Waiter>>,
    /// Every `wait_for_receipt` invocation, in order.
    calls: Vec<(TxHash, u32)>,
}

/// A [`ChainClient`] whose receipt waits resolve only when the test says so.
///
/// Clones share state, so the client handed to the store and the handle the
/// test resolves through are the same instance.
#[derive(Clone)]
pub struct NullChainClient {
    state: Arc<Mutex<ClientState>>,
}

impl NullChainClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClientState {
                waiters: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Resolve every outstanding wait for `hash` with a receipt.
    pub fn resolve(&self, hash: TxHash, status: ReceiptStatus) {
        let waiters = self
            .state
            .lock()
            .unwrap()
            .waiters
            .remove(&hash)
            .unwrap_or_default();
        for waiter in waiters {
            let _ = waiter.send(Ok(Receipt {
                transaction_hash: hash,
                status,
            }));
        }
    }

    /// Reject every outstanding wait for `hash` with a transport error.
    pub fn reject(&self, hash: TxHash) {
        let waiters = self
            .state
            .lock()
            .unwrap()
            .waiters
            .remove(&hash)
            .unwrap_or_default();
        for waiter in waiters {
            let _ = waiter.send(Err(ClientError::Transport(
                "rejected by null client".into(),
            )));
        }
    }

    /// How many receipt waits were issued for `hash`.
    pub fn wait_invocations(&self, hash: TxHash) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(h, _)| *h == hash)
            .count()
    }

    /// The confirmation threshold of the most recent wait for `hash`.
    pub fn last_confirmations(&self, hash: TxHash) -> Option<u32> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find(|(h, _)| *h == hash)
            .map(|(_, confirmations)| *confirmations)
    }

    /// Whether a wait is currently outstanding for `hash`.
    pub fn has_waiter(&self, hash: TxHash) -> bool {
        self.state
            .lock()
            .unwrap()
            .waiters
            .get(&hash)
            .is_some_and(|w| !w.is_empty())
    }
}

impl Default for NullChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainClient for NullChainClient {
    fn wait_for_receipt(
        &self,
        hash: TxHash,
        confirmations: u32,
    ) -> BoxFuture<'static, Result<Receipt, ClientError>> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push((hash, confirmations));
            state.waiters.entry(hash).or_default().push(tx);
        }
        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(ClientError::Transport("null client dropped".into())))
        })
    }
}
