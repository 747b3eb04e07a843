//! Chain client capability — the store's only view of the network.
//!
//! Receipt waiting (polling strategy, reorg handling, retries) belongs to
//! the client implementation; the store only awaits the final outcome.

use futures_util::future::BoxFuture;
use thiserror::Error;
use txwatch_types::{TxHash, TxStatus};

/// Outcome of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

impl From<ReceiptStatus> for TxStatus {
    fn from(status: ReceiptStatus) -> Self {
        match status {
            ReceiptStatus::Success => TxStatus::Success,
            ReceiptStatus::Reverted => TxStatus::Reverted,
        }
    }
}

/// The chain's record of a mined transaction.
#[derive(Clone, Debug)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub status: ReceiptStatus,
}

/// Errors from the receipt wait.
///
/// The store neither retries nor changes a record's status on failure; the
/// record stays pending until a consumer re-triggers a watch (e.g. by
/// remounting).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction {0} dropped or replaced")]
    TransactionDropped(TxHash),

    #[error("timed out waiting for receipt")]
    Timeout,
}

/// Awaits a transaction receipt confirmed to a given depth.
///
/// Implementations are shared across background watch tasks, hence the
/// `'static` boxed future and the `Send + Sync` bound.
pub trait ChainClient: Send + Sync {
    fn wait_for_receipt(
        &self,
        hash: TxHash,
        confirmations: u32,
    ) -> BoxFuture<'static, Result<Receipt, ClientError>>;
}
