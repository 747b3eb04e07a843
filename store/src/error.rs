use thiserror::Error;
use txwatch_storage::StorageError;
use txwatch_types::TypeError;

/// Errors surfaced synchronously by store operations.
///
/// There is no error event channel: observers only ever see state-changing
/// events, and every failure is returned from the call that triggered it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A context-dependent operation was invoked without an active context.
    #[error("transaction store not mounted")]
    NotMounted,

    /// Malformed transaction hash supplied to `add_transaction`.
    #[error("invalid transaction hash")]
    InvalidHash(#[source] TypeError),

    /// Persistence adapter failure; not caught or retried by the store.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
