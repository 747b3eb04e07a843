//! Transaction record — one tracked transaction.

use crate::{ChainId, Timestamp, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Caller-supplied annotations attached to a record.
///
/// Opaque to the store; consumers use it for display (labels, descriptions).
pub type Meta = BTreeMap<String, String>;

/// Outcome of a tracked transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted, no confirmed receipt yet.
    Pending,
    /// Mined and executed successfully.
    Success,
    /// Mined but execution reverted.
    Reverted,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStatus::Pending => "pending",
            TxStatus::Success => "success",
            TxStatus::Reverted => "reverted",
        };
        write!(f, "{s}")
    }
}

/// One tracked transaction, as stored in the partitioned table.
///
/// Within one (user, chain) partition the hash is unique; partitions are
/// ordered most-recent-first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub status: TxStatus,
    /// Confirmations required before the watch resolves.
    pub min_confirmations: u32,
    pub chain_id: ChainId,
    /// Submission time, milliseconds since epoch.
    pub sent_at: Timestamp,
    #[serde(default)]
    pub meta: Meta,
}

impl TransactionRecord {
    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }
}

/// Caller input for tracking a new transaction.
///
/// Everything but the hash is optional; the store fills in defaults from its
/// configuration and mounted context.
#[derive(Clone, Debug, Default)]
pub struct NewTransaction {
    /// `0x`-prefixed 64-hex-digit transaction hash.
    pub hash: String,
    /// Defaults to the mounted chain.
    pub chain_id: Option<ChainId>,
    pub meta: Option<Meta>,
    /// Defaults to the store's configured threshold.
    pub min_confirmations: Option<u32>,
}

impl NewTransaction {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TxStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&TxStatus::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&TxStatus::Reverted).unwrap(), "\"reverted\"");
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let record = TransactionRecord {
            hash: TxHash::ZERO,
            status: TxStatus::Pending,
            min_confirmations: 1,
            chain_id: ChainId::new(1),
            sent_at: Timestamp::new(1_700_000_000_000),
            meta: Meta::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("minConfirmations").is_some());
        assert!(json.get("chainId").is_some());
        assert!(json.get("sentAt").is_some());
    }

    #[test]
    fn record_without_meta_deserializes() {
        let json = format!(
            r#"{{"hash":"{}","status":"pending","minConfirmations":1,"chainId":1,"sentAt":0}}"#,
            TxHash::ZERO
        );
        let record: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert!(record.meta.is_empty());
    }
}
