//! Store configuration.

/// Configuration supplied once at store construction.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum records kept per (user, chain) partition; `None` keeps all.
    ///
    /// The bound truncates the whole partition on every insert, not only
    /// completed records — submitting more than the bound in quick
    /// succession can evict a still-pending record.
    pub max_completed_transactions: Option<usize>,
    /// Default confirmation threshold for new transactions.
    pub min_confirmations: u32,
    /// Storage key identifying the persisted table (e.g. the file name for
    /// a JSON file backend).
    pub persistence_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_completed_transactions: Some(50),
            min_confirmations: 1,
            persistence_key: "transactions".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StoreConfig::default();
        assert_eq!(config.max_completed_transactions, Some(50));
        assert_eq!(config.min_confirmations, 1);
        assert_eq!(config.persistence_key, "transactions");
    }
}
