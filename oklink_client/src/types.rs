use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// Chain segment of every explorer path. Only Tron is scraped.
pub const CHAIN_SEGMENT: &str = "tron";

/// Logical explorer page for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// `/tron/address/{address}`
    Main,
    /// `/tron/address/{address}/token-transfer`
    TokenTransfer,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Main => "main",
            PageKind::TokenTransfer => "token-transfer",
        }
    }

    /// Build the path suffix for this page. An empty locale yields the canonical path.
    pub fn path(&self, address: &str, locale: &str) -> String {
        let mut path = String::new();
        if !locale.is_empty() {
            path.push('/');
            path.push_str(locale);
        }
        path.push('/');
        path.push_str(CHAIN_SEGMENT);
        path.push_str("/address/");
        path.push_str(address);
        if *self == PageKind::TokenTransfer {
            path.push_str("/token-transfer");
        }
        path
    }
}

/// One entity tag as reported by the explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTag {
    pub text: Option<String>,
    pub category: Option<String>,
}

/// Flat per-address summary. Every field is independently optional; the two
/// source pages are fetched separately so one field's presence implies nothing
/// about another's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub address: Option<String>,

    // Tagging
    pub entity_tag: Option<String>,
    pub entity_tags: Vec<EntityTag>,
    pub risk_tags: Vec<String>,
    pub property_tags: Vec<String>,
    pub is_contract: Option<bool>,

    // Valuation
    pub total_usd_value: Option<f64>,
    /// Native TRX balance
    pub balance: Option<f64>,
    /// Sourced from the token-transfer page
    pub usdt_holding: Option<f64>,

    // First inbound transfer
    pub first_entry_from_address: Option<String>,
    pub first_entry_time: Option<i64>,
    pub first_entry_amount: Option<f64>,
    pub first_entry_tx_hash: Option<String>,

    // Aggregate activity
    pub total_tx_amount: Option<f64>,
    pub first_tx_time: Option<i64>,
    pub first_tx_hash: Option<String>,
    pub last_tx_time: Option<i64>,
    pub last_tx_hash: Option<String>,
}

impl SummaryRecord {
    pub fn first_entry_datetime(&self) -> Option<DateTime<Utc>> {
        self.first_entry_time.and_then(epoch_to_datetime)
    }

    pub fn first_tx_datetime(&self) -> Option<DateTime<Utc>> {
        self.first_tx_time.and_then(epoch_to_datetime)
    }

    pub fn last_tx_datetime(&self) -> Option<DateTime<Utc>> {
        self.last_tx_time.and_then(epoch_to_datetime)
    }
}

/// Interpret an explorer timestamp for display. The explorer reports epoch
/// milliseconds; values that only make sense as seconds are read as seconds.
pub fn epoch_to_datetime(value: i64) -> Option<DateTime<Utc>> {
    // 1e11 ms is early 1973, 1e11 s is the year 5138
    if value.abs() >= 100_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

/// Result of one address in a batch lookup
#[derive(Debug)]
pub struct AddressLookup {
    pub address: String,
    pub result: Result<SummaryRecord, ExplorerError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_paths() {
        assert_eq!(
            PageKind::Main.path("TAbc", "zh-hans"),
            "/zh-hans/tron/address/TAbc"
        );
        assert_eq!(PageKind::Main.path("TAbc", ""), "/tron/address/TAbc");
        assert_eq!(
            PageKind::TokenTransfer.path("TAbc", "zh-hans"),
            "/zh-hans/tron/address/TAbc/token-transfer"
        );
        assert_eq!(
            PageKind::TokenTransfer.path("TAbc", ""),
            "/tron/address/TAbc/token-transfer"
        );
    }

    #[test]
    fn test_epoch_to_datetime_handles_millis_and_seconds() {
        let from_ms = epoch_to_datetime(1_700_000_000_000).unwrap();
        let from_s = epoch_to_datetime(1_700_000_000).unwrap();
        assert_eq!(from_ms, from_s);
        assert_eq!(from_ms.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_default_record_is_empty() {
        let record = SummaryRecord::default();
        assert!(record.address.is_none());
        assert!(record.risk_tags.is_empty());
        assert!(record.is_contract.is_none());
        assert!(record.first_tx_datetime().is_none());
    }
}
