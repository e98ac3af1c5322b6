use chrono::{DateTime, Utc};
use oklink_client::{AddressLookup, ExplorerError, SummaryRecord};
use serde_json::{json, Value};

const EMPTY_CELL: &str = "—";

fn error_kind(error: &ExplorerError) -> &'static str {
    match error {
        ExplorerError::Transport(_) => "transport",
        ExplorerError::FetchFailure { .. } => "fetch_failure",
        ExplorerError::StateNotFound => "state_not_found",
        ExplorerError::StateParse(_) => "state_parse",
        ExplorerError::InvalidRequest(_) => "invalid_request",
    }
}

pub fn to_json(results: &[AddressLookup]) -> serde_json::Result<String> {
    let rows: Vec<Value> = results
        .iter()
        .map(|lookup| match &lookup.result {
            Ok(record) => json!({
                "address": lookup.address,
                "record": record,
            }),
            Err(e) => json!({
                "address": lookup.address,
                "error": {
                    "kind": error_kind(e),
                    "status": e.status(),
                    "message": e.to_string(),
                },
            }),
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn time_cell(value: Option<DateTime<Utc>>) -> String {
    cell(value.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC")))
}

fn list_cell(values: &[String]) -> String {
    if values.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        values.join(", ")
    }
}

fn record_rows(record: &SummaryRecord) -> Vec<(&'static str, String)> {
    let entity_tags: Vec<String> = record
        .entity_tags
        .iter()
        .map(|tag| match (&tag.text, &tag.category) {
            (Some(text), Some(category)) => format!("{} ({})", text, category),
            (Some(text), None) => text.clone(),
            (None, Some(category)) => format!("({})", category),
            (None, None) => EMPTY_CELL.to_string(),
        })
        .collect();

    vec![
        ("entity tag", cell(record.entity_tag.as_deref())),
        ("entity tags", list_cell(&entity_tags)),
        ("risk tags", list_cell(&record.risk_tags)),
        ("property tags", list_cell(&record.property_tags)),
        ("contract", cell(record.is_contract)),
        ("total usd value", cell(record.total_usd_value)),
        ("trx balance", cell(record.balance)),
        ("usdt holding", cell(record.usdt_holding)),
        ("first entry from", cell(record.first_entry_from_address.as_deref())),
        ("first entry time", time_cell(record.first_entry_datetime())),
        ("first entry amount", cell(record.first_entry_amount)),
        ("first entry tx", cell(record.first_entry_tx_hash.as_deref())),
        ("total tx amount", cell(record.total_tx_amount)),
        ("first tx time", time_cell(record.first_tx_datetime())),
        ("first tx", cell(record.first_tx_hash.as_deref())),
        ("last tx time", time_cell(record.last_tx_datetime())),
        ("last tx", cell(record.last_tx_hash.as_deref())),
    ]
}

/// Human-readable block per address; absent values render as "—".
pub fn to_table(results: &[AddressLookup]) -> String {
    let mut out = String::new();
    for lookup in results {
        out.push_str(&format!("== {}\n", lookup.address));
        match &lookup.result {
            Ok(record) => {
                for (label, value) in record_rows(record) {
                    out.push_str(&format!("  {:<20} {}\n", label, value));
                }
            }
            Err(e) => out.push_str(&format!("  lookup failed: {}\n", e)),
        }
    }
    out.trim_end().to_string()
}
