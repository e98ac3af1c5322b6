//! Projection of the explorer's untyped page state into a [`SummaryRecord`].
//!
//! The page state is controlled by a third party and changes without notice,
//! so every read goes through [`json_path`] and falls back to `None` / empty.
//! All knowledge of the upstream shape lives in this module.

use serde_json::Value;
use tracing::debug;

use crate::types::{EntityTag, SummaryRecord};

const PAGE_STATE: &[&str] = &["appContext", "initialProps", "store", "pageState"];
const OVERVIEW_STORE: &str = "overviewStore";
const TOKEN_TRANSFER_STORE: &str = "tokenTransferStore";

const LABEL_KEYS: &[&str] = &["text", "name", "label"];
const CATEGORY_KEYS: &[&str] = &["category", "type"];

/// Walk `keys` through nested objects. Any missing key or non-object
/// intermediate yields `None`.
pub fn json_path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .try_fold(value, |node, key| node.as_object()?.get(*key))
}

fn child<'a>(node: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    node.and_then(|n| n.get(key))
}

/// Read `key` through `convert`. A present, non-null value of the wrong type
/// is discarded with a debug line so upstream shape drift stays visible.
fn leaf_at<T>(
    node: Option<&Value>,
    key: &str,
    expected: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = child(node, key)?;
    let converted = convert(value);
    if converted.is_none() && !value.is_null() {
        debug!("Discarding '{}': expected {}, got {}", key, expected, value);
    }
    converted
}

fn string_at(node: Option<&Value>, key: &str) -> Option<String> {
    leaf_at(node, key, "string", |v| v.as_str().map(str::to_string))
        .filter(|s| !s.is_empty())
}

fn number_at(node: Option<&Value>, key: &str) -> Option<f64> {
    leaf_at(node, key, "number", Value::as_f64)
}

/// Integral JSON number as `i64`. Serializers sometimes write epoch
/// timestamps as `1609459200000.0`; those are accepted, fractions are not.
fn as_integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        let f = value.as_f64()?;
        // i64::MAX as f64 rounds up to 2^63, which is out of range
        let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
        (f.fract() == 0.0 && in_range).then_some(f as i64)
    })
}

fn integer_at(node: Option<&Value>, key: &str) -> Option<i64> {
    leaf_at(node, key, "integer", as_integral)
}

fn first_label(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Plain list of non-empty labels. Accepts strings and objects carrying the
/// label under `text`, `name` or `label` (first non-empty wins). Anything else
/// is dropped; a non-array input gives an empty list.
pub fn normalize_tag_list(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(object) => first_label(object, LABEL_KEYS),
            _ => None,
        })
        .collect()
}

/// Entity tags keep their category alongside the display text.
pub fn normalize_entity_tags(value: Option<&Value>) -> Vec<EntityTag> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(EntityTag {
                text: Some(s.clone()),
                category: None,
            }),
            Value::Object(object) => {
                let tag = EntityTag {
                    text: first_label(object, LABEL_KEYS),
                    category: first_label(object, CATEGORY_KEYS),
                };
                (tag.text.is_some() || tag.category.is_some()).then_some(tag)
            }
            _ => None,
        })
        .collect()
}

/// Only a real JSON boolean counts; `"true"`, `1` and friends are unknown.
pub fn normalize_contract_flag(value: Option<&Value>) -> Option<bool> {
    let value = value?;
    let flag = value.as_bool();
    if flag.is_none() && !value.is_null() {
        debug!("Discarding non-boolean contract flag: {}", value);
    }
    flag
}

/// Merge the main profile state and the token-transfer state into one record.
/// Never fails: absent data is encoded as `None` / empty lists.
pub fn project(main_state: &Value, token_state: &Value) -> SummaryRecord {
    let overview = json_path(main_state, PAGE_STATE).and_then(|p| p.get(OVERVIEW_STORE));
    let info = child(overview, "info");
    let tag = child(overview, "tag");
    let tag_maps = child(tag, "tagMaps");

    let token_store =
        json_path(token_state, PAGE_STATE).and_then(|p| p.get(TOKEN_TRANSFER_STORE));
    let usdt_holding = number_at(token_store, "usdtHolding");

    SummaryRecord {
        address: string_at(info, "address"),

        entity_tag: string_at(tag, "entityTag"),
        entity_tags: normalize_entity_tags(child(tag_maps, "entityTags")),
        risk_tags: normalize_tag_list(child(tag_maps, "riskTags")),
        property_tags: normalize_tag_list(child(tag_maps, "propertyTags")),
        is_contract: normalize_contract_flag(child(tag, "isContract")),

        total_usd_value: number_at(info, "totalUsdValue"),
        balance: number_at(info, "balance"),
        usdt_holding,

        first_entry_from_address: string_at(info, "firstEntryFromAddress"),
        first_entry_time: integer_at(info, "firstEntryTime"),
        first_entry_amount: number_at(info, "firstEntryAmount"),
        first_entry_tx_hash: string_at(info, "firstEntryTxHash"),

        total_tx_amount: number_at(info, "totalTxAmount"),
        first_tx_time: integer_at(info, "firstTxTime"),
        first_tx_hash: string_at(info, "firstTxHash"),
        last_tx_time: integer_at(info, "lastTxTime"),
        last_tx_hash: string_at(info, "lastTxHash"),
    }
}
