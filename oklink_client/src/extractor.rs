//! Locates the server-rendered `appState` payload in an explorer page.
//!
//! Script elements are raw-text elements: their content runs up to the first
//! `</script` regardless of what it contains, so a tag scan finds the same
//! content an HTML tokenizer would.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{ExplorerError, Result};

pub const APP_STATE_ELEMENT_ID: &str = "appState";

fn script_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // quoted attribute values may contain '>'
        Regex::new(r#"(?is)<script\b((?:[^>"']|"[^"]*"|'[^']*')*)>(.*?)</script\s*>"#)
            .expect("script pattern is valid")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
            .expect("attribute pattern is valid")
    })
}

/// Attribute value by case-insensitive name
fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    attribute_regex().captures_iter(attributes).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        Some(
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or(""),
        )
    })
}

fn is_json_type(value: &str) -> bool {
    value
        .trim()
        .to_ascii_lowercase()
        .starts_with("application/json")
}

/// Raw text of the `appState` JSON script element, if the page has one.
/// The first matching element wins.
pub fn find_app_state_text(html: &str) -> Option<&str> {
    script_regex().captures_iter(html).find_map(|caps| {
        let attributes = caps.get(1)?.as_str();
        let is_app_state = attribute(attributes, "id") == Some(APP_STATE_ELEMENT_ID)
            && attribute(attributes, "type").is_some_and(is_json_type);
        if is_app_state {
            caps.get(2).map(|m| m.as_str())
        } else {
            None
        }
    })
}

/// Parse the embedded `appState` payload into an untyped JSON value.
///
/// Missing or empty element -> [`ExplorerError::StateNotFound`];
/// invalid JSON -> [`ExplorerError::StateParse`].
pub fn extract_app_state(html: &str) -> Result<Value> {
    let text = match find_app_state_text(html) {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            debug!("No appState element in {} bytes of HTML", html.len());
            return Err(ExplorerError::StateNotFound);
        }
    };

    serde_json::from_str(text).map_err(|e| {
        let sample = text.chars().take(200).collect::<String>();
        warn!("⚠️ appState present but unparseable ({}): {}", e, sample);
        ExplorerError::StateParse(e)
    })
}
