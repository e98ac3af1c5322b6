// OKLink explorer client - scrapes the server-rendered address pages for the
// Tron network and normalizes their embedded state into flat summary records

pub mod client;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod projector;
pub mod resolver;
pub mod types;

pub use client::{validate_tron_address, OklinkClient};
pub use error::{ExplorerError, Result};
pub use extractor::{extract_app_state, APP_STATE_ELEMENT_ID};
pub use fetcher::{HtmlFetcher, PageSource, CACHE_BUST_PARAM};
pub use projector::{json_path, normalize_contract_flag, normalize_tag_list, project};
pub use resolver::{FallbackState, PathResolver};
pub use types::*;

// Re-export config so callers need only this crate
pub use config_manager::ExplorerConfig;
