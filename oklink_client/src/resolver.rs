use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{ExplorerError, Result};
use crate::extractor::extract_app_state;
use crate::fetcher::PageSource;
use crate::types::PageKind;

/// Two-attempt locale fallback.
///
/// `TryPreferred` -> `Succeeded` on success, `TryFallback` on any error.
/// `TryFallback` -> `Succeeded` on success, `Failed` with the fallback's error otherwise.
#[derive(Debug)]
pub enum FallbackState {
    TryPreferred,
    TryFallback,
    Succeeded(Value),
    Failed(ExplorerError),
}

/// Resolves explorer page state, trying the localized path first and the
/// canonical (unlocalized) path once if that fails.
pub struct PathResolver<S: PageSource> {
    source: S,
}

impl<S: PageSource> PathResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn resolve_main_state(&self, address: &str, preferred_locale: &str) -> Result<Value> {
        self.resolve_page(PageKind::Main, address, preferred_locale).await
    }

    pub async fn resolve_token_state(
        &self,
        address: &str,
        preferred_locale: &str,
    ) -> Result<Value> {
        self.resolve_page(PageKind::TokenTransfer, address, preferred_locale)
            .await
    }

    async fn load(&self, path: &str) -> Result<Value> {
        let html = self.source.fetch(path).await?;
        extract_app_state(&html)
    }

    pub async fn resolve_page(
        &self,
        page: PageKind,
        address: &str,
        preferred_locale: &str,
    ) -> Result<Value> {
        let preferred_path = page.path(address, preferred_locale);
        let fallback_path = page.path(address, "");

        // With no locale the preferred path already is the canonical one
        let mut state = if preferred_path == fallback_path {
            FallbackState::TryFallback
        } else {
            FallbackState::TryPreferred
        };

        loop {
            state = match state {
                FallbackState::TryPreferred => match self.load(&preferred_path).await {
                    Ok(value) => FallbackState::Succeeded(value),
                    Err(e) => {
                        warn!(
                            "⚠️ {} page for {} failed at {} ({}), trying canonical path",
                            page.as_str(),
                            address,
                            preferred_path,
                            e
                        );
                        FallbackState::TryFallback
                    }
                },
                FallbackState::TryFallback => match self.load(&fallback_path).await {
                    Ok(value) => FallbackState::Succeeded(value),
                    Err(e) => FallbackState::Failed(e),
                },
                FallbackState::Succeeded(value) => {
                    debug!("✅ Resolved {} page state for {}", page.as_str(), address);
                    return Ok(value);
                }
                FallbackState::Failed(e) => {
                    error!(
                        "❌ {} page for {} failed at {}: {}",
                        page.as_str(),
                        address,
                        fallback_path,
                        e
                    );
                    return Err(e);
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Reply {
        Html(String),
        Status(u16),
    }

    /// Serves canned replies per path and records every call
    struct ScriptedSource {
        replies: HashMap<String, Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<(&str, Reply)>) -> Self {
            Self {
                replies: replies
                    .into_iter()
                    .map(|(path, reply)| (path.to_string(), reply))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch(&self, path_suffix: &str) -> Result<String> {
            self.calls.lock().unwrap().push(path_suffix.to_string());
            match self.replies.get(path_suffix) {
                Some(Reply::Html(html)) => Ok(html.clone()),
                Some(Reply::Status(status)) => Err(ExplorerError::FetchFailure { status: *status }),
                None => Err(ExplorerError::FetchFailure { status: 404 }),
            }
        }
    }

    fn state_page(json: &str) -> Reply {
        Reply::Html(format!(
            r#"<html><body><script id="appState" type="application/json">{}</script></body></html>"#,
            json
        ))
    }

    #[tokio::test]
    async fn test_preferred_success_makes_single_call() {
        let source = ScriptedSource::new(vec![(
            "/zh-hans/tron/address/TAbc",
            state_page(r#"{"from":"preferred"}"#),
        )]);
        let resolver = PathResolver::new(source);

        let value = resolver.resolve_main_state("TAbc", "zh-hans").await.unwrap();
        assert_eq!(value["from"], "preferred");
        assert_eq!(resolver.source().calls(), vec!["/zh-hans/tron/address/TAbc"]);
    }

    #[tokio::test]
    async fn test_falls_back_once_on_preferred_failure() {
        let source = ScriptedSource::new(vec![
            ("/zh-hans/tron/address/TAbc/token-transfer", Reply::Status(503)),
            (
                "/tron/address/TAbc/token-transfer",
                state_page(r#"{"from":"fallback"}"#),
            ),
        ]);
        let resolver = PathResolver::new(source);

        let value = resolver.resolve_token_state("TAbc", "zh-hans").await.unwrap();
        assert_eq!(value["from"], "fallback");
        assert_eq!(
            resolver.source().calls(),
            vec![
                "/zh-hans/tron/address/TAbc/token-transfer",
                "/tron/address/TAbc/token-transfer"
            ]
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_also_triggers_fallback() {
        let source = ScriptedSource::new(vec![
            (
                "/zh-hans/tron/address/TAbc",
                Reply::Html("<html>challenge page</html>".to_string()),
            ),
            ("/tron/address/TAbc", state_page(r#"{"ok":true}"#)),
        ]);
        let resolver = PathResolver::new(source);

        let value = resolver.resolve_main_state("TAbc", "zh-hans").await.unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(resolver.source().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_both_failing_propagates_fallback_error() {
        let source = ScriptedSource::new(vec![
            ("/zh-hans/tron/address/TAbc", Reply::Status(429)),
            (
                "/tron/address/TAbc",
                Reply::Html(
                    r#"<script id="appState" type="application/json">not json</script>"#
                        .to_string(),
                ),
            ),
        ]);
        let resolver = PathResolver::new(source);

        let err = resolver.resolve_main_state("TAbc", "zh-hans").await.unwrap_err();
        assert!(matches!(err, ExplorerError::StateParse(_)));
        assert_eq!(resolver.source().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_locale_makes_single_canonical_attempt() {
        let source = ScriptedSource::new(vec![("/tron/address/TAbc", Reply::Status(500))]);
        let resolver = PathResolver::new(source);

        let err = resolver.resolve_main_state("TAbc", "").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(resolver.source().calls(), vec!["/tron/address/TAbc"]);
    }
}
