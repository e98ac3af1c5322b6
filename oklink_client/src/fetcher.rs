use async_trait::async_trait;
use chrono::Utc;
use config_manager::ExplorerConfig;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT},
    Client,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{ExplorerError, Result};

/// Query parameter used to defeat browser/proxy caching
pub const CACHE_BUST_PARAM: &str = "_t";

static LAST_CACHE_BUST: AtomicI64 = AtomicI64::new(0);

/// Strictly increasing token, seeded from the wall clock in milliseconds.
/// Two calls within the same millisecond still get distinct values.
pub fn next_cache_bust_token() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_CACHE_BUST
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// Source of raw explorer HTML for a path suffix
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, path_suffix: &str) -> Result<String>;
}

/// Plain HTTP GET against the configured base prefix. No retry and no rate
/// limiting happen here.
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HtmlFetcher {
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );

        if let Some(agent) = &config.user_agent {
            headers.insert(
                USER_AGENT,
                agent.parse().map_err(|e| {
                    ExplorerError::InvalidRequest(format!("Invalid user agent: {}", e))
                })?,
            );
        }
        if let Some(language) = &config.accept_language {
            headers.insert(
                ACCEPT_LANGUAGE,
                language.parse().map_err(|e| {
                    ExplorerError::InvalidRequest(format!("Invalid accept-language: {}", e))
                })?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                ExplorerError::InvalidRequest(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_seconds),
        })
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a path suffix, including a fresh cache-busting parameter
    pub fn build_url(&self, path_suffix: &str) -> Result<String> {
        if !path_suffix.starts_with('/') {
            return Err(ExplorerError::InvalidRequest(format!(
                "Path suffix must start with '/': {}",
                path_suffix
            )));
        }

        let separator = match path_suffix.split_once('?') {
            Some((_, query)) => {
                let conflicting = query
                    .split('&')
                    .any(|pair| pair.split('=').next() == Some(CACHE_BUST_PARAM));
                if conflicting {
                    return Err(ExplorerError::InvalidRequest(format!(
                        "Path suffix already carries '{}': {}",
                        CACHE_BUST_PARAM, path_suffix
                    )));
                }
                '&'
            }
            None => '?',
        };

        Ok(format!(
            "{}{}{}{}={}",
            self.base_url,
            path_suffix,
            separator,
            CACHE_BUST_PARAM,
            next_cache_bust_token()
        ))
    }
}

#[async_trait]
impl PageSource for HtmlFetcher {
    async fn fetch(&self, path_suffix: &str) -> Result<String> {
        let url = self.build_url(path_suffix)?;
        debug!("📡 GET {}", url);

        let start_time = std::time::Instant::now();
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Transport failure for {}: {}", url, e);
                ExplorerError::Transport(e)
            })?;

        let status = response.status();
        debug!(
            "📨 {} for {} in {:.2}s",
            status,
            path_suffix,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(ExplorerError::FetchFailure {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("📊 {} bytes from {}", body.len(), path_suffix);
        Ok(body)
    }
}
