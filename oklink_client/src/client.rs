use config_manager::ExplorerConfig;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::Result;
use crate::fetcher::{HtmlFetcher, PageSource};
use crate::projector::project;
use crate::resolver::PathResolver;
use crate::types::{AddressLookup, SummaryRecord};

/// OKLink address lookups for the Tron network.
///
/// Dropping a lookup future cancels its in-flight requests.
pub struct OklinkClient<S: PageSource = HtmlFetcher> {
    resolver: PathResolver<S>,
    default_locale: String,
    batch_concurrency: usize,
}

impl OklinkClient<HtmlFetcher> {
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        let fetcher = HtmlFetcher::new(config)?;
        Ok(Self::with_source(fetcher, config))
    }
}

impl<S: PageSource> OklinkClient<S> {
    pub fn with_source(source: S, config: &ExplorerConfig) -> Self {
        Self {
            resolver: PathResolver::new(source),
            default_locale: config.default_locale.clone(),
            batch_concurrency: config.batch_concurrency.max(1),
        }
    }

    pub fn resolver(&self) -> &PathResolver<S> {
        &self.resolver
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Fetch the profile and token-transfer pages concurrently and merge them
    /// into one record. Fails if either page fails after its own fallback.
    pub async fn lookup(
        &self,
        address: &str,
        preferred_locale: Option<&str>,
    ) -> Result<SummaryRecord> {
        let locale = preferred_locale.unwrap_or(&self.default_locale);
        info!("🔍 Looking up {} (locale '{}')", address, locale);

        let (main_state, token_state) = tokio::try_join!(
            self.resolver.resolve_main_state(address, locale),
            self.resolver.resolve_token_state(address, locale),
        )?;

        let record = project(&main_state, &token_state);

        info!(
            "✅ {}: usd={:?} trx={:?} usdt={:?} risk_tags={}",
            address,
            record.total_usd_value,
            record.balance,
            record.usdt_holding,
            record.risk_tags.len()
        );
        Ok(record)
    }

    /// Look up several addresses with bounded concurrency. Results come back in
    /// input order; one failing address does not affect the others.
    pub async fn lookup_many<I>(
        &self,
        addresses: I,
        preferred_locale: Option<&str>,
    ) -> Vec<AddressLookup>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let results: Vec<AddressLookup> = stream::iter(addresses.into_iter().map(Into::into))
            .map(|address: String| async move {
                let result = self.lookup(&address, preferred_locale).await;
                AddressLookup { address, result }
            })
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        if failed > 0 {
            warn!("⚠️ {} of {} lookups failed", failed, results.len());
        }
        results
    }
}

/// Shape check for a Tron base58 address: `T` prefix, 34 characters, base58 alphabet.
/// The explorer is the authority on whether the address exists.
pub fn validate_tron_address(address: &str) -> std::result::Result<(), String> {
    const BASE58: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    if !address.starts_with('T') {
        return Err(format!("Tron address must start with 'T': {}", address));
    }
    if address.len() != 34 {
        return Err(format!(
            "Tron address must be 34 characters, got {}: {}",
            address.len(),
            address
        ));
    }
    if let Some(bad) = address.chars().find(|c| !BASE58.contains(*c)) {
        return Err(format!("Invalid base58 character '{}' in {}", bad, address));
    }
    Ok(())
}
