use crate::{error::HeliusError, types::EnrichedTransaction};
use config_manager::HeliusConfig;
use futures::{stream, Stream, TryStreamExt};
use reqwest::Client;
use retry_utils::{retry_with_backoff, RetryConfig, RetryError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Optional time bounds for a wallet fetch, in unix milliseconds.
/// `start_ms` is inclusive, `end_ms` exclusive, matching the Helius
/// `startTime`/`endTime` query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchWindow {
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

/// Client for the Helius enriched-transaction API.
#[derive(Debug, Clone)]
pub struct HeliusClient {
    client: Client,
    config: HeliusConfig,
    retry: RetryConfig,
}

impl HeliusClient {
    pub fn new(config: HeliusConfig) -> Result<Self, HeliusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let retry = RetryConfig {
            max_attempts: config.max_retries,
            base_delay_ms: config.retry_base_delay_ms,
            growth: config.retry_growth,
            max_delay_ms: config.retry_max_delay_ms,
        };

        Ok(Self {
            client,
            config,
            retry,
        })
    }

    /// Fetch up to `limit` enriched transactions for one wallet,
    /// newest-first.
    ///
    /// The endpoint honors no page-size parameter, so pagination walks the
    /// "before" cursor (last signature of the previous page) and the limit
    /// is enforced locally, truncating the final page when it overshoots.
    pub async fn get_wallet_transactions(
        &self,
        wallet: &str,
        limit: usize,
        window: FetchWindow,
    ) -> Result<Vec<EnrichedTransaction>, HeliusError> {
        info!(
            "Fetching up to {} transactions for wallet {}",
            limit, wallet
        );

        let mut transactions = self
            .page_stream(wallet, window, limit)
            .try_fold(Vec::new(), |mut acc, page| async move {
                acc.extend(page);
                Ok(acc)
            })
            .await?;

        if transactions.len() > limit {
            transactions.truncate(limit);
        }

        info!(
            "Fetched {} transactions for wallet {}",
            transactions.len(),
            wallet
        );
        Ok(transactions)
    }

    /// Lazy sequence of pages. Ends on an empty page, a page whose last
    /// record carries no signature (no cursor to continue from), or once
    /// `limit` records have been seen. Each yielded page has already been
    /// through the retry layer.
    fn page_stream<'a>(
        &'a self,
        wallet: &'a str,
        window: FetchWindow,
        limit: usize,
    ) -> impl Stream<Item = Result<Vec<EnrichedTransaction>, HeliusError>> + 'a {
        stream::try_unfold(PageCursor::new(limit), move |mut cursor| async move {
            if !cursor.wants_more() {
                return Ok(None);
            }

            let page = self
                .fetch_page_with_retry(wallet, cursor.before(), window)
                .await?;
            if page.is_empty() {
                debug!("Empty page for wallet {}, end of history", wallet);
                return Ok(None);
            }

            cursor.advance(&page);
            Ok(Some((page, cursor)))
        })
    }

    async fn fetch_page_with_retry(
        &self,
        wallet: &str,
        before: Option<&str>,
        window: FetchWindow,
    ) -> Result<Vec<EnrichedTransaction>, HeliusError> {
        retry_with_backoff(
            || self.fetch_page(wallet, before, window),
            &self.retry,
            HeliusError::retry_class,
        )
        .await
        .map_err(|e| match e {
            RetryError::Fatal { cause, .. } => cause,
            RetryError::Exhausted { attempts, cause } => HeliusError::RetriesExhausted {
                attempts,
                cause: Box::new(cause),
            },
        })
    }

    /// One raw page request. 2xx with a JSON array is the only good shape;
    /// any other status surfaces with its body, and a non-array payload is
    /// a malformed page.
    async fn fetch_page(
        &self,
        wallet: &str,
        before: Option<&str>,
        window: FetchWindow,
    ) -> Result<Vec<EnrichedTransaction>, HeliusError> {
        let url = format!(
            "{}/addresses/{}/transactions",
            self.config.api_base_url, wallet
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("api-key", self.config.api_key.as_str())]);
        if let Some(before) = before {
            request = request.query(&[("before", before)]);
        }
        if let Some(start) = window.start_ms {
            request = request.query(&[("startTime", start.to_string())]);
        }
        if let Some(end) = window.end_ms {
            request = request.query(&[("endTime", end.to_string())]);
        }

        debug!("GET {} (before={:?})", url, before);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Helius API error {} for wallet {}: {}", status, wallet, body);
            return Err(HeliusError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        if !value.is_array() {
            return Err(HeliusError::MalformedPage(format!(
                "expected a JSON array, got: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Local pagination state: the "before" cursor plus how many records have
/// been accumulated against the caller's limit.
#[derive(Debug)]
struct PageCursor {
    before: Option<String>,
    fetched: usize,
    limit: usize,
    done: bool,
}

impl PageCursor {
    fn new(limit: usize) -> Self {
        Self {
            before: None,
            fetched: 0,
            limit,
            done: false,
        }
    }

    fn wants_more(&self) -> bool {
        !self.done && self.fetched < self.limit
    }

    fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    /// Record a fetched page and derive the next cursor. A last record
    /// without a signature leaves nothing to paginate from, so the walk
    /// stops there.
    fn advance(&mut self, page: &[EnrichedTransaction]) {
        self.fetched += page.len();
        match page.last().map(|tx| tx.signature.as_str()) {
            Some(sig) if !sig.is_empty() => self.before = Some(sig.to_string()),
            _ => self.done = true,
        }
    }
}
