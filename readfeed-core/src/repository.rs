use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_util::stream::{BoxStream, StreamExt};
use tracing::{debug, info, warn};

use crate::article::{Article, CachedArticle};
use crate::cache::ArticleLocalSource;
use crate::decoder::FeedDecoder;
use crate::error::{CacheError, RemoteError, SyncError};
use crate::remote::ArticleRemoteSource;

#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Upper bound for a single fetch attempt.
    pub fetch_timeout: Duration,
    /// Extra attempts after a failed fetch. `0` fetches once.
    pub max_retries: u8,
    /// Delay before the first retry, grows linearly per attempt.
    pub retry_backoff: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Serves articles from the local cache and refreshes the cache from the
/// remote feed once per subscription.
#[derive(Clone)]
pub struct ArticleRepository {
    local: Arc<dyn ArticleLocalSource>,
    remote: Arc<dyn ArticleRemoteSource>,
    decoder: Arc<dyn FeedDecoder>,
    config: SyncConfig,
}

impl ArticleRepository {
    pub fn new(
        local: Arc<dyn ArticleLocalSource>,
        remote: Arc<dyn ArticleRemoteSource>,
        decoder: Arc<dyn FeedDecoder>,
        config: SyncConfig,
    ) -> Self {
        Self {
            local,
            remote,
            decoder,
            config,
        }
    }

    /// Live article list for `identity`.
    ///
    /// Every cache snapshot is yielded as soon as the cache produces it. After
    /// the first snapshot has been handed to the consumer, the stream fetches
    /// the remote feed and replaces the cache with it; the resulting cache
    /// change arrives as a later item. This happens once per returned stream.
    ///
    /// Fetch, decode and write failures of that refresh are logged and
    /// dropped. A failing cache subscription ends the stream with its error.
    ///
    /// Dropping the stream cancels a refresh still in flight.
    pub fn articles(&self, identity: &str) -> BoxStream<'static, Result<Vec<Article>, CacheError>> {
        let repository = self.clone();
        let identity = identity.to_owned();

        stream! {
            let mut local = repository.local.observe_all();
            // Owned by this stream only; every subscription gets its own.
            let mut refreshed = false;

            while let Some(snapshot) = local.next().await {
                let rows = match snapshot {
                    Ok(rows) => rows,
                    Err(err) => {
                        warn!(identity = %identity, error = %err, "article cache subscription failed");
                        yield Err(err);
                        break;
                    }
                };

                let articles: Vec<Article> = rows.into_iter().map(CachedArticle::into_article).collect();
                yield Ok(articles);

                if !refreshed {
                    refreshed = true;
                    match repository.reconcile(&identity).await {
                        Ok(count) => info!(identity = %identity, count, "article cache refreshed"),
                        Err(err) => warn!(identity = %identity, error = %err, "article refresh failed"),
                    }
                }
            }

            debug!(identity = %identity, "article cache stream ended");
        }
        .boxed()
    }

    /// Fetches, decodes and stores the feed of `identity`, returning the
    /// number of stored articles.
    pub async fn reconcile(&self, identity: &str) -> Result<usize, SyncError> {
        let raw = self.fetch_with_retry(identity).await?;
        let articles = self.decoder.decode(&raw)?;
        let count = articles.len();
        self.local.replace_all(articles).await?;
        Ok(count)
    }

    async fn fetch_with_retry(&self, identity: &str) -> Result<String, RemoteError> {
        let mut attempt: u8 = 0;
        loop {
            let result =
                match tokio::time::timeout(self.config.fetch_timeout, self.remote.fetch(identity)).await {
                    Ok(result) => result,
                    Err(_) => Err(RemoteError::Timeout(self.config.fetch_timeout)),
                };

            match result {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(identity = %identity, attempt, error = %err, "feed fetch failed, retrying");
                    tokio::time::sleep(self.config.retry_backoff * u32::from(attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
