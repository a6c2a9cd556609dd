use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::RemoteError;

/// Retrieves the raw feed document published by `identity`.
#[async_trait]
pub trait ArticleRemoteSource: Send + Sync {
    async fn fetch(&self, identity: &str) -> Result<String, RemoteError>;
}

/// Fetches `GET {base_url}/feed/@{identity}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    base_url: Url,
}

impl HttpFeedSource {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self::new(config.build_client()?, base_url))
    }

    pub fn feed_url(&self, identity: &str) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("feed")
            .push(&format!("@{identity}"));
        Ok(url)
    }
}

#[async_trait]
impl ArticleRemoteSource for HttpFeedSource {
    async fn fetch(&self, identity: &str) -> Result<String, RemoteError> {
        let url = self.feed_url(identity)?;
        debug!(%url, "fetching feed");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
