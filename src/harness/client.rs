use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::api::response::{ResetResponse, StatusResponse, StressResponse};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("requested {requested} calls, must be between 1 and {max}")]
    Validation { requested: u32, max: u32 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The two slot operations the harness drives.
#[async_trait]
pub trait SlotApi: Send + Sync {
    /// Base URL or other label identifying the target in reports.
    fn target(&self) -> &str;
    async fn stress(&self) -> Result<StressResponse, HarnessError>;
    async fn status(&self) -> Result<StatusResponse, HarnessError>;
}

#[derive(Clone)]
pub struct HttpSlotApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSlotApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HarnessError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("bluegreen-probe/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Clears the target's counters.
    pub async fn reset(&self) -> Result<ResetResponse, HarnessError> {
        let url = self.url("/reset");
        let resp = self.client.post(&url).send().await?;
        decode(url, resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HarnessError> {
        let url = self.url(path);
        let resp = self.client.get(&url).send().await?;
        decode(url, resp).await
    }
}

async fn decode<T: DeserializeOwned>(
    url: String,
    resp: reqwest::Response,
) -> Result<T, HarnessError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(HarnessError::Status { status, url });
    }
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| HarnessError::Decode { url, source })
}

#[async_trait]
impl SlotApi for HttpSlotApi {
    fn target(&self) -> &str {
        &self.base_url
    }

    async fn stress(&self) -> Result<StressResponse, HarnessError> {
        self.get_json("/stress").await
    }

    async fn status(&self) -> Result<StatusResponse, HarnessError> {
        self.get_json("/status").await
    }
}
