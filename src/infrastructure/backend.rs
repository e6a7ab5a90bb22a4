//! Client for the platform stats backend
//!
//! The backend wraps every payload in a `{code, message, data}` envelope;
//! `code == 0` means success, anything else carries a message.

use crate::domain::pool::{LockPeriod, TokenKind};
use crate::shared::errors::ProviderError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Platform-wide stats
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSummary {
    #[serde(rename = "totalStaked")]
    pub total_staked: f64,
    #[serde(rename = "totalRewards")]
    pub total_rewards: f64,
    #[serde(rename = "stakerCount")]
    pub staker_count: u64,
}

/// Stats for one pool
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSummary {
    pub token: String,
    pub period: String,
    #[serde(rename = "totalStaked")]
    pub total_staked: f64,
    pub apr: f64,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    message: Option<String>,
    data: Option<T>,
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: String) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Backend(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<(), ProviderError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Backend(format!("request to {url} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ProviderError::Backend(format!(
                "health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    pub async fn platform_summary(&self) -> Result<PlatformSummary, ProviderError> {
        self.get("/v1/summary", &[]).await
    }

    pub async fn pool_summary(
        &self,
        token: TokenKind,
        period: LockPeriod,
    ) -> Result<PoolSummary, ProviderError> {
        self.get(
            "/v1/pool/summary",
            &[("token", token.as_str()), ("period", period.as_str())],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("backend request {url}");
        let envelope: Envelope<T> = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Backend(format!("request to {url} failed: {e}")))?
            .json()
            .await
            .map_err(|e| ProviderError::Backend(format!("invalid response from {url}: {e}")))?;

        if envelope.code != 0 {
            return Err(ProviderError::Backend(format!(
                "backend error {}: {}",
                envelope.code,
                envelope.message.unwrap_or_else(|| "unknown".to_string())
            )));
        }
        envelope
            .data
            .ok_or_else(|| ProviderError::Backend(format!("empty payload from {url}")))
    }
}
