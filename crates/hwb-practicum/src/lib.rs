//! Homework review API adapter (reqwest).
//!
//! Implements the `hwb-core` ReviewApi port over the `homework_statuses`
//! endpoint: one GET per call, no retries.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};

use hwb_core::{config::Config, domain::Timestamp, errors::Error, ports::ReviewApi, Result};

#[derive(Clone)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("startup: http client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.endpoint.clone(), cfg.practicum_token.clone())
    }
}

#[async_trait]
impl ReviewApi for PracticumClient {
    async fn homework_statuses(&self, from_date: Timestamp) -> Result<serde_json::Value> {
        tracing::debug!("GET {} from_date={from_date}", self.endpoint);

        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date.0)])
            .send()
            .await
            .map_err(|e| Error::ApiAnswer(format!("request to {} failed: {e}", self.endpoint)))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            let snippet = body.trim().chars().take(200).collect::<String>();
            return Err(Error::ApiAnswer(if snippet.is_empty() {
                format!("unexpected status code: {}", status.as_u16())
            } else {
                format!("unexpected status code: {} {snippet}", status.as_u16())
            }));
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| Error::ApiAnswer(format!("response is not valid json: {e}")))
    }
}
