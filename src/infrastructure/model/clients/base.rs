//! Base HTTP client with shared logic

use crate::infrastructure::model::types::ModelError;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_retries: u32,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::network(&id, e))?;
        Ok(Self {
            id,
            endpoint: endpoint.into(),
            api_key,
            max_retries,
            http,
        })
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Post JSON with the API key as `?key=` (Gemini style)
    pub async fn post_with_query_key<Req, Res>(
        &self,
        url: &str,
        body: &Req,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let api_key = self.require_api_key()?;
        self.post_with_retry(url, body, Some(api_key)).await
    }

    /// Post JSON without auth (for local services like Ollama)
    pub async fn post_no_auth<Req, Res>(&self, url: &str, body: &Req) -> Result<Res, ModelError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        self.post_with_retry(url, body, None).await
    }

    async fn post_with_retry<Req, Res>(
        &self,
        url: &str,
        body: &Req,
        api_key: Option<&str>,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let mut attempt = 0u32;
        loop {
            match self.post_once(url, body, api_key).await {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                    warn!(
                        provider = self.id.as_str(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %err,
                        "Retrying model request"
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }

    async fn post_once<Req, Res>(
        &self,
        url: &str,
        body: &Req,
        api_key: Option<&str>,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let mut request = self.http.post(url).json(body);
        if let Some(key) = api_key {
            request = request.query(&[("key", key)]);
        }

        request
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?
            .error_for_status()
            .map_err(|e| ModelError::network(&self.id, e))?
            .json()
            .await
            .map_err(|e| ModelError::network(&self.id, e))
    }

    fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::missing_api_key(&self.id))
    }
}
