use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use logscope_types::LogFileInfo;

use crate::error::{ApiError, Result};
use crate::query::{FilterParams, LogsQuery};
use crate::wire::{AnalyzePayload, FilesPayload, LogsPayload, StatsPayload};

/// Operations the explorer needs from the analysis backend.
///
/// A 2xx payload carrying `success: false` is still returned as `Ok` and
/// judged by the caller. Error statuses are reported as `Err`.
pub trait LogApi: Send + Sync + 'static {
    /// `GET /api/logs/files`
    fn list_files(&self) -> impl Future<Output = Result<Vec<LogFileInfo>>> + Send;

    /// `GET /api/logs`
    fn fetch_logs(&self, query: &LogsQuery) -> impl Future<Output = Result<LogsPayload>> + Send;

    /// `GET /api/stats`
    fn fetch_stats(
        &self,
        filters: &FilterParams,
    ) -> impl Future<Output = Result<StatsPayload>> + Send;

    /// `POST /api/analyze`
    fn analyze(&self, filters: &FilterParams)
    -> impl Future<Output = Result<AnalyzePayload>> + Send;
}

/// [`LogApi`] over HTTP
#[derive(Clone, Debug)]
pub struct HttpLogApi {
    client: Client,
    base_url: String,
}

impl HttpLogApi {
    /// Create a client for the backend at `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl LogApi for HttpLogApi {
    async fn list_files(&self) -> Result<Vec<LogFileInfo>> {
        let response = self.client.get(self.url("/api/logs/files")).send().await?;
        let payload: FilesPayload = decode(response).await?;

        // Skip entries we cannot read instead of failing the whole listing
        let files = match payload.log_files {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<LogFileInfo>(item).ok())
                .collect(),
            _ => Vec::new(),
        };
        Ok(files)
    }

    async fn fetch_logs(&self, query: &LogsQuery) -> Result<LogsPayload> {
        let pairs = query.pairs();
        tracing::debug!(?pairs, "fetching log page");
        let response = self
            .client
            .get(self.url("/api/logs"))
            .query(&pairs)
            .send()
            .await?;
        decode(response).await
    }

    async fn fetch_stats(&self, filters: &FilterParams) -> Result<StatsPayload> {
        let pairs = filters.pairs();
        tracing::debug!(?pairs, "fetching stats");
        let response = self
            .client
            .get(self.url("/api/stats"))
            .query(&pairs)
            .send()
            .await?;
        decode(response).await
    }

    async fn analyze(&self, filters: &FilterParams) -> Result<AnalyzePayload> {
        let response = self
            .client
            .post(self.url("/api/analyze"))
            .json(&filters.to_json())
            .send()
            .await?;
        decode(response).await
    }
}

/// Read the body and decode it.
///
/// A non-2xx answer carrying a JSON `error` becomes [`ApiError::Backend`] with
/// that message; anything else becomes [`ApiError::Status`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(match backend_error(&body) {
            Some(message) => ApiError::Backend(message),
            None => ApiError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).trim().to_string(),
            },
        });
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn backend_error(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}
