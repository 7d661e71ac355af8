//! Response bodies as the backend sends them.
//!
//! Fields whose shape varies between backend versions are kept as raw JSON
//! values and interpreted by the normalizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /api/logs`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub logs: Value,
    #[serde(default)]
    pub total_pages: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/stats`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub total_requests: Value,
    #[serde(default)]
    pub unique_ips: Value,
    #[serde(default)]
    pub total_bytes: Value,
    #[serde(default)]
    pub avg_response_size: Value,
    #[serde(default)]
    pub time_range: Value,
    /// Ordered list of pairs or a key -> count mapping
    #[serde(default)]
    pub top_urls: Value,
    /// Ordered list of pairs or a key -> count mapping
    #[serde(default)]
    pub top_ips: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /api/analyze`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzePayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/logs/files`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesPayload {
    #[serde(default)]
    pub log_files: Value,
}
