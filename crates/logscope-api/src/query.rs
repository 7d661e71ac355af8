use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Filter fields forwarded to `/api/logs`, `/api/stats` and `/api/analyze`.
///
/// Empty values are never sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Selected log file
    pub filename: Option<String>,
    /// Additional fields such as `start_time`, `end_time`, `domain`
    pub fields: BTreeMap<String, String>,
}

impl FilterParams {
    pub fn new(filename: Option<String>, fields: BTreeMap<String, String>) -> Self {
        Self { filename, fields }
    }

    /// Query string pairs, `filename` first
    pub fn pairs(&self) -> Vec<(String, String)> {
        let filename = self
            .filename
            .iter()
            .map(|f| ("filename".to_string(), f.clone()));
        let fields = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "filename")
            .map(|(k, v)| (k.clone(), v.clone()));

        filename
            .chain(fields)
            .filter(|(_, v)| !v.trim().is_empty())
            .collect()
    }

    /// JSON body for `POST /api/analyze`
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .pairs()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Value::Object(map)
    }
}

/// Parameters of a record page request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogsQuery {
    pub filters: FilterParams,
    pub search: String,
    pub page: u32,
    pub page_size: u32,
}

impl LogsQuery {
    /// Query string pairs: filters, then paging, then the search keyword
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.filters.pairs();
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("page_size".to_string(), self.page_size.to_string()));
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        pairs
    }
}
