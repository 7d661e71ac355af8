//! Convert backend payloads into canonical data.
//!
//! Every field has a default: a missing or ill-typed value never fails the
//! conversion. The only error produced here is a payload that explicitly
//! reports `success: false`.

use chrono::DateTime;
use serde_json::Value;

use logscope_api::{ApiError, LogsPayload, StatsPayload};
use logscope_types::{
    LogRecord, Page, RankedEntry, RecordTime, StatsSummary, TOP_ENTRIES, TimeRange,
};

/// Apache/Nginx combined log timestamp, e.g. `10/Oct/2024:13:55:36 +0000`
const ACCESS_LOG_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Fields that can name a record's display target, in priority order
const TARGET_FIELDS: [&str; 4] = ["url", "upstream", "host", "server"];

/// Field names accepted as the key of a ranking entry object
const RANKING_KEY_FIELDS: [&str; 3] = ["key", "url", "ip"];

/// Normalize a top URL / top IP ranking.
///
/// A list is taken in its own order. A mapping is taken in the backend's
/// iteration order: it is NOT re-sorted by count, because the backend gives
/// no guarantee either way. Both are cut to the first [`TOP_ENTRIES`].
pub fn ranking(payload: &Value) -> Vec<RankedEntry> {
    match payload {
        Value::Array(items) => items
            .iter()
            .filter_map(ranked_item)
            .take(TOP_ENTRIES)
            .collect(),
        Value::Object(map) => map
            .iter()
            .take(TOP_ENTRIES)
            .map(|(key, count)| RankedEntry::new(key.clone(), count_of(count)))
            .collect(),
        _ => Vec::new(),
    }
}

/// `{"url": k, "count": n}`, `{"ip": k, ...}`, `{"key": k, ...}` or `[k, n]`
fn ranked_item(item: &Value) -> Option<RankedEntry> {
    match item {
        Value::Object(fields) => {
            let key = RANKING_KEY_FIELDS
                .iter()
                .find_map(|name| fields.get(*name).and_then(text_of))?;
            let count = fields.get("count").map(count_of).unwrap_or(0);
            Some(RankedEntry::new(key, count))
        }
        Value::Array(pair) => {
            let key = pair.first().and_then(text_of)?;
            let count = pair.get(1).map(count_of).unwrap_or(0);
            Some(RankedEntry::new(key, count))
        }
        _ => None,
    }
}

/// Normalize one record object from `/api/logs`
pub fn record(value: &Value) -> LogRecord {
    let field = |name: &str| value.get(name);
    let text = |name: &str| field(name).and_then(text_of).filter(|s| !s.is_empty());

    LogRecord {
        timestamp: field("timestamp").map(record_time).unwrap_or_default(),
        source_address: text("ip").unwrap_or_default(),
        status_code: field("status_code")
            .and_then(integer_of)
            .and_then(|code| u16::try_from(code).ok()),
        method: text("method"),
        target: TARGET_FIELDS.iter().find_map(|name| text(*name)),
        response_size: field("response_size").map(count_of).unwrap_or(0),
        user_agent: text("user_agent"),
        message: text("message"),
    }
}

/// Normalize a `/api/logs` payload into at most `page_size` records
pub fn page(payload: LogsPayload, page_size: u32) -> Result<Page, ApiError> {
    if !payload.success {
        let message = payload
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ApiError::Backend(message));
    }

    let records = match &payload.logs {
        Value::Array(items) => items
            .iter()
            .take(page_size as usize)
            .map(record)
            .collect(),
        _ => Vec::new(),
    };
    let total_pages = u32::try_from(count_of(&payload.total_pages)).unwrap_or(u32::MAX);

    Ok(Page::new(records, total_pages))
}

/// Normalize a `/api/stats` payload
pub fn stats(payload: &StatsPayload) -> StatsSummary {
    StatsSummary {
        total_requests: count_of(&payload.total_requests),
        unique_sources: count_of(&payload.unique_ips),
        total_bytes: count_of(&payload.total_bytes),
        avg_response_size: float_of(&payload.avg_response_size).max(0.0),
        time_range: time_range(&payload.time_range),
        top_urls: ranking(&payload.top_urls),
        top_ips: ranking(&payload.top_ips),
    }
}

fn time_range(value: &Value) -> Option<TimeRange> {
    let fields = value.as_object()?;
    Some(TimeRange {
        start: fields.get("start").and_then(text_of),
        end: fields.get("end").and_then(text_of),
    })
}

fn record_time(value: &Value) -> RecordTime {
    let Some(raw) = text_of(value).filter(|s| !s.is_empty()) else {
        return RecordTime::Missing;
    };

    DateTime::parse_from_rfc3339(&raw)
        .or_else(|_| DateTime::parse_from_str(&raw, ACCESS_LOG_TIME_FORMAT))
        .map(RecordTime::At)
        .unwrap_or(RecordTime::Raw(raw))
}

/// Strings as-is, numbers and booleans in their JSON spelling
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

/// Non-negative integer, 0 for anything else
fn count_of(value: &Value) -> u64 {
    integer_of(value)
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}

fn float_of(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
