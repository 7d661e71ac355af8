//! Shared types for logscope
//!
//! This crate contains data structures used across multiple logscope crates.

use chrono::{DateTime, FixedOffset};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text shown wherever a value is absent
pub const PLACEHOLDER: &str = "-";

/// Number of entries kept in the top URL / top IP rankings
pub const TOP_ENTRIES: usize = 5;

/// Page sizes offered by the explorer
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

/// Page size used when nothing else is configured
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ============================================================================
// Query Versioning
// ============================================================================

/// Version counter of the explorer query state.
///
/// Every state mutation produces a new, strictly larger generation. Async
/// results carry the generation they were issued for so that results from
/// superseded versions can be dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation of a freshly constructed state
    pub const INITIAL: Self = Self(0);

    /// The generation following this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Time bucket used by the traffic trend chart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Wire value used in chart locators
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Cycle to the next interval
    pub fn next(&self) -> Self {
        match self {
            Self::Hourly => Self::Daily,
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Hourly,
        }
    }

    /// Cycle to the previous interval
    pub fn prev(&self) -> Self {
        match self {
            Self::Hourly => Self::Monthly,
            Self::Daily => Self::Hourly,
            Self::Weekly => Self::Daily,
            Self::Monthly => Self::Weekly,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" | "hour" | "h" => Ok(Self::Hourly),
            "daily" | "day" | "d" => Ok(Self::Daily),
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => Err(format!(
                "unknown interval '{other}' (expected hourly, daily, weekly or monthly)"
            )),
        }
    }
}

/// The page size that follows `current` in [`PAGE_SIZES`], wrapping around
pub fn next_page_size(current: u32) -> u32 {
    PAGE_SIZES
        .iter()
        .copied()
        .find(|size| *size > current)
        .unwrap_or(PAGE_SIZES[0])
}

// ============================================================================
// Log Records
// ============================================================================

/// Timestamp of a log record as delivered by the backend
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum RecordTime {
    /// Parsed instant, keeping the offset the server logged
    At(DateTime<FixedOffset>),
    /// Present but in a format we do not understand
    Raw(String),
    #[default]
    Missing,
}

/// One parsed access log line
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LogRecord {
    pub timestamp: RecordTime,

    /// Client address (empty when the backend omitted it)
    pub source_address: String,

    pub status_code: Option<u16>,

    pub method: Option<String>,

    /// First present of url, upstream, host, server
    pub target: Option<String>,

    /// Response size in bytes
    pub response_size: u64,

    pub user_agent: Option<String>,

    pub message: Option<String>,
}

impl LogRecord {
    /// Status family used for colouring
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_code(self.status_code)
    }
}

/// Status family of an HTTP response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn from_code(code: Option<u16>) -> Self {
        match code.map(|c| c / 100) {
            Some(1) => Self::Informational,
            Some(2) => Self::Success,
            Some(3) => Self::Redirect,
            Some(4) => Self::ClientError,
            Some(5) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Get display color for this status class
    pub fn color(&self) -> Color {
        match self {
            Self::Informational => Color::Blue,
            Self::Success => Color::Green,
            Self::Redirect => Color::Cyan,
            Self::ClientError => Color::Yellow,
            Self::ServerError => Color::Red,
            Self::Unknown => Color::DarkGray,
        }
    }
}

/// One page of records
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Page {
    pub records: Vec<LogRecord>,
    total_pages: u32,
}

impl Page {
    /// Build a page; a backend total below one is treated as one page
    pub fn new(records: Vec<LogRecord>, total_pages: u32) -> Self {
        Self {
            records,
            total_pages: total_pages.max(1),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// A `(key, count)` pair from a backend ranking
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub count: u64,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// First and last timestamp covered by the statistics
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Aggregate statistics for the current filters
#[derive(Clone, Debug, PartialEq, Default)]
pub struct StatsSummary {
    pub total_requests: u64,
    pub unique_sources: u64,
    pub total_bytes: u64,
    pub avg_response_size: f64,
    pub time_range: Option<TimeRange>,
    pub top_urls: Vec<RankedEntry>,
    pub top_ips: Vec<RankedEntry>,
}

// ============================================================================
// Sources and Charts
// ============================================================================

/// A log file the backend can analyze
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileInfo {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}

impl LogFileInfo {
    /// Display label such as `access.log (12.5KB)`
    pub fn label(&self) -> String {
        format!("{} ({:.1}KB)", self.filename, self.size as f64 / 1024.0)
    }
}

/// Charts rendered by the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    TrafficTrend,
    TopIps,
    TopUrls,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [Self::TrafficTrend, Self::TopIps, Self::TopUrls];

    /// Path segment under `/api/chart/`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrafficTrend => "traffic_trend",
            Self::TopIps => "top_ips",
            Self::TopUrls => "top_urls",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::TrafficTrend => "Traffic trend",
            Self::TopIps => "Top IPs",
            Self::TopUrls => "Top URLs",
        }
    }
}
