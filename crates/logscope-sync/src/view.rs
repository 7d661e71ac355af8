//! Pure derivation of render instructions.
//!
//! Nothing in this module performs I/O; a [`crate::RenderSurface`] applies
//! the values produced here.

use logscope_types::{
    ChartKind, Interval, LogRecord, PLACEHOLDER, Page, RankedEntry, RecordTime, StatsSummary,
    StatusClass,
};

/// Display cap for the target column
pub const TARGET_MAX_CHARS: usize = 50;
/// Display cap for the user agent column
pub const USER_AGENT_MAX_CHARS: usize = 30;
/// Display cap for the message column
pub const MESSAGE_MAX_CHARS: usize = 80;
/// Maximum number of numbered page buttons
pub const PAGE_WINDOW: u32 = 5;

/// A possibly truncated value plus the full text for a tooltip
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub title: String,
}

impl Cell {
    /// Truncate to `max_chars` characters with a trailing `...`.
    /// Absent or empty values become the placeholder.
    pub fn truncated(value: Option<&str>, max_chars: usize) -> Self {
        let full = value.filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER);
        let text = if full.chars().count() > max_chars {
            let cut: String = full.chars().take(max_chars).collect();
            format!("{cut}...")
        } else {
            full.to_string()
        };
        Self {
            text,
            title: full.to_string(),
        }
    }
}

/// One table row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub timestamp: String,
    pub source_address: String,
    pub status: String,
    pub status_class: StatusClass,
    pub method: String,
    pub target: Cell,
    pub size: String,
    pub user_agent: Cell,
    pub message: Cell,
}

/// Content of the record table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<TableRow>),
    /// The current page has no records
    Empty,
    /// No source selected yet
    NoSource,
    /// The record fetch failed; carries the failure message verbatim
    Failed(String),
}

/// Pagination controls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
    /// Numbered buttons, ascending, at most [`PAGE_WINDOW`] wide
    pub pages: Vec<u32>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl Pagination {
    /// Controls for a state with nothing to page through
    pub fn hidden() -> Self {
        Self {
            current: 1,
            total: 1,
            pages: Vec::new(),
            prev_enabled: false,
            next_enabled: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.total > 1
    }
}

/// Ranking panel content
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopList {
    Entries(Vec<RankedEntry>),
    /// No source selected yet
    SelectSource,
}

/// Text of the statistics cards
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatCards {
    pub total_requests: String,
    pub unique_ips: String,
    /// Total traffic in MB
    pub total_traffic: String,
    /// Average response size in bytes
    pub avg_response_size: String,
    pub time_start: String,
    pub time_end: String,
    pub top_urls: TopList,
    pub top_ips: TopList,
}

impl StatCards {
    /// Cards shown before a source is selected
    pub fn placeholder() -> Self {
        Self {
            total_requests: PLACEHOLDER.to_string(),
            unique_ips: PLACEHOLDER.to_string(),
            total_traffic: PLACEHOLDER.to_string(),
            avg_response_size: PLACEHOLDER.to_string(),
            time_start: PLACEHOLDER.to_string(),
            time_end: PLACEHOLDER.to_string(),
            top_urls: TopList::SelectSource,
            top_ips: TopList::SelectSource,
        }
    }
}

/// Cache-busted locator of a backend chart image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartLocator {
    pub kind: ChartKind,
    pub interval: Interval,
    /// Milliseconds since the epoch, used only to defeat caches
    pub stamp: i64,
}

impl ChartLocator {
    /// Path relative to the backend base URL
    pub fn path(&self) -> String {
        format!(
            "/api/chart/{}.png?interval={}&t={}",
            self.kind.as_str(),
            self.interval.as_str(),
            self.stamp
        )
    }
}

/// Table content for a page of records
pub fn table(page: &Page) -> TableBody {
    if page.records.is_empty() {
        return TableBody::Empty;
    }
    TableBody::Rows(page.records.iter().map(row).collect())
}

/// Table row for one record
pub fn row(record: &LogRecord) -> TableRow {
    let or_placeholder = |value: &str| {
        if value.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            value.to_string()
        }
    };

    TableRow {
        timestamp: format_timestamp(&record.timestamp),
        source_address: or_placeholder(&record.source_address),
        status: record
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        status_class: record.status_class(),
        method: or_placeholder(record.method.as_deref().unwrap_or_default()),
        target: Cell::truncated(record.target.as_deref(), TARGET_MAX_CHARS),
        size: format_bytes(record.response_size),
        user_agent: Cell::truncated(record.user_agent.as_deref(), USER_AGENT_MAX_CHARS),
        message: Cell::truncated(record.message.as_deref(), MESSAGE_MAX_CHARS),
    }
}

/// Sliding window of page buttons centred on `current`.
///
/// `current` is clamped into `[1, total]` first, so the rendered active page
/// can never fall outside the known range.
pub fn pagination(current: u32, total: u32) -> Pagination {
    let total = total.max(1);
    if total == 1 {
        return Pagination::hidden();
    }

    let current = current.clamp(1, total);
    let width = PAGE_WINDOW.min(total);
    let start = current
        .saturating_sub(PAGE_WINDOW / 2)
        .max(1)
        .min(total - width + 1);

    Pagination {
        current,
        total,
        pages: (start..=start + (width - 1)).collect(),
        prev_enabled: current > 1,
        next_enabled: current < total,
    }
}

/// Stat card text; `None` means no source is selected
pub fn stat_cards(stats: Option<&StatsSummary>) -> StatCards {
    let Some(stats) = stats else {
        return StatCards::placeholder();
    };

    let range = stats.time_range.as_ref();
    let bound = |value: Option<&String>| {
        value
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    StatCards {
        total_requests: stats.total_requests.to_string(),
        unique_ips: stats.unique_sources.to_string(),
        total_traffic: format!("{:.1}", stats.total_bytes as f64 / 1024.0 / 1024.0),
        avg_response_size: format!("{:.0}", stats.avg_response_size),
        time_start: bound(range.and_then(|r| r.start.as_ref())),
        time_end: bound(range.and_then(|r| r.end.as_ref())),
        top_urls: TopList::Entries(stats.top_urls.clone()),
        top_ips: TopList::Entries(stats.top_ips.clone()),
    }
}

/// Locators for every chart kind; empty when no source is selected
pub fn chart_locators(has_source: bool, interval: Interval, stamp: i64) -> Vec<ChartLocator> {
    if !has_source {
        return Vec::new();
    }
    ChartKind::ALL
        .iter()
        .map(|kind| ChartLocator {
            kind: *kind,
            interval,
            stamp,
        })
        .collect()
}

pub fn format_timestamp(time: &RecordTime) -> String {
    match time {
        RecordTime::At(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        RecordTime::Raw(raw) => raw.clone(),
        RecordTime::Missing => PLACEHOLDER.to_string(),
    }
}

/// Human readable size: `0 B`, `512 B`, `1.5 KB`, `2 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
