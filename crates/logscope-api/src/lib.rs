//! HTTP boundary for logscope
//!
//! This crate talks to the log analysis backend: listing log files, fetching
//! record pages and statistics, and triggering re-analysis. Payloads are
//! returned close to their wire shape; turning them into display-ready data
//! is the job of `logscope-sync`.

mod client;
mod error;
mod query;
mod wire;

pub use client::{HttpLogApi, LogApi};
pub use error::{ApiError, Result};
pub use query::{FilterParams, LogsQuery};
pub use wire::{AnalyzePayload, FilesPayload, LogsPayload, StatsPayload};

// Re-export types used in our public API
pub use logscope_types::LogFileInfo;
