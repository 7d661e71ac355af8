use std::collections::BTreeMap;
use std::num::NonZeroU32;

use logscope_api::{FilterParams, LogsQuery};
use logscope_types::{Generation, Interval};

/// One version of the explorer's query.
///
/// Only [`crate::ActionDispatcher`] creates new versions; everything else sees
/// read-only snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    pub(crate) source: Option<String>,
    pub(crate) filters: BTreeMap<String, String>,
    pub(crate) search: String,
    pub(crate) page: NonZeroU32,
    pub(crate) page_size: NonZeroU32,
    pub(crate) interval: Interval,
    pub(crate) generation: Generation,
}

impl QueryState {
    pub(crate) fn new(page_size: NonZeroU32, interval: Interval) -> Self {
        Self {
            source: None,
            filters: BTreeMap::new(),
            search: String::new(),
            page: NonZeroU32::MIN,
            page_size,
            interval,
            generation: Generation::INITIAL,
        }
    }

    /// Selected log file (None = guide mode, nothing is fetched)
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> u32 {
        self.page.get()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Filter fields as sent to the backend
    pub fn filter_params(&self) -> FilterParams {
        FilterParams::new(self.source.clone(), self.filters.clone())
    }

    /// Parameters of the record page request for this version
    pub fn logs_query(&self) -> LogsQuery {
        LogsQuery {
            filters: self.filter_params(),
            search: self.search.clone(),
            page: self.page(),
            page_size: self.page_size(),
        }
    }
}

/// Partial update merged by [`crate::ActionDispatcher::set_filters`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    /// `Some(None)` deselects the source, `None` leaves it unchanged
    pub source: Option<Option<String>>,
    /// Merged into the filter map; an empty value removes the field
    pub fields: BTreeMap<String, String>,
    pub search: Option<String>,
}

impl FilterUpdate {
    /// Select a log file, leaving other fields untouched
    pub fn source(filename: impl Into<String>) -> Self {
        Self {
            source: Some(Some(filename.into())),
            ..Default::default()
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse `key=value` pairs separated by whitespace.
    ///
    /// `file=` / `filename=` select the source. Tokens without `=` are
    /// rejected with the offending token.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut update = Self::default();
        for token in input.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                return Err(format!("expected key=value, got '{token}'"));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("missing field name in '{token}'"));
            }
            match key {
                "file" | "filename" | "source" => {
                    let value = value.trim();
                    update.source = Some((!value.is_empty()).then(|| value.to_string()));
                }
                "search" => update.search = Some(value.to_string()),
                _ => {
                    update.fields.insert(key.to_string(), value.to_string());
                }
            }
        }
        Ok(update)
    }
}
