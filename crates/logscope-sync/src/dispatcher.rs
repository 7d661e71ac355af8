use std::num::NonZeroU32;

use logscope_types::{Generation, Interval};

use crate::state::{FilterUpdate, QueryState};

/// Which consumers a state change affects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchScope {
    /// Record page and statistics
    Data,
    /// Chart locators only
    Charts,
    All,
}

impl FetchScope {
    pub fn includes_data(&self) -> bool {
        matches!(self, Self::Data | Self::All)
    }

    pub fn includes_charts(&self) -> bool {
        matches!(self, Self::Charts | Self::All)
    }
}

/// A new state version and the fetches it requires
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: QueryState,
    pub scope: FetchScope,
}

/// Sole owner of the query state and its generation counter.
///
/// Every method that changes the state bumps the generation before returning
/// the snapshot to fetch against. `set_page` with an out-of-range page is the
/// only ignored input.
pub struct ActionDispatcher {
    state: QueryState,
    default_page_size: NonZeroU32,
    default_interval: Interval,
    /// Page count from the latest applied page (None = unknown)
    total_pages: Option<u32>,
}

impl ActionDispatcher {
    pub fn new(page_size: NonZeroU32, interval: Interval) -> Self {
        Self {
            state: QueryState::new(page_size, interval),
            default_page_size: page_size,
            default_interval: interval,
            total_pages: None,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.state.generation
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Remember the page count reported for the current state
    pub fn record_total_pages(&mut self, total: u32) {
        self.total_pages = Some(total.max(1));
    }

    /// Merge filters, source and search; back to page 1
    pub fn set_filters(&mut self, update: FilterUpdate) -> Transition {
        if let Some(source) = update.source {
            self.state.source = source.filter(|s| !s.trim().is_empty());
        }
        for (key, value) in update.fields {
            if value.trim().is_empty() {
                self.state.filters.remove(&key);
            } else {
                self.state.filters.insert(key, value);
            }
        }
        if let Some(search) = update.search {
            self.state.search = search;
        }
        self.state.page = NonZeroU32::MIN;
        self.total_pages = None;
        self.advance(FetchScope::All)
    }

    /// Jump to page `n`; 0 and pages past the known last page are ignored
    pub fn set_page(&mut self, n: u32) -> Option<Transition> {
        let page = NonZeroU32::new(n)?;
        if self.total_pages.is_some_and(|total| n > total) {
            return None;
        }
        self.state.page = page;
        Some(self.advance(FetchScope::Data))
    }

    /// Change the page size; back to page 1
    pub fn set_page_size(&mut self, n: NonZeroU32) -> Transition {
        self.state.page_size = n;
        self.state.page = NonZeroU32::MIN;
        self.total_pages = None;
        self.advance(FetchScope::Data)
    }

    /// Change the search keyword; back to page 1
    pub fn set_search(&mut self, keyword: impl Into<String>) -> Transition {
        self.state.search = keyword.into();
        self.state.page = NonZeroU32::MIN;
        self.total_pages = None;
        self.advance(FetchScope::Data)
    }

    /// Change the chart interval; the page is kept
    pub fn set_interval(&mut self, interval: Interval) -> Transition {
        self.state.interval = interval;
        self.advance(FetchScope::Charts)
    }

    /// Reset everything except the generation to defaults
    pub fn clear(&mut self) -> Transition {
        let generation = self.state.generation;
        self.state = QueryState::new(self.default_page_size, self.default_interval);
        self.state.generation = generation;
        self.total_pages = None;
        self.advance(FetchScope::All)
    }

    /// Same parameters, new version (used after the backend re-aggregates)
    pub fn refresh(&mut self) -> Transition {
        self.advance(FetchScope::All)
    }

    fn advance(&mut self, scope: FetchScope) -> Transition {
        self.state.generation = self.state.generation.next();
        Transition {
            state: self.state.clone(),
            scope,
        }
    }
}
