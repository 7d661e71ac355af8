use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use logscope_api::LogApi;
use logscope_types::{Generation, Interval};

use crate::coordinator::{DataDispatch, FetchCoordinator, FetchOutcome};
use crate::dispatcher::{ActionDispatcher, FetchScope, Transition};
use crate::state::{FilterUpdate, QueryState};
use crate::surface::RenderSurface;
use crate::view::{self, Pagination, StatCards, TableBody};

/// Something the user asked the explorer to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Search(String),
    ChangePage(u32),
    ChangePageSize(NonZeroU32),
    SubmitFilters(FilterUpdate),
    ChangeInterval(Interval),
    Clear,
    /// Re-aggregate on the backend, then refresh everything
    Analyze,
    /// The display area changed size; charts need new locators
    Resize,
}

/// What [`Explorer::apply`] did with an outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Rendered,
    /// Belonged to a superseded generation and was dropped
    Stale,
    Failed,
    /// The page ran past the reported last page; the last page was requested
    Reissued,
}

/// Wires the dispatcher, the coordinator and a render surface together.
///
/// User intents go in through [`Explorer::handle`]; background results go in
/// through [`Explorer::apply`]. Both run on the caller's task, so the query
/// state is only ever touched from one place.
pub struct Explorer<A: LogApi, S: RenderSurface> {
    dispatcher: ActionDispatcher,
    coordinator: FetchCoordinator<A>,
    surface: S,
}

impl<A: LogApi, S: RenderSurface> Explorer<A, S> {
    /// Create an explorer; outcomes of its fetches arrive on the returned
    /// receiver and must be fed back through [`Explorer::apply`]
    pub fn new(
        api: Arc<A>,
        surface: S,
        page_size: NonZeroU32,
        interval: Interval,
    ) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (coordinator, outcomes) = FetchCoordinator::new(api);
        let explorer = Self {
            dispatcher: ActionDispatcher::new(page_size, interval),
            coordinator,
            surface,
        };
        (explorer, outcomes)
    }

    /// Load the source list and render the initial state
    pub fn start(&mut self) {
        self.coordinator.list_files();
        let initial = Transition {
            state: self.dispatcher.state().clone(),
            scope: FetchScope::All,
        };
        self.issue(initial);
    }

    pub fn handle(&mut self, intent: Intent) {
        tracing::debug!(?intent, generation = %self.generation(), "handling intent");

        if intent != Intent::Resize {
            self.surface.set_error_banner(None);
        }

        let transition = match intent {
            Intent::Search(keyword) => Some(self.dispatcher.set_search(keyword)),
            Intent::ChangePage(n) => {
                let transition = self.dispatcher.set_page(n);
                if transition.is_none() {
                    tracing::debug!(page = n, "ignoring out of range page");
                }
                transition
            }
            Intent::ChangePageSize(n) => Some(self.dispatcher.set_page_size(n)),
            Intent::SubmitFilters(update) => Some(self.dispatcher.set_filters(update)),
            Intent::ChangeInterval(interval) => Some(self.dispatcher.set_interval(interval)),
            Intent::Clear => Some(self.dispatcher.clear()),
            Intent::Analyze => {
                self.start_analysis();
                None
            }
            Intent::Resize => {
                let charts = self.coordinator.chart_locators(self.dispatcher.state());
                self.surface.set_chart_locators(charts);
                None
            }
        };

        if let Some(transition) = transition {
            self.issue(transition);
        }
    }

    /// Apply a background result if it still belongs to the current state
    pub fn apply(&mut self, outcome: FetchOutcome) -> Applied {
        match outcome {
            FetchOutcome::Records { generation, result } => {
                if !self.coordinator.is_current(generation) {
                    tracing::debug!(%generation, "discarding stale record page");
                    return Applied::Stale;
                }
                match result {
                    Ok(page) => {
                        let total = page.total_pages();
                        self.dispatcher.record_total_pages(total);
                        let requested = self.dispatcher.state().page();
                        if requested > total {
                            if let Some(transition) = self.dispatcher.set_page(total) {
                                tracing::debug!(
                                    requested,
                                    total,
                                    "page past the end, loading last page"
                                );
                                self.issue(transition);
                                return Applied::Reissued;
                            }
                        }
                        self.surface.set_table(view::table(&page));
                        self.surface
                            .set_pagination(view::pagination(self.dispatcher.state().page(), total));
                        Applied::Rendered
                    }
                    Err(e) => {
                        tracing::warn!(%generation, error = %e, "record fetch failed");
                        self.surface.set_table(TableBody::Failed(e.to_string()));
                        self.surface.set_pagination(Pagination::hidden());
                        Applied::Failed
                    }
                }
            }

            FetchOutcome::Stats { generation, result } => {
                if !self.coordinator.is_current(generation) {
                    tracing::debug!(%generation, "discarding stale statistics");
                    return Applied::Stale;
                }
                match result {
                    Ok(stats) => {
                        self.surface.set_stat_cards(view::stat_cards(Some(&stats)));
                        Applied::Rendered
                    }
                    Err(e) => {
                        // Cards keep their last rendered values
                        tracing::warn!(%generation, error = %e, "stats fetch failed");
                        Applied::Failed
                    }
                }
            }

            FetchOutcome::Analyzed { generation, result } => match result {
                Ok(()) => {
                    tracing::info!(%generation, "analysis finished, refreshing");
                    let transition = self.dispatcher.refresh();
                    self.issue(transition);
                    Applied::Rendered
                }
                Err(e) => {
                    tracing::warn!(%generation, error = %e, "analysis failed");
                    self.surface
                        .set_error_banner(Some(format!("Analysis failed: {e}")));
                    Applied::Failed
                }
            },

            FetchOutcome::Files(result) => match result {
                Ok(files) => {
                    tracing::debug!(count = files.len(), "loaded log files");
                    self.surface.set_sources(files);
                    Applied::Rendered
                }
                Err(e) => {
                    tracing::warn!(error = %e, "listing log files failed");
                    self.surface
                        .set_error_banner(Some(format!("Failed to load log files: {e}")));
                    Applied::Failed
                }
            },
        }
    }

    pub fn state(&self) -> &QueryState {
        self.dispatcher.state()
    }

    pub fn generation(&self) -> Generation {
        self.dispatcher.generation()
    }

    /// Page count of the latest applied page, if any
    pub fn total_pages(&self) -> Option<u32> {
        self.dispatcher.total_pages()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn start_analysis(&mut self) {
        if !self.dispatcher.state().has_source() {
            self.surface
                .set_error_banner(Some("Select a log file to analyze".to_string()));
            return;
        }
        self.coordinator.analyze(self.dispatcher.state());
    }

    fn issue(&mut self, transition: Transition) {
        let dispatch = self.coordinator.dispatch(&transition.state, transition.scope);
        tracing::debug!(
            generation = %dispatch.generation,
            data = ?dispatch.data,
            "dispatched"
        );

        if dispatch.data == DataDispatch::NoSource {
            self.surface.set_table(TableBody::NoSource);
            self.surface.set_pagination(Pagination::hidden());
            self.surface.set_stat_cards(StatCards::placeholder());
        }
        if let Some(charts) = dispatch.charts {
            self.surface.set_chart_locators(charts);
        }
    }
}
