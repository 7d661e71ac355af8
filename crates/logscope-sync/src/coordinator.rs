use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use logscope_api::{ApiError, LogApi};
use logscope_types::{Generation, LogFileInfo, Page, StatsSummary};

use crate::dispatcher::FetchScope;
use crate::normalize;
use crate::state::QueryState;
use crate::view::{self, ChartLocator};

/// Completion of a background fetch, tagged with the generation it was
/// issued for
#[derive(Debug)]
pub enum FetchOutcome {
    Records {
        generation: Generation,
        result: Result<Page, ApiError>,
    },
    Stats {
        generation: Generation,
        result: Result<StatsSummary, ApiError>,
    },
    Analyzed {
        generation: Generation,
        result: Result<(), ApiError>,
    },
    Files(Result<Vec<LogFileInfo>, ApiError>),
}

/// What happened to the record/stats consumers on a dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataDispatch {
    /// Record and stats fetches are in flight
    Issued,
    /// No source selected; nothing was sent
    NoSource,
    /// The transition did not touch records or stats
    Skipped,
    /// This generation was already dispatched
    AlreadyIssued,
}

/// Result of [`FetchCoordinator::dispatch`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: Generation,
    pub data: DataDispatch,
    /// New chart locators, when the transition affects charts
    pub charts: Option<Vec<ChartLocator>>,
}

/// Issues backend requests for a query state.
///
/// Requests run as detached tasks; their results come back through the
/// receiver returned by [`FetchCoordinator::new`]. In-flight requests are
/// never cancelled. Superseded results are recognised with
/// [`FetchCoordinator::is_current`] and dropped by the caller.
pub struct FetchCoordinator<A: LogApi> {
    api: Arc<A>,
    outcomes: UnboundedSender<FetchOutcome>,
    /// Generation of the latest state whose records/stats were requested
    data_generation: Option<Generation>,
    last_stamp: i64,
}

impl<A: LogApi> FetchCoordinator<A> {
    pub fn new(api: Arc<A>) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (outcomes, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            api,
            outcomes,
            data_generation: None,
            last_stamp: 0,
        };
        (coordinator, rx)
    }

    /// Issue whatever `scope` requires for `state`
    pub fn dispatch(&mut self, state: &QueryState, scope: FetchScope) -> Dispatch {
        let generation = state.generation();

        let data = if !scope.includes_data() {
            DataDispatch::Skipped
        } else if self.data_generation == Some(generation) {
            DataDispatch::AlreadyIssued
        } else {
            self.data_generation = Some(generation);
            if state.has_source() {
                self.fetch_records(state);
                self.fetch_stats(state);
                DataDispatch::Issued
            } else {
                tracing::debug!(%generation, "no source selected, skipping record and stats fetch");
                DataDispatch::NoSource
            }
        };

        let charts = scope
            .includes_charts()
            .then(|| self.chart_locators(state));

        Dispatch {
            generation,
            data,
            charts,
        }
    }

    /// Whether a record/stats result tagged `generation` may be applied
    pub fn is_current(&self, generation: Generation) -> bool {
        self.data_generation == Some(generation)
    }

    /// Fresh chart locators for `state`, stamped with the current time
    pub fn chart_locators(&mut self, state: &QueryState) -> Vec<ChartLocator> {
        let stamp = self.next_stamp();
        view::chart_locators(state.has_source(), state.interval(), stamp)
    }

    /// Ask the backend to re-aggregate with the filters of `state`
    pub fn analyze(&self, state: &QueryState) {
        let api = Arc::clone(&self.api);
        let tx = self.outcomes.clone();
        let generation = state.generation();
        let params = state.filter_params();

        tokio::spawn(async move {
            let result = api.analyze(&params).await.and_then(|payload| {
                if payload.success {
                    Ok(())
                } else {
                    Err(ApiError::Backend(
                        payload.error.unwrap_or_else(|| "unknown error".to_string()),
                    ))
                }
            });
            let _ = tx.send(FetchOutcome::Analyzed { generation, result });
        });
    }

    /// Load the list of analyzable log files
    pub fn list_files(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.outcomes.clone();

        tokio::spawn(async move {
            let result = api.list_files().await;
            let _ = tx.send(FetchOutcome::Files(result));
        });
    }

    fn fetch_records(&self, state: &QueryState) {
        let api = Arc::clone(&self.api);
        let tx = self.outcomes.clone();
        let generation = state.generation();
        let query = state.logs_query();
        let page_size = state.page_size();

        tokio::spawn(async move {
            let result = api
                .fetch_logs(&query)
                .await
                .and_then(|payload| normalize::page(payload, page_size));
            let _ = tx.send(FetchOutcome::Records { generation, result });
        });
    }

    fn fetch_stats(&self, state: &QueryState) {
        let api = Arc::clone(&self.api);
        let tx = self.outcomes.clone();
        let generation = state.generation();
        let params = state.filter_params();

        tokio::spawn(async move {
            let result = api.fetch_stats(&params).await.and_then(|payload| {
                match payload.error.clone() {
                    Some(error) => Err(ApiError::Backend(error)),
                    None => Ok(normalize::stats(&payload)),
                }
            });
            let _ = tx.send(FetchOutcome::Stats { generation, result });
        });
    }

    /// Millisecond timestamp, strictly increasing across calls
    fn next_stamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }
}
