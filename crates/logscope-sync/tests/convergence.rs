//! End-to-end behaviour of the explorer against a backend whose responses
//! are released by the test, in any order.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use logscope_api::{
    AnalyzePayload, ApiError, FilterParams, LogApi, LogsPayload, LogsQuery, StatsPayload,
};
use logscope_sync::{
    Applied, ChartLocator, Explorer, FetchOutcome, FilterUpdate, Intent, Interval, LogFileInfo,
    Pagination, RenderSurface, StatCards, TableBody, TopList,
};

type Reply<T> = oneshot::Sender<logscope_api::Result<T>>;

/// A request the explorer made, waiting for the test to answer it
enum Request {
    Files(Reply<Vec<LogFileInfo>>),
    Logs(LogsQuery, Reply<LogsPayload>),
    Stats(FilterParams, Reply<StatsPayload>),
    Analyze(FilterParams, Reply<AnalyzePayload>),
}

impl Request {
    fn kind(&self) -> &'static str {
        match self {
            Request::Files(_) => "files",
            Request::Logs(..) => "logs",
            Request::Stats(..) => "stats",
            Request::Analyze(..) => "analyze",
        }
    }
}

struct ScriptedApi {
    requests: mpsc::UnboundedSender<Request>,
}

async fn ask<T>(
    requests: &mpsc::UnboundedSender<Request>,
    make: impl FnOnce(Reply<T>) -> Request,
) -> logscope_api::Result<T> {
    let (tx, rx) = oneshot::channel();
    let _ = requests.send(make(tx));
    rx.await
        .unwrap_or_else(|_| Err(ApiError::Decode("test dropped the request".to_string())))
}

impl LogApi for ScriptedApi {
    async fn list_files(&self) -> logscope_api::Result<Vec<LogFileInfo>> {
        ask(&self.requests, Request::Files).await
    }

    async fn fetch_logs(&self, query: &LogsQuery) -> logscope_api::Result<LogsPayload> {
        let query = query.clone();
        ask(&self.requests, |tx| Request::Logs(query, tx)).await
    }

    async fn fetch_stats(&self, filters: &FilterParams) -> logscope_api::Result<StatsPayload> {
        let filters = filters.clone();
        ask(&self.requests, |tx| Request::Stats(filters, tx)).await
    }

    async fn analyze(&self, filters: &FilterParams) -> logscope_api::Result<AnalyzePayload> {
        let filters = filters.clone();
        ask(&self.requests, |tx| Request::Analyze(filters, tx)).await
    }
}

#[derive(Default)]
struct RecordingSurface {
    sources: Vec<LogFileInfo>,
    table: Option<TableBody>,
    pagination: Option<Pagination>,
    cards: Option<StatCards>,
    charts: Vec<ChartLocator>,
    chart_updates: usize,
    banner: Option<String>,
}

impl RenderSurface for RecordingSurface {
    fn set_sources(&mut self, sources: Vec<LogFileInfo>) {
        self.sources = sources;
    }

    fn set_table(&mut self, body: TableBody) {
        self.table = Some(body);
    }

    fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = Some(pagination);
    }

    fn set_stat_cards(&mut self, cards: StatCards) {
        self.cards = Some(cards);
    }

    fn set_chart_locators(&mut self, charts: Vec<ChartLocator>) {
        self.charts = charts;
        self.chart_updates += 1;
    }

    fn set_error_banner(&mut self, message: Option<String>) {
        self.banner = message;
    }
}

struct Harness {
    explorer: Explorer<ScriptedApi, RecordingSurface>,
    outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
    requests: mpsc::UnboundedReceiver<Request>,
}

impl Harness {
    fn new() -> Self {
        let (tx, requests) = mpsc::unbounded_channel();
        let api = Arc::new(ScriptedApi { requests: tx });
        let (explorer, outcomes) = Explorer::new(
            api,
            RecordingSurface::default(),
            NonZeroU32::new(10).unwrap(),
            Interval::Daily,
        );
        Self {
            explorer,
            outcomes,
            requests,
        }
    }

    /// Start the explorer and answer the file listing
    async fn started() -> Self {
        let mut h = Self::new();
        h.explorer.start();
        match h.next_request().await {
            Request::Files(reply) => {
                let _ = reply.send(Ok(vec![LogFileInfo {
                    filename: "access.log".to_string(),
                    size: 4096,
                }]));
            }
            other => panic!("expected file listing, got {}", other.kind()),
        }
        h.settle().await;
        h
    }

    /// Started, with `access.log` selected and its first page rendered
    async fn with_source(total_pages: u32) -> Self {
        let mut h = Self::started().await;
        h.explorer
            .handle(Intent::SubmitFilters(FilterUpdate::source("access.log")));
        let (logs, stats) = h.data_requests().await;
        respond_logs(logs, logs_ok(json!([record("/first")]), total_pages));
        respond_stats(stats, stats_ok(100));
        h.settle().await;
        h.settle().await;
        h
    }

    fn surface(&self) -> &RecordingSurface {
        self.explorer.surface()
    }

    async fn next_request(&mut self) -> Request {
        timeout(Duration::from_secs(1), self.requests.recv())
            .await
            .expect("timed out waiting for a request")
            .expect("request channel closed")
    }

    /// The record and stats requests of one dispatch, in either order
    async fn data_requests(&mut self) -> (LogsRequest, StatsRequest) {
        let mut logs = None;
        let mut stats = None;
        for _ in 0..2 {
            match self.next_request().await {
                Request::Logs(query, reply) => logs = Some((query, reply)),
                Request::Stats(filters, reply) => stats = Some((filters, reply)),
                other => panic!("unexpected {} request", other.kind()),
            }
        }
        (logs.unwrap(), stats.unwrap())
    }

    async fn assert_no_requests(&mut self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        if let Ok(request) = self.requests.try_recv() {
            panic!("unexpected {} request", request.kind());
        }
    }

    async fn next_outcome(&mut self) -> FetchOutcome {
        timeout(Duration::from_secs(1), self.outcomes.recv())
            .await
            .expect("timed out waiting for an outcome")
            .expect("outcome channel closed")
    }

    /// Apply the next outcome
    async fn settle(&mut self) -> Applied {
        let outcome = self.next_outcome().await;
        self.explorer.apply(outcome)
    }
}

type LogsRequest = (LogsQuery, Reply<LogsPayload>);
type StatsRequest = (FilterParams, Reply<StatsPayload>);

fn respond_logs(request: LogsRequest, payload: logscope_api::Result<LogsPayload>) {
    let _ = request.1.send(payload);
}

fn respond_stats(request: StatsRequest, payload: logscope_api::Result<StatsPayload>) {
    let _ = request.1.send(payload);
}

fn record(url: &str) -> Value {
    json!({
        "timestamp": "10/Oct/2024:13:55:36 +0000",
        "ip": "10.0.0.1",
        "method": "GET",
        "url": url,
        "status_code": 200,
        "response_size": 512
    })
}

fn logs_ok(logs: Value, total_pages: u32) -> logscope_api::Result<LogsPayload> {
    Ok(serde_json::from_value(json!({
        "success": true,
        "logs": logs,
        "total_pages": total_pages
    }))
    .unwrap())
}

fn stats_ok(total_requests: u64) -> logscope_api::Result<StatsPayload> {
    Ok(serde_json::from_value(json!({
        "total_requests": total_requests,
        "unique_ips": 3,
        "total_bytes": 1048576,
        "avg_response_size": 512.0,
        "time_range": {"start": "2024-10-10", "end": "2024-10-11"},
        "top_urls": {"/a": 10, "/b": 3, "/c": 7},
        "top_ips": [["10.0.0.1", 9]]
    }))
    .unwrap())
}

fn targets(body: &TableBody) -> Vec<String> {
    match body {
        TableBody::Rows(rows) => rows.iter().map(|r| r.target.text.clone()).collect(),
        other => panic!("expected rows, got {other:?}"),
    }
}

#[tokio::test]
async fn without_source_only_files_are_requested() {
    let mut h = Harness::new();
    h.explorer.start();

    assert!(matches!(h.next_request().await, Request::Files(_)));
    h.assert_no_requests().await;

    let surface = h.surface();
    assert_eq!(surface.table, Some(TableBody::NoSource));
    assert_eq!(surface.cards, Some(StatCards::placeholder()));
    assert_eq!(surface.cards.as_ref().unwrap().total_requests, "-");
    assert!(surface.charts.is_empty());
    assert!(!surface.pagination.as_ref().unwrap().is_visible());
}

#[tokio::test]
async fn file_listing_reaches_the_surface() {
    let h = Harness::started().await;
    assert_eq!(h.surface().sources.len(), 1);
    assert_eq!(h.surface().sources[0].label(), "access.log (4.0KB)");
}

#[tokio::test]
async fn selecting_a_source_fetches_records_stats_and_charts() {
    let mut h = Harness::started().await;
    h.explorer
        .handle(Intent::SubmitFilters(FilterUpdate::source("access.log")));

    let ((query, logs_reply), (filters, stats_reply)) = h.data_requests().await;
    assert_eq!(query.filters.filename.as_deref(), Some("access.log"));
    assert_eq!(query.page, 1);
    assert_eq!(query.page_size, 10);
    assert_eq!(filters.filename.as_deref(), Some("access.log"));

    let charts = &h.surface().charts;
    assert_eq!(charts.len(), 3);
    assert!(charts.iter().all(|c| c.interval == Interval::Daily));

    let _ = logs_reply.send(logs_ok(json!([record("/x"), record("/y")]), 4));
    let _ = stats_reply.send(stats_ok(42));
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(h.settle().await, Applied::Rendered);

    let surface = h.surface();
    assert_eq!(targets(surface.table.as_ref().unwrap()), vec!["/x", "/y"]);
    let pagination = surface.pagination.as_ref().unwrap();
    assert_eq!(pagination.pages, vec![1, 2, 3, 4]);
    assert!(!pagination.prev_enabled);

    let cards = surface.cards.as_ref().unwrap();
    assert_eq!(cards.total_requests, "42");
    assert_eq!(cards.total_traffic, "1.0");
    match &cards.top_urls {
        TopList::Entries(entries) => {
            let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
            assert_eq!(keys, vec!["/a", "/b", "/c"]);
        }
        other => panic!("expected entries, got {other:?}"),
    }
}

#[tokio::test]
async fn search_then_page_converges_on_the_last_action() {
    let mut h = Harness::with_source(5).await;

    h.explorer.handle(Intent::Search("error".to_string()));
    let (search_logs, search_stats) = h.data_requests().await;
    assert_eq!(search_logs.0.search, "error");
    assert_eq!(search_logs.0.page, 1);

    h.explorer.handle(Intent::ChangePage(2));
    let (page_logs, page_stats) = h.data_requests().await;
    assert_eq!(page_logs.0.search, "error");
    assert_eq!(page_logs.0.page, 2);

    // The later action resolves first
    respond_logs(page_logs, logs_ok(json!([record("/page-two")]), 5));
    respond_stats(page_stats, stats_ok(7));
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(h.settle().await, Applied::Rendered);

    respond_logs(search_logs, logs_ok(json!([record("/page-one")]), 5));
    respond_stats(search_stats, stats_ok(999));
    assert_eq!(h.settle().await, Applied::Stale);
    assert_eq!(h.settle().await, Applied::Stale);

    let surface = h.surface();
    assert_eq!(targets(surface.table.as_ref().unwrap()), vec!["/page-two"]);
    assert_eq!(surface.pagination.as_ref().unwrap().current, 2);
    assert_eq!(surface.cards.as_ref().unwrap().total_requests, "7");
}

#[tokio::test]
async fn rapid_actions_apply_only_the_last_generation() {
    let mut h = Harness::with_source(1).await;

    let mut pending = Vec::new();
    let mut generations = vec![h.explorer.generation()];
    for keyword in ["e", "er", "err", "erro", "error"] {
        h.explorer.handle(Intent::Search(keyword.to_string()));
        generations.push(h.explorer.generation());
        pending.push(h.data_requests().await);
    }
    assert!(generations.windows(2).all(|w| w[0] < w[1]));

    // Resolve newest first so every superseded response lands last
    let mut applied = Vec::new();
    for ((query, logs_reply), (_, stats_reply)) in pending.into_iter().rev() {
        let _ = logs_reply.send(logs_ok(json!([record(&format!("/{}", query.search))]), 1));
        let _ = stats_reply.send(Err(ApiError::Decode("unused".to_string())));
        applied.push(h.settle().await);
        applied.push(h.settle().await);
    }

    let rendered = applied.iter().filter(|a| **a == Applied::Rendered).count();
    let stale = applied.iter().filter(|a| **a == Applied::Stale).count();
    assert_eq!(rendered, 1);
    assert_eq!(stale, 8);
    assert_eq!(targets(h.surface().table.as_ref().unwrap()), vec!["/error"]);
}

#[tokio::test]
async fn record_failure_shows_message_and_keeps_stat_cards() {
    let mut h = Harness::with_source(2).await;
    let cards_before = h.surface().cards.clone();
    assert_eq!(cards_before.as_ref().unwrap().total_requests, "100");

    h.explorer.handle(Intent::Search("slow".to_string()));
    let (logs, stats) = h.data_requests().await;
    respond_logs(
        logs,
        Ok(serde_json::from_value(json!({"success": false, "error": "db timeout"})).unwrap()),
    );
    respond_stats(
        stats,
        Err(ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
        }),
    );
    assert_eq!(h.settle().await, Applied::Failed);
    assert_eq!(h.settle().await, Applied::Failed);

    let surface = h.surface();
    assert_eq!(
        surface.table,
        Some(TableBody::Failed("db timeout".to_string()))
    );
    assert_eq!(surface.cards, cards_before);
    assert!(!surface.pagination.as_ref().unwrap().is_visible());
}

#[tokio::test]
async fn record_without_target_renders_placeholder() {
    let mut h = Harness::started().await;
    h.explorer
        .handle(Intent::SubmitFilters(FilterUpdate::source("access.log")));
    let (logs, stats) = h.data_requests().await;
    respond_logs(
        logs,
        logs_ok(json!([{"ip": "10.0.0.2", "status_code": 404}]), 1),
    );
    respond_stats(stats, stats_ok(1));
    h.settle().await;
    h.settle().await;

    match h.surface().table.as_ref().unwrap() {
        TableBody::Rows(rows) => {
            assert_eq!(rows[0].target.text, "-");
            assert_eq!(rows[0].status, "404");
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

#[tokio::test]
async fn out_of_range_pages_are_ignored() {
    let mut h = Harness::with_source(3).await;
    let generation = h.explorer.generation();

    h.explorer.handle(Intent::ChangePage(0));
    h.explorer.handle(Intent::ChangePage(4));
    h.assert_no_requests().await;
    assert_eq!(h.explorer.generation(), generation);
    assert_eq!(h.explorer.state().page(), 1);

    h.explorer.handle(Intent::ChangePage(3));
    let (logs, stats) = h.data_requests().await;
    assert_eq!(logs.0.page, 3);
    respond_logs(logs, logs_ok(json!([record("/last")]), 3));
    respond_stats(stats, stats_ok(1));
    h.settle().await;
    h.settle().await;

    let pagination = h.surface().pagination.clone().unwrap();
    assert_eq!(pagination.current, 3);
    assert_eq!(pagination.pages, vec![1, 2, 3]);
    assert!(!pagination.next_enabled);
}

#[tokio::test]
async fn page_past_a_shrunken_result_falls_back_to_the_last_page() {
    let mut h = Harness::with_source(10).await;

    // The page count is unknown until the search result lands
    h.explorer.handle(Intent::Search("error".to_string()));
    let _pending_search = h.data_requests().await;
    h.explorer.handle(Intent::ChangePage(10));
    let (logs, stats) = h.data_requests().await;
    assert_eq!(logs.0.page, 10);

    respond_logs(logs, logs_ok(json!([]), 3));
    assert_eq!(h.settle().await, Applied::Reissued);
    assert_eq!(h.explorer.state().page(), 3);

    let (last_logs, last_stats) = h.data_requests().await;
    assert_eq!(last_logs.0.page, 3);
    assert_eq!(last_logs.0.search, "error");

    respond_stats(stats, stats_ok(999));
    assert_eq!(h.settle().await, Applied::Stale);

    respond_logs(last_logs, logs_ok(json!([record("/last")]), 3));
    respond_stats(last_stats, stats_ok(5));
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(h.settle().await, Applied::Rendered);

    let surface = h.surface();
    assert_eq!(targets(surface.table.as_ref().unwrap()), vec!["/last"]);
    let pagination = surface.pagination.as_ref().unwrap();
    assert_eq!(pagination.current, 3);
    assert!(!pagination.next_enabled);
    assert_eq!(surface.cards.as_ref().unwrap().total_requests, "5");
}

#[tokio::test]
async fn interval_change_only_refreshes_charts() {
    let mut h = Harness::started().await;
    h.explorer
        .handle(Intent::SubmitFilters(FilterUpdate::source("access.log")));
    let (logs, stats) = h.data_requests().await;
    let updates = h.surface().chart_updates;

    h.explorer.handle(Intent::ChangeInterval(Interval::Hourly));
    h.assert_no_requests().await;
    assert_eq!(h.surface().chart_updates, updates + 1);
    assert!(h.surface().charts.iter().all(|c| c.interval == Interval::Hourly));
    assert!(h.surface().charts[0].path().contains("interval=hourly"));

    // Data requested before the interval change still belongs to the view
    respond_logs(logs, logs_ok(json!([record("/kept")]), 1));
    respond_stats(stats, stats_ok(5));
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(h.explorer.state().page(), 1);
}

#[tokio::test]
async fn resize_reissues_locators_with_the_same_interval() {
    let mut h = Harness::with_source(1).await;
    h.explorer.handle(Intent::ChangeInterval(Interval::Weekly));
    let before = h.surface().charts.clone();
    let generation = h.explorer.generation();

    h.explorer.handle(Intent::Resize);
    h.assert_no_requests().await;

    let after = &h.surface().charts;
    assert_eq!(after.len(), 3);
    for (old, new) in before.iter().zip(after) {
        assert_eq!(old.kind, new.kind);
        assert_eq!(new.interval, Interval::Weekly);
        assert!(new.stamp > old.stamp);
    }
    assert_eq!(h.explorer.generation(), generation);
}

#[tokio::test]
async fn analyze_requires_a_source() {
    let mut h = Harness::started().await;
    h.explorer.handle(Intent::Analyze);
    h.assert_no_requests().await;
    assert_eq!(
        h.surface().banner.as_deref(),
        Some("Select a log file to analyze")
    );
}

#[tokio::test]
async fn successful_analysis_refreshes_everything() {
    let mut h = Harness::with_source(1).await;
    h.explorer.handle(Intent::SubmitFilters(
        FilterUpdate::default().field("status_code", "500"),
    ));
    let (logs, stats) = h.data_requests().await;
    respond_logs(logs, logs_ok(json!([]), 1));
    respond_stats(stats, stats_ok(0));
    h.settle().await;
    h.settle().await;
    assert_eq!(h.surface().table, Some(TableBody::Empty));

    let generation = h.explorer.generation();
    h.explorer.handle(Intent::Analyze);
    match h.next_request().await {
        Request::Analyze(filters, reply) => {
            assert_eq!(filters.filename.as_deref(), Some("access.log"));
            assert_eq!(
                filters.fields.get("status_code").map(String::as_str),
                Some("500")
            );
            let _ = reply.send(Ok(AnalyzePayload {
                success: true,
                error: None,
            }));
        }
        other => panic!("expected analyze, got {}", other.kind()),
    }
    assert_eq!(h.settle().await, Applied::Rendered);
    assert!(h.explorer.generation() > generation);

    let (logs, stats) = h.data_requests().await;
    assert_eq!(logs.0.filters.filename.as_deref(), Some("access.log"));
    respond_logs(logs, logs_ok(json!([record("/fresh")]), 1));
    respond_stats(stats, stats_ok(3));
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(h.settle().await, Applied::Rendered);
    assert_eq!(targets(h.surface().table.as_ref().unwrap()), vec!["/fresh"]);
}

#[tokio::test]
async fn failed_analysis_shows_banner_until_next_action() {
    let mut h = Harness::with_source(1).await;
    h.explorer.handle(Intent::Analyze);
    match h.next_request().await {
        Request::Analyze(_, reply) => {
            let _ = reply.send(Ok(AnalyzePayload {
                success: false,
                error: Some("file missing".to_string()),
            }));
        }
        other => panic!("expected analyze, got {}", other.kind()),
    }
    assert_eq!(h.settle().await, Applied::Failed);
    assert_eq!(
        h.surface().banner.as_deref(),
        Some("Analysis failed: file missing")
    );
    h.assert_no_requests().await;

    h.explorer.handle(Intent::Search("x".to_string()));
    assert_eq!(h.surface().banner, None);
}

#[tokio::test]
async fn clear_returns_to_guide_mode_and_drops_pending_results() {
    let mut h = Harness::with_source(2).await;
    h.explorer.handle(Intent::ChangePage(2));
    let (logs, stats) = h.data_requests().await;

    h.explorer.handle(Intent::Clear);
    h.assert_no_requests().await;
    assert_eq!(h.surface().table, Some(TableBody::NoSource));
    assert_eq!(h.surface().cards, Some(StatCards::placeholder()));
    assert!(h.surface().charts.is_empty());

    respond_logs(logs, logs_ok(json!([record("/late")]), 2));
    respond_stats(stats, stats_ok(1));
    assert_eq!(h.settle().await, Applied::Stale);
    assert_eq!(h.settle().await, Applied::Stale);
    assert_eq!(h.surface().table, Some(TableBody::NoSource));
    assert_eq!(h.explorer.state().page(), 1);
    assert!(!h.explorer.state().has_source());
}
