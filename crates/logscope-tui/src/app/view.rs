use logscope_sync::{
    ChartLocator, LogFileInfo, Pagination, RenderSurface, StatCards, TableBody, TableRow,
};

/// Last render instructions received from the explorer.
///
/// Screens draw from this value on every frame; nothing here is derived
/// locally.
#[derive(Clone, Debug)]
pub struct ExplorerView {
    pub sources: Vec<LogFileInfo>,
    pub table: TableBody,
    pub pagination: Pagination,
    pub cards: StatCards,
    pub charts: Vec<ChartLocator>,
    pub banner: Option<String>,
    /// Bumped whenever the table body is replaced
    pub table_version: u64,
}

impl Default for ExplorerView {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            table: TableBody::NoSource,
            pagination: Pagination::hidden(),
            cards: StatCards::placeholder(),
            charts: Vec::new(),
            banner: None,
            table_version: 0,
        }
    }
}

impl ExplorerView {
    /// Rows of the table, empty for every non-row body
    pub fn rows(&self) -> &[TableRow] {
        match &self.table {
            TableBody::Rows(rows) => rows,
            _ => &[],
        }
    }
}

impl RenderSurface for ExplorerView {
    fn set_sources(&mut self, sources: Vec<LogFileInfo>) {
        self.sources = sources;
    }

    fn set_table(&mut self, body: TableBody) {
        self.table = body;
        self.table_version += 1;
    }

    fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    fn set_stat_cards(&mut self, cards: StatCards) {
        self.cards = cards;
    }

    fn set_chart_locators(&mut self, charts: Vec<ChartLocator>) {
        self.charts = charts;
    }

    fn set_error_banner(&mut self, message: Option<String>) {
        self.banner = message;
    }
}
