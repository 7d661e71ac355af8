use logscope_types::LogFileInfo;

use crate::view::{ChartLocator, Pagination, StatCards, TableBody};

/// Display sinks driven by the explorer.
///
/// These calls are the only effects the synchronization layer produces. A
/// surface never reads state back; each call replaces whatever the
/// corresponding widget showed before.
pub trait RenderSurface {
    fn set_sources(&mut self, sources: Vec<LogFileInfo>);

    fn set_table(&mut self, body: TableBody);

    fn set_pagination(&mut self, pagination: Pagination);

    fn set_stat_cards(&mut self, cards: StatCards);

    fn set_chart_locators(&mut self, charts: Vec<ChartLocator>);

    /// `None` hides the banner
    fn set_error_banner(&mut self, message: Option<String>);
}
