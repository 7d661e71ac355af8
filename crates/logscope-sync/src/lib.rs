//! Synchronization layer for logscope
//!
//! Owns the explorer's query state, issues the record/stats/chart fetches that
//! state implies, drops responses that belong to superseded state versions,
//! and derives render instructions for a [`RenderSurface`].
//!
//! Nothing here touches a terminal or a socket directly: network access goes
//! through [`logscope_api::LogApi`] and output goes through [`RenderSurface`].

mod coordinator;
mod dispatcher;
mod explorer;
pub mod normalize;
mod state;
mod surface;
pub mod view;

pub use coordinator::{DataDispatch, Dispatch, FetchCoordinator, FetchOutcome};
pub use dispatcher::{ActionDispatcher, FetchScope, Transition};
pub use explorer::{Applied, Explorer, Intent};
pub use state::{FilterUpdate, QueryState};
pub use surface::RenderSurface;
pub use view::{Cell, ChartLocator, Pagination, StatCards, TableBody, TableRow, TopList};

// Re-export types used in our public API
pub use logscope_types::{Generation, Interval, LogFileInfo};
