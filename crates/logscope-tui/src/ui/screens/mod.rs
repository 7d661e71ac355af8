mod explorer;
mod source_select;

pub use explorer::ExplorerScreen;
pub use source_select::SourceSelectScreen;
