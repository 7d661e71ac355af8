mod action;
mod state;
mod view;

pub use action::Action;
pub use state::{AppState, InputMode, Screen, UiState};
pub use view::ExplorerView;
