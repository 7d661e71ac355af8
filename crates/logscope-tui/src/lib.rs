//! TUI components for logscope
//!
//! This crate provides the terminal user interface for logscope: the
//! [`ExplorerView`] render surface fed by `logscope-sync`, keybindings, event
//! handling, and the screens that draw it all.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, ExplorerView, InputMode, Screen, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, StatusBar, list_nav_hints};
pub use ui::screens::{ExplorerScreen, SourceSelectScreen};
pub use ui::{Layout, Theme};
