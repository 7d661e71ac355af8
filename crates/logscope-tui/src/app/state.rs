use ratatui::widgets::{ListState, TableState};

/// Screen enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    SourceSelect,
    Explorer,
}

/// What the input bar is editing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Search keyword
    Search,
    /// `key=value` filter fields
    Filter,
}

/// UI-specific transient state
pub struct UiState {
    /// Current input mode
    pub input_mode: InputMode,

    /// Text being edited in the input bar
    pub input: String,

    /// Why the last submitted input was rejected
    pub input_error: Option<String>,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// List state for the source selection screen
    pub list_state: ListState,

    /// Selected row in the record table
    pub table_state: TableState,

    /// Terminal-level error message (input failures and the like)
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Normal,
            input: String::new(),
            input_error: None,
            help_visible: false,
            list_state: ListState::default(),
            table_state: TableState::default(),
            error_message: None,
        }
    }
}

/// Global application state
pub struct AppState {
    /// Current screen being displayed
    pub current_screen: Screen,

    /// Navigation stack for back navigation
    pub screen_stack: Vec<Screen>,

    /// Backend base URL, shown in the header and prefixed to chart locators
    pub base_url: String,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,
}

impl AppState {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut ui_state = UiState::default();
        ui_state.list_state.select(Some(0));

        Self {
            current_screen: Screen::SourceSelect,
            screen_stack: Vec::new(),
            base_url: base_url.into(),
            ui_state,
            should_quit: false,
            render_dirty: true, // Start dirty to ensure initial render
        }
    }

    /// Navigate to a new screen, pushing current to stack
    pub fn navigate_to(&mut self, screen: Screen) {
        if self.current_screen == screen {
            return;
        }
        self.screen_stack.push(self.current_screen);
        self.current_screen = screen;
    }

    /// Go back to previous screen
    pub fn go_back(&mut self) -> bool {
        if let Some(prev_screen) = self.screen_stack.pop() {
            self.current_screen = prev_screen;
            true
        } else {
            false
        }
    }

    /// Move selection up in a list of `len` items, wrapping around
    pub fn list_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.ui_state.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => (i - 1).min(len - 1),
        };
        self.ui_state.list_state.select(Some(i));
    }

    /// Move selection down in a list of `len` items, wrapping around
    pub fn list_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.ui_state.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.ui_state.list_state.select(Some(i));
    }

    /// Get currently selected index
    pub fn selected_index(&self) -> Option<usize> {
        self.ui_state.list_state.selected()
    }

    pub fn row_up(&mut self) {
        let previous = self
            .ui_state
            .table_state
            .selected()
            .map_or(0, |i| i.saturating_sub(1));
        self.ui_state.table_state.select(Some(previous));
    }

    pub fn row_down(&mut self, rows: usize) {
        if rows == 0 {
            self.ui_state.table_state.select(None);
            return;
        }
        let next = self
            .ui_state
            .table_state
            .selected()
            .map_or(0, |i| (i + 1).min(rows - 1));
        self.ui_state.table_state.select(Some(next));
    }

    /// Forget the selected row (a new page replaced the table)
    pub fn reset_rows(&mut self) {
        self.ui_state.table_state.select(None);
    }

    pub fn is_editing(&self) -> bool {
        self.ui_state.input_mode != InputMode::Normal
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.ui_state.error_message = Some(msg);
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }

    /// Start editing, pre-filled with `initial`
    pub fn start_input(&mut self, mode: InputMode, initial: impl Into<String>) {
        self.ui_state.input_mode = mode;
        self.ui_state.input = initial.into();
        self.ui_state.input_error = None;
    }

    /// Leave input mode without submitting
    pub fn cancel_input(&mut self) {
        self.ui_state.input_mode = InputMode::Normal;
        self.ui_state.input.clear();
        self.ui_state.input_error = None;
    }

    /// Leave input mode, returning what was being edited
    pub fn take_input(&mut self) -> (InputMode, String) {
        let mode = std::mem::take(&mut self.ui_state.input_mode);
        self.ui_state.input_error = None;
        (mode, std::mem::take(&mut self.ui_state.input))
    }

    /// Re-open the input with a rejection message
    pub fn reject_input(&mut self, mode: InputMode, input: String, error: String) {
        self.ui_state.input_mode = mode;
        self.ui_state.input = input;
        self.ui_state.input_error = Some(error);
    }

    /// Add a character to the input
    pub fn input_char(&mut self, c: char) {
        self.ui_state.input.push(c);
    }

    /// Remove last character from the input
    pub fn input_backspace(&mut self) {
        self.ui_state.input.pop();
    }

    pub fn input_clear(&mut self) {
        self.ui_state.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_stack() {
        let mut state = AppState::new("http://localhost:5000");
        assert_eq!(state.current_screen, Screen::SourceSelect);

        state.navigate_to(Screen::Explorer);
        state.navigate_to(Screen::Explorer);
        assert_eq!(state.screen_stack.len(), 1);

        assert!(state.go_back());
        assert_eq!(state.current_screen, Screen::SourceSelect);
        assert!(!state.go_back());
    }

    #[test]
    fn test_list_selection_wraps() {
        let mut state = AppState::new("");
        state.list_up(3);
        assert_eq!(state.selected_index(), Some(2));
        state.list_down(3);
        assert_eq!(state.selected_index(), Some(0));
        state.list_down(0);
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn test_row_selection_stops_at_last_row() {
        let mut state = AppState::new("");
        state.row_down(2);
        state.row_down(2);
        state.row_down(2);
        assert_eq!(state.ui_state.table_state.selected(), Some(1));
        state.reset_rows();
        assert_eq!(state.ui_state.table_state.selected(), None);
    }

    #[test]
    fn test_take_input_leaves_input_mode() {
        let mut state = AppState::new("");
        state.start_input(InputMode::Search, "err");
        state.input_char('o');
        state.input_char('r');
        assert!(state.is_editing());

        let (mode, text) = state.take_input();
        assert_eq!(mode, InputMode::Search);
        assert_eq!(text, "error");
        assert!(!state.is_editing());
        assert!(state.ui_state.input.is_empty());
    }
}
