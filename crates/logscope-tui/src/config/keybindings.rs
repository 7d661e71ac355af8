use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    ListNavigation,
    Explorer,
    TextInput,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Source list
        let mut list_nav = HashMap::new();
        list_nav.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        list_nav.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        list_nav.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        list_nav.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        list_nav.insert(KeyBinding::new(KeyCode::Enter), Action::ListSelect);
        bindings.insert(KeyContext::ListNavigation, list_nav);

        // Explorer
        let mut explorer = HashMap::new();
        // Rows
        explorer.insert(KeyBinding::new(KeyCode::Char('j')), Action::RowDown);
        explorer.insert(KeyBinding::new(KeyCode::Down), Action::RowDown);
        explorer.insert(KeyBinding::new(KeyCode::Char('k')), Action::RowUp);
        explorer.insert(KeyBinding::new(KeyCode::Up), Action::RowUp);
        // Pages
        explorer.insert(KeyBinding::new(KeyCode::Char('l')), Action::NextPage);
        explorer.insert(KeyBinding::new(KeyCode::Right), Action::NextPage);
        explorer.insert(KeyBinding::new(KeyCode::PageDown), Action::NextPage);
        explorer.insert(KeyBinding::new(KeyCode::Char('h')), Action::PrevPage);
        explorer.insert(KeyBinding::new(KeyCode::Left), Action::PrevPage);
        explorer.insert(KeyBinding::new(KeyCode::PageUp), Action::PrevPage);
        explorer.insert(KeyBinding::new(KeyCode::Char('g')), Action::FirstPage);
        explorer.insert(KeyBinding::new(KeyCode::Home), Action::FirstPage);
        explorer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::LastPage);
        explorer.insert(KeyBinding::new(KeyCode::End), Action::LastPage);
        explorer.insert(KeyBinding::new(KeyCode::Char('z')), Action::CyclePageSize);
        // Charts
        explorer.insert(KeyBinding::new(KeyCode::Char('i')), Action::CycleInterval);
        explorer.insert(KeyBinding::shift(KeyCode::Char('I')), Action::CycleIntervalBack);
        // Query
        explorer.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        explorer.insert(KeyBinding::new(KeyCode::Char('f')), Action::OpenFilter);
        explorer.insert(KeyBinding::new(KeyCode::Char('o')), Action::OpenSourceSelect);
        explorer.insert(KeyBinding::new(KeyCode::Char('a')), Action::Analyze);
        explorer.insert(KeyBinding::new(KeyCode::Char('c')), Action::ClearQuery);
        explorer.insert(KeyBinding::new(KeyCode::Char('x')), Action::DismissError);
        bindings.insert(KeyContext::Explorer, explorer);

        // Text input (search and filter bars)
        let mut text_input = HashMap::new();
        text_input.insert(KeyBinding::new(KeyCode::Enter), Action::InputSubmit);
        text_input.insert(KeyBinding::new(KeyCode::Esc), Action::InputCancel);
        text_input.insert(KeyBinding::new(KeyCode::Backspace), Action::InputBackspace);
        text_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::InputClear);
        text_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::InputCancel);
        bindings.insert(KeyContext::TextInput, text_input);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|bindings| bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event while the input bar is active
    /// Returns Some(Action) for special keys, InputChar for regular characters
    pub fn get_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&KeyContext::TextInput)
            .and_then(|bindings| bindings.get(&binding))
        {
            return Some(action.clone());
        }

        match key.code {
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                Some(Action::InputChar(c))
            }
            _ => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
