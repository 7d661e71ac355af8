/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    OpenSourceSelect,
    GoBack,
    Quit,

    // UI toggles
    ToggleHelp,

    // List navigation
    ListUp,
    ListDown,
    ListSelect,

    // Table rows
    RowUp,
    RowDown,

    // Text input (search keyword or filter fields)
    OpenSearch,
    OpenFilter,
    InputChar(char),
    InputBackspace,
    InputClear,
    InputSubmit,
    InputCancel,

    // Paging
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CyclePageSize,

    // Charts
    CycleInterval,
    CycleIntervalBack,

    // Query
    Analyze,
    ClearQuery,

    // Error handling
    ShowError(String),
    DismissError,

    // Terminal resized
    Resize,
}
