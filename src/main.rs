mod config;

use std::fs::File;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use logscope_api::HttpLogApi;
use logscope_sync::{Explorer, FetchOutcome, FilterUpdate, Intent, RenderSurface};
use logscope_tui::{
    Action, AppState, Event, EventHandler, ExplorerScreen, ExplorerView, HelpOverlay, InputMode,
    KeyBindings, KeyContext, Screen, SourceSelectScreen, Tui,
};
use logscope_types::next_page_size;

use crate::config::{Config, ConfigOverrides};

type AppExplorer = Explorer<HttpLogApi, ExplorerView>;

/// Logscope - A terminal explorer for parsed web server access logs
#[derive(Parser, Debug)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log file to open directly (skips the file picker)
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Backend base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Records per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Chart interval (hourly, daily, weekly, monthly)
    #[arg(long)]
    interval: Option<String>,

    /// Request timeout, e.g. "10s" or "1m"
    #[arg(long, value_name = "DURATION")]
    timeout: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/logscope/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args)?;

    let mut config = Config::load(args.config.as_deref())?;
    config.apply(
        ConfigOverrides {
            base_url: args.base_url.clone(),
            page_size: args.page_size,
            interval: args.interval.clone(),
            request_timeout: args.timeout.clone(),
            tick_rate_ms: None,
        },
        "command line",
    )?;
    tracing::debug!(?config, "configuration loaded");

    let result = run_app(args.file, config).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .with_context(|| format!("invalid log level '{}'", args.log_level))?;

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run_app(file: Option<String>, config: Config) -> Result<()> {
    let api = HttpLogApi::new(&config.base_url, config.request_timeout)
        .context("failed to build HTTP client")?;
    let (mut explorer, mut outcomes) = Explorer::new(
        Arc::new(api),
        ExplorerView::default(),
        config.page_size,
        config.interval,
    );

    let mut state = AppState::new(config.base_url.clone());
    explorer.start();

    // Open the file given on the command line straight away
    if let Some(file) = file {
        explorer.handle(Intent::SubmitFilters(FilterUpdate::source(file)));
        state.navigate_to(Screen::Explorer);
    }

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(config.tick_rate);
    let keybindings = KeyBindings::new();

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.is_editing() {
                            keybindings.get_input_action(&key)
                        } else {
                            let context = match state.current_screen {
                                Screen::SourceSelect => KeyContext::ListNavigation,
                                Screen::Explorer => KeyContext::Explorer,
                            };
                            keybindings.get_action(context, &key)
                        };

                        if let Some(action) = action {
                            handle_action(&mut state, &mut explorer, action);
                        }
                    }
                    Event::Tick => {}
                    Event::Resize(_, _) => {
                        handle_action(&mut state, &mut explorer, Action::Resize);
                    }
                    Event::Error(e) => {
                        handle_action(&mut state, &mut explorer, Action::ShowError(e));
                    }
                }
            }

            Some(outcome) = outcomes.recv() => {
                apply_outcome(&mut state, &mut explorer, outcome);
            }

            else => break,
        }

        if state.should_quit {
            break;
        }

        if state.render_dirty {
            render(&mut tui, &mut state, &explorer)?;
            state.render_dirty = false;
        }
    }

    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn apply_outcome(state: &mut AppState, explorer: &mut AppExplorer, outcome: FetchOutcome) {
    let table_version = explorer.surface().table_version;
    let applied = explorer.apply(outcome);
    tracing::trace!(?applied, "fetch outcome");

    if explorer.surface().table_version != table_version {
        state.reset_rows();
    }
    state.render_dirty = true;
}

fn handle_action(state: &mut AppState, explorer: &mut AppExplorer, action: Action) {
    state.render_dirty = true;

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::GoBack => {
            if state.ui_state.help_visible {
                state.ui_state.help_visible = false;
            } else if !state.go_back() {
                state.should_quit = true;
            }
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }

        Action::OpenSourceSelect => {
            let current = explorer.state().source().and_then(|source| {
                explorer
                    .surface()
                    .sources
                    .iter()
                    .position(|f| f.filename == source)
            });
            state.ui_state.list_state.select(Some(current.unwrap_or(0)));
            state.navigate_to(Screen::SourceSelect);
        }
        Action::ListUp => {
            state.list_up(explorer.surface().sources.len());
        }
        Action::ListDown => {
            state.list_down(explorer.surface().sources.len());
        }
        Action::ListSelect => {
            let selected = state
                .selected_index()
                .and_then(|idx| explorer.surface().sources.get(idx))
                .map(|file| file.filename.clone());
            if let Some(filename) = selected {
                explorer.handle(Intent::SubmitFilters(FilterUpdate::source(filename)));
                if !state.go_back() {
                    state.navigate_to(Screen::Explorer);
                }
            }
        }

        Action::RowUp => state.row_up(),
        Action::RowDown => state.row_down(explorer.surface().rows().len()),

        Action::OpenSearch => {
            state.start_input(InputMode::Search, explorer.state().search());
        }
        Action::OpenFilter => {
            let current = explorer
                .state()
                .filters()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            state.start_input(InputMode::Filter, current);
        }
        Action::InputChar(c) => state.input_char(c),
        Action::InputBackspace => state.input_backspace(),
        Action::InputClear => state.input_clear(),
        Action::InputCancel => state.cancel_input(),
        Action::InputSubmit => submit_input(state, explorer),

        Action::NextPage => {
            let pagination = &explorer.surface().pagination;
            if pagination.next_enabled {
                let page = pagination.current + 1;
                explorer.handle(Intent::ChangePage(page));
            }
        }
        Action::PrevPage => {
            let pagination = &explorer.surface().pagination;
            if pagination.prev_enabled {
                let page = pagination.current - 1;
                explorer.handle(Intent::ChangePage(page));
            }
        }
        Action::FirstPage => {
            if explorer.surface().pagination.prev_enabled {
                explorer.handle(Intent::ChangePage(1));
            }
        }
        Action::LastPage => {
            let pagination = &explorer.surface().pagination;
            if pagination.next_enabled {
                let page = pagination.total;
                explorer.handle(Intent::ChangePage(page));
            }
        }
        Action::CyclePageSize => {
            let next = next_page_size(explorer.state().page_size());
            if let Some(size) = NonZeroU32::new(next) {
                explorer.handle(Intent::ChangePageSize(size));
            }
        }

        Action::CycleInterval => {
            let interval = explorer.state().interval().next();
            explorer.handle(Intent::ChangeInterval(interval));
        }
        Action::CycleIntervalBack => {
            let interval = explorer.state().interval().prev();
            explorer.handle(Intent::ChangeInterval(interval));
        }

        Action::Analyze => explorer.handle(Intent::Analyze),
        Action::ClearQuery => explorer.handle(Intent::Clear),

        Action::ShowError(msg) => {
            tracing::warn!(error = %msg, "terminal error");
            state.show_error(msg);
        }
        Action::DismissError => {
            state.dismiss_error();
            explorer.surface_mut().set_error_banner(None);
        }

        Action::Resize => explorer.handle(Intent::Resize),
    }
}

/// Turn the submitted input bar into a query change
fn submit_input(state: &mut AppState, explorer: &mut AppExplorer) {
    let (mode, input) = state.take_input();
    match mode {
        InputMode::Search => {
            explorer.handle(Intent::Search(input.trim().to_string()));
        }
        InputMode::Filter => match FilterUpdate::parse(&input) {
            Ok(mut update) => {
                // The bar shows every active field, so a missing one was deleted
                for key in explorer.state().filters().keys() {
                    update
                        .fields
                        .entry(key.clone())
                        .or_insert_with(String::new);
                }
                explorer.handle(Intent::SubmitFilters(update));
            }
            Err(e) => state.reject_input(mode, input, e),
        },
        InputMode::Normal => {}
    }
}

fn render(tui: &mut Tui, state: &mut AppState, explorer: &AppExplorer) -> Result<()> {
    tui.terminal().draw(|frame| {
        match state.current_screen {
            Screen::SourceSelect => {
                SourceSelectScreen::render(
                    frame,
                    state,
                    explorer.surface(),
                    explorer.state().source(),
                );
            }
            Screen::Explorer => {
                ExplorerScreen::render(frame, state, explorer.surface(), explorer.state());
            }
        }

        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    })?;

    Ok(())
}
