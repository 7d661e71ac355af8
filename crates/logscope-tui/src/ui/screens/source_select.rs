use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    app::{AppState, ExplorerView},
    ui::{
        Layout, Theme,
        components::{StatusBar, list_nav_hints},
    },
};

/// Log file selection screen
pub struct SourceSelectScreen;

impl SourceSelectScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState, view: &ExplorerView, current: Option<&str>) {
        let area = frame.area();
        let (header_area, content_area, status_area) = Layout::main(area);

        Self::render_header(frame, header_area, state);
        Self::render_list(frame, content_area, state, view, current);
        Self::render_status_bar(frame, status_area, view);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let title = Line::from(vec![
            Span::styled("logscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled("Select Log File", Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.base_url.as_str(), Theme::text_dim()),
        ]);

        let header = Paragraph::new(title).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_list(
        frame: &mut Frame,
        area: Rect,
        state: &mut AppState,
        view: &ExplorerView,
        current: Option<&str>,
    ) {
        let list_area = Layout::centered_list(area, 80);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Log Files ", Theme::title()));

        if view.sources.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No log files found on the backend",
                Theme::text_dim(),
            )))
            .block(block);
            frame.render_widget(empty, list_area);
            return;
        }

        let items: Vec<ListItem> = view
            .sources
            .iter()
            .map(|file| {
                let is_current = current == Some(file.filename.as_str());
                let (text, style) = if is_current {
                    (format!("{} (current)", file.label()), Theme::list_item_current())
                } else {
                    (file.label(), Theme::list_item())
                };
                ListItem::new(Line::from(Span::styled(text, style)))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Theme::list_item_selected())
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, list_area, &mut state.ui_state.list_state);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, view: &ExplorerView) {
        let status = StatusBar::new()
            .hints(list_nav_hints())
            .right(format!("{} files", view.sources.len()));

        frame.render_widget(status, area);
    }
}
