use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TableCell, Paragraph, Row, Table, Wrap},
};

use logscope_sync::{Pagination, QueryState, StatCards, TableBody, TableRow, TopList};

use crate::{
    app::{AppState, ExplorerView, InputMode},
    ui::{Layout, Theme, components::StatusBar},
};

/// Record table, statistics and charts for the selected log file
pub struct ExplorerScreen;

impl ExplorerScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState, view: &ExplorerView, query: &QueryState) {
        let banner = view
            .banner
            .as_deref()
            .or(state.ui_state.error_message.as_deref());
        let areas = Layout::explorer(frame.area(), banner.is_some(), state.is_editing());

        Self::render_header(frame, areas.header, query);
        if let (Some(area), Some(message)) = (areas.banner, banner) {
            Self::render_banner(frame, area, message);
        }
        Self::render_cards(frame, areas.cards, &view.cards);
        if let Some(area) = areas.input {
            Self::render_input(frame, area, state);
        }
        Self::render_table(frame, areas.table, state, view);
        Self::render_sidebar(frame, areas.sidebar, state, view);
        Self::render_pagination(frame, areas.pagination, &view.pagination);
        Self::render_status_bar(frame, areas.status, view, query);
    }

    fn render_header(frame: &mut Frame, area: Rect, query: &QueryState) {
        let mut spans = vec![
            Span::styled("logscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            match query.source() {
                Some(source) => Span::styled(source.to_string(), Theme::text_highlight()),
                None => Span::styled("no log file", Theme::text_dim()),
            },
        ];

        if !query.search().is_empty() {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(format!("search: {}", query.search()), Theme::text()));
        }

        if !query.filters().is_empty() {
            let filters = query
                .filters()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(filters, Theme::text()));
        }

        spans.push(Span::styled(" │ ", Theme::text_dim()));
        spans.push(Span::styled(
            format!("⏱ {}", query.interval()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" │ ", Theme::text_dim()));
        spans.push(Span::styled(
            format!("{}/page", query.page_size()),
            Theme::text(),
        ));

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_banner(frame: &mut Frame, area: Rect, message: &str) {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(format!(" ⚠ {message}"), Theme::banner()),
            Span::styled("  [x] dismiss", Theme::banner()),
        ]))
        .style(Theme::banner());
        frame.render_widget(banner, area);
    }

    fn render_cards(frame: &mut Frame, area: Rect, cards: &StatCards) {
        let entries = [
            ("Requests", cards.total_requests.as_str()),
            ("Unique IPs", cards.unique_ips.as_str()),
            ("Traffic (MB)", cards.total_traffic.as_str()),
            ("Avg size (B)", cards.avg_response_size.as_str()),
            ("From", cards.time_start.as_str()),
            ("To", cards.time_end.as_str()),
        ];

        let columns = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 7),
                Constraint::Ratio(1, 7),
                Constraint::Ratio(1, 7),
                Constraint::Ratio(1, 7),
                Constraint::Ratio(3, 14),
                Constraint::Ratio(3, 14),
            ])
            .split(area);

        for ((title, value), rect) in entries.into_iter().zip(columns.iter()) {
            let card = Paragraph::new(Line::from(Span::styled(value, Theme::card_value()))).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(Span::styled(format!(" {title} "), Theme::text_dim())),
            );
            frame.render_widget(card, *rect);
        }
    }

    fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
        let (prompt, title) = match state.ui_state.input_mode {
            InputMode::Filter => (" filter: ", " Filters (key=value, file=<name>) "),
            _ => (" /", " Search "),
        };

        let mut spans = vec![
            Span::styled(
                prompt,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(state.ui_state.input.clone(), Theme::text_highlight()),
            Span::styled(
                "█",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ];

        if let Some(err) = &state.ui_state.input_error {
            spans.push(Span::styled(" ", Theme::text()));
            spans.push(Span::styled(format!("⚠ {err}"), Style::default().fg(Color::Red)));
        }
        spans.push(Span::styled("  [Enter] Apply  [Esc] Cancel", Theme::text_dim()));

        let border = if state.ui_state.input_error.is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(bar, area);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState, view: &ExplorerView) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Records ", Theme::title()));

        let message = match &view.table {
            TableBody::Rows(rows) => {
                let table = Table::new(rows.iter().map(Self::row), Self::widths())
                    .header(Self::header_row())
                    .block(block)
                    .row_highlight_style(Theme::row_selected())
                    .highlight_symbol("▶ ");
                frame.render_stateful_widget(table, area, &mut state.ui_state.table_state);
                return;
            }
            TableBody::Empty => Span::styled("No data", Theme::text_dim()),
            TableBody::NoSource => Span::styled(
                "Select a log file to analyze (press o)",
                Theme::text_highlight(),
            ),
            TableBody::Failed(message) => Span::styled(message.clone(), Theme::error()),
        };

        let paragraph = Paragraph::new(Line::from(message))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
    }

    fn widths() -> [Constraint; 8] {
        [
            Constraint::Length(19), // Time
            Constraint::Length(15), // IP
            Constraint::Length(6),  // Status
            Constraint::Length(7),  // Method
            Constraint::Min(20),    // Target
            Constraint::Length(10), // Size
            Constraint::Length(20), // User agent
            Constraint::Min(20),    // Message
        ]
    }

    fn header_row() -> Row<'static> {
        Row::new([
            "Time",
            "IP",
            "Status",
            "Method",
            "Target",
            "Size",
            "User Agent",
            "Message",
        ])
        .style(Theme::table_header())
    }

    fn row(row: &TableRow) -> Row<'_> {
        Row::new([
            TableCell::from(row.timestamp.as_str()),
            TableCell::from(row.source_address.as_str()),
            TableCell::from(Span::styled(
                row.status.as_str(),
                Style::default().fg(row.status_class.color()),
            )),
            TableCell::from(row.method.as_str()),
            TableCell::from(row.target.text.as_str()),
            TableCell::from(row.size.as_str()),
            TableCell::from(row.user_agent.text.as_str()),
            TableCell::from(row.message.text.as_str()),
        ])
    }

    fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState, view: &ExplorerView) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // Top URLs
                Constraint::Length(7), // Top IPs
                Constraint::Length(5), // Charts
                Constraint::Min(3),    // Row details
            ])
            .split(area);

        Self::render_top_list(frame, chunks[0], " Top URLs ", &view.cards.top_urls);
        Self::render_top_list(frame, chunks[1], " Top IPs ", &view.cards.top_ips);
        Self::render_charts(frame, chunks[2], state, view);
        Self::render_details(frame, chunks[3], state, view);
    }

    fn render_top_list(frame: &mut Frame, area: Rect, title: &str, list: &TopList) {
        let lines: Vec<Line> = match list {
            TopList::SelectSource => vec![Line::from(Span::styled(
                "Select a log file to analyze",
                Theme::text_dim(),
            ))],
            TopList::Entries(entries) if entries.is_empty() => {
                vec![Line::from(Span::styled("No data", Theme::text_dim()))]
            }
            TopList::Entries(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    Line::from(vec![
                        Span::styled(format!("{}. ", i + 1), Theme::text_dim()),
                        Span::styled(entry.key.clone(), Theme::text()),
                        Span::styled(format!("  {} requests", entry.count), Theme::text_highlight()),
                    ])
                })
                .collect(),
        };

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(widget, area);
    }

    fn render_charts(frame: &mut Frame, area: Rect, state: &AppState, view: &ExplorerView) {
        let lines: Vec<Line> = if view.charts.is_empty() {
            vec![Line::from(Span::styled("No charts", Theme::text_dim()))]
        } else {
            view.charts
                .iter()
                .map(|chart| {
                    Line::from(vec![
                        Span::styled(format!("{}: ", chart.kind.title()), Theme::text_dim()),
                        Span::styled(
                            format!("{}{}", state.base_url, chart.path()),
                            Theme::text(),
                        ),
                    ])
                })
                .collect()
        };

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Charts ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }

    /// Full text of the truncated cells of the selected row
    fn render_details(frame: &mut Frame, area: Rect, state: &AppState, view: &ExplorerView) {
        let selected = state
            .ui_state
            .table_state
            .selected()
            .and_then(|i| view.rows().get(i));

        let lines = match selected {
            Some(row) => vec![
                Self::detail_line("Target", &row.target.title),
                Self::detail_line("Agent", &row.user_agent.title),
                Self::detail_line("Message", &row.message.title),
            ],
            None => vec![Line::from(Span::styled(
                "Select a row (j/k)",
                Theme::text_dim(),
            ))],
        };

        let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Details ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }

    fn detail_line<'a>(label: &'a str, value: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{label}: "), Theme::text_dim()),
            Span::styled(value, Theme::text()),
        ])
    }

    fn render_pagination(frame: &mut Frame, area: Rect, pagination: &Pagination) {
        if !pagination.is_visible() {
            return;
        }

        let arrow = |text: &'static str, enabled: bool| {
            Span::styled(
                text,
                if enabled {
                    Theme::text_highlight()
                } else {
                    Theme::page_disabled()
                },
            )
        };

        let mut spans = vec![Span::raw(" "), arrow("‹ prev", pagination.prev_enabled), Span::raw(" ")];
        for page in &pagination.pages {
            let style = if *page == pagination.current {
                Theme::page_current()
            } else {
                Theme::text()
            };
            spans.push(Span::styled(format!(" {page} "), style));
        }
        spans.push(Span::raw(" "));
        spans.push(arrow("next ›", pagination.next_enabled));
        spans.push(Span::styled(
            format!("   of {}", pagination.total),
            Theme::text_dim(),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, view: &ExplorerView, query: &QueryState) {
        let right = if view.pagination.is_visible() {
            format!("page {}/{}", view.pagination.current, view.pagination.total)
        } else {
            format!("{} rows", view.rows().len())
        };

        let status = StatusBar::new()
            .hints([
                ("/", "Search"),
                ("f", "Filter"),
                ("h/l", "Page"),
                ("i", query.interval().as_str()),
                ("a", "Analyze"),
                ("?", "Help"),
            ])
            .right(right);

        frame.render_widget(status, area);
    }
}
