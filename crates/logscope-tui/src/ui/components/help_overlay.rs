use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let area = frame.area();

        let popup_width = 52.min(area.width.saturating_sub(4));
        let popup_height = 30.min(area.height.saturating_sub(4));

        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Records"),
            Self::key_line("j/↓", "Next row"),
            Self::key_line("k/↑", "Previous row"),
            Self::key_line("l/→", "Next page"),
            Self::key_line("h/←", "Previous page"),
            Self::key_line("g/G", "First / last page"),
            Self::key_line("z", "Cycle page size"),
            Line::from(""),
            Self::section("Query"),
            Self::key_line("/", "Search keyword"),
            Self::key_line("f", "Edit filters (key=value)"),
            Self::key_line("o", "Choose log file"),
            Self::key_line("c", "Clear all filters"),
            Self::key_line("a", "Re-run analysis"),
            Line::from(""),
            Self::section("Charts"),
            Self::key_line("i/I", "Next / previous interval"),
            Line::from(""),
            Self::section("General"),
            Self::key_line("x", "Dismiss error"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Go back"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {key:>8}"), Style::default().fg(Color::Green)),
            Span::styled(format!("  {desc}"), Style::default().fg(Color::White)),
        ])
    }
}
