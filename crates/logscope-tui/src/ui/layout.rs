use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

/// Areas of the explorer screen
pub struct ExplorerAreas {
    pub header: Rect,
    pub banner: Option<Rect>,
    pub cards: Rect,
    pub input: Option<Rect>,
    pub table: Rect,
    pub sidebar: Rect,
    pub pagination: Rect,
    pub status: Rect,
}

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Create a centered content area (for selection screens)
    pub fn centered_list(area: Rect, width_percent: u16) -> Rect {
        let horizontal = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - width_percent) / 2),
                Constraint::Percentage(width_percent),
                Constraint::Percentage((100 - width_percent) / 2),
            ])
            .split(area);

        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(horizontal[1]);

        vertical[1]
    }

    /// Split the explorer screen; the sidebar holds rankings and charts
    pub fn explorer(area: Rect, show_banner: bool, show_input: bool) -> ExplorerAreas {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_banner {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Length(4)); // Stat cards
        if show_input {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Min(5)); // Table + sidebar
        constraints.push(Constraint::Length(1)); // Pagination
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut idx = 0;
        let mut next = || {
            let rect = chunks[idx];
            idx += 1;
            rect
        };

        let header = next();
        let banner = show_banner.then(&mut next);
        let cards = next();
        let input = show_input.then(&mut next);
        let body = next();
        let pagination = next();
        let status = next();

        let columns = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(42)])
            .split(body);

        ExplorerAreas {
            header,
            banner,
            cards,
            input,
            table: columns[0],
            sidebar: columns[1],
            pagination,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_areas_stack_without_overlap() {
        let area = Rect::new(0, 0, 120, 40);
        let areas = Layout::explorer(area, true, true);

        assert_eq!(areas.header.y, 0);
        assert_eq!(areas.banner.map(|r| r.y), Some(3));
        assert_eq!(areas.cards.y, 4);
        assert_eq!(areas.input.map(|r| r.y), Some(8));
        assert_eq!(areas.status.y, 39);
        assert_eq!(areas.pagination.y, 38);
        assert_eq!(areas.table.width + areas.sidebar.width, 120);
    }

    #[test]
    fn test_optional_areas_are_omitted() {
        let areas = Layout::explorer(Rect::new(0, 0, 80, 30), false, false);
        assert!(areas.banner.is_none());
        assert!(areas.input.is_none());
        assert_eq!(areas.cards.y, 3);
    }
}
