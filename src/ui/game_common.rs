//! Screen layout and the small widgets drawn around the play field.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// Areas of the game screen.
pub struct ScreenAreas {
    /// Play field, sized to keep the field's proportions where possible.
    pub field: Rect,
    /// Two rows under the field: status message, then key hints.
    pub status: Rect,
    /// Score panel on the right, inside its own border.
    pub side: Rect,
}

/// Draw the outer frame and split the screen into field, status and side
/// panel. The side panel gets `side_width` columns when there is room.
pub fn split_screen(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    field_aspect: f64,
    side_width: u16,
) -> ScreenAreas {
    frame.render_widget(Clear, area);
    let outer = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let status_height = inner.height.min(2);
    let body_height = inner.height - status_height;
    let status = Rect {
        y: inner.y + body_height,
        height: status_height,
        ..inner
    };

    let side_width = side_width.min(inner.width / 2);
    let max_field_width = inner.width - side_width;
    let wanted = (f64::from(body_height) * field_aspect * CELL_ASPECT).round() as u16;
    let field_width = wanted.min(max_field_width);

    let field = Rect {
        width: field_width,
        height: body_height,
        ..inner
    };
    let side = Rect {
        x: inner.x + field_width,
        width: inner.width - field_width,
        height: body_height,
        ..inner
    };

    ScreenAreas {
        field,
        status,
        side,
    }
}

/// Status message on the first row, key hints on the second.
pub fn draw_status(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    color: Color,
    keys: &[(&str, &str)],
) {
    let hints: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!("{} ", key), Style::default().fg(Color::White)),
                Span::styled(format!("{}   ", action), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();

    let lines = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(hints),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// Boxed message centred over `area`. The rest of `area` is left as drawn.
pub fn draw_overlay(frame: &mut Frame, area: Rect, lines: Vec<Line>, color: Color) {
    let height = (lines.len() as u16 + 2).min(area.height);
    let width = lines
        .iter()
        .map(|line| line.width() as u16 + 4)
        .max()
        .unwrap_or(0)
        .min(area.width);
    if height < 3 || width < 4 {
        return;
    }

    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Bordered side panel. Returns the area inside the border.
pub fn draw_side_panel(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    let block = Block::default()
        .title(title)
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_field_keeps_proportions_when_wide() {
        let mut terminal = Terminal::new(TestBackend::new(120, 34)).unwrap();
        let mut areas = None;
        terminal
            .draw(|f| areas = Some(split_screen(f, f.size(), " t ", 0.75, 24)))
            .unwrap();
        let areas = areas.unwrap();

        // 30 body rows at 3:4 with 2:1 cells -> 45 columns
        assert_eq!(areas.field.height, 30);
        assert_eq!(areas.field.width, 45);
        assert_eq!(areas.status.height, 2);
        assert!(areas.side.width >= 24);
    }

    #[test]
    fn test_field_shrinks_to_fit_narrow_screen() {
        let mut terminal = Terminal::new(TestBackend::new(40, 40)).unwrap();
        let mut areas = None;
        terminal
            .draw(|f| areas = Some(split_screen(f, f.size(), " t ", 0.75, 24)))
            .unwrap();
        let areas = areas.unwrap();

        // Side panel capped at half the body width
        assert_eq!(areas.side.width, 19);
        assert_eq!(areas.field.width, 19);
    }
}
