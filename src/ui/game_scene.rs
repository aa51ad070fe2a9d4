//! Terminal rendering of a Parakeet round.

use super::game_common::{draw_overlay, draw_side_panel, draw_status, split_screen};
use super::Hud;
use crate::game::{GameSnapshot, PhysicsConfig};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const CONTROLS: &[(&str, &str)] = &[("[Space]", "Flap"), ("[R]", "Restart"), ("[Q]", "Quit")];

/// Render the whole game screen from a snapshot.
pub fn render_game(
    frame: &mut Frame,
    area: Rect,
    snapshot: &GameSnapshot,
    config: &PhysicsConfig,
    hud: &Hud,
) {
    let aspect = config.field_width / config.field_height;
    let areas = split_screen(frame, area, " Parakeet ", aspect, 24);

    render_play_area(frame, areas.field, snapshot, config);
    render_status(frame, areas.status, snapshot);
    render_side_panel(frame, areas.side, snapshot, hud);

    if snapshot.over {
        let lines = vec![
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("You cleared {} pipes.", snapshot.score)),
            Line::from(Span::styled(
                "[R] to play again",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        draw_overlay(frame, areas.field, lines, Color::Red);
    }
}

/// What occupies one terminal cell of the play area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Pipe,
    Rim,
    Bird,
}

/// Map the field onto a `width` x `height` grid of cells.
fn rasterize(
    snapshot: &GameSnapshot,
    config: &PhysicsConfig,
    width: usize,
    height: usize,
) -> Vec<Vec<Cell>> {
    let mut grid = vec![vec![Cell::Empty; width]; height];
    if width == 0 || height == 0 {
        return grid;
    }

    let cell_w = config.field_width / width as f64;
    let cell_h = config.field_height / height as f64;

    for (row, line) in grid.iter_mut().enumerate() {
        // Sample at the cell center
        let fy = (row as f64 + 0.5) * cell_h;
        for (col, cell) in line.iter_mut().enumerate() {
            let fx = (col as f64 + 0.5) * cell_w;
            for pipe in &snapshot.pipes {
                if fx < pipe.x || fx >= pipe.right() {
                    continue;
                }
                if fy < pipe.gap_top || fy > pipe.gap_bottom() {
                    // Solid pipe; the cell touching the gap is the rim
                    let near_gap = (fy - pipe.gap_top).abs() < cell_h
                        || (fy - pipe.gap_bottom()).abs() < cell_h;
                    *cell = if near_gap { Cell::Rim } else { Cell::Pipe };
                }
            }
        }
    }

    let bird_col = (snapshot.bird.x / cell_w).floor();
    let bird_row = (snapshot.bird.y / cell_h).floor();
    if bird_col >= 0.0 && bird_row >= 0.0 {
        let (col, row) = (bird_col as usize, bird_row as usize);
        if row < height && col < width {
            grid[row][col] = Cell::Bird;
        }
    }

    grid
}

/// Render the play field with bird and pipes.
fn render_play_area(
    frame: &mut Frame,
    area: Rect,
    snapshot: &GameSnapshot,
    config: &PhysicsConfig,
) {
    let grid = rasterize(snapshot, config, area.width as usize, area.height as usize);

    let bird_char = if snapshot.bird.vel < -2.0 {
        "▲" // Rising
    } else if snapshot.bird.vel > 4.0 {
        "▼" // Falling fast
    } else {
        "►"
    };

    let lines: Vec<Line> = grid
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => Span::raw(" "),
                    Cell::Pipe => Span::styled("█", Style::default().fg(Color::Cyan)),
                    Cell::Rim => Span::styled("▀", Style::default().fg(Color::Blue)),
                    Cell::Bird => Span::styled(
                        bird_char,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status(frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
    if snapshot.over {
        draw_status(frame, area, "Crashed!", Color::Red, CONTROLS);
    } else if !snapshot.running {
        draw_status(frame, area, "Press Space to start", Color::Yellow, CONTROLS);
    } else {
        let message = format!("Score: {}", snapshot.score);
        draw_status(frame, area, &message, Color::Green, CONTROLS);
    }
}

fn render_side_panel(frame: &mut Frame, area: Rect, snapshot: &GameSnapshot, hud: &Hud) {
    let inner = draw_side_panel(frame, area, " Scores ");

    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let label = Style::default().fg(Color::DarkGray);
    let global = hud
        .global_best
        .map(|high| high.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Score: ", label),
            Span::styled(
                snapshot.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Best: ", label),
            Span::styled(hud.local_best.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled(" Global: ", label),
            Span::styled(global, Style::default().fg(Color::Green)),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Leaderboard", label)),
    ];

    if hud.leaderboard.is_empty() {
        lines.push(Line::from(Span::styled("  (none yet)", label)));
    }
    for (i, entry) in hud.leaderboard.iter().enumerate() {
        let name = entry.username.as_deref().unwrap_or("anon");
        lines.push(Line::from(format!(" {:>2}. {} {}", i + 1, name, entry.score)));
    }

    if let Some(status) = &hud.server_status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", status),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
