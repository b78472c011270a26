use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::keyboard::GRID_COLUMNS;
use crate::session::{SessionState, SUGGESTION_SLOTS};

const EAR_BAR_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, state: &SessionState) {
    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Min(2),
    ])
    .split(frame.area());

    render_title(frame, rows[0]);
    render_panels(frame, rows[1], state);
    if state.suggesting() {
        render_suggestions(frame, rows[2], state);
    } else {
        render_keyboard(frame, rows[2], state);
    }
    render_settings(frame, rows[3], state);
    render_footer(frame, rows[4], state);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "Gaze Typing Keyboard Demo",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  —  Galactic Typist"),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_panels(frame: &mut Frame, area: Rect, state: &SessionState) {
    let columns =
        Layout::horizontal([Constraint::Percentage(38), Constraint::Percentage(62)]).split(area);

    render_camera_panel(frame, columns[0], state);
    render_text_panel(frame, columns[1], state);
}

fn render_camera_panel(frame: &mut Frame, area: Rect, state: &SessionState) {
    let block = Block::default().borders(Borders::ALL).title("Camera");

    if let Some(notice) = &state.camera_notice {
        let paragraph = Paragraph::new(notice.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let webcam = if state.webcam_active {
        Span::styled("✓ Active", Style::default().fg(Color::Green))
    } else {
        Span::styled("× Not available", Style::default().fg(Color::Red))
    };
    let position = state
        .eye_position
        .map(|(x, y)| format!("{x:.0}%, {y:.0}%"))
        .unwrap_or_else(|| "—".to_string());
    let blink = if state.blinking {
        Span::styled("● Blinking", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ Not blinking", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        Line::from(vec![Span::raw("Webcam:        "), webcam]),
        Line::from(format!("Eye direction: {}", state.eye_direction.as_str())),
        Line::from(format!("Eye position:  {position}")),
        Line::from(vec![
            Span::raw("EAR:           "),
            Span::styled(ear_bar(state.ear_value), Style::default().fg(Color::Blue)),
            Span::raw(format!(" {:.2}", state.ear_value)),
        ]),
        Line::from(vec![Span::raw("Blink:         "), blink]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Eyelid-openness meter, full scale at an EAR of 0.5.
fn ear_bar(ear_value: f32) -> String {
    let ratio = (ear_value * 2.0).clamp(0.0, 1.0);
    let filled = (ratio * EAR_BAR_WIDTH as f32).round() as usize;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(EAR_BAR_WIDTH - filled));
    bar
}

fn render_text_panel(frame: &mut Frame, area: Rect, state: &SessionState) {
    let block = Block::default().borders(Borders::ALL).title("Text Output");

    let mode = if state.force_suggest_mode {
        "Direct autocomplete mode active"
    } else if state.suggest_active {
        "Word suggestion mode active"
    } else {
        "Current mode: Letter selection"
    };

    let text_line = if state.text.is_empty() {
        Line::from(Span::styled(
            "Type using your eyes...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.text.as_str())
    };

    let lines = vec![
        text_line,
        Line::default(),
        Line::from(Span::styled(mode, Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn render_suggestions(frame: &mut Frame, area: Rect, state: &SessionState) {
    let cells = Layout::horizontal([Constraint::Ratio(1, 3); SUGGESTION_SLOTS]).split(area);

    for (index, cell) in cells.iter().enumerate() {
        let selected = state.letter_index == index;
        let border_style = if selected {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let content = state
            .suggestions
            .get(index)
            .filter(|suggestion| !suggestion.is_empty())
            .map(String::as_str)
            .unwrap_or("...");

        let paragraph = Paragraph::new(content).centered().block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(paragraph, *cell);
    }
}

fn render_keyboard(frame: &mut Frame, area: Rect, state: &SessionState) {
    let mut lines = Vec::new();
    for (row_index, row) in state.keys.chunks(GRID_COLUMNS).enumerate() {
        let mut spans = Vec::new();
        for (column_index, key) in row.iter().enumerate() {
            let index = row_index * GRID_COLUMNS + column_index;
            let style = if index == state.letter_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {key} "), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default().borders(Borders::ALL).title("Keyboard");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_settings(frame: &mut Frame, area: Rect, state: &SessionState) {
    let tracking = if state.tracking {
        let since = state
            .tracking_since
            .map(|at| format!(" since {}", at.format("%H:%M:%S")))
            .unwrap_or_default();
        Span::styled(
            format!("Active{since}"),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("Inactive", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        Line::from(format!(
            "Gaze sensitivity: {:.1}   ([ / ] to adjust)",
            state.sensitivity
        )),
        Line::from(vec![Span::raw("Tracking:         "), tracking]),
    ];

    let block = Block::default().borders(Borders::ALL).title("Settings");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &SessionState) {
    let status = if state.tracking {
        Span::styled(
            " Tracking Active ",
            Style::default().fg(Color::Black).bg(Color::Green),
        )
    } else {
        Span::styled(
            " Tracking Inactive ",
            Style::default().fg(Color::Black).bg(Color::Gray),
        )
    };

    let lines = vec![
        Line::from(vec![
            Span::raw("t toggle tracking · c clear · s speak · r reset cursor · q quit   "),
            status,
        ]),
        Line::from(Span::styled(
            "Look LEFT or RIGHT to move the cursor, BLINK to select.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}
