pub mod panel;
pub mod tabs;
pub mod view;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Overlay};

/// Fixed width of the control-panel column.
pub const PANEL_WIDTH: u16 = 28;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    if app.panel_visible {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(0)])
            .split(chunks[1]);
        app.panel_width = cols[0].width;
        panel::render_panel(frame, cols[0], app);
        view::render_view(frame, cols[1], app);
    } else {
        app.panel_width = 0;
        view::render_view(frame, chunks[1], app);
    }

    match app.overlay {
        Overlay::Help => render_help(frame, frame.area()),
        Overlay::OptionPicker { entry, selected } => {
            render_option_picker(frame, frame.area(), app, entry, selected)
        }
        Overlay::None => {}
    }
}

fn overlay_rect(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width.saturating_sub(4));
    let h = h.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

fn render_help(frame: &mut Frame, area: Rect) {
    let overlay = overlay_rect(area, 52, 18);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
        .title(" Help ")
        .title_style(
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let key_style = Style::default()
        .fg(Color::Rgb(80, 200, 255))
        .add_modifier(Modifier::BOLD);
    let txt_style = Style::default().fg(Color::Rgb(180, 180, 200));
    let row = |k: &'static str, t: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k:<12}"), key_style),
            Span::styled(t, txt_style),
        ])
    };

    let lines = vec![
        Line::from(""),
        row("letter keys", "focus a row / run its command"),
        row("arrows", "nudge the focused value"),
        row("alt+arrow", "nudge x3"),
        row("ctrl+arrow", "nudge x0.1"),
        row("shift", "route x into z on camera rows"),
        row("< >", "cycle focus between value rows"),
        row("Return", "toggle morphing on the focused row"),
        row("mouse drag", "edit the focused value"),
        row("scroll", "zoom the fractal"),
        row("Tab", "switch between Fractal and Terrain"),
        row("1", "hide or show the panel"),
        row("Esc", "quit"),
        Line::from(""),
        Line::from(Span::styled("  any key to close", txt_style)),
    ];

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}

fn render_option_picker(frame: &mut Frame, area: Rect, app: &App, entry: usize, selected: usize) {
    let Some(e) = app.panel.entries().get(entry) else { return };
    let title = e.labels.first().cloned().unwrap_or_default();
    let choices = &e.labels[1.min(e.labels.len())..];

    let overlay = overlay_rect(area, 30, choices.len() as u16 + 4);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(80, 200, 255)))
        .title(format!(" {title} "))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let mut lines = vec![Line::from("")];
    for (i, choice) in choices.iter().enumerate() {
        let style = if i == selected {
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(180, 180, 200))
        };
        let marker = if i == selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!(" {marker}{choice}"),
            style,
        )));
    }

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}
