use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};
use crate::explorer::Explorer;

/// Draws the current pixel buffer with the half-block trick: each terminal
/// cell carries two vertically stacked pixels (foreground over background).
pub fn render_view(frame: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.current_tab {
        Tab::Fractal => " Fractal ",
        Tab::Terrain => " Terrain ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(title)
        .title_style(Style::default().fg(Color::Rgb(180, 180, 180)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Track the view size; a change forces a recompute at the new size.
    let pw = inner.width as usize;
    let ph = inner.height as usize * 2;
    if app.explorer.view_w != pw || app.explorer.view_h != ph {
        app.explorer.view_w = pw;
        app.explorer.view_h = ph;
        app.explorer.recompute(&mut app.store, app.current_tab);
    }

    let ex = &app.explorer;
    if ex.pixels.is_empty() || ex.pix_w == 0 || ex.pix_h == 0 {
        return;
    }

    let mut lines = Vec::with_capacity(inner.height as usize);
    for cy in 0..inner.height as usize {
        let mut spans = Vec::with_capacity(pw);
        for cx in 0..pw {
            let top = sample(ex, cx, cy * 2, pw, ph);
            let bottom = sample(ex, cx, cy * 2 + 1, pw, ph);
            spans.push(Span::styled(
                "▀",
                Style::default()
                    .fg(Color::Rgb(top[0], top[1], top[2]))
                    .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
            ));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Nearest-neighbor lookup; the buffer may be smaller than the view when a
/// reduced resolution is selected.
fn sample(ex: &Explorer, x: usize, y: usize, view_w: usize, view_h: usize) -> [u8; 3] {
    let bx = (x * ex.pix_w / view_w).min(ex.pix_w - 1);
    let by = (y * ex.pix_h / view_h).min(ex.pix_h - 1);
    ex.pixels.get(by * ex.pix_w + bx).copied().unwrap_or([0, 0, 0])
}
