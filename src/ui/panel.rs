use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::panel::{EntryKind, PanelHost};

// Near-black red backdrop, amber highlight, blue morph accent.
const BG: Color = Color::Rgb(26, 5, 5);
const HIGHLIGHT_BG: Color = Color::Rgb(102, 51, 0);
const MORPH: Color = Color::Rgb(90, 90, 220);
const TEXT: Color = Color::Rgb(180, 180, 180);
const FOCUS: Color = Color::Rgb(90, 230, 90);
const LEGEND: Color = Color::Rgb(230, 220, 90);
const DIM: Color = Color::Rgb(90, 70, 70);

const GRAPH_W: usize = 7;

pub fn render_panel(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" Controls ")
        .title_style(Style::default().fg(TEXT));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Block::default().style(Style::default().bg(BG)), inner);

    let focus = app.panel.focus();
    let mut lines: Vec<Line> = Vec::new();
    let mut row = inner.y;
    let bottom = inner.y + inner.height;

    for i in 0..app.panel.entries().len() {
        // rows past the bottom still get a layout position so pointer
        // hit-tests cannot land on stale coordinates
        app.panel.record_layout(i, row);

        let rows = app.panel.entries()[i].rows.max(1);
        if row < bottom {
            lines.push(entry_line(app, i, focus, inner.width));
            for _ in 1..rows {
                lines.push(Line::from(""));
            }
        }
        row += rows;
    }

    let p = Paragraph::new(lines).style(Style::default().bg(BG));
    frame.render_widget(p, inner);
}

fn entry_line(app: &App, index: usize, focus: Option<usize>, width: u16) -> Line<'static> {
    let e = &app.panel.entries()[index];
    let focused = focus == Some(index)
        || (e.kind == EntryKind::VectorZ && focus == Some(index.saturating_sub(1)));
    let fg = if focused { FOCUS } else { TEXT };
    let label = e.labels.first().cloned().unwrap_or_default();

    let hotkey = Span::styled(
        format!("{} ", e.hotkey.unwrap_or(' ')),
        Style::default().fg(DIM),
    );

    match e.kind {
        EntryKind::SingleScalar => {
            let bar = graph_bar(app, index, 0, None);
            value_line(hotkey, bar, label, fg, e.morph)
        }
        EntryKind::DualScalar | EntryKind::VectorXy => {
            let bar = graph_bar(app, index, 0, Some(1));
            value_line(hotkey, bar, label, fg, e.morph)
        }
        EntryKind::VectorZ => {
            let bar = graph_bar(app, index, 2, None);
            let mut spans = vec![Span::styled("  ", Style::default().fg(DIM))];
            spans.extend(bar_spans(bar, fg, e.morph));
            spans.push(Span::styled(" z", Style::default().fg(fg)));
            Line::from(spans)
        }
        EntryKind::DropDown => {
            let choice = e.labels.get(e.choice(&app.store)).cloned().unwrap_or_default();
            Line::from(vec![hotkey, Span::styled(choice, Style::default().fg(fg))])
        }
        EntryKind::OptionList => {
            let current = app.explorer.option_label(&app.store, e.ident);
            Line::from(vec![
                hotkey,
                Span::styled(format!("{label}: {current}"), Style::default().fg(fg)),
            ])
        }
        EntryKind::Command => {
            let mut style = Style::default().fg(fg);
            if app.explorer.highlight(&app.store, e.ident) {
                style = style.bg(HIGHLIGHT_BG);
            }
            Line::from(vec![hotkey, Span::styled(label, style)])
        }
        EntryKind::Toggle => {
            let text = app.explorer.display_string(&app.store, e.ident);
            Line::from(vec![hotkey, Span::styled(text, Style::default().fg(fg))])
        }
        EntryKind::StringDisplay => {
            let text = app.explorer.display_string(&app.store, e.ident);
            Line::from(vec![hotkey, Span::styled(text, Style::default().fg(TEXT))])
        }
        EntryKind::Legend => Line::from(vec![
            Span::raw("  "),
            Span::styled(label, Style::default().fg(LEGEND)),
        ]),
        EntryKind::Line => Line::from(Span::styled(
            "─".repeat(width as usize),
            Style::default().fg(DIM),
        )),
        EntryKind::ColorBar => {
            let bg = if app.explorer.highlight(&app.store, e.ident) {
                HIGHLIGHT_BG
            } else {
                BG
            };
            Line::from(Span::styled(
                " ".repeat(width as usize),
                Style::default().bg(bg),
            ))
        }
        EntryKind::Gap => Line::from(""),
    }
}

fn value_line(
    hotkey: Span<'static>,
    bar: [char; GRAPH_W],
    label: String,
    fg: Color,
    morph: bool,
) -> Line<'static> {
    let mut spans = vec![hotkey];
    spans.extend(bar_spans(bar, fg, morph));
    spans.push(Span::styled(format!(" {label}"), Style::default().fg(fg)));
    Line::from(spans)
}

fn bar_spans(bar: [char; GRAPH_W], fg: Color, morph: bool) -> Vec<Span<'static>> {
    let marker_color = if morph { MORPH } else { fg };
    bar.iter()
        .map(|&ch| {
            let style = if ch == '·' {
                Style::default().fg(DIM).bg(Color::Black)
            } else {
                Style::default().fg(marker_color).bg(Color::Black)
            };
            Span::styled(String::from(ch), style)
        })
        .collect()
}

/// Miniature indicator: the x component draws a full-height marker, the
/// optional y component a low block, both placed by their ratios.
fn graph_bar(app: &App, index: usize, x_comp: usize, y_comp: Option<usize>) -> [char; GRAPH_W] {
    let e = &app.panel.entries()[index];
    let mut cells = ['·'; GRAPH_W];

    let pos = |ratio: f32| ((ratio * GRAPH_W as f32) as usize).min(GRAPH_W - 1);

    let x = pos(e.ratio(&app.store, x_comp));
    cells[x] = '█';

    if let Some(yc) = y_comp {
        let y = pos(e.ratio(&app.store, yc));
        cells[y] = if y == x { '▓' } else { '▄' };
    }
    cells
}
