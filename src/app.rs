use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::explorer::{Explorer, Ident};
use crate::panel::{EntryKind, HopScale, Panel, ParamStore};

/// Per-tick phase step for the morph oscillator (~3 s period at 20 Hz).
const MORPH_PHASE_STEP: f32 = 0.1;
/// Ticks a hop delta stays live without a repeat; terminals deliver no
/// key-release events, so autorepeat keeps this refreshed while held.
const HOP_HOLD_TICKS: u8 = 3;
/// Terminal cells are coarse; scale cell deltas up to point-like drags.
const DRAG_CELL_W: f32 = 8.0;
const DRAG_CELL_H: f32 = 16.0;

const SCROLL_ZOOM_STEP: f32 = 0.05;

#[derive(Clone, Copy, PartialEq)]
pub enum Tab {
    Fractal,
    Terrain,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Fractal, Tab::Terrain]
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Fractal => " Fractal ",
            Tab::Terrain => " Terrain ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Fractal => 0,
            Tab::Terrain => 1,
        }
    }
}

pub enum Overlay {
    None,
    Help,
    /// Choice picker for an option-list entry.
    OptionPicker { entry: usize, selected: usize },
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub store: ParamStore,
    pub panel: Panel<Ident>,
    pub explorer: Explorer,
    pub panel_visible: bool,
    pub overlay: Overlay,
    /// Width of the panel column as last laid out, for routing mouse presses.
    pub panel_width: u16,
    drag_origin: Option<(u16, u16)>,
    hop_ticks: u8,
}

impl App {
    pub fn new() -> Self {
        let mut store = ParamStore::new();
        let explorer = Explorer::new(&mut store);
        let mut panel = Panel::new();
        explorer.build_panel(&mut panel, Tab::Fractal);

        Self {
            should_quit: false,
            current_tab: Tab::Fractal,
            store,
            panel,
            explorer,
            panel_visible: true,
            overlay: Overlay::None,
            panel_width: 0,
            drag_origin: None,
            hop_ticks: 0,
        }
    }

    pub fn on_tick(&mut self) {
        // emulated key release: a hop delta expires unless autorepeat
        // refreshes it
        if self.hop_ticks > 0 {
            self.hop_ticks -= 1;
            if self.hop_ticks == 0 {
                self.panel.stop_changes();
            }
        }

        let mut changed = self.panel.update(&mut self.store, &mut self.explorer);
        changed |= self.panel.advance_morph(MORPH_PHASE_STEP, &mut self.store);
        if self.current_tab == Tab::Terrain {
            changed |= self.explorer.advance_light(&self.store);
        }

        if self.explorer.take_rebuild() {
            self.rebuild_panel();
        }
        if self.explorer.take_help() {
            self.overlay = Overlay::Help;
        }
        if changed || self.explorer.take_render() {
            self.explorer.recompute(&mut self.store, self.current_tab);
        }
    }

    fn rebuild_panel(&mut self) {
        self.explorer.build_panel(&mut self.panel, self.current_tab);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if !matches!(self.overlay, Overlay::None) {
            self.handle_overlay_key(key);
            return;
        }

        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Left => self.hop(key, -1, 0, shift),
            KeyCode::Right => self.hop(key, 1, 0, shift),
            KeyCode::Down => self.hop(key, 0, -1, shift),
            KeyCode::Up => self.hop(key, 0, 1, shift),
            KeyCode::Char('<') | KeyCode::Char(',') => self.panel.move_focus(-1),
            KeyCode::Char('>') | KeyCode::Char('.') => self.panel.move_focus(1),
            KeyCode::Tab => self.switch_tab(1),
            KeyCode::BackTab => self.switch_tab(-1),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => {
                self.panel_visible = !self.panel_visible;
                self.explorer.request_render();
            }
            KeyCode::Enter => self.activate_focused(),
            KeyCode::Char(c) => {
                if self
                    .panel
                    .press_hotkey(c.to_ascii_uppercase(), &mut self.store, &mut self.explorer)
                {
                    self.after_dispatch();
                }
            }
            _ => {}
        }
    }

    fn hop(&mut self, key: KeyEvent, dx: i32, dy: i32, shift: bool) {
        let scale = if key.modifiers.contains(KeyModifiers::ALT) {
            HopScale::Fast
        } else if key.modifiers.contains(KeyModifiers::CONTROL) {
            HopScale::Fine
        } else {
            HopScale::Normal
        };
        self.panel.set_axis_swap(shift);
        self.panel.hop(dx, dy, scale);
        self.hop_ticks = HOP_HOLD_TICKS;
    }

    /// Return behaves per the focused row: drop-downs cycle their choice,
    /// option rows open the picker, value rows toggle morphing.
    fn activate_focused(&mut self) {
        let Some(focus) = self.panel.focus() else { return };
        match self.panel.entries()[focus].kind {
            EntryKind::DropDown => {
                let e = &self.panel.entries()[focus];
                let next = (e.choice(&self.store) + 1) % e.labels.len().max(1);
                if let Some(f) = e.field {
                    f.set_component(&mut self.store, 0, next as f32);
                }
                self.explorer.request_render();
            }
            EntryKind::OptionList => {
                self.overlay = Overlay::OptionPicker {
                    entry: focus,
                    selected: 0,
                };
            }
            _ => self.panel.toggle_morph_on_focused(),
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        match &mut self.overlay {
            Overlay::Help => {
                self.overlay = Overlay::None;
            }
            Overlay::OptionPicker { entry, selected } => {
                let count = self.panel.entries()[*entry].labels.len().saturating_sub(1);
                match key.code {
                    KeyCode::Up => *selected = selected.saturating_sub(1),
                    KeyCode::Down => {
                        if count > 0 && *selected < count - 1 {
                            *selected += 1;
                        }
                    }
                    KeyCode::Enter => {
                        let ident = self.panel.entries()[*entry].ident;
                        let index = *selected;
                        self.overlay = Overlay::None;
                        self.panel.option_selected(
                            ident,
                            index,
                            &mut self.store,
                            &mut self.explorer,
                        );
                        self.after_dispatch();
                    }
                    KeyCode::Esc => self.overlay = Overlay::None,
                    _ => {}
                }
            }
            Overlay::None => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_origin = Some((mouse.column, mouse.row));
                if self.panel_visible && mouse.column < self.panel_width {
                    self.panel
                        .pointer_down(mouse.row, &mut self.store, &mut self.explorer);
                    self.after_dispatch();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((ox, oy)) = self.drag_origin {
                    let dx = (mouse.column as f32 - ox as f32) * DRAG_CELL_W;
                    let dy = (mouse.row as f32 - oy as f32) * DRAG_CELL_H;
                    self.panel
                        .set_axis_swap(mouse.modifiers.contains(KeyModifiers::SHIFT));
                    self.panel.drag_move(dx, dy, true);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_origin = None;
                self.panel.drag_move(0.0, 0.0, false);
            }
            MouseEventKind::ScrollUp => self.scroll_zoom(SCROLL_ZOOM_STEP),
            MouseEventKind::ScrollDown => self.scroll_zoom(-SCROLL_ZOOM_STEP),
            _ => {}
        }
    }

    fn scroll_zoom(&mut self, amount: f32) {
        let id = self.explorer.params.zoom;
        let z = self.store.scalar(id) + amount;
        self.store.set_scalar(id, z);
        self.explorer.request_render();
    }

    fn switch_tab(&mut self, dir: i32) {
        let tabs = Tab::all();
        let idx = self.current_tab.index() as i32 + dir;
        let idx = idx.rem_euclid(tabs.len() as i32) as usize;
        self.current_tab = tabs[idx];
        self.rebuild_panel();
        self.explorer.request_render();
    }

    /// Commands may have queued follow-up work; drain it right away so the
    /// next draw shows the result.
    fn after_dispatch(&mut self) {
        if self.explorer.take_rebuild() {
            self.rebuild_panel();
        }
        if self.explorer.take_help() {
            self.overlay = Overlay::Help;
        }
        if self.explorer.take_render() {
            self.explorer.recompute(&mut self.store, self.current_tab);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn escape_quits() {
        let mut app = App::new();
        app.on_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn tab_switch_rebuilds_panel() {
        let mut app = App::new();
        let fractal_rows = app.panel.entries().len();
        app.on_key(key(KeyCode::Tab));
        assert!(matches!(app.current_tab, Tab::Terrain));
        assert_ne!(app.panel.entries().len(), fractal_rows);
        assert_eq!(app.panel.focus(), None);
    }

    #[test]
    fn hotkey_z_focuses_zoom_row() {
        let mut app = App::new();
        app.on_key(key(KeyCode::Char('z')));
        let f = app.panel.focus().expect("focus");
        assert_eq!(app.panel.entries()[f].labels[0], "Zoom");
    }

    #[test]
    fn hop_delta_expires_after_hold_ticks() {
        let mut app = App::new();
        app.on_key(key(KeyCode::Char('i'))); // focus Iterate
        let id = app.explorer.params.max_iter;
        let before = app.store.scalar(id);

        app.on_key(key(KeyCode::Right));
        app.on_tick();
        assert!(app.store.scalar(id) > before);

        // delta keeps applying until the hold expires
        for _ in 0..HOP_HOLD_TICKS + 1 {
            app.on_tick();
        }
        let settled = app.store.scalar(id);
        app.on_tick();
        assert_eq!(app.store.scalar(id), settled);
    }

    #[test]
    fn return_toggles_morph_on_value_row() {
        let mut app = App::new();
        app.on_key(key(KeyCode::Char('c'))); // focus Contrast
        let f = app.panel.focus().expect("focus");
        app.on_key(key(KeyCode::Enter));
        assert!(app.panel.entries()[f].morph);
        app.on_key(key(KeyCode::Enter));
        assert!(!app.panel.entries()[f].morph);
    }

    #[test]
    fn help_command_opens_overlay_and_any_key_closes() {
        let mut app = App::new();
        app.on_key(key(KeyCode::Char('h')));
        assert!(matches!(app.overlay, Overlay::Help));
        app.on_key(key(KeyCode::Char('x')));
        assert!(matches!(app.overlay, Overlay::None));
    }

    #[test]
    fn scroll_zoom_is_consumed_by_the_recompute() {
        let mut app = App::new();
        let id = app.explorer.params.zoom;
        app.on_mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 40,
            row: 10,
            modifiers: KeyModifiers::NONE,
        });
        app.explorer.view_w = 8;
        app.explorer.view_h = 8;
        app.on_tick();
        assert_eq!(app.store.scalar(id), 0.0);
    }

    #[test]
    fn panel_toggle_key_hides_panel() {
        let mut app = App::new();
        assert!(app.panel_visible);
        app.on_key(key(KeyCode::Char('1')));
        assert!(!app.panel_visible);
    }
}
