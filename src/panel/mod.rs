pub mod entry;
pub mod field;

pub use entry::{Entry, EntryKind};
pub use field::{BoundField, ParamStore, ScalarId, VectorId};

/// Host side of the panel protocol. `I` is an opaque identity the panel
/// round-trips without interpreting; value-change notifications reuse
/// `command` with the entry's identity.
pub trait PanelHost<I> {
    fn command(&mut self, store: &mut ParamStore, ident: I);
    fn toggle(&mut self, store: &mut ParamStore, ident: I);
    fn display_string(&self, store: &ParamStore, ident: I) -> String;
    fn highlight(&self, store: &ParamStore, ident: I) -> bool;
    fn option_selected(&mut self, store: &mut ParamStore, ident: I, index: usize);
    fn option_label(&self, store: &ParamStore, ident: I) -> String;
}

/// Speed modifier applied to discrete hops.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HopScale {
    Normal,
    /// Accelerate modifier held.
    Fast,
    /// Fine-adjust modifier held.
    Fine,
}

impl HopScale {
    fn factor(self) -> f32 {
        match self {
            HopScale::Normal => 1.0,
            HopScale::Fast => 3.0,
            HopScale::Fine => 0.1,
        }
    }
}

const DRAG_SCALE: f32 = 0.05;
const MORPH_DIVISOR: f32 = 20.0;

/// Entry registry plus the interaction state machine. Entries are value
/// records with no identity beyond their position; reconfiguring the panel
/// means `clear()` and re-adding, which also resets focus and drag state.
pub struct Panel<I> {
    entries: Vec<Entry<I>>,
    focus: Option<usize>,
    previous_focus: Option<usize>,
    delta: [f32; 3],
    morph_phase: f32,
    axis_swap: bool,
}

impl<I: Copy + PartialEq + Default> Panel<I> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            focus: None,
            previous_focus: None,
            delta: [0.0; 3],
            morph_phase: 0.0,
            axis_swap: false,
        }
    }

    // ---- registry ---------------------------------------------------------

    pub fn clear(&mut self) {
        self.entries.clear();
        self.focus = None;
        self.previous_focus = None;
        self.delta = [0.0; 3];
    }

    fn push(&mut self, hotkey: Option<char>, kind: EntryKind) -> &mut Entry<I> {
        self.entries.push(Entry::new(hotkey, kind));
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    fn set_common(e: &mut Entry<I>, min: f32, max: f32, step: f32, label: &str) {
        e.min = min;
        e.max = max;
        e.step = step;
        e.labels.push(label.to_string());
    }

    pub fn add_scalar(
        &mut self,
        hotkey: Option<char>,
        field: ScalarId,
        min: f32,
        max: f32,
        step: f32,
        label: &str,
    ) {
        let e = self.push(hotkey, EntryKind::SingleScalar);
        e.field = Some(BoundField::Scalar(field));
        Self::set_common(e, min, max, step, label);
    }

    pub fn add_pair(
        &mut self,
        hotkey: Option<char>,
        fx: ScalarId,
        fy: ScalarId,
        min: f32,
        max: f32,
        step: f32,
        label: &str,
    ) {
        let e = self.push(hotkey, EntryKind::DualScalar);
        e.field = Some(BoundField::Pair(fx, fy));
        Self::set_common(e, min, max, step, label);
    }

    /// Binds one packed triple through two rows: an x/y row and a z-only row
    /// directly after it. Focus cycling hops past the z row.
    pub fn add_triplet(
        &mut self,
        hotkey: Option<char>,
        field: VectorId,
        min: f32,
        max: f32,
        step: f32,
        label: &str,
    ) {
        let e = self.push(hotkey, EntryKind::VectorXy);
        e.field = Some(BoundField::Vector(field));
        Self::set_common(e, min, max, step, label);

        let z = self.push(None, EntryKind::VectorZ);
        z.field = Some(BoundField::Vector(field));
        Self::set_common(z, min, max, step, "");
    }

    pub fn add_dropdown(&mut self, hotkey: Option<char>, field: ScalarId, choices: &[&str]) {
        let e = self.push(hotkey, EntryKind::DropDown);
        e.field = Some(BoundField::Scalar(field));
        for c in choices {
            e.labels.push((*c).to_string());
        }
    }

    pub fn add_option_list(&mut self, ident: I, title: &str, choices: &[&str]) {
        let e = self.push(None, EntryKind::OptionList);
        e.ident = ident;
        e.labels.push(title.to_string());
        for c in choices {
            e.labels.push((*c).to_string());
        }
    }

    pub fn add_command(&mut self, hotkey: Option<char>, label: &str, ident: I) {
        let e = self.push(hotkey, EntryKind::Command);
        e.labels.push(label.to_string());
        e.ident = ident;
    }

    /// Color backdrop plus the command row it belongs to.
    pub fn add_colored_command(&mut self, hotkey: Option<char>, label: &str, ident: I) {
        self.add_color(ident, 1);
        self.add_command(hotkey, label, ident);
    }

    pub fn add_toggle(&mut self, hotkey: Option<char>, ident: I) {
        let e = self.push(hotkey, EntryKind::Toggle);
        e.ident = ident;
    }

    pub fn add_legend(&mut self, label: &str) {
        let e = self.push(None, EntryKind::Legend);
        e.labels.push(label.to_string());
    }

    pub fn add_line(&mut self) {
        self.push(None, EntryKind::Line);
    }

    pub fn add_string(&mut self, label: &str, ident: I) {
        let e = self.push(None, EntryKind::StringDisplay);
        e.labels.push(label.to_string());
        e.ident = ident;
    }

    pub fn add_color(&mut self, ident: I, rows: u16) {
        let e = self.push(None, EntryKind::ColorBar);
        e.ident = ident;
        e.rows = rows;
    }

    pub fn add_gap(&mut self, rows: u16) {
        let e = self.push(None, EntryKind::Gap);
        e.rows = rows;
    }

    // ---- queries ----------------------------------------------------------

    pub fn entries(&self) -> &[Entry<I>] {
        &self.entries
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn has_focus(&self) -> bool {
        self.focus.is_some()
    }

    pub fn remove_focus(&mut self) {
        self.focus = None;
    }

    pub fn focused_kind(&self) -> Option<EntryKind> {
        self.focus.map(|i| self.entries[i].kind)
    }

    /// Called by the renderer as it lays rows out, so pointer hit-tests can
    /// map a terminal row back to an entry.
    pub fn record_layout(&mut self, index: usize, row: u16) {
        if let Some(e) = self.entries.get_mut(index) {
            e.layout_y = row;
        }
    }

    /// When set, applying deltas to a triplet entry routes the horizontal
    /// delta into the z component instead of x.
    pub fn set_axis_swap(&mut self, on: bool) {
        self.axis_swap = on;
    }

    // ---- input ------------------------------------------------------------

    /// First entry with a matching hotkey wins. Commands and toggles dispatch
    /// immediately without taking focus; everything else becomes the focus.
    pub fn press_hotkey(
        &mut self,
        key: char,
        store: &mut ParamStore,
        host: &mut impl PanelHost<I>,
    ) -> bool {
        for i in 0..self.entries.len() {
            if self.entries[i].hotkey != Some(key) {
                continue;
            }
            match self.entries[i].kind {
                EntryKind::Command => host.command(store, self.entries[i].ident),
                EntryKind::Toggle => host.toggle(store, self.entries[i].ident),
                _ => self.focus = Some(i),
            }
            return true;
        }
        false
    }

    /// Discrete nudge from the arrow keys. Ignored without focus.
    pub fn hop(&mut self, dx: i32, dy: i32, scale: HopScale) {
        if self.focus.is_none() {
            return;
        }
        let f = scale.factor();
        self.delta = [dx as f32 * f, dy as f32 * f, 0.0];
    }

    /// Drag vector from the pointer, in view points. An inactive call marks
    /// the end of the edit session and clears the pending delta.
    pub fn drag_move(&mut self, dx: f32, dy: f32, active: bool) {
        let Some(focus) = self.focus else { return };

        if !active {
            self.stop_changes();
            return;
        }

        self.delta[0] = dx * DRAG_SCALE;
        self.delta[1] = -dy * DRAG_SCALE;

        // One-dimensional values follow whichever axis moved furthest.
        if self.entries[focus].kind == EntryKind::SingleScalar
            && self.delta[1].abs() > self.delta[0].abs()
        {
            self.delta[0] = self.delta[1];
        }
    }

    pub fn stop_changes(&mut self) {
        self.delta = [0.0; 3];
    }

    /// Circular focus movement over the interactive kinds, skipping z-only
    /// rows so only explicit value application can touch the z component.
    pub fn move_focus(&mut self, dir: i32) {
        if self.focus.is_none() || self.entries.len() < 2 {
            return;
        }
        if !self.entries.iter().any(|e| e.kind.is_interactive()) {
            return;
        }

        self.advance_focus(dir);
        if self.focused_kind() == Some(EntryKind::VectorZ) {
            self.advance_focus(dir);
        }
    }

    fn advance_focus(&mut self, dir: i32) {
        let len = self.entries.len() as i32;
        let Some(start) = self.focus else { return };
        let mut i = start as i32;
        loop {
            i += dir;
            if i >= len {
                i = 0;
            } else if i < 0 {
                i = len - 1;
            }
            if self.entries[i as usize].kind.is_interactive() {
                break;
            }
        }
        self.focus = Some(i as usize);
    }

    pub fn toggle_morph_on_focused(&mut self) {
        if let Some(i) = self.focus {
            self.entries[i].morph = !self.entries[i].morph;
        }
    }

    pub fn morph_reset(&mut self) {
        for e in &mut self.entries {
            e.morph = false;
        }
    }

    /// Pointer press at a terminal row. Commands and toggles fire and give
    /// focus back to whatever held it before; value rows keep focus until
    /// explicitly changed.
    pub fn pointer_down(
        &mut self,
        row: u16,
        store: &mut ParamStore,
        host: &mut impl PanelHost<I>,
    ) {
        self.stop_changes();
        if let Some(f) = self.focus {
            if self.entries[f].kind.is_memorizable() {
                self.previous_focus = Some(f);
            }
        }

        for i in 0..self.entries.len() {
            let e = &self.entries[i];
            if row >= e.layout_y && row < e.layout_y + e.rows && e.kind.is_memorizable() {
                self.focus = Some(i);
                break;
            }
        }

        if let Some(f) = self.focus {
            match self.entries[f].kind {
                EntryKind::Command => {
                    host.command(store, self.entries[f].ident);
                    self.focus = self.previous_focus;
                    return;
                }
                EntryKind::Toggle => {
                    host.toggle(store, self.entries[f].ident);
                    self.focus = self.previous_focus;
                    return;
                }
                _ => {}
            }
        }

        self.stop_changes();
    }

    /// Forwarded choice from the option picker UI.
    pub fn option_selected(
        &mut self,
        ident: I,
        index: usize,
        store: &mut ParamStore,
        host: &mut impl PanelHost<I>,
    ) {
        host.option_selected(store, ident, index);
    }

    // ---- tick -------------------------------------------------------------

    /// Applies the pending delta to the focused entry's bound value(s). The
    /// delta is NOT consumed here: it keeps applying once per tick until a
    /// drag-end or `stop_changes` arrives, which is what makes a held drag
    /// slide the value continuously.
    pub fn update(&mut self, store: &mut ParamStore, host: &mut impl PanelHost<I>) -> bool {
        let Some(focus) = self.focus else { return false };
        if self.delta == [0.0; 3] {
            return false; // marks end of session
        }

        let e = &self.entries[focus];
        let step = e.step;
        let Some(f) = e.field else { return false };
        match e.kind {
            EntryKind::SingleScalar => {
                let v = e.clamp(e.component(store, 0) + self.delta[0] * step);
                f.set_component(store, 0, v);
            }
            EntryKind::DualScalar => {
                let x = e.clamp(e.component(store, 0) + self.delta[0] * step);
                let y = e.clamp(e.component(store, 1) + self.delta[1] * step);
                f.set_component(store, 0, x);
                f.set_component(store, 1, y);
            }
            EntryKind::VectorXy | EntryKind::VectorZ => {
                if self.axis_swap {
                    let y = e.clamp(e.component(store, 1) + self.delta[1] * step);
                    let z = e.clamp(e.component(store, 2) + self.delta[0] * step);
                    f.set_component(store, 1, y);
                    f.set_component(store, 2, z);
                } else {
                    let x = e.clamp(e.component(store, 0) + self.delta[0] * step);
                    let y = e.clamp(e.component(store, 1) + self.delta[1] * step);
                    f.set_component(store, 0, x);
                    f.set_component(store, 1, y);
                }
            }
            _ => return false,
        }

        host.command(store, self.entries[focus].ident);
        true
    }

    /// Oscillates every morph-flagged entry by `sin(phase) * step / 20`,
    /// clamped into its range, then advances the shared phase. Reports
    /// whether any entry is morphing at all.
    pub fn advance_morph(&mut self, phase_increment: f32, store: &mut ParamStore) -> bool {
        let wave = self.morph_phase.sin();
        let mut any = false;

        for e in &self.entries {
            if !e.morph {
                continue;
            }
            any = true;
            let amt = wave * e.step / MORPH_DIVISOR;
            let components: &[usize] = match e.kind {
                EntryKind::SingleScalar => &[0],
                EntryKind::DualScalar => &[0, 1],
                EntryKind::VectorXy | EntryKind::VectorZ => &[0, 1, 2],
                _ => &[],
            };
            if let Some(f) = e.field {
                for &c in components {
                    let v = e.clamp(e.component(store, c) + amt);
                    f.set_component(store, c, v);
                }
            }
        }

        self.morph_phase += phase_increment;
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    enum Tag {
        #[default]
        None,
        Reset,
        Flip,
    }

    #[derive(Default)]
    struct Recorder {
        commands: Vec<Tag>,
        toggles: Vec<Tag>,
        options: Vec<(Tag, usize)>,
    }

    impl PanelHost<Tag> for Recorder {
        fn command(&mut self, _store: &mut ParamStore, ident: Tag) {
            self.commands.push(ident);
        }
        fn toggle(&mut self, _store: &mut ParamStore, ident: Tag) {
            self.toggles.push(ident);
        }
        fn display_string(&self, _store: &ParamStore, _ident: Tag) -> String {
            String::new()
        }
        fn highlight(&self, _store: &ParamStore, _ident: Tag) -> bool {
            false
        }
        fn option_selected(&mut self, _store: &mut ParamStore, ident: Tag, index: usize) {
            self.options.push((ident, index));
        }
        fn option_label(&self, _store: &ParamStore, _ident: Tag) -> String {
            String::new()
        }
    }

    fn scalar_panel(store: &mut ParamStore, value: f32) -> (Panel<Tag>, ScalarId) {
        let id = store.alloc_scalar(value);
        let mut panel = Panel::new();
        panel.add_scalar(Some('V'), id, 0.0, 100.0, 10.0, "Value");
        (panel, id)
    }

    #[test]
    fn hotkey_focuses_value_entry() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, _) = scalar_panel(&mut store, 50.0);
        assert!(panel.press_hotkey('V', &mut store, &mut host));
        assert_eq!(panel.focus(), Some(0));
        assert!(host.commands.is_empty());
    }

    #[test]
    fn hotkey_dispatches_command_without_taking_focus() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_command(Some('R'), "Reset", Tag::Reset);
        panel.add_toggle(Some('F'), Tag::Flip);

        assert!(panel.press_hotkey('R', &mut store, &mut host));
        assert_eq!(host.commands, vec![Tag::Reset]);
        assert_eq!(panel.focus(), None);

        assert!(panel.press_hotkey('F', &mut store, &mut host));
        assert_eq!(host.toggles, vec![Tag::Flip]);
        assert_eq!(panel.focus(), None);
    }

    #[test]
    fn duplicate_hotkey_first_registered_wins() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let a = store.alloc_scalar(0.0);
        let b = store.alloc_scalar(0.0);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_scalar(Some('X'), a, 0.0, 1.0, 0.1, "first");
        panel.add_scalar(Some('X'), b, 0.0, 1.0, 0.1, "second");

        panel.press_hotkey('X', &mut store, &mut host);
        assert_eq!(panel.focus(), Some(0));
    }

    #[test]
    fn unknown_hotkey_is_a_silent_noop() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, _) = scalar_panel(&mut store, 50.0);
        assert!(!panel.press_hotkey('?', &mut store, &mut host));
        assert_eq!(panel.focus(), None);
    }

    #[test]
    fn hop_then_update_applies_step_and_keeps_applying() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, id) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);

        panel.hop(1, 0, HopScale::Normal);
        assert!(panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(id), 60.0);

        // The delta survives one application; a second tick applies again
        // until a drag-end/stop arrives.
        assert!(panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(id), 70.0);

        panel.stop_changes();
        assert!(!panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(id), 70.0);
    }

    #[test]
    fn update_with_zero_delta_is_idempotent_false() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, id) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);

        assert!(!panel.update(&mut store, &mut host));
        assert!(!panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(id), 50.0);
        assert!(host.commands.is_empty());
    }

    #[test]
    fn update_clamps_into_range_for_any_delta() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, id) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);

        panel.hop(1_000_000, 0, HopScale::Fast);
        panel.update(&mut store, &mut host);
        assert_eq!(store.scalar(id), 100.0);

        panel.hop(-1_000_000, 0, HopScale::Fast);
        panel.update(&mut store, &mut host);
        assert_eq!(store.scalar(id), 0.0);
    }

    #[test]
    fn hop_scales_with_modifiers() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, id) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);

        panel.hop(1, 0, HopScale::Fast); // x3
        panel.update(&mut store, &mut host);
        assert_eq!(store.scalar(id), 80.0);

        panel.hop(-1, 0, HopScale::Fine); // x0.1
        panel.update(&mut store, &mut host);
        assert_eq!(store.scalar(id), 79.0);
    }

    #[test]
    fn hop_without_focus_is_ignored() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, id) = scalar_panel(&mut store, 50.0);

        panel.hop(1, 0, HopScale::Normal);
        assert!(!panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(id), 50.0);
    }

    #[test]
    fn drag_edits_dual_scalar_and_drag_end_clears_delta() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let x = store.alloc_scalar(0.0);
        let y = store.alloc_scalar(0.0);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_pair(Some('M'), x, y, -10.0, 10.0, 1.0, "Move");
        panel.press_hotkey('M', &mut store, &mut host);

        panel.drag_move(100.0, 0.0, true);
        assert!(panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(x), 5.0); // 100 * 0.05 * 1
        assert_eq!(store.scalar(y), 0.0);

        panel.drag_move(0.0, 0.0, false);
        assert!(!panel.update(&mut store, &mut host));
        assert_eq!(store.scalar(x), 5.0);
    }

    #[test]
    fn single_scalar_drag_follows_dominant_axis() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, id) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);

        // vertical drag dominates: dy 100 -> delta.y -5 overrides delta.x
        panel.drag_move(10.0, 100.0, true);
        panel.update(&mut store, &mut host);
        assert_eq!(store.scalar(id), 0.0); // 50 + (-5 * 10) clamped to 0
    }

    #[test]
    fn focus_cycle_is_total_and_skips_z_rows() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let s = store.alloc_scalar(0.0);
        let px = store.alloc_scalar(0.0);
        let py = store.alloc_scalar(0.0);
        let v = store.alloc_vector([0.0; 3]);

        let mut panel: Panel<Tag> = Panel::new();
        panel.add_command(Some('R'), "Reset", Tag::Reset);
        panel.add_scalar(Some('S'), s, 0.0, 1.0, 0.1, "Scalar");
        panel.add_line();
        panel.add_pair(Some('P'), px, py, 0.0, 1.0, 0.1, "Pair");
        panel.add_legend("legend");
        panel.add_triplet(Some('T'), v, -1.0, 1.0, 0.1, "Camera");
        panel.add_gap(1);

        panel.press_hotkey('S', &mut store, &mut host);
        let start = panel.focus().unwrap();

        // interactive stops: Scalar, Pair, VectorXy (z row skipped)
        let mut seen = Vec::new();
        for _ in 0..3 {
            panel.move_focus(1);
            let f = panel.focus().unwrap();
            assert_ne!(panel.entries()[f].kind, EntryKind::VectorZ);
            seen.push(f);
        }
        assert_eq!(panel.focus(), Some(start));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn move_focus_without_focus_is_a_noop() {
        let mut store = ParamStore::new();
        let s = store.alloc_scalar(0.0);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_scalar(Some('S'), s, 0.0, 1.0, 0.1, "Scalar");
        panel.add_scalar(Some('T'), s, 0.0, 1.0, 0.1, "Scalar2");

        panel.move_focus(1);
        assert_eq!(panel.focus(), None);
    }

    #[test]
    fn axis_swap_routes_horizontal_delta_into_z() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let v = store.alloc_vector([0.0; 3]);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_triplet(Some('C'), v, -100.0, 100.0, 1.0, "Camera");
        panel.press_hotkey('C', &mut store, &mut host);

        panel.set_axis_swap(true);
        panel.hop(2, 0, HopScale::Normal);
        panel.update(&mut store, &mut host);
        assert_eq!(store.vector(v), [0.0, 0.0, 2.0]);

        panel.set_axis_swap(false);
        panel.update(&mut store, &mut host);
        assert_eq!(store.vector(v), [2.0, 0.0, 2.0]);
    }

    #[test]
    fn morph_oscillates_all_triplet_components_within_range() {
        let mut store = ParamStore::new();
        let v = store.alloc_vector([1.0, 1.0, 1.0]);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_triplet(Some('C'), v, -1.0, 2.0, 1.0, "Camera");
        let mut host = Recorder::default();
        panel.press_hotkey('C', &mut store, &mut host);
        panel.toggle_morph_on_focused();

        // first tick: phase 0, sin = 0, no movement, but morphing is active
        assert!(panel.advance_morph(0.1, &mut store));
        assert_eq!(store.vector(v), [1.0, 1.0, 1.0]);

        // second tick uses the advanced phase
        assert!(panel.advance_morph(0.1, &mut store));
        let expected = 1.0 + (0.1_f32).sin() * 1.0 / 20.0;
        for c in store.vector(v) {
            assert!((c - expected).abs() < 1e-6);
            assert!((-1.0..=2.0).contains(&c));
        }
    }

    #[test]
    fn advance_morph_without_flags_reports_false() {
        let mut store = ParamStore::new();
        let (mut panel, _) = scalar_panel(&mut store, 50.0);
        assert!(!panel.advance_morph(0.1, &mut store));
    }

    #[test]
    fn morph_reset_clears_every_flag() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, _) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);
        panel.toggle_morph_on_focused();
        assert!(panel.advance_morph(0.1, &mut store));

        panel.morph_reset();
        assert!(!panel.advance_morph(0.1, &mut store));
    }

    #[test]
    fn pointer_down_on_command_restores_previous_focus() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let s = store.alloc_scalar(0.0);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_scalar(Some('S'), s, 0.0, 1.0, 0.1, "Scalar");
        panel.add_command(Some('R'), "Reset", Tag::Reset);
        panel.record_layout(0, 4);
        panel.record_layout(1, 5);

        panel.press_hotkey('S', &mut store, &mut host);
        panel.pointer_down(5, &mut store, &mut host);

        assert_eq!(host.commands, vec![Tag::Reset]);
        assert_eq!(panel.focus(), Some(0)); // momentary, focus restored
    }

    #[test]
    fn pointer_down_on_value_row_is_sticky() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let a = store.alloc_scalar(0.0);
        let b = store.alloc_scalar(0.0);
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_scalar(Some('A'), a, 0.0, 1.0, 0.1, "A");
        panel.add_scalar(Some('B'), b, 0.0, 1.0, 0.1, "B");
        panel.record_layout(0, 2);
        panel.record_layout(1, 3);

        panel.pointer_down(3, &mut store, &mut host);
        assert_eq!(panel.focus(), Some(1));

        // a miss leaves focus alone
        panel.pointer_down(40, &mut store, &mut host);
        assert_eq!(panel.focus(), Some(1));
    }

    #[test]
    fn option_selection_round_trips_through_host() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let mut panel: Panel<Tag> = Panel::new();
        panel.add_option_list(Tag::Flip, "Palette", &["a", "b"]);
        panel.option_selected(Tag::Flip, 1, &mut store, &mut host);
        assert_eq!(host.options, vec![(Tag::Flip, 1)]);
    }

    #[test]
    fn clear_resets_focus_and_delta() {
        let mut store = ParamStore::new();
        let mut host = Recorder::default();
        let (mut panel, _) = scalar_panel(&mut store, 50.0);
        panel.press_hotkey('V', &mut store, &mut host);
        panel.hop(1, 0, HopScale::Normal);

        panel.clear();
        assert_eq!(panel.focus(), None);
        assert!(panel.entries().is_empty());
        assert!(!panel.update(&mut store, &mut host));
    }
}
