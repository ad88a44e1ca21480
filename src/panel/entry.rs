use crate::panel::field::{BoundField, ParamStore};

/// Row kinds. Value-bound kinds edit through the interaction state machine;
/// the rest are dispatch-only or purely decorative.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
    SingleScalar,
    DualScalar,
    /// x/y projection of a packed triple. Its z row follows immediately after.
    VectorXy,
    /// z projection of the triple bound by the preceding VectorXy row.
    VectorZ,
    DropDown,
    OptionList,
    Command,
    Toggle,
    Legend,
    Line,
    StringDisplay,
    ColorBar,
    Gap,
}

impl EntryKind {
    /// Kinds the focus ring visits. VectorZ is in the set so a hotkey can
    /// land on it, but cycling hops past it (see `Panel::move_focus`).
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            EntryKind::SingleScalar
                | EntryKind::DualScalar
                | EntryKind::VectorXy
                | EntryKind::VectorZ
        )
    }

    /// Kinds worth remembering as "previous focus" across a momentary
    /// command/toggle click.
    pub fn is_memorizable(self) -> bool {
        self.is_interactive()
            || matches!(
                self,
                EntryKind::Command | EntryKind::Toggle | EntryKind::DropDown | EntryKind::OptionList
            )
    }
}

/// One row of panel state. Ranges and steps are taken as given; a caller
/// registering min > max or a non-finite step gets what it asked for.
pub struct Entry<I> {
    pub kind: EntryKind,
    pub hotkey: Option<char>,
    pub ident: I,
    pub morph: bool,
    pub labels: Vec<String>,
    pub field: Option<BoundField>,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    /// Extra terminal rows consumed by color bars and gaps.
    pub rows: u16,
    /// Terminal row this entry was last drawn at; used for pointer hit-tests.
    pub layout_y: u16,
}

impl<I: Default> Entry<I> {
    pub fn new(hotkey: Option<char>, kind: EntryKind) -> Self {
        Self {
            kind,
            hotkey,
            ident: I::default(),
            morph: false,
            labels: Vec::new(),
            field: None,
            min: 0.0,
            max: 0.0,
            step: 0.0,
            rows: 1,
            layout_y: 0,
        }
    }
}

impl<I> Entry<I> {
    /// Component read through the bound field; unbound reads are 0.
    pub fn component(&self, store: &ParamStore, idx: usize) -> f32 {
        match &self.field {
            Some(f) => f.component(store, idx),
            None => 0.0,
        }
    }

    /// Value normalized into [0.05, 0.95] for the indicator graph. The
    /// floor/ceiling keep the marker visible at the range edges; a zero-width
    /// range yields 0.
    pub fn ratio(&self, store: &ParamStore, idx: usize) -> f32 {
        let den = self.max - self.min;
        if den == 0.0 {
            return 0.0;
        }
        ((self.component(store, idx) - self.min) / den).clamp(0.05, 0.95)
    }

    /// Choice index for drop-down rows, clamped into the label list.
    pub fn choice(&self, store: &ParamStore) -> usize {
        let raw = self.component(store, 0).round().max(0.0) as usize;
        raw.min(self.labels.len().saturating_sub(1))
    }

    pub fn clamp(&self, v: f32) -> f32 {
        if v < self.min {
            return self.min;
        }
        if v > self.max {
            return self.max;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_entry(store: &mut ParamStore, value: f32, min: f32, max: f32) -> Entry<()> {
        let id = store.alloc_scalar(value);
        let mut e = Entry::new(Some('X'), EntryKind::SingleScalar);
        e.field = Some(BoundField::Scalar(id));
        e.min = min;
        e.max = max;
        e
    }

    #[test]
    fn ratio_stays_inside_visibility_band() {
        let mut store = ParamStore::new();
        for value in [-500.0, 0.0, 0.5, 50.0, 100.0, 9999.0] {
            let e = scalar_entry(&mut store, value, 0.0, 100.0);
            let r = e.ratio(&store, 0);
            assert!((0.05..=0.95).contains(&r), "value {value} gave ratio {r}");
        }
    }

    #[test]
    fn zero_width_range_ratio_is_zero() {
        let mut store = ParamStore::new();
        let e = scalar_entry(&mut store, 3.0, 3.0, 3.0);
        assert_eq!(e.ratio(&store, 0), 0.0);
    }

    #[test]
    fn unbound_entry_reads_zero() {
        let store = ParamStore::new();
        let e: Entry<()> = Entry::new(None, EntryKind::SingleScalar);
        assert_eq!(e.component(&store, 0), 0.0);
    }

    #[test]
    fn choice_clamps_into_label_list() {
        let mut store = ParamStore::new();
        let id = store.alloc_scalar(12.0);
        let mut e: Entry<()> = Entry::new(None, EntryKind::DropDown);
        e.field = Some(BoundField::Scalar(id));
        e.labels = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(e.choice(&store), 2);
        store.set_scalar(id, -4.0);
        assert_eq!(e.choice(&store), 0);
    }
}
