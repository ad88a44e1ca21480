/// Slot arena for the numeric parameters the panel edits. The host allocates
/// slots at setup, keeps the returned ids, and passes the store into every
/// panel call that reads or writes values. The panel itself never learns what
/// a slot means.
#[derive(Default)]
pub struct ParamStore {
    scalars: Vec<f32>,
    vectors: Vec<[f32; 3]>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScalarId(usize);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VectorId(usize);

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_scalar(&mut self, init: f32) -> ScalarId {
        self.scalars.push(init);
        ScalarId(self.scalars.len() - 1)
    }

    pub fn alloc_vector(&mut self, init: [f32; 3]) -> VectorId {
        self.vectors.push(init);
        VectorId(self.vectors.len() - 1)
    }

    /// Stale ids read as 0 rather than failing; a frame showing a wrong
    /// number beats aborting mid-redraw.
    pub fn scalar(&self, id: ScalarId) -> f32 {
        self.scalars.get(id.0).copied().unwrap_or(0.0)
    }

    pub fn set_scalar(&mut self, id: ScalarId, v: f32) {
        if let Some(slot) = self.scalars.get_mut(id.0) {
            *slot = v;
        }
    }

    pub fn vector(&self, id: VectorId) -> [f32; 3] {
        self.vectors.get(id.0).copied().unwrap_or([0.0; 3])
    }

    pub fn set_vector(&mut self, id: VectorId, v: [f32; 3]) {
        if let Some(slot) = self.vectors.get_mut(id.0) {
            *slot = v;
        }
    }
}

/// Handle to an external numeric location: one float, two independent floats,
/// or one packed triple. Components beyond what the variant carries read as 0.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum BoundField {
    Scalar(ScalarId),
    Pair(ScalarId, ScalarId),
    Vector(VectorId),
}

impl BoundField {
    pub fn component(&self, store: &ParamStore, idx: usize) -> f32 {
        match (self, idx) {
            (BoundField::Scalar(x), 0) => store.scalar(*x),
            (BoundField::Pair(x, _), 0) => store.scalar(*x),
            (BoundField::Pair(_, y), 1) => store.scalar(*y),
            (BoundField::Vector(v), 0..=2) => store.vector(*v)[idx],
            _ => 0.0,
        }
    }

    pub fn set_component(&self, store: &mut ParamStore, idx: usize, value: f32) {
        match (self, idx) {
            (BoundField::Scalar(x), 0) => store.set_scalar(*x, value),
            (BoundField::Pair(x, _), 0) => store.set_scalar(*x, value),
            (BoundField::Pair(_, y), 1) => store.set_scalar(*y, value),
            (BoundField::Vector(v), 0..=2) => {
                let mut vec = store.vector(*v);
                vec[idx] = value;
                store.set_vector(*v, vec);
            }
            _ => {}
        }
    }
}
