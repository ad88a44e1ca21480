use rand::Rng;

use crate::app::Tab;
use crate::fractal::{
    self, Control, LineTrap, PointTrap, Region, NUM_TRAPS, NUM_VARIATIONS, PALETTE_NAMES,
    VARIATION_NAMES,
};
use crate::panel::{Panel, PanelHost, ParamStore, ScalarId, VectorId};
use crate::presets::{Preset, PresetBank, PRESET_FLOATS};
use crate::terrain::{HeightField, Light};

const TERRAIN_GRID: usize = 96;
const STEREO_EYE_OFFSET: f32 = 40.0;

/// Command/toggle identities round-tripped through the panel. The panel never
/// looks inside these.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Ident {
    #[default]
    None,
    Reset,
    Coloring,
    Variation,
    Shadow,
    Palette,
    SavePreset,
    LoadNext,
    Help,
    RandomColors,
    Stereo,
    LightOrbit,
    Status,
    PointTrap(usize),
    LineTrap(usize),
}

/// Store handles for every live-editable parameter. The ids are what the
/// panel binds; the explorer reads them back when building a compute
/// snapshot.
pub struct Params {
    pub zoom: ScalarId,
    pub pan_x: ScalarId,
    pub pan_y: ScalarId,
    pub max_iter: ScalarId,
    pub contrast: ScalarId,
    pub skip: ScalarId,
    pub power: ScalarId,
    pub foam_q: ScalarId,
    pub foam_w: ScalarId,
    pub stripe_density: ScalarId,
    pub escape_radius: ScalarId,
    pub multiplier: ScalarId,
    pub red: ScalarId,
    pub green: ScalarId,
    pub blue: ScalarId,
    pub resolution: ScalarId,
    pub p_traps: [(ScalarId, ScalarId); NUM_TRAPS],
    pub l_traps: [(ScalarId, ScalarId, ScalarId); NUM_TRAPS],
    // terrain side
    pub terrain_height: ScalarId,
    pub camera: VectorId,
    pub light_spread: ScalarId,
    pub light_ambient: ScalarId,
    pub light_speed: ScalarId,
    pub light_radius: ScalarId,
    pub light_height: ScalarId,
    pub smooth: ScalarId,
}

impl Params {
    fn alloc(store: &mut ParamStore) -> Self {
        let d = Control::defaults(0, 0);
        let light = Light::defaults();
        Self {
            zoom: store.alloc_scalar(0.0),
            pan_x: store.alloc_scalar(0.0),
            pan_y: store.alloc_scalar(0.0),
            max_iter: store.alloc_scalar(d.max_iter),
            contrast: store.alloc_scalar(d.contrast),
            skip: store.alloc_scalar(d.skip),
            power: store.alloc_scalar(d.power),
            foam_q: store.alloc_scalar(d.foam_q),
            foam_w: store.alloc_scalar(d.foam_w),
            stripe_density: store.alloc_scalar(d.stripe_density),
            escape_radius: store.alloc_scalar(d.escape_radius),
            multiplier: store.alloc_scalar(d.multiplier),
            red: store.alloc_scalar(d.red),
            green: store.alloc_scalar(d.green),
            blue: store.alloc_scalar(d.blue),
            resolution: store.alloc_scalar(0.0),
            p_traps: std::array::from_fn(|_| {
                (store.alloc_scalar(0.0), store.alloc_scalar(0.0))
            }),
            l_traps: std::array::from_fn(|_| {
                (
                    store.alloc_scalar(0.0),
                    store.alloc_scalar(0.0),
                    store.alloc_scalar(1.0),
                )
            }),
            terrain_height: store.alloc_scalar(0.3),
            camera: store.alloc_vector([0.0, 0.0, 0.0]),
            light_spread: store.alloc_scalar(light.spread),
            light_ambient: store.alloc_scalar(light.ambient),
            light_speed: store.alloc_scalar(light.speed),
            light_radius: store.alloc_scalar(light.radius),
            light_height: store.alloc_scalar(light.height),
            smooth: store.alloc_scalar(0.5),
        }
    }
}

/// The fractal controller: owns everything the panel does not — the render
/// region, discrete mode state, the pixel buffers — and is the panel's host.
pub struct Explorer {
    pub params: Params,
    pub region: Region,
    pub variation: usize,
    pub coloring: bool,
    pub shadow: bool,
    pub stereo: bool,
    pub palette: usize,
    pub p_active: [bool; NUM_TRAPS],
    pub l_active: [bool; NUM_TRAPS],
    pub light_angle: f32,
    pub light_orbiting: bool,
    pub presets: PresetBank,
    pub pixels: Vec<[u8; 3]>,
    pub pix_w: usize,
    pub pix_h: usize,
    /// Requested view size in pixels, set by the renderer.
    pub view_w: usize,
    pub view_h: usize,
    needs_rebuild: bool,
    needs_render: bool,
    help_requested: bool,
}

impl Explorer {
    pub fn new(store: &mut ParamStore) -> Self {
        Self {
            params: Params::alloc(store),
            region: Region::home(),
            variation: 0,
            coloring: true,
            shadow: false,
            stereo: false,
            palette: 0,
            p_active: [false; NUM_TRAPS],
            l_active: [false; NUM_TRAPS],
            light_angle: 0.0,
            light_orbiting: true,
            presets: PresetBank::load(),
            pixels: Vec::new(),
            pix_w: 0,
            pix_h: 0,
            view_w: 0,
            view_h: 0,
            needs_rebuild: false,
            needs_render: true,
            help_requested: false,
        }
    }

    // ---- pending-work flags (set from inside dispatch, drained by App) ----

    pub fn take_rebuild(&mut self) -> bool {
        std::mem::take(&mut self.needs_rebuild)
    }

    pub fn take_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    pub fn take_help(&mut self) -> bool {
        std::mem::take(&mut self.help_requested)
    }

    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    // ---- parameter plumbing ----------------------------------------------

    pub fn reset(&mut self, store: &mut ParamStore) {
        let d = Control::defaults(0, 0);
        let p = &self.params;
        store.set_scalar(p.zoom, 0.0);
        store.set_scalar(p.pan_x, 0.0);
        store.set_scalar(p.pan_y, 0.0);
        store.set_scalar(p.max_iter, d.max_iter);
        store.set_scalar(p.contrast, d.contrast);
        store.set_scalar(p.skip, d.skip);
        store.set_scalar(p.power, d.power);
        store.set_scalar(p.foam_q, d.foam_q);
        store.set_scalar(p.foam_w, d.foam_w);
        store.set_scalar(p.stripe_density, d.stripe_density);
        store.set_scalar(p.escape_radius, d.escape_radius);
        store.set_scalar(p.multiplier, d.multiplier);
        store.set_scalar(p.red, d.red);
        store.set_scalar(p.green, d.green);
        store.set_scalar(p.blue, d.blue);
        store.set_vector(p.camera, [0.0, 0.0, 0.0]);
        self.region = Region::home();
        self.needs_render = true;
    }

    /// Snapshot for the compute kernel; also consumes the pan/zoom
    /// accumulators, which is why it needs the store mutably.
    fn control_snapshot(&mut self, store: &mut ParamStore, w: usize, h: usize) -> Control {
        let p = &self.params;

        let pan_x = store.scalar(p.pan_x);
        let pan_y = store.scalar(p.pan_y);
        let zoom = store.scalar(p.zoom);
        self.region.pan(pan_x, pan_y);
        self.region.zoom(zoom);
        store.set_scalar(p.pan_x, 0.0);
        store.set_scalar(p.pan_y, 0.0);
        store.set_scalar(p.zoom, 0.0);

        let mut ctrl = Control::defaults(w, h);
        ctrl.region = self.region;
        ctrl.variation = self.variation;
        ctrl.coloring = self.coloring;
        ctrl.shadow = self.shadow;
        ctrl.palette = self.palette;
        ctrl.max_iter = store.scalar(p.max_iter);
        ctrl.skip = store.scalar(p.skip);
        ctrl.stripe_density = store.scalar(p.stripe_density);
        ctrl.escape_radius = store.scalar(p.escape_radius);
        ctrl.multiplier = store.scalar(p.multiplier);
        ctrl.contrast = store.scalar(p.contrast);
        ctrl.red = store.scalar(p.red);
        ctrl.green = store.scalar(p.green);
        ctrl.blue = store.scalar(p.blue);
        ctrl.power = store.scalar(p.power);
        ctrl.foam_q = store.scalar(p.foam_q);
        ctrl.foam_w = store.scalar(p.foam_w);
        for i in 0..NUM_TRAPS {
            ctrl.p_traps[i] = PointTrap {
                x: store.scalar(p.p_traps[i].0),
                y: store.scalar(p.p_traps[i].1),
                active: self.p_active[i],
            };
            ctrl.l_traps[i] = LineTrap {
                x: store.scalar(p.l_traps[i].0),
                y: store.scalar(p.l_traps[i].1),
                slope: store.scalar(p.l_traps[i].2),
                active: self.l_active[i],
            };
        }
        ctrl
    }

    fn resolution_divisor(&self, store: &ParamStore) -> usize {
        match store.scalar(self.params.resolution).round() as usize {
            1 => 2,
            2 => 4,
            _ => 1,
        }
    }

    pub fn advance_light(&mut self, store: &ParamStore) -> bool {
        if !self.light_orbiting {
            return false;
        }
        self.light_angle += store.scalar(self.params.light_speed);
        true
    }

    fn light_snapshot(&self, store: &ParamStore) -> Light {
        let p = &self.params;
        Light {
            spread: store.scalar(p.light_spread),
            ambient: store.scalar(p.light_ambient),
            speed: store.scalar(p.light_speed),
            radius: store.scalar(p.light_radius),
            height: store.scalar(p.light_height),
            angle: self.light_angle,
        }
    }

    // ---- recompute --------------------------------------------------------

    pub fn recompute(&mut self, store: &mut ParamStore, tab: Tab) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        match tab {
            Tab::Fractal => self.render_fractal(store),
            Tab::Terrain => self.render_terrain(store),
        }
    }

    fn render_fractal(&mut self, store: &mut ParamStore) {
        let div = self.resolution_divisor(store);
        let w = (self.view_w / div).max(1);
        let h = (self.view_h / div).max(1);
        let ctrl = self.control_snapshot(store, w, h);
        self.pixels = fractal::render(&ctrl);
        self.pix_w = w;
        self.pix_h = h;
    }

    fn render_terrain(&mut self, store: &mut ParamStore) {
        let p = &self.params;
        let smooth_passes = (store.scalar(p.smooth) * 4.0).round().max(0.0) as usize;
        let height_scale = store.scalar(p.terrain_height);
        let camera = store.vector(p.camera);
        let light = self.light_snapshot(store);

        let ctrl = self.control_snapshot(store, TERRAIN_GRID, TERRAIN_GRID);
        let field = HeightField::sample(&ctrl, TERRAIN_GRID, smooth_passes);

        let (w, h) = (self.view_w.max(1), self.view_h.max(1));
        if self.stereo {
            // side-by-side eyes with a horizontal camera offset
            let half = (w / 2).max(1);
            let mut left_cam = camera;
            let mut right_cam = camera;
            left_cam[0] -= STEREO_EYE_OFFSET;
            right_cam[0] += STEREO_EYE_OFFSET;
            let left = crate::terrain::render(&field, &light, left_cam, height_scale, half, h);
            let right = crate::terrain::render(&field, &light, right_cam, height_scale, half, h);

            let mut pixels = vec![[0u8; 3]; half * 2 * h];
            for row in 0..h {
                let dst = row * half * 2;
                pixels[dst..dst + half].copy_from_slice(&left[row * half..(row + 1) * half]);
                pixels[dst + half..dst + half * 2]
                    .copy_from_slice(&right[row * half..(row + 1) * half]);
            }
            self.pixels = pixels;
            self.pix_w = half * 2;
            self.pix_h = h;
        } else {
            self.pixels = crate::terrain::render(&field, &light, camera, height_scale, w, h);
            self.pix_w = w;
            self.pix_h = h;
        }
    }

    // ---- presets ----------------------------------------------------------

    fn pack_preset(&self, store: &ParamStore) -> Preset {
        let p = &self.params;
        let mut out = [0.0f32; PRESET_FLOATS];
        out[0] = self.region.xmin;
        out[1] = self.region.xmax;
        out[2] = self.region.ymin;
        out[3] = self.region.ymax;
        out[4] = self.variation as f32;
        out[5] = if self.coloring { 1.0 } else { 0.0 };
        out[6] = self.palette as f32;
        out[7] = if self.shadow { 1.0 } else { 0.0 };
        let scalars = [
            p.max_iter,
            p.contrast,
            p.skip,
            p.power,
            p.foam_q,
            p.foam_w,
            p.stripe_density,
            p.escape_radius,
            p.multiplier,
            p.red,
            p.green,
            p.blue,
        ];
        for (i, id) in scalars.iter().enumerate() {
            out[8 + i] = store.scalar(*id);
        }
        for i in 0..NUM_TRAPS {
            out[20 + i * 3] = store.scalar(p.p_traps[i].0);
            out[21 + i * 3] = store.scalar(p.p_traps[i].1);
            out[22 + i * 3] = if self.p_active[i] { 1.0 } else { 0.0 };
        }
        for i in 0..NUM_TRAPS {
            out[29 + i * 4] = store.scalar(p.l_traps[i].0);
            out[30 + i * 4] = store.scalar(p.l_traps[i].1);
            out[31 + i * 4] = store.scalar(p.l_traps[i].2);
            out[32 + i * 4] = if self.l_active[i] { 1.0 } else { 0.0 };
        }
        out
    }

    fn unpack_preset(&mut self, store: &mut ParamStore, values: &Preset) {
        let p = &self.params;
        self.region = Region {
            xmin: values[0],
            xmax: values[1],
            ymin: values[2],
            ymax: values[3],
        };
        self.variation = (values[4].round().max(0.0) as usize) % NUM_VARIATIONS;
        self.coloring = values[5] != 0.0;
        self.palette = (values[6].round().max(0.0) as usize) % PALETTE_NAMES.len();
        self.shadow = values[7] != 0.0;
        let scalars = [
            p.max_iter,
            p.contrast,
            p.skip,
            p.power,
            p.foam_q,
            p.foam_w,
            p.stripe_density,
            p.escape_radius,
            p.multiplier,
            p.red,
            p.green,
            p.blue,
        ];
        for (i, id) in scalars.iter().enumerate() {
            store.set_scalar(*id, values[8 + i]);
        }
        for i in 0..NUM_TRAPS {
            store.set_scalar(p.p_traps[i].0, values[20 + i * 3]);
            store.set_scalar(p.p_traps[i].1, values[21 + i * 3]);
            self.p_active[i] = values[22 + i * 3] != 0.0;
        }
        for i in 0..NUM_TRAPS {
            store.set_scalar(p.l_traps[i].0, values[29 + i * 4]);
            store.set_scalar(p.l_traps[i].1, values[30 + i * 4]);
            store.set_scalar(p.l_traps[i].2, values[31 + i * 4]);
            self.l_active[i] = values[32 + i * 4] != 0.0;
        }
    }

    // ---- panel configurations ---------------------------------------------

    pub fn build_panel(&self, panel: &mut Panel<Ident>, tab: Tab) {
        match tab {
            Tab::Fractal => self.build_fractal_panel(panel),
            Tab::Terrain => self.build_terrain_panel(panel),
        }
    }

    fn build_fractal_panel(&self, panel: &mut Panel<Ident>) {
        let p = &self.params;
        panel.clear();

        panel.add_command(Some('R'), "Reset", Ident::Reset);
        panel.add_scalar(Some('Z'), p.zoom, -1.0, 1.0, 0.01, "Zoom");
        panel.add_pair(Some('M'), p.pan_x, p.pan_y, -10.0, 10.0, 1.0, "Move");

        panel.add_line();
        panel.add_scalar(Some('I'), p.max_iter, 40.0, 200.0, 3.0, "Iterate");
        panel.add_scalar(Some('C'), p.contrast, 0.1, 5.0, 0.03, "Contrast");
        panel.add_scalar(Some('S'), p.skip, 1.0, 100.0, 0.2, "Skip");

        panel.add_line();
        panel.add_command(
            Some('X'),
            &format!("Var: {}", VARIATION_NAMES[self.variation]),
            Ident::Variation,
        );
        match self.variation {
            1 => {
                panel.add_scalar(Some('P'), p.power, 0.5, 5.0, 0.0002, "Power");
            }
            2 => {
                panel.add_scalar(Some('Q'), p.foam_q, -1.0, 2.0, 0.001, "Foam Q");
                panel.add_scalar(Some('W'), p.foam_w, -1.0, 2.0, 0.001, "Foam W");
            }
            _ => {}
        }

        panel.add_line();
        panel.add_colored_command(Some('D'), "Shadow", Ident::Shadow);
        panel.add_dropdown(Some('E'), p.resolution, &["Res: Full", "Res: Half", "Res: Quarter"]);

        panel.add_line();
        panel.add_color(Ident::Coloring, 1);
        panel.add_command(Some('T'), "Coloring", Ident::Coloring);
        panel.add_scalar(Some('2'), p.stripe_density, -10.0, 10.0, 0.03, "Stripe");
        panel.add_scalar(Some('3'), p.escape_radius, 0.01, 15.0, 0.01, "Escape");
        panel.add_scalar(Some('4'), p.multiplier, -2.0, 2.0, 0.01, "Mult");
        panel.add_scalar(Some('5'), p.red, 0.0, 1.0, 0.008, "Color R");
        panel.add_scalar(Some('6'), p.green, 0.0, 1.0, 0.008, "Color G");
        panel.add_scalar(Some('7'), p.blue, 0.0, 1.0, 0.008, "Color B");
        panel.add_command(Some('N'), "Random colors", Ident::RandomColors);
        panel.add_option_list(Ident::Palette, "Palette", &PALETTE_NAMES);

        // trap groups stay compact: the command row itself carries the
        // active-state highlight
        panel.add_line();
        for i in 0..NUM_TRAPS {
            panel.add_command(None, &format!("PTrap #{}", i + 1), Ident::PointTrap(i));
            panel.add_pair(
                None,
                p.p_traps[i].0,
                p.p_traps[i].1,
                -10.0,
                10.0,
                0.1,
                "Point",
            );
        }
        panel.add_line();
        for i in 0..NUM_TRAPS {
            panel.add_command(None, &format!("LTrap #{}", i + 1), Ident::LineTrap(i));
            panel.add_pair(
                None,
                p.l_traps[i].0,
                p.l_traps[i].1,
                -10.0,
                10.0,
                0.1,
                "Point",
            );
            panel.add_scalar(None, p.l_traps[i].2, -10.0, 10.0, 0.05, "Slope");
        }

        panel.add_line();
        panel.add_command(Some('V'), "Save preset", Ident::SavePreset);
        panel.add_command(Some('L'), "Load next", Ident::LoadNext);
        panel.add_command(Some('H'), "Help", Ident::Help);
        panel.add_string("", Ident::Status);
    }

    fn build_terrain_panel(&self, panel: &mut Panel<Ident>) {
        let p = &self.params;
        panel.clear();

        panel.add_scalar(Some('2'), p.terrain_height, -1.0, 1.0, 0.01, "Height");
        panel.add_triplet(Some('M'), p.camera, -300.0, 300.0, 5.0, "Move");

        panel.add_line();
        panel.add_legend("Light Controls");
        panel.add_scalar(Some('3'), p.light_spread, 0.1, 2.0, 0.1, "Spread");
        panel.add_scalar(Some('4'), p.light_ambient, 0.0, 1.0, 0.01, "Ambient");
        panel.add_scalar(Some('5'), p.light_speed, 0.001, 0.05, 0.001, "Speed");
        panel.add_scalar(Some('6'), p.light_radius, 5.0, 150.0, 4.0, "Radius");
        panel.add_scalar(Some('7'), p.light_height, -100.0, 100.0, 5.0, "Height");
        panel.add_toggle(Some('G'), Ident::LightOrbit);

        panel.add_line();
        panel.add_scalar(Some('8'), p.smooth, 0.0, 1.0, 0.02, "Smooth");

        panel.add_line();
        panel.add_colored_command(Some('O'), "Stereo", Ident::Stereo);

        panel.add_line();
        panel.add_command(Some('R'), "Reset", Ident::Reset);
        panel.add_command(Some('H'), "Help", Ident::Help);
    }
}

impl PanelHost<Ident> for Explorer {
    fn command(&mut self, store: &mut ParamStore, ident: Ident) {
        match ident {
            // value-change notification from the state machine
            Ident::None => {}
            Ident::Reset => self.reset(store),
            Ident::Coloring => {
                self.coloring = !self.coloring;
                self.needs_render = true;
            }
            Ident::Variation => {
                self.variation = (self.variation + 1) % NUM_VARIATIONS;
                self.needs_rebuild = true;
                self.reset(store);
            }
            Ident::Shadow => {
                self.shadow = !self.shadow;
                self.needs_render = true;
            }
            Ident::SavePreset => {
                let preset = self.pack_preset(store);
                self.presets.save(preset);
            }
            Ident::LoadNext => {
                if let Some(values) = self.presets.load_next() {
                    self.unpack_preset(store, &values);
                    self.needs_rebuild = true;
                    self.needs_render = true;
                }
            }
            Ident::Help => self.help_requested = true,
            Ident::RandomColors => {
                let mut rng = rand::thread_rng();
                let p = &self.params;
                store.set_scalar(p.red, rng.gen_range(0.0..1.0));
                store.set_scalar(p.green, rng.gen_range(0.0..1.0));
                store.set_scalar(p.blue, rng.gen_range(0.0..1.0));
                store.set_scalar(p.stripe_density, rng.gen_range(-3.0..3.0));
                store.set_scalar(p.multiplier, rng.gen_range(-1.0..1.0));
                self.needs_render = true;
            }
            Ident::Stereo => {
                self.stereo = !self.stereo;
                self.needs_render = true;
            }
            Ident::PointTrap(i) => {
                if let Some(flag) = self.p_active.get_mut(i) {
                    *flag = !*flag;
                    self.needs_render = true;
                }
            }
            Ident::LineTrap(i) => {
                if let Some(flag) = self.l_active.get_mut(i) {
                    *flag = !*flag;
                    self.needs_render = true;
                }
            }
            Ident::Palette | Ident::LightOrbit | Ident::Status => {}
        }
    }

    fn toggle(&mut self, _store: &mut ParamStore, ident: Ident) {
        if ident == Ident::LightOrbit {
            self.light_orbiting = !self.light_orbiting;
            self.needs_render = true;
        }
    }

    fn display_string(&self, _store: &ParamStore, ident: Ident) -> String {
        match ident {
            Ident::LightOrbit => {
                if self.light_orbiting {
                    "Light: orbiting".to_string()
                } else {
                    "Light: fixed".to_string()
                }
            }
            Ident::Status => format!("Span {:.2e}", self.region.xmax - self.region.xmin),
            _ => String::new(),
        }
    }

    fn highlight(&self, _store: &ParamStore, ident: Ident) -> bool {
        match ident {
            Ident::Shadow => self.shadow,
            Ident::Coloring => self.coloring,
            Ident::Stereo => self.stereo,
            Ident::PointTrap(i) => self.p_active.get(i).copied().unwrap_or(false),
            Ident::LineTrap(i) => self.l_active.get(i).copied().unwrap_or(false),
            _ => false,
        }
    }

    fn option_selected(&mut self, _store: &mut ParamStore, ident: Ident, index: usize) {
        if ident == Ident::Palette {
            self.palette = index % PALETTE_NAMES.len();
            self.needs_render = true;
        }
    }

    fn option_label(&self, _store: &ParamStore, ident: Ident) -> String {
        match ident {
            Ident::Palette => PALETTE_NAMES[self.palette].to_string(),
            _ => String::new(),
        }
    }
}
