use rayon::prelude::*;

pub const NUM_VARIATIONS: usize = 7;

pub const VARIATION_NAMES: [&str; NUM_VARIATIONS] = [
    "Mandelbrot",
    "Power",
    "Foam",
    "Burning Ship",
    "Tricorn",
    "Celtic",
    "Buffalo",
];

pub const PALETTE_NAMES: [&str; 4] = ["Classic", "Fire", "Ocean", "Mono"];

pub const NUM_TRAPS: usize = 3;

#[derive(Clone, Copy, Default)]
pub struct PointTrap {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

#[derive(Clone, Copy, Default)]
pub struct LineTrap {
    pub x: f32,
    pub y: f32,
    pub slope: f32,
    pub active: bool,
}

/// Complex-plane window being rendered. Pan and zoom are applied as
/// accumulated amounts that the caller zeroes after each recompute.
#[derive(Clone, Copy)]
pub struct Region {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

impl Region {
    pub fn home() -> Self {
        Self {
            xmin: -2.0,
            xmax: 1.0,
            ymin: -1.5,
            ymax: 1.5,
        }
    }

    /// Shifts the window by a percentage of its size per axis.
    pub fn pan(&mut self, pan_x: f32, pan_y: f32) {
        let mx = (self.xmax - self.xmin) * pan_x / 100.0;
        let my = -(self.ymax - self.ymin) * pan_y / 100.0;
        self.xmin -= mx;
        self.xmax -= mx;
        self.ymin -= my;
        self.ymax -= my;
    }

    /// Scales the window about its center; positive amounts zoom in.
    pub fn zoom(&mut self, amount: f32) {
        let scale = 1.0 - amount;
        let xsize = (self.xmax - self.xmin) * scale;
        let ysize = (self.ymax - self.ymin) * scale;
        let xc = (self.xmin + self.xmax) / 2.0;
        let yc = (self.ymin + self.ymax) / 2.0;
        self.xmin = xc - xsize / 2.0;
        self.xmax = xc + xsize / 2.0;
        self.ymin = yc - ysize / 2.0;
        self.ymax = yc + ysize / 2.0;
    }
}

/// Parameter snapshot handed to the compute kernel. Built fresh from the
/// live parameter store on every recompute; the kernel never sees the store.
#[derive(Clone)]
pub struct Control {
    pub width: usize,
    pub height: usize,
    pub region: Region,
    pub variation: usize,
    pub coloring: bool,
    pub shadow: bool,
    pub palette: usize,
    pub max_iter: f32,
    pub skip: f32,
    pub stripe_density: f32,
    pub escape_radius: f32,
    pub multiplier: f32,
    pub contrast: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub power: f32,
    pub foam_q: f32,
    pub foam_w: f32,
    pub p_traps: [PointTrap; NUM_TRAPS],
    pub l_traps: [LineTrap; NUM_TRAPS],
}

impl Control {
    pub fn defaults(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            region: Region::home(),
            variation: 0,
            coloring: true,
            shadow: false,
            palette: 0,
            max_iter: 200.0,
            skip: 20.0,
            stripe_density: -1.343,
            escape_radius: 4.0,
            multiplier: -0.381,
            contrast: 4.0,
            red: 0.0,
            green: 0.4,
            blue: 0.7,
            power: 2.0,
            foam_q: -0.5,
            foam_w: 0.2,
            p_traps: [PointTrap::default(); NUM_TRAPS],
            l_traps: [LineTrap::default(); NUM_TRAPS],
        }
    }
}

/// Raw iteration data for one pixel, before color mapping. The terrain view
/// reuses `value` as its elevation sample.
#[derive(Clone, Copy, Default)]
pub struct Sample {
    pub escaped: bool,
    pub value: f32,
    pub trap_glow: f32,
}

/// One escape-time orbit. The variation selects the iteration formula; the
/// stripe accumulator and orbit traps observe every step of the orbit.
pub fn sample(ctrl: &Control, cx: f32, cy: f32) -> Sample {
    let max_iter = ctrl.max_iter.max(1.0) as usize;
    let skip = ctrl.skip.max(0.0) as usize;
    let bail = ctrl.escape_radius * ctrl.escape_radius;

    let mut zx = 0.0f32;
    let mut zy = 0.0f32;
    let mut avg = 0.0f32;
    let mut stripe_count = 0usize;
    let mut trap_dist = f32::MAX;

    for i in 0..max_iter {
        let (nx, ny) = step(ctrl, zx, zy, cx, cy);
        zx = nx;
        zy = ny;

        let r2 = zx * zx + zy * zy;

        if i >= skip {
            avg += 0.5 + 0.5 * (ctrl.stripe_density * zy.atan2(zx)).sin();
            stripe_count += 1;
        }

        for t in &ctrl.p_traps {
            if t.active {
                let d = ((zx - t.x) * (zx - t.x) + (zy - t.y) * (zy - t.y)).sqrt();
                trap_dist = trap_dist.min(d);
            }
        }
        for t in &ctrl.l_traps {
            if t.active {
                // distance to the line through (x, y) with the given slope
                let d = (t.slope * (zx - t.x) - (zy - t.y)).abs()
                    / (t.slope * t.slope + 1.0).sqrt();
                trap_dist = trap_dist.min(d);
            }
        }

        if r2 > bail {
            let smooth = i as f32 + 1.0 - (r2.sqrt().ln().max(1e-9)).ln() / std::f32::consts::LN_2;
            let value = if ctrl.coloring && stripe_count > 0 {
                avg / stripe_count as f32
            } else {
                smooth / max_iter as f32
            };
            let trap_glow = if trap_dist < f32::MAX {
                (1.0 - trap_dist * 2.0).clamp(0.0, 1.0)
            } else {
                0.0
            };
            return Sample {
                escaped: true,
                value,
                trap_glow,
            };
        }
    }

    Sample {
        escaped: false,
        value: 0.0,
        trap_glow: 0.0,
    }
}

fn step(ctrl: &Control, zx: f32, zy: f32, cx: f32, cy: f32) -> (f32, f32) {
    match ctrl.variation {
        1 => {
            // z^p + c via polar form
            let r = (zx * zx + zy * zy).sqrt();
            if r == 0.0 {
                return (cx, cy);
            }
            let theta = zy.atan2(zx) * ctrl.power;
            let rp = r.powf(ctrl.power);
            (rp * theta.cos() + cx, rp * theta.sin() + cy)
        }
        2 => {
            // foam: quadratic step sheared by the foam weights
            let nx = zx * zx - zy * zy + cx + ctrl.foam_q * zy;
            let ny = 2.0 * zx * zy + cy + ctrl.foam_w * zx;
            (nx, ny)
        }
        3 => {
            let ax = zx.abs();
            let ay = zy.abs();
            (ax * ax - ay * ay + cx, 2.0 * ax * ay + cy)
        }
        4 => (zx * zx - zy * zy + cx, -2.0 * zx * zy + cy),
        5 => ((zx * zx - zy * zy).abs() + cx, 2.0 * zx * zy + cy),
        6 => ((zx * zx - zy * zy).abs() + cx, -(2.0 * zx * zy).abs() + cy),
        _ => (zx * zx - zy * zy + cx, 2.0 * zx * zy + cy),
    }
}

fn palette_channel(t: f32, offset: f32) -> f32 {
    0.5 + 0.5 * (std::f32::consts::TAU * (t + offset)).cos()
}

fn shade(ctrl: &Control, s: Sample) -> [u8; 3] {
    if !s.escaped {
        return [0, 0, 0];
    }

    let t = s.value * ctrl.contrast + ctrl.multiplier;
    let (r, g, b) = match ctrl.palette {
        1 => {
            let v = palette_channel(t, 0.0);
            (v, v * 0.45, v * 0.08) // fire
        }
        2 => {
            let v = palette_channel(t, 0.0);
            (v * 0.1, v * 0.55, v) // ocean
        }
        3 => {
            let v = palette_channel(t, 0.0);
            (v, v, v) // mono
        }
        _ => (
            palette_channel(t, ctrl.red),
            palette_channel(t, ctrl.green),
            palette_channel(t, ctrl.blue),
        ),
    };

    let glow = s.trap_glow;
    let mix = |c: f32| ((c * (1.0 - glow) + glow) * 255.0) as u8;
    [mix(r), mix(g), mix(b)]
}

/// Renders the full window into an RGB buffer, row-parallel.
pub fn render(ctrl: &Control) -> Vec<[u8; 3]> {
    if ctrl.width == 0 || ctrl.height == 0 {
        return Vec::new();
    }
    let dx = (ctrl.region.xmax - ctrl.region.xmin) / ctrl.width as f32;
    let dy = (ctrl.region.ymax - ctrl.region.ymin) / ctrl.height as f32;

    let mut pixels = vec![[0u8; 3]; ctrl.width * ctrl.height];
    pixels
        .par_chunks_mut(ctrl.width)
        .enumerate()
        .for_each(|(py, row)| {
            let cy = ctrl.region.ymin + dy * py as f32;
            for (px, out) in row.iter_mut().enumerate() {
                let cx = ctrl.region.xmin + dx * px as f32;
                *out = shade(ctrl, sample(ctrl, cx, cy));
            }
        });

    if ctrl.shadow {
        emboss(ctrl, &mut pixels);
    }
    pixels
}

/// Post-pass relief shadow: darkens or lightens each pixel by the luminance
/// slope toward its lower-right neighbor.
fn emboss(ctrl: &Control, pixels: &mut [[u8; 3]]) {
    let w = ctrl.width;
    let h = ctrl.height;
    let lum =
        |p: [u8; 3]| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
    let src: Vec<f32> = pixels.iter().map(|&p| lum(p)).collect();

    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let i = y * w + x;
            let slope = (src[i + w + 1] - src[i]) / 255.0;
            let f = (0.65 + slope * 2.0).clamp(0.2, 1.4);
            for c in &mut pixels[i] {
                *c = ((*c as f32) * f).min(255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_point_never_escapes() {
        let ctrl = Control::defaults(4, 4);
        let s = sample(&ctrl, 0.0, 0.0);
        assert!(!s.escaped);
    }

    #[test]
    fn far_exterior_point_escapes() {
        let ctrl = Control::defaults(4, 4);
        let s = sample(&ctrl, 2.0, 2.0);
        assert!(s.escaped);
    }

    #[test]
    fn render_fills_exact_buffer() {
        let ctrl = Control::defaults(16, 9);
        assert_eq!(render(&ctrl).len(), 16 * 9);
    }

    #[test]
    fn interior_renders_black() {
        let mut ctrl = Control::defaults(1, 1);
        ctrl.region = Region {
            xmin: -0.01,
            xmax: 0.01,
            ymin: -0.01,
            ymax: 0.01,
        };
        assert_eq!(render(&ctrl)[0], [0, 0, 0]);
    }

    #[test]
    fn zoom_shrinks_window_about_center() {
        let mut r = Region::home();
        r.zoom(0.5);
        assert!((r.xmax - r.xmin - 1.5).abs() < 1e-5);
        assert!(((r.xmin + r.xmax) / 2.0 - -0.5).abs() < 1e-5);
    }

    #[test]
    fn pan_shifts_window_by_percentage() {
        let mut r = Region::home();
        let width = r.xmax - r.xmin;
        r.pan(10.0, 0.0);
        assert!((r.xmin - (-2.0 - width * 0.1)).abs() < 1e-5);
        assert!((r.xmax - r.xmin - width).abs() < 1e-5);
    }

    #[test]
    fn every_variation_produces_finite_steps() {
        let mut ctrl = Control::defaults(1, 1);
        for v in 0..NUM_VARIATIONS {
            ctrl.variation = v;
            let (x, y) = step(&ctrl, 0.3, -0.4, 0.1, 0.2);
            assert!(x.is_finite() && y.is_finite(), "variation {v}");
        }
    }

    #[test]
    fn point_trap_lights_nearby_orbits() {
        let mut ctrl = Control::defaults(1, 1);
        // the first orbit step lands exactly on c
        ctrl.p_traps[0] = PointTrap {
            x: 0.5,
            y: 0.5,
            active: true,
        };
        let s = sample(&ctrl, 0.5, 0.5);
        assert!(s.escaped);
        assert!(s.trap_glow > 0.9);
    }
}
