use crate::fractal::{self, Control};

/// Orbiting light over the height field. `spread` sharpens the diffuse
/// falloff, `speed` is the per-tick orbit increment.
#[derive(Clone, Copy)]
pub struct Light {
    pub spread: f32,
    pub ambient: f32,
    pub speed: f32,
    pub radius: f32,
    pub height: f32,
    pub angle: f32,
}

impl Light {
    pub fn defaults() -> Self {
        Self {
            spread: 1.3,
            ambient: 0.1,
            speed: 0.002,
            radius: 50.0,
            height: 1.0,
            angle: 0.0,
        }
    }

    fn direction(&self) -> [f32; 3] {
        let v = [
            self.angle.cos() * self.radius,
            self.angle.sin() * self.radius,
            self.height.abs().max(1.0),
        ];
        normalize(v)
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt().max(1e-6);
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Square elevation grid sampled from the fractal over the current region.
/// Escaped points sit low, interior points form the plateaus.
pub struct HeightField {
    pub size: usize,
    pub heights: Vec<f32>,
}

impl HeightField {
    pub fn sample(ctrl: &Control, size: usize, smooth_passes: usize) -> Self {
        let mut heights = vec![0.0; size * size];
        let dx = (ctrl.region.xmax - ctrl.region.xmin) / size as f32;
        let dy = (ctrl.region.ymax - ctrl.region.ymin) / size as f32;

        for gy in 0..size {
            let cy = ctrl.region.ymin + dy * gy as f32;
            for gx in 0..size {
                let cx = ctrl.region.xmin + dx * gx as f32;
                let s = fractal::sample(ctrl, cx, cy);
                heights[gy * size + gx] = if s.escaped { s.value.clamp(0.0, 1.0) } else { 1.0 };
            }
        }

        let mut field = Self { size, heights };
        // neighbor-averaging passes knock down single-sample spikes
        for _ in 0..smooth_passes {
            field.smooth();
        }
        field
    }

    pub fn smooth(&mut self) {
        let n = self.size;
        if n < 3 {
            return;
        }
        let mut out = self.heights.clone();
        for y in 1..n - 1 {
            for x in 1..n - 1 {
                let mut sum = 0.0;
                for dy in 0..3 {
                    for dx in 0..3 {
                        sum += self.heights[(y + dy - 1) * n + (x + dx - 1)];
                    }
                }
                out[y * n + x] = sum / 9.0;
            }
        }
        self.heights = out;
    }

    pub fn height_at(&self, x: usize, y: usize) -> f32 {
        let n = self.size;
        self.heights[y.min(n - 1) * n + x.min(n - 1)]
    }

    /// Surface normal from central differences, z up.
    pub fn normal_at(&self, x: usize, y: usize, z_scale: f32) -> [f32; 3] {
        let n = self.size;
        let xl = self.height_at(x.saturating_sub(1), y);
        let xr = self.height_at((x + 1).min(n - 1), y);
        let yl = self.height_at(x, y.saturating_sub(1));
        let yr = self.height_at(x, (y + 1).min(n - 1));
        normalize([(xl - xr) * z_scale, (yl - yr) * z_scale, 2.0 / n as f32])
    }
}

fn height_color(h: f32) -> [f32; 3] {
    // water -> shore -> grass -> rock -> snow
    const STOPS: [(f32, [f32; 3]); 5] = [
        (0.00, [0.05, 0.15, 0.45]),
        (0.30, [0.15, 0.45, 0.60]),
        (0.50, [0.20, 0.55, 0.20]),
        (0.80, [0.45, 0.38, 0.30]),
        (1.00, [0.95, 0.95, 0.98]),
    ];
    let h = h.clamp(0.0, 1.0);
    for w in STOPS.windows(2) {
        let (t0, c0) = w[0];
        let (t1, c1) = w[1];
        if h <= t1 {
            let f = if t1 > t0 { (h - t0) / (t1 - t0) } else { 0.0 };
            return [
                c0[0] + (c1[0] - c0[0]) * f,
                c0[1] + (c1[1] - c0[1]) * f,
                c0[2] + (c1[2] - c0[2]) * f,
            ];
        }
    }
    STOPS[4].1
}

/// Lit relief of the height field. The camera triple pans the viewport over
/// the grid (x, y) and zooms it (z); `height_scale` exaggerates elevation.
pub fn render(
    field: &HeightField,
    light: &Light,
    camera: [f32; 3],
    height_scale: f32,
    width: usize,
    height: usize,
) -> Vec<[u8; 3]> {
    if width == 0 || height == 0 || field.size == 0 {
        return Vec::new();
    }

    let n = field.size;
    let light_dir = light.direction();
    let z_scale = (1.0 + height_scale).max(0.1);
    // camera z range +-300 maps to roughly 1x..5x magnification
    let magnify = 1.0 + camera[2].abs() / 75.0;
    let span = n as f32 / magnify;
    // camera x/y range +-300 maps to +- half a grid of pan
    let pan_x = camera[0] / 300.0 * n as f32 / 2.0 + (n as f32 - span) / 2.0;
    let pan_y = camera[1] / 300.0 * n as f32 / 2.0 + (n as f32 - span) / 2.0;

    let mut pixels = vec![[0u8; 3]; width * height];
    for py in 0..height {
        for px in 0..width {
            let gx = (px as f32 / width as f32 * span + pan_x)
                .rem_euclid(n as f32) as usize;
            let gy = (py as f32 / height as f32 * span + pan_y)
                .rem_euclid(n as f32) as usize;

            let h = field.height_at(gx, gy);
            let normal = field.normal_at(gx, gy, z_scale);
            let diff = (normal[0] * light_dir[0]
                + normal[1] * light_dir[1]
                + normal[2] * light_dir[2])
                .max(0.0)
                .powf(light.spread.max(0.05));
            let lum = (light.ambient + (1.0 - light.ambient) * diff).clamp(0.0, 1.0);

            let c = height_color((h * z_scale).min(1.0));
            pixels[py * width + px] = [
                (c[0] * lum * 255.0) as u8,
                (c[1] * lum * 255.0) as u8,
                (c[2] * lum * 255.0) as u8,
            ];
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(size: usize, level: f32) -> HeightField {
        HeightField {
            size,
            heights: vec![level; size * size],
        }
    }

    #[test]
    fn smoothing_preserves_a_constant_field() {
        let mut f = flat_field(8, 0.5);
        f.smooth();
        assert!(f.heights.iter().all(|&h| (h - 0.5).abs() < 1e-6));
    }

    #[test]
    fn flat_field_normals_point_up() {
        let f = flat_field(8, 0.5);
        let n = f.normal_at(4, 4, 1.0);
        assert!(n[2] > 0.99);
        assert!(n[0].abs() < 1e-6 && n[1].abs() < 1e-6);
    }

    #[test]
    fn render_fills_exact_buffer() {
        let f = flat_field(8, 0.5);
        let light = Light::defaults();
        let px = render(&f, &light, [0.0, 0.0, 0.0], 0.5, 10, 6);
        assert_eq!(px.len(), 60);
    }

    #[test]
    fn sampling_marks_interior_as_plateau() {
        let mut ctrl = Control::defaults(4, 4);
        ctrl.region = crate::fractal::Region {
            xmin: -0.05,
            xmax: 0.05,
            ymin: -0.05,
            ymax: 0.05,
        };
        ctrl.max_iter = 60.0;
        let f = HeightField::sample(&ctrl, 5, 2);
        // the window is entirely inside the set; smoothing keeps it at 1.0
        assert!(f.heights.iter().all(|&h| h > 0.9));
    }
}
