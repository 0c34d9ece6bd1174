//! Layered sine/cosine height field with a flat corridor along `z = 0`.

use crate::math::{clampf, smooth01};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub amplitude: f32,
    pub frequency: f32,
    pub octaves: u32,
    /// Half-width of the flat corridor as a fraction of the full grid extent.
    pub flat_fraction: f32,
    /// Width of the smoothstep ramp between the corridor and full terrain.
    pub transition: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            amplitude: 3.0,
            frequency: 0.1,
            octaves: 3,
            flat_fraction: 0.005,
            transition: 8.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NoiseField {
    params: NoiseParams,
    flat_radius: f32,
}

impl NoiseField {
    /// `extent` is the full side length of the grid the field is sampled over.
    pub fn new(params: NoiseParams, extent: f32) -> Self {
        Self {
            params,
            flat_radius: (params.flat_fraction * extent).max(0.0),
        }
    }

    pub fn flat_radius(&self) -> f32 {
        self.flat_radius
    }

    /// Octave sum before clamping, masking and progress scaling.
    pub fn raw(&self, x: f32, z: f32) -> f32 {
        let mut amp = self.params.amplitude;
        let mut freq = self.params.frequency;
        let mut h = 0.0;
        for _ in 0..self.params.octaves {
            h += (x * freq).sin() * (z * freq * 0.7).cos() * amp;
            h += (x * freq * 1.3).cos() * (z * freq * 0.9).sin() * amp * 0.5;
            amp *= 0.5;
            freq *= 2.0;
        }
        h
    }

    pub fn mask(&self, z: f32) -> f32 {
        corridor_mask(z, self.flat_radius, self.params.transition)
    }

    /// `scroll_progress` is expected in `[0, 1]`.
    pub fn height(&self, x: f32, z: f32, scroll_progress: f32) -> f32 {
        let h = self.raw(x, z).max(0.0);
        h * scroll_progress * self.mask(z)
    }
}

/// 0 inside `|z| <= flat_radius`, smoothstep up to 1 over `transition`.
pub fn corridor_mask(z: f32, flat_radius: f32, transition: f32) -> f32 {
    let dz = z.abs();
    if dz <= flat_radius {
        return 0.0;
    }
    if transition <= 0.0 {
        return 1.0;
    }
    let t = clampf((dz - flat_radius) / transition, 0.0, 1.0);
    smooth01(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> NoiseField {
        NoiseField::new(NoiseParams::default(), 40.0)
    }

    #[test]
    fn reference_flat_radius_is_half_percent_of_extent() {
        assert!((field().flat_radius() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn zero_progress_is_flat_everywhere() {
        let f = field();
        for i in -20..=20 {
            for j in -20..=20 {
                let (x, z) = (i as f32 * 1.37, j as f32 * 0.91);
                assert_eq!(f.height(x, z, 0.0), 0.0);
            }
        }
    }

    #[test]
    fn corridor_stays_flat_at_any_progress() {
        let f = field();
        let r = f.flat_radius();
        for p in [0.1, 0.5, 1.0] {
            for i in -10..=10 {
                let z = r * i as f32 / 10.0;
                for x in [-17.0, -3.3, 0.0, 4.2, 19.9] {
                    assert_eq!(f.height(x, z, p), 0.0);
                }
            }
        }
    }

    #[test]
    fn mask_is_monotonic_and_saturates() {
        let r = 0.2;
        let w = 8.0;
        let mut prev = 0.0;
        for i in 0..=400 {
            let z = r + w * i as f32 / 400.0;
            let m = corridor_mask(z, r, w);
            assert!(m >= prev, "mask decreased at z={z}");
            prev = m;
        }
        assert_eq!(corridor_mask(r + w, r, w), 1.0);
        assert_eq!(corridor_mask(-(r + w + 3.0), r, w), 1.0);
        assert!(corridor_mask(r + 1e-4, r, w) < 1e-6);
    }

    #[test]
    fn heights_are_never_negative() {
        let f = field();
        for i in -40..=40 {
            for j in -40..=40 {
                assert!(f.height(i as f32 * 0.5, j as f32 * 0.5, 1.0) >= 0.0);
            }
        }
    }

    #[test]
    fn height_scales_linearly_with_progress() {
        let f = field();
        let (x, z) = (5.0, 12.0);
        let full = f.height(x, z, 1.0);
        assert!(full > 0.0);
        assert!((f.height(x, z, 0.5) - full * 0.5).abs() < 1e-5);
    }

    #[test]
    fn zero_octaves_produce_flat_terrain() {
        let params = NoiseParams {
            octaves: 0,
            ..NoiseParams::default()
        };
        let f = NoiseField::new(params, 40.0);
        assert_eq!(f.height(3.0, 9.0, 1.0), 0.0);
    }
}
