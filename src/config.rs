use crate::error::ConfigError;
use crate::noise::NoiseParams;
use crate::particles::ParticleConfig;
use crate::terrain::GridConfig;
use crate::trail::TrailConfig;
use serde::{Deserialize, Serialize};

// beyond this the octaves are finer than a grid segment
const MAX_OCTAVES: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Terrain is fully formed after this many viewport heights of scroll.
    pub span_viewports: f32,
    /// Normalized cursor to particle-world scale.
    pub cursor_scale: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            span_viewports: 1.0,
            cursor_scale: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    pub noise: NoiseParams,
    pub grid: GridConfig,
    pub particles: ParticleConfig,
    pub trail: TrailConfig,
    pub scroll: ScrollConfig,
    pub caption: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE_u64,
            noise: NoiseParams::default(),
            grid: GridConfig::default(),
            particles: ParticleConfig::default(),
            trail: TrailConfig::default(),
            scroll: ScrollConfig::default(),
            caption: "Moving pixels with art and code".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.noise;
        let p = &self.particles;
        let floats = [
            ("noise.amplitude", n.amplitude),
            ("noise.frequency", n.frequency),
            ("noise.flat_fraction", n.flat_fraction),
            ("noise.transition", n.transition),
            ("grid.spacing", self.grid.spacing),
            ("grid extent", self.grid.extent()),
            ("particles.bounds.x", p.bounds.x),
            ("particles.bounds.y", p.bounds.y),
            ("particles.bounds.z", p.bounds.z),
            ("particles.spawn_extent.x", p.spawn_extent.x),
            ("particles.spawn_extent.y", p.spawn_extent.y),
            ("particles.spawn_extent.z", p.spawn_extent.z),
            ("particles.initial_speed", p.initial_speed),
            ("particles.attraction", p.attraction),
            ("particles.epsilon", p.epsilon),
            ("particles.damping", p.damping),
            ("scroll.span_viewports", self.scroll.span_viewports),
            ("scroll.cursor_scale", self.scroll.cursor_scale),
        ];
        if let Some(&(name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite(name));
        }
        if n.octaves > MAX_OCTAVES {
            return Err(ConfigError::TooManyOctaves {
                got: n.octaves,
                max: MAX_OCTAVES,
            });
        }
        if self.particles.count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.trail.capacity == 0 {
            return Err(ConfigError::NoTrail);
        }
        if self.grid.divisions == 0 || self.grid.segments == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if !(self.grid.spacing > 0.0) {
            return Err(ConfigError::BadSpacing(self.grid.spacing));
        }
        let b = self.particles.bounds;
        if !(b.x > 0.0 && b.y > 0.0 && b.z > 0.0) {
            return Err(ConfigError::BadBounds);
        }
        let s = self.particles.spawn_extent;
        let spawn_ok = (0.0..=b.x).contains(&s.x)
            && (0.0..=b.y).contains(&s.y)
            && (0.0..=b.z).contains(&s.z);
        if !spawn_ok {
            return Err(ConfigError::SpawnOutsideBounds);
        }
        let min_bound = b.x.min(b.y).min(b.z);
        if !(0.0..=min_bound).contains(&p.initial_speed) {
            return Err(ConfigError::BadInitialSpeed(p.initial_speed));
        }
        if !(p.damping > 0.0 && p.damping <= 1.0) {
            return Err(ConfigError::BadDamping(p.damping));
        }
        for (name, v) in [
            ("particles.attraction", p.attraction),
            ("particles.epsilon", p.epsilon),
            ("scroll.cursor_scale", self.scroll.cursor_scale),
        ] {
            if v < 0.0 {
                return Err(ConfigError::Negative(name));
            }
        }
        if !(self.scroll.span_viewports > 0.0) {
            return Err(ConfigError::BadScrollSpan(self.scroll.span_viewports));
        }
        Ok(())
    }
}
