use crate::math::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Per-axis half extents; positions wrap toroidally at `±bounds`.
    pub bounds: Vec3,
    /// Per-axis half extents for initial placement, within `bounds`.
    pub spawn_extent: Vec3,
    /// Initial velocity is uniform in `±initial_speed` per axis.
    pub initial_speed: f32,
    pub attraction: f32,
    /// Below this cursor distance no attraction is applied.
    pub epsilon: f32,
    pub damping: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            bounds: Vec3::new(5.0, 5.0, 2.0),
            spawn_extent: Vec3::new(5.0, 5.0, 1.5),
            initial_speed: 0.01,
            attraction: 0.015,
            epsilon: 0.1,
            damping: 0.98,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[inline]
fn wrap_axis(v: f32, b: f32) -> f32 {
    if v > b {
        -b
    } else if v < -b {
        b
    } else {
        v
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    // packed xyz for the point batch
    positions: Vec<Vec3>,
    bounds: Vec3,
    attraction: f32,
    epsilon: f32,
    damping: f32,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(config: &ParticleConfig, rng: &mut R) -> Self {
        let s = config.spawn_extent;
        let v = config.initial_speed.abs();
        let particles: Vec<Particle> = (0..config.count)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen_range(-s.x..=s.x),
                    rng.gen_range(-s.y..=s.y),
                    rng.gen_range(-s.z..=s.z),
                ),
                velocity: Vec3::new(
                    rng.gen_range(-v..=v),
                    rng.gen_range(-v..=v),
                    rng.gen_range(-v..=v),
                ),
            })
            .collect();
        let positions = particles.iter().map(|p| p.position).collect();

        Self {
            particles,
            positions,
            bounds: config.bounds,
            attraction: config.attraction,
            epsilon: config.epsilon,
            damping: config.damping,
        }
    }

    /// One integration step toward `target` (cursor in world units).
    pub fn update(&mut self, target: Vec2) {
        let b = self.bounds;
        for (p, out) in self.particles.iter_mut().zip(self.positions.iter_mut()) {
            let d = target.sub(p.position.xy());
            let dist = d.len();
            if dist > self.epsilon {
                let force = self.attraction / (dist + 1.0);
                p.velocity.x += d.x * force;
                p.velocity.y += d.y * force;
            }

            p.position = p.position.add(p.velocity);
            p.velocity = p.velocity.mul(self.damping);

            p.position.x = wrap_axis(p.position.x, b.x);
            p.position.y = wrap_axis(p.position.y, b.y);
            p.position.z = wrap_axis(p.position.z, b.z);
            *out = p.position;
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let b = self.bounds;
        p.x.abs() <= b.x && p.y.abs() <= b.y && p.z.abs() <= b.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn field(seed: u64) -> ParticleField {
        let mut rng = StdRng::seed_from_u64(seed);
        ParticleField::new(&ParticleConfig::default(), &mut rng)
    }

    fn single(position: Vec3, velocity: Vec3) -> ParticleField {
        let config = ParticleConfig {
            count: 1,
            ..ParticleConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut f = ParticleField::new(&config, &mut rng);
        f.particles[0] = Particle { position, velocity };
        f
    }

    #[test]
    fn seeding_is_reproducible() {
        let a = field(7);
        let b = field(7);
        let c = field(8);
        assert_eq!(a.particles(), b.particles());
        assert_ne!(a.particles(), c.particles());
        assert_eq!(a.len(), 1000);
    }

    #[test]
    fn seeded_within_spawn_extent() {
        let f = field(3);
        for p in f.particles() {
            assert!(p.position.x.abs() <= 5.0);
            assert!(p.position.y.abs() <= 5.0);
            assert!(p.position.z.abs() <= 1.5);
            assert!(p.velocity.x.abs() <= 0.01);
            assert!(p.velocity.z.abs() <= 0.01);
        }
    }

    #[test]
    fn stays_in_bounds_under_wandering_cursor() {
        let mut f = field(42);
        for step in 0..600 {
            let t = step as f32 * 0.05;
            let target = Vec2::new(t.sin() * 6.0, (t * 1.7).cos() * 6.0);
            f.update(target);
            for p in f.positions() {
                assert!(f.contains(*p), "escaped at step {step}: {p:?}");
            }
        }
    }

    #[test]
    fn exiting_one_edge_reenters_at_the_other() {
        let mut f = single(Vec3::new(4.99, 0.0, 1.99), Vec3::new(0.05, 0.0, 0.05));
        f.update(Vec2::new(4.99, 0.0));
        let p = f.particles()[0].position;
        assert_eq!(p.x, -5.0);
        assert_eq!(p.z, -2.0);

        let mut g = single(Vec3::new(0.0, -4.99, -1.99), Vec3::new(0.0, -0.05, -0.05));
        g.update(Vec2::new(0.0, -4.99));
        let q = g.particles()[0].position;
        assert_eq!(q.y, 5.0);
        assert_eq!(q.z, 2.0);
    }

    #[test]
    fn attraction_skipped_inside_epsilon() {
        let mut f = single(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO);
        f.update(Vec2::new(1.05, 1.0));
        assert_eq!(f.particles()[0].velocity, Vec3::ZERO);
        assert_eq!(f.particles()[0].position, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn attraction_pulls_toward_cursor_then_damps() {
        let mut f = single(Vec3::ZERO, Vec3::ZERO);
        f.update(Vec2::new(3.0, 0.0));
        let p = f.particles()[0];
        // force = 0.015 / 4, dv = 3 * force
        let dv = 3.0 * 0.015 / 4.0;
        assert!((p.position.x - dv).abs() < 1e-7);
        assert!((p.velocity.x - dv * 0.98).abs() < 1e-7);
        assert_eq!(p.position.y, 0.0);
    }

    #[test]
    fn z_velocity_decays_without_force() {
        let mut f = single(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.01));
        for _ in 0..10 {
            f.update(Vec2::ZERO);
        }
        let vz = f.particles()[0].velocity.z;
        assert!((vz - 0.01 * 0.98f32.powi(10)).abs() < 1e-7);
    }
}
