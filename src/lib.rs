//! Scroll-reactive terrain grid and cursor-attracted particle field.
//!
//! [`FrameScheduler`] owns every buffer and is ticked once per display frame;
//! a [`RenderSurface`] receives the regenerated [`FramePrimitives`].

pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod noise;
pub mod opacity;
pub mod particles;
pub mod scheduler;
pub mod terrain;
pub mod trail;
pub mod typewriter;

pub use config::{EngineConfig, ScrollConfig};
pub use error::{ConfigError, EngineError};
pub use frame::{BlendMode, FramePrimitives, FrameStats, Material, Rgb};
pub use math::{Vec2, Vec3};
pub use noise::{NoiseField, NoiseParams};
pub use opacity::FadeRegions;
pub use particles::{Particle, ParticleConfig, ParticleField};
pub use scheduler::{FrameScheduler, RenderSurface, SchedulerState, TickOutcome, Viewport};
pub use terrain::{GridConfig, GridLine, LineFamily, TerrainMesh};
pub use trail::{CursorTrail, TrailConfig};
pub use typewriter::Typewriter;
