//! Error types for the engine.

/// Rejected [`EngineConfig`](crate::config::EngineConfig) values.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("particle count must be at least 1")]
    NoParticles,

    #[error("trail capacity must be at least 1")]
    NoTrail,

    #[error("grid needs at least one division and one segment per line")]
    EmptyGrid,

    #[error("grid spacing must be positive, got {0}")]
    BadSpacing(f32),

    #[error("particle bounds must be positive on every axis")]
    BadBounds,

    #[error("spawn extent must lie within the particle bounds")]
    SpawnOutsideBounds,

    #[error("scroll span must be positive, got {0}")]
    BadScrollSpan(f32),

    #[error("{0} must be finite")]
    NotFinite(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("initial speed must lie in 0..=smallest bound, got {0}")]
    BadInitialSpeed(f32),

    #[error("damping must lie in (0, 1], got {0}")]
    BadDamping(f32),

    #[error("at most {max} noise octaves, got {got}")]
    TooManyOctaves { got: u32, max: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The host had nothing to draw on; the engine stays inert.
    #[error("no rendering surface available")]
    NoSurface,

    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("render surface failed: {0}")]
    Surface(#[source] anyhow::Error),
}
