//! Per-frame driver: owns every engine buffer, reads the latest host input and
//! hands the regenerated primitives to a [`RenderSurface`].

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::frame::{
    Caption, FramePrimitives, FrameStats, LineBatch, Material, PointBatch, GRID_MATERIAL,
    PARTICLE_MATERIAL, TRAIL_MATERIAL,
};
use crate::math::{clampf, Vec2};
use crate::opacity;
use crate::particles::ParticleField;
use crate::terrain::TerrainMesh;
use crate::trail::CursorTrail;
use crate::typewriter::Typewriter;
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// The host side of the engine: receives primitives and owns the input hooks.
pub trait RenderSurface {
    /// Begin delivering pointer, scroll and resize input.
    fn attach(&mut self) -> anyhow::Result<()>;
    fn draw(&mut self, frame: &FramePrimitives<'_>) -> anyhow::Result<()>;
    /// Stop delivering input. Called at most once per successful `attach`.
    fn detach(&mut self);
    /// Free buffers and restore the host. Called exactly once.
    fn release(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub document_height: f32,
}

impl Viewport {
    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.height).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Paused,
    TornDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    /// The surface rejected the frame; the engine keeps going.
    Dropped,
    Skipped,
}

#[derive(Clone, Copy, Debug, Default)]
struct InputState {
    scroll_y: f32,
    cursor: Vec2,
    fresh_cursor: bool,
}

struct Buffers {
    mesh: TerrainMesh,
    particles: ParticleField,
    trail: CursorTrail,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FpsMeter {
    frames: u32,
    since: Option<Instant>,
    fps: u32,
}

impl FpsMeter {
    pub(crate) fn tick(&mut self, now: Instant) -> u32 {
        let since = *self.since.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.saturating_duration_since(since);
        if elapsed >= Duration::from_millis(1000) {
            let ms = elapsed.as_secs_f64() * 1000.0;
            self.fps = (self.frames as f64 * 1000.0 / ms).round() as u32;
            self.frames = 0;
            self.since = Some(now);
        }
        self.fps
    }
}

pub struct FrameScheduler<S: RenderSurface> {
    config: EngineConfig,
    surface: S,
    state: SchedulerState,
    listening: bool,
    released: bool,
    buffers: Option<Buffers>,
    input: InputState,
    viewport: Viewport,
    caption: Typewriter,
    fps: FpsMeter,
    frame_index: u64,
    last_tick: Option<Instant>,
    stats: FrameStats,
}

impl<S: RenderSurface> FrameScheduler<S> {
    /// Builds every buffer up front. Without a surface nothing is built and
    /// [`EngineError::NoSurface`] is returned.
    pub fn new(
        config: EngineConfig,
        viewport: Viewport,
        surface: Option<S>,
    ) -> Result<Self, EngineError> {
        let Some(mut surface) = surface else {
            warn!("no render surface, background engine disabled");
            return Err(EngineError::NoSurface);
        };
        if let Err(e) = config.validate() {
            surface.release();
            return Err(e.into());
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let buffers = Buffers {
            mesh: TerrainMesh::new(config.grid, config.noise),
            particles: ParticleField::new(&config.particles, &mut rng),
            trail: CursorTrail::new(config.trail.capacity),
        };
        debug!(
            vertices = buffers.mesh.vertex_count(),
            particles = buffers.particles.len(),
            trail = buffers.trail.capacity(),
            "engine buffers built"
        );

        Ok(Self {
            caption: Typewriter::new(&config.caption),
            config,
            surface,
            state: SchedulerState::Idle,
            listening: false,
            released: false,
            buffers: Some(buffers),
            input: InputState::default(),
            viewport,
            fps: FpsMeter::default(),
            frame_index: 0,
            last_tick: None,
            stats: FrameStats::default(),
        })
    }

    /// Attaches input on first call and resumes ticking. Returns `false` once
    /// torn down.
    pub fn start(&mut self) -> Result<bool, EngineError> {
        match self.state {
            SchedulerState::TornDown => return Ok(false),
            SchedulerState::Running => return Ok(true),
            SchedulerState::Idle | SchedulerState::Paused => {}
        }
        if !self.listening {
            self.surface.attach().map_err(EngineError::Surface)?;
            self.listening = true;
        }
        self.state = SchedulerState::Running;
        // a pause must not turn into a huge first dt
        self.last_tick = None;
        info!("frame scheduler started");
        Ok(true)
    }

    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Paused;
            info!(frame = self.frame_index, "frame scheduler paused");
        }
    }

    /// Stops ticking, detaches input, then frees buffers. Safe to repeat.
    pub fn teardown(&mut self) {
        if self.state == SchedulerState::TornDown {
            return;
        }
        self.state = SchedulerState::TornDown;
        if self.listening {
            self.surface.detach();
            self.listening = false;
        }
        self.buffers = None;
        if !self.released {
            self.surface.release();
            self.released = true;
        }
        info!(frames = self.frame_index, "frame scheduler torn down");
    }

    /* -----------------------------
       Input hooks (last write wins)
    ------------------------------ */

    pub fn on_scroll(&mut self, scroll_y: f32) {
        if self.listening && scroll_y.is_finite() {
            self.input.scroll_y = scroll_y;
        }
    }

    /// `ndc` is the pointer in `[-1, 1]` on both axes, y up.
    pub fn on_pointer(&mut self, ndc: Vec2) {
        if self.listening && ndc.is_finite() {
            self.input.cursor = ndc.mul(self.config.scroll.cursor_scale);
            self.input.fresh_cursor = true;
        }
    }

    /// Also pulls the scroll offset back inside the resized page.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if self.listening {
            debug!(?viewport, "viewport resized");
            self.viewport = viewport;
            self.input.scroll_y = clampf(self.input.scroll_y, 0.0, viewport.max_scroll());
        }
    }

    pub fn scroll_progress(&self) -> f32 {
        let span = self.viewport.height * self.config.scroll.span_viewports;
        let y = self.input.scroll_y;
        if span <= 0.0 {
            return if y > 0.0 { 1.0 } else { 0.0 };
        }
        clampf(y / span, 0.0, 1.0)
    }

    pub fn opacity(&self) -> f32 {
        opacity::opacity(
            self.input.scroll_y,
            self.viewport.height,
            self.viewport.document_height,
        )
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.state != SchedulerState::Running {
            return TickOutcome::Skipped;
        }
        let progress = self.scroll_progress();
        let opacity = self.opacity();
        let Some(buffers) = self.buffers.as_mut() else {
            return TickOutcome::Skipped;
        };

        let dt = self
            .last_tick
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);

        buffers.mesh.update(progress);
        buffers.particles.update(self.input.cursor);
        if std::mem::take(&mut self.input.fresh_cursor) {
            buffers.trail.push(self.input.cursor);
        }
        buffers.trail.rebuild();
        self.caption.advance(dt);

        self.frame_index += 1;
        self.stats = FrameStats {
            frame_index: self.frame_index,
            fps: self.fps.tick(now),
            scroll_y: self.input.scroll_y,
            scroll_progress: progress,
            opacity,
        };

        let dirty = buffers.mesh.take_dirty();
        let caption = self.caption.visible();
        let frame = FramePrimitives {
            grid: LineBatch {
                lines: buffers.mesh.lines(),
                material: Material {
                    opacity,
                    ..GRID_MATERIAL
                },
                dirty,
            },
            particles: PointBatch {
                points: buffers.particles.positions(),
                material: PARTICLE_MATERIAL,
            },
            trail: PointBatch {
                points: buffers.trail.render_points(),
                material: TRAIL_MATERIAL,
            },
            caption: Caption {
                text: &caption,
                cursor_on: self.caption.cursor_on(),
            },
            stats: self.stats,
        };

        trace!(frame = self.frame_index, progress, opacity, "tick");
        match self.surface.draw(&frame) {
            Ok(()) => TickOutcome::Drawn,
            Err(e) => {
                warn!(frame = self.frame_index, error = %e, "frame dropped");
                TickOutcome::Dropped
            }
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_y(&self) -> f32 {
        self.input.scroll_y
    }

    /// Latest cursor in particle-world units.
    pub fn cursor(&self) -> Vec2 {
        self.input.cursor
    }

    pub fn caption(&self) -> &Typewriter {
        &self.caption
    }

    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.buffers.as_ref().map(|b| &b.mesh)
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.buffers.as_ref().map(|b| &b.particles)
    }

    pub fn trail(&self) -> Option<&CursorTrail> {
        self.buffers.as_ref().map(|b| &b.trail)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: RenderSurface> Drop for FrameScheduler<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
