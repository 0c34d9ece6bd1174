use anyhow::anyhow;
use gridscape::{
    ConfigError, EngineConfig, EngineError, FramePrimitives, FrameScheduler, RenderSurface,
    SchedulerState, TickOutcome, Vec2, Vec3, Viewport,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Log {
    attached: u32,
    detached: u32,
    released: u32,
    draws: u32,
    last_opacity: f32,
    last_trail: Vec<Vec3>,
    last_caption: String,
    last_particles: usize,
}

struct RecordingSurface {
    log: Rc<RefCell<Log>>,
    fail_draws: bool,
}

impl RecordingSurface {
    fn new() -> (Self, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (
            Self {
                log: log.clone(),
                fail_draws: false,
            },
            log,
        )
    }
}

impl RenderSurface for RecordingSurface {
    fn attach(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().attached += 1;
        Ok(())
    }

    fn draw(&mut self, frame: &FramePrimitives<'_>) -> anyhow::Result<()> {
        if self.fail_draws {
            return Err(anyhow!("surface lost"));
        }
        let mut log = self.log.borrow_mut();
        log.draws += 1;
        log.last_opacity = frame.grid.material.opacity;
        log.last_trail = frame.trail.points.to_vec();
        log.last_caption = frame.caption.text.to_string();
        log.last_particles = frame.particles.points.len();
        Ok(())
    }

    fn detach(&mut self) {
        self.log.borrow_mut().detached += 1;
    }

    fn release(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}

fn page() -> Viewport {
    Viewport {
        width: 1600.0,
        height: 1000.0,
        document_height: 4000.0,
    }
}

fn small_config() -> EngineConfig {
    let mut c = EngineConfig::default();
    c.particles.count = 64;
    c
}

fn started() -> (FrameScheduler<RecordingSurface>, Rc<RefCell<Log>>) {
    let (surface, log) = RecordingSurface::new();
    let mut s = FrameScheduler::new(small_config(), page(), Some(surface)).unwrap();
    assert!(s.start().unwrap());
    (s, log)
}

#[test]
fn missing_surface_is_reported() {
    let r = FrameScheduler::<RecordingSurface>::new(EngineConfig::default(), page(), None);
    assert!(matches!(r, Err(EngineError::NoSurface)));
}

#[test]
fn invalid_config_releases_the_surface() {
    let (surface, log) = RecordingSurface::new();
    let mut c = EngineConfig::default();
    c.particles.count = 0;
    let r = FrameScheduler::new(c, page(), Some(surface));
    assert!(matches!(
        r,
        Err(EngineError::Config(ConfigError::NoParticles))
    ));
    let log = log.borrow();
    assert_eq!(log.released, 1);
    assert_eq!(log.attached, 0);
}

#[test]
fn unusable_motion_params_are_rejected_before_spawning() {
    let (surface, log) = RecordingSurface::new();
    let mut c = small_config();
    c.particles.initial_speed = f32::MAX;
    let r = FrameScheduler::new(c, page(), Some(surface));
    assert!(matches!(
        r,
        Err(EngineError::Config(ConfigError::BadInitialSpeed(_)))
    ));
    assert_eq!(log.borrow().released, 1);
}

#[test]
fn teardown_twice_releases_once() {
    let (mut s, log) = started();
    s.tick(Instant::now());
    assert!(s.is_listening());
    s.teardown();
    s.teardown();
    assert!(!s.is_listening());
    drop(s);

    let log = log.borrow();
    assert_eq!(log.attached, 1);
    assert_eq!(log.detached, 1);
    assert_eq!(log.released, 1);
}

#[test]
fn teardown_before_start_never_detaches() {
    let (surface, log) = RecordingSurface::new();
    let mut s = FrameScheduler::new(small_config(), page(), Some(surface)).unwrap();
    s.teardown();
    assert_eq!(log.borrow().detached, 0);
    assert_eq!(log.borrow().released, 1);
    assert!(s.mesh().is_none());
    assert!(s.particles().is_none());
    assert!(s.trail().is_none());
}

#[test]
fn ticks_only_while_running() {
    let (surface, log) = RecordingSurface::new();
    let mut s = FrameScheduler::new(small_config(), page(), Some(surface)).unwrap();
    let t0 = Instant::now();

    assert_eq!(s.tick(t0), TickOutcome::Skipped);
    assert!(s.start().unwrap());
    assert_eq!(s.tick(t0), TickOutcome::Drawn);

    s.stop();
    assert_eq!(s.state(), SchedulerState::Paused);
    assert_eq!(s.tick(t0 + Duration::from_millis(16)), TickOutcome::Skipped);

    // resuming does not attach a second time
    assert!(s.start().unwrap());
    assert_eq!(s.tick(t0 + Duration::from_millis(32)), TickOutcome::Drawn);
    assert_eq!(log.borrow().attached, 1);

    s.teardown();
    assert_eq!(s.tick(t0 + Duration::from_millis(48)), TickOutcome::Skipped);
    assert!(!s.start().unwrap());
    assert_eq!(s.state(), SchedulerState::TornDown);
    assert_eq!(log.borrow().draws, 2);
}

#[test]
fn input_is_ignored_until_listening_and_after_teardown() {
    let (surface, _log) = RecordingSurface::new();
    let mut s = FrameScheduler::new(small_config(), page(), Some(surface)).unwrap();
    s.on_scroll(500.0);
    assert_eq!(s.scroll_y(), 0.0);

    s.start().unwrap();
    s.on_scroll(500.0);
    assert_eq!(s.scroll_y(), 500.0);

    s.teardown();
    s.on_scroll(900.0);
    s.on_pointer(Vec2::new(0.5, 0.5));
    assert_eq!(s.scroll_y(), 500.0);
    assert_eq!(s.cursor(), Vec2::ZERO);
}

#[test]
fn scroll_drives_progress_and_opacity() {
    let (mut s, log) = started();
    assert_eq!(s.scroll_progress(), 0.0);
    assert!((s.opacity() - 0.6).abs() < 1e-5);

    s.on_scroll(500.0);
    assert!((s.scroll_progress() - 0.5).abs() < 1e-6);

    s.on_scroll(1487.5);
    assert_eq!(s.scroll_progress(), 1.0);
    s.tick(Instant::now());
    assert!((log.borrow().last_opacity - 0.3).abs() < 1e-5);
    assert!((s.stats().opacity - 0.3).abs() < 1e-5);

    s.on_scroll(2000.0);
    assert_eq!(s.opacity(), 0.0);

    s.on_scroll(3000.0);
    assert!((s.opacity() - 0.3).abs() < 1e-5);
}

#[test]
fn terrain_follows_scroll_progress() {
    let (mut s, _log) = started();
    s.tick(Instant::now());
    let flat = s
        .mesh()
        .unwrap()
        .lines()
        .iter()
        .flat_map(|l| l.positions())
        .all(|p| p.y == 0.0);
    assert!(flat);

    s.on_scroll(1000.0);
    s.tick(Instant::now());
    let mesh = s.mesh().unwrap();
    assert_eq!(mesh.progress(), 1.0);
    let peaks = mesh
        .lines()
        .iter()
        .flat_map(|l| l.positions())
        .any(|p| p.y > 0.0);
    assert!(peaks);
}

#[test]
fn trail_grows_only_on_fresh_pointer_input() {
    let (mut s, log) = started();
    let t0 = Instant::now();

    s.on_pointer(Vec2::new(0.2, -0.4));
    assert_eq!(s.cursor(), Vec2::new(1.0, -2.0));
    s.tick(t0);
    assert_eq!(log.borrow().last_trail, vec![Vec3::new(1.0, -2.0, 0.0)]);

    // no new pointer event, no new trail point
    s.tick(t0 + Duration::from_millis(16));
    assert_eq!(s.trail().unwrap().len(), 1);

    // two moves in one frame collapse to the latest
    s.on_pointer(Vec2::new(0.0, 0.0));
    s.on_pointer(Vec2::new(0.4, 0.4));
    s.tick(t0 + Duration::from_millis(32));
    let trail = s.trail().unwrap().snapshot();
    assert_eq!(trail, vec![Vec2::new(1.0, -2.0), Vec2::new(2.0, 2.0)]);
}

#[test]
fn particles_stay_in_bounds_under_attraction() {
    let (mut s, log) = started();
    let t0 = Instant::now();
    s.on_pointer(Vec2::new(1.0, 1.0));
    for i in 0..300 {
        s.tick(t0 + Duration::from_millis(i * 16));
    }
    let field = s.particles().unwrap();
    assert_eq!(field.len(), 64);
    assert!(field.positions().iter().all(|&p| field.contains(p)));
    assert_eq!(log.borrow().last_particles, 64);
}

#[test]
fn failed_draws_are_dropped_not_fatal() {
    let (mut s, log) = started();
    s.surface_mut().fail_draws = true;
    let t0 = Instant::now();
    assert_eq!(s.tick(t0), TickOutcome::Dropped);
    assert!(s.is_running());
    assert_eq!(s.stats().frame_index, 1);

    s.surface_mut().fail_draws = false;
    assert_eq!(s.tick(t0 + Duration::from_millis(16)), TickOutcome::Drawn);
    assert_eq!(log.borrow().draws, 1);
}

#[test]
fn caption_types_out_with_ticks() {
    let (mut s, log) = started();
    let t0 = Instant::now();
    s.tick(t0);
    assert_eq!(log.borrow().last_caption, "M");
    s.tick(t0 + Duration::from_millis(250));
    assert_eq!(log.borrow().last_caption, "Mov");
    assert!(!s.caption().is_done());

    s.tick(t0 + Duration::from_secs(5));
    assert!(s.caption().is_done());
    assert_eq!(log.borrow().last_caption, "Moving pixels with art and code");
}

#[test]
fn same_seed_same_field() {
    let (mut a, _la) = started();
    let (mut b, _lb) = started();
    let t0 = Instant::now();
    for i in 0..10 {
        a.on_pointer(Vec2::new(0.1 * i as f32 - 0.5, 0.3));
        b.on_pointer(Vec2::new(0.1 * i as f32 - 0.5, 0.3));
        a.tick(t0 + Duration::from_millis(i * 16));
        b.tick(t0 + Duration::from_millis(i * 16));
    }
    assert_eq!(
        a.particles().unwrap().positions(),
        b.particles().unwrap().positions()
    );
}

#[test]
fn resize_moves_the_fade_regions() {
    let (mut s, _log) = started();
    s.on_scroll(1487.5);
    assert!((s.opacity() - 0.3).abs() < 1e-5);
    s.on_resize(Viewport {
        width: 800.0,
        height: 2000.0,
        document_height: 8000.0,
    });
    assert_eq!(s.viewport().height, 2000.0);
    assert!((s.opacity() - 0.6).abs() < 1e-5);
    assert!((s.scroll_progress() - 0.74375).abs() < 1e-5);
}

#[test]
fn shrinking_the_page_clamps_scroll() {
    let (mut s, _log) = started();
    s.on_scroll(2500.0);
    s.on_resize(Viewport {
        width: 1600.0,
        height: 1000.0,
        document_height: 2200.0,
    });
    assert_eq!(s.scroll_y(), s.viewport().max_scroll());
    assert_eq!(s.scroll_y(), 1200.0);
    s.tick(Instant::now());
    assert_eq!(s.stats().scroll_y, 1200.0);

    // a page shorter than the viewport cannot scroll at all
    s.on_resize(Viewport {
        width: 1600.0,
        height: 1000.0,
        document_height: 800.0,
    });
    assert_eq!(s.scroll_y(), 0.0);
}
