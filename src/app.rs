use crate::input::{collect_events_nonblocking, map_event, pointer_ndc, HostAction};
use crate::render::{RenderOptions, TerminalSurface};
use crate::settings::Settings;
use anyhow::{bail, Context};
use gridscape::{EngineError, FrameScheduler, TickOutcome, Viewport};
use std::time::{Duration, Instant};
use tracing::{info, warn};

// about two seconds of frames the terminal refused
const MAX_DROPPED_FRAMES: u32 = 120;

pub(crate) struct Outcome {
    pub(crate) show_hud: bool,
}

pub(crate) struct App {
    scheduler: FrameScheduler<TerminalSurface>,
    fps_cap: u32,
    cell_height_px: f32,
    scroll_step_px: f32,
    pages: f32,
    scroll_y: f32,
    dropped: u32,
    should_quit: bool,
}

fn viewport_for(cols: u16, rows: u16, cell_height_px: f32, pages: f32) -> Viewport {
    let height = rows as f32 * cell_height_px;
    Viewport {
        // terminal cells are roughly twice as tall as wide
        width: cols as f32 * cell_height_px * 0.5,
        height,
        document_height: height * pages.max(1.0),
    }
}

impl App {
    /// `None` when there is no terminal to draw on.
    fn init(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let opts = RenderOptions {
            enable_color: settings.enable_color,
            background: settings.background,
            show_hud: settings.show_hud,
        };
        let surface = TerminalSurface::open(opts);
        let (cols, rows) = surface.as_ref().map(|s| s.size()).unwrap_or((80, 24));
        let viewport = viewport_for(cols, rows, settings.cell_height_px, settings.pages);

        let scheduler = match FrameScheduler::new(settings.engine.clone(), viewport, surface) {
            Ok(s) => s,
            Err(EngineError::NoSurface) => return Ok(None),
            Err(e) => return Err(e).context("building background engine"),
        };

        Ok(Some(Self {
            scheduler,
            fps_cap: settings.fps_cap,
            cell_height_px: settings.cell_height_px,
            scroll_step_px: settings.scroll_step_px,
            pages: settings.pages,
            scroll_y: 0.0,
            dropped: 0,
            should_quit: false,
        }))
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.scheduler
            .start()
            .context("attaching terminal input")?;
        let (cols, rows) = self.scheduler.surface().size();
        self.apply_resize(cols, rows);

        let fps = self.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        info!(fps, "entering frame loop");

        while !self.should_quit {
            let frame_start = Instant::now();

            for ev in collect_events_nonblocking(frame_dt)? {
                if let Some(action) = map_event(ev) {
                    self.apply(action)?;
                }
                if self.should_quit {
                    break;
                }
            }
            if self.should_quit {
                break;
            }

            match self.scheduler.tick(Instant::now()) {
                TickOutcome::Drawn => self.dropped = 0,
                TickOutcome::Dropped => {
                    self.dropped += 1;
                    if self.dropped >= MAX_DROPPED_FRAMES {
                        bail!("terminal stopped accepting frames");
                    }
                }
                TickOutcome::Skipped => {}
            }

            spin_sleep(frame_dt, frame_start);
        }

        self.scheduler.teardown();
        Ok(())
    }

    fn apply(&mut self, action: HostAction) -> anyhow::Result<()> {
        match action {
            HostAction::Quit => self.should_quit = true,
            HostAction::ToggleHud => {
                let surface = self.scheduler.surface_mut();
                let on = !surface.show_hud();
                surface.set_hud(on);
            }
            HostAction::TogglePause => {
                if self.scheduler.is_running() {
                    self.scheduler.stop();
                } else {
                    self.scheduler.start().context("resuming frame scheduler")?;
                }
            }
            HostAction::ScrollSteps(n) => self.set_scroll(self.scroll_y + n * self.scroll_step_px),
            HostAction::ScrollPages(n) => {
                let page = self.scheduler.viewport().height;
                self.set_scroll(self.scroll_y + n * page);
            }
            HostAction::ScrollTop => self.set_scroll(0.0),
            HostAction::ScrollBottom => self.set_scroll(f32::INFINITY),
            HostAction::Pointer { col, row } => {
                let (cols, rows) = self.scheduler.surface().size();
                self.scheduler.on_pointer(pointer_ndc(col, row, cols, rows));
            }
            HostAction::Resize { cols, rows } => {
                self.scheduler.surface_mut().resize(cols, rows);
                let (cols, rows) = self.scheduler.surface().size();
                self.apply_resize(cols, rows);
            }
        }
        Ok(())
    }

    fn apply_resize(&mut self, cols: u16, rows: u16) {
        let viewport = viewport_for(cols, rows, self.cell_height_px, self.pages);
        self.scheduler.on_resize(viewport);
        self.scroll_y = self.scheduler.scroll_y();
    }

    fn set_scroll(&mut self, y: f32) {
        let max = self.scheduler.viewport().max_scroll();
        self.scroll_y = y.clamp(0.0, max);
        self.scheduler.on_scroll(self.scroll_y);
    }
}

/// Runs until the user quits. Returns `Ok(None)` without a terminal.
pub(crate) fn run(settings: &Settings) -> anyhow::Result<Option<Outcome>> {
    let Some(mut app) = App::init(settings)? else {
        warn!("stdout is not a terminal, nothing to draw on");
        return Ok(None);
    };
    let res = app.run();
    let outcome = Outcome {
        show_hud: app.scheduler.surface().show_hud(),
    };
    // restores the terminal even when the loop failed
    app.scheduler.teardown();
    res.map(|()| Some(outcome))
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
