use crate::camera::{Camera, Projected};
use gridscape::{BlendMode, FramePrimitives, Material, RenderSurface, Rgb, Vec3};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, IsTerminal, Write};
use tracing::{debug, info};

const INK_THRESHOLD: f32 = 0.06;
const BG_CENTRE: Rgb = Rgb::hex(0x1d2b4f);

#[derive(Clone, Copy, Debug)]
pub(crate) struct RenderOptions {
    pub(crate) enable_color: bool,
    pub(crate) background: bool,
    pub(crate) show_hud: bool,
}

fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

fn luminance(c: [f32; 3]) -> f32 {
    0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2]
}

/* -----------------------------
   Sub-pixel accumulation canvas
------------------------------ */

pub(crate) struct Canvas {
    pub(crate) w: usize,
    pub(crate) h: usize,
    pub(crate) px: Vec<[f32; 3]>,
}

impl Canvas {
    pub(crate) fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![[0.0; 3]; w * h],
        }
    }

    pub(crate) fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize(w * h, [0.0; 3]);
    }

    pub(crate) fn clear(&mut self) {
        self.px.fill([0.0; 3]);
    }

    pub(crate) fn blend(&mut self, x: i32, y: i32, color: [f32; 3], alpha: f32, mode: BlendMode) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let i = y as usize * self.w + x as usize;
        let dst = &mut self.px[i];
        match mode {
            BlendMode::Normal => {
                for k in 0..3 {
                    dst[k] = color[k] * alpha + dst[k] * (1.0 - alpha);
                }
            }
            BlendMode::Additive => {
                for k in 0..3 {
                    dst[k] += color[k] * alpha;
                }
            }
        }
    }

    pub(crate) fn line(&mut self, a: (f32, f32), b: (f32, f32), m: &Material) {
        let (w, h) = (self.w as f32, self.h as f32);
        // both ends off the same edge
        if (a.0 < 0.0 && b.0 < 0.0)
            || (a.1 < 0.0 && b.1 < 0.0)
            || (a.0 >= w && b.0 >= w)
            || (a.1 >= h && b.1 >= h)
        {
            return;
        }
        let dx = b.0 - a.0;
        let dy = b.1 - a.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0).min(4.0 * (w + h) + 1.0);
        let n = steps as i32;
        let color = m.color.to_unit();
        for i in 0..=n {
            let t = i as f32 / steps;
            let x = (a.0 + dx * t).round() as i32;
            let y = (a.1 + dy * t).round() as i32;
            self.blend(x, y, color, m.opacity, m.blend);
        }
    }

    /// Strokes a world-space polyline. Segments with an end behind the camera
    /// are skipped.
    pub(crate) fn polyline(&mut self, cam: &Camera, points: &[Vec3], m: &Material) {
        let (w, h) = (self.w as f32, self.h as f32);
        let mut prev: Option<Projected> = None;
        for &p in points {
            let cur = cam.project(p, w, h);
            if let (Some(a), Some(b)) = (prev, cur) {
                self.line((a.x, a.y), (b.x, b.y), m);
            }
            prev = cur;
        }
    }

    pub(crate) fn splat(&mut self, x: f32, y: f32, diameter: f32, m: &Material) {
        let color = m.color.to_unit();
        let r = (diameter.max(1.0) - 1.0) * 0.5;
        let x0 = (x - r).round() as i32;
        let x1 = (x + r).round() as i32;
        let y0 = (y - r).round() as i32;
        let y1 = (y + r).round() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                self.blend(px, py, color, m.opacity, m.blend);
            }
        }
    }
}

/* -----------------------------
   Cell frame with diffed output
------------------------------ */

struct Frame {
    cols: u16,
    rows: u16,
    glyphs: Vec<char>,
    fg: Vec<u32>,
    bg: Vec<u32>,
    last_glyphs: Vec<char>,
    last_fg: Vec<u32>,
    last_bg: Vec<u32>,
}

impl Frame {
    fn new(cols: u16, rows: u16) -> Self {
        let cells = (cols as usize) * (rows as usize);
        Self {
            cols,
            rows,
            glyphs: vec![' '; cells],
            fg: vec![0; cells],
            bg: vec![0; cells],
            last_glyphs: vec!['\0'; cells],
            last_fg: vec![u32::MAX; cells],
            last_bg: vec![u32::MAX; cells],
        }
    }

    fn put_text(&mut self, x: usize, y: usize, s: &str, fg: u32, bg: Option<u32>) {
        let cols = self.cols as usize;
        if y >= self.rows as usize {
            return;
        }
        for (cx, ch) in (x..).zip(s.chars()) {
            if cx >= cols {
                break;
            }
            let i = y * cols + cx;
            self.glyphs[i] = ch;
            self.fg[i] = fg;
            if let Some(bg) = bg {
                self.bg[i] = bg;
            }
        }
    }
}

fn braille_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

fn braille_char(mask: u8) -> char {
    char::from_u32(0x2800 + mask as u32).unwrap_or(' ')
}

/// CSS-style `radial-gradient(centre, black)` out to the farthest corner.
fn background_at(x: usize, y: usize, cols: usize, rows: usize) -> u32 {
    let hx = (cols as f32 * 0.5).max(1.0);
    let hy = (rows as f32 * 0.5).max(1.0);
    let nx = (x as f32 + 0.5 - hx) / hx;
    let ny = (y as f32 + 0.5 - hy) / hy;
    let t = ((nx * nx + ny * ny).sqrt() / std::f32::consts::SQRT_2).clamp(0.0, 1.0);
    let k = 1.0 - t;
    pack_rgb(
        (BG_CENTRE.r as f32 * k) as u8,
        (BG_CENTRE.g as f32 * k) as u8,
        (BG_CENTRE.b as f32 * k) as u8,
    )
}

fn canvas_to_cells(canvas: &Canvas, frame: &mut Frame, opts: RenderOptions) {
    let cols = frame.cols as usize;
    let rows = frame.rows as usize;
    for cy in 0..rows {
        for cx in 0..cols {
            let mut mask = 0u8;
            let mut best_lum = -1.0f32;
            let mut best = [0.0f32; 3];
            for dy in 0..4 {
                for dx in 0..2 {
                    let sx = cx * 2 + dx;
                    let sy = cy * 4 + dy;
                    if sx >= canvas.w || sy >= canvas.h {
                        continue;
                    }
                    let c = canvas.px[sy * canvas.w + sx];
                    let lum = luminance(c);
                    if lum > INK_THRESHOLD {
                        mask |= braille_bit(dx, dy);
                    }
                    if lum > best_lum {
                        best_lum = lum;
                        best = c;
                    }
                }
            }

            let i = cy * cols + cx;
            frame.glyphs[i] = if mask == 0 { ' ' } else { braille_char(mask) };
            frame.fg[i] = if opts.enable_color {
                pack_rgb(unit_to_u8(best[0]), unit_to_u8(best[1]), unit_to_u8(best[2]))
            } else {
                pack_rgb(220, 220, 220)
            };
            frame.bg[i] = if opts.enable_color && opts.background {
                background_at(cx, cy, cols, rows)
            } else {
                0
            };
        }
    }
}

fn draw_diff(out: &mut io::Stdout, frame: &mut Frame, full: bool) -> io::Result<()> {
    let cols = frame.cols as usize;
    let rows = frame.rows as usize;

    queue!(out, BeginSynchronizedUpdate)?;
    if full {
        queue!(out, SetBackgroundColor(Color::Black), Clear(ClearType::All))?;
    }

    for y in 0..rows {
        for x in 0..cols {
            let i = y * cols + x;
            let (ch, fg, bg) = (frame.glyphs[i], frame.fg[i], frame.bg[i]);
            if !full
                && ch == frame.last_glyphs[i]
                && fg == frame.last_fg[i]
                && bg == frame.last_bg[i]
            {
                continue;
            }
            frame.last_glyphs[i] = ch;
            frame.last_fg[i] = fg;
            frame.last_bg[i] = bg;

            queue!(
                out,
                cursor::MoveTo(x as u16, y as u16),
                SetForegroundColor(Color::Rgb {
                    r: (fg >> 16) as u8,
                    g: (fg >> 8) as u8,
                    b: fg as u8
                }),
                SetBackgroundColor(Color::Rgb {
                    r: (bg >> 16) as u8,
                    g: (bg >> 8) as u8,
                    b: bg as u8
                }),
                Print(ch)
            )?;
        }
    }

    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()?;
    Ok(())
}

/* -----------------------------
   Terminal surface
------------------------------ */

pub(crate) struct TerminalSurface {
    out: io::Stdout,
    frame: Frame,
    canvas: Canvas,
    grid_cam: Camera,
    point_cam: Camera,
    opts: RenderOptions,
    entered: bool,
    mouse: bool,
    full_redraw: bool,
}

impl TerminalSurface {
    /// `None` when stdout is not an interactive terminal.
    pub(crate) fn open(opts: RenderOptions) -> Option<Self> {
        let out = io::stdout();
        if !out.is_terminal() {
            return None;
        }
        let (cols, rows) = terminal::size().ok()?;
        let (cols, rows) = (cols.max(20), rows.max(10));
        Some(Self {
            out,
            frame: Frame::new(cols, rows),
            canvas: Canvas::new(cols as usize * 2, rows as usize * 4),
            grid_cam: Camera::look_at(Vec3::new(15.0, 2.0, 0.0), Vec3::ZERO, 75.0),
            point_cam: Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 75.0),
            opts,
            entered: false,
            mouse: false,
            full_redraw: true,
        })
    }

    pub(crate) fn size(&self) -> (u16, u16) {
        (self.frame.cols, self.frame.rows)
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        let (cols, rows) = (cols.max(20), rows.max(10));
        if (cols, rows) == self.size() {
            return;
        }
        debug!(cols, rows, "terminal resized");
        self.frame = Frame::new(cols, rows);
        self.canvas.resize(cols as usize * 2, rows as usize * 4);
        self.full_redraw = true;
    }

    pub(crate) fn show_hud(&self) -> bool {
        self.opts.show_hud
    }

    pub(crate) fn set_hud(&mut self, on: bool) {
        self.opts.show_hud = on;
        self.full_redraw = true;
    }

    fn rasterize(&mut self, f: &FramePrimitives<'_>) {
        self.canvas.clear();
        let (w, h) = (self.canvas.w as f32, self.canvas.h as f32);

        let m = f.grid.material;
        if m.opacity > 0.0 {
            for line in f.grid.lines {
                self.canvas.polyline(&self.grid_cam, line.positions(), &m);
            }
        }

        for batch in [&f.particles, &f.trail] {
            let m = batch.material;
            for &p in batch.points {
                if let Some(s) = self.point_cam.project(p, w, h) {
                    let d = self.point_cam.pixel_size(m.size, s.depth, h);
                    self.canvas.splat(s.x, s.y, d, &m);
                }
            }
        }
    }

    fn overlay(&mut self, f: &FramePrimitives<'_>) {
        let cols = self.frame.cols as usize;
        let rows = self.frame.rows as usize;

        let mut caption = f.caption.text.to_string();
        caption.push(if f.caption.cursor_on { '▌' } else { ' ' });
        let len = caption.chars().count();
        let x = cols.saturating_sub(len) / 2;
        self.frame
            .put_text(x, rows / 2, &caption, pack_rgb(235, 235, 235), None);

        if self.opts.show_hud {
            let s = f.stats;
            let line1 = format!(
                "gridscape  scroll {:>6.0}px  terrain {:>3.0}%  grid {:.2}  fps {:>3}",
                s.scroll_y,
                s.scroll_progress * 100.0,
                s.opacity,
                s.fps
            );
            let line2 = "Wheel/arrows/PgUp/PgDn scroll  Home/End jump  space pause  H hud  Q quit";
            self.frame
                .put_text(0, 0, &line1, pack_rgb(210, 210, 210), Some(0));
            self.frame
                .put_text(0, 1, line2, pack_rgb(150, 150, 150), Some(0));
        }
    }
}

impl RenderSurface for TerminalSurface {
    fn attach(&mut self) -> anyhow::Result<()> {
        execute!(
            self.out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        self.entered = true;
        terminal::enable_raw_mode()?;
        execute!(self.out, EnableMouseCapture)?;
        self.mouse = true;
        self.full_redraw = true;
        info!("terminal input attached");
        Ok(())
    }

    fn draw(&mut self, f: &FramePrimitives<'_>) -> anyhow::Result<()> {
        self.rasterize(f);
        canvas_to_cells(&self.canvas, &mut self.frame, self.opts);
        self.overlay(f);
        let full = std::mem::take(&mut self.full_redraw);
        draw_diff(&mut self.out, &mut self.frame, full)?;
        Ok(())
    }

    fn detach(&mut self) {
        if self.mouse {
            execute!(self.out, DisableMouseCapture).ok();
            self.mouse = false;
            info!("terminal input detached");
        }
    }

    fn release(&mut self) {
        self.detach();
        if self.entered {
            execute!(self.out, EndSynchronizedUpdate).ok();
            execute!(
                self.out,
                ResetColor,
                Clear(ClearType::All),
                cursor::Show,
                EnableLineWrap,
                LeaveAlternateScreen
            )
            .ok();
            terminal::disable_raw_mode().ok();
            self.entered = false;
        }
        self.frame = Frame::new(0, 0);
        self.canvas.resize(0, 0);
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        // no-op after an explicit release
        self.release();
    }
}
