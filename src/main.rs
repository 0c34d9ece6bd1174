mod app;
mod camera;
mod input;
mod render;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use settings::{load_settings, project_paths, save_settings, Settings};
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gridscape")]
#[command(about = "Scroll-reactive terrain grid and cursor particle field for the terminal", long_about = None)]
struct Args {
    /// frames per second cap
    #[arg(long)]
    fps: Option<u32>,

    /// particle seed
    #[arg(long)]
    seed: Option<u64>,

    /// number of particles
    #[arg(long)]
    particles: Option<usize>,

    /// cursor trail length
    #[arg(long)]
    trail: Option<usize>,

    /// grid cells per side
    #[arg(long)]
    grid_lines: Option<usize>,

    /// segments per grid line
    #[arg(long)]
    segments: Option<usize>,

    /// world units between grid lines
    #[arg(long)]
    spacing: Option<f32>,

    /// virtual page length in screens
    #[arg(long)]
    pages: Option<f32>,

    /// monochrome output
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// skip the radial background gradient
    #[arg(long, default_value_t = false)]
    no_background: bool,

    /// log file (defaults to the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// do not write settings on exit
    #[arg(long, default_value_t = false)]
    no_save: bool,
}

impl Args {
    fn apply(&self, s: &mut Settings) {
        if let Some(v) = self.fps {
            s.fps_cap = v;
        }
        if let Some(v) = self.seed {
            s.engine.seed = v;
        }
        if let Some(v) = self.particles {
            s.engine.particles.count = v;
        }
        if let Some(v) = self.trail {
            s.engine.trail.capacity = v;
        }
        if let Some(v) = self.grid_lines {
            s.engine.grid.divisions = v;
        }
        if let Some(v) = self.segments {
            s.engine.grid.segments = v;
        }
        if let Some(v) = self.spacing {
            s.engine.grid.spacing = v;
        }
        if let Some(v) = self.pages {
            s.pages = v;
        }
        if self.no_color {
            s.enable_color = false;
        }
        if self.no_background {
            s.background = false;
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = project_paths()?;

    let log_path = args.log_file.clone().unwrap_or_else(|| paths.log_path.clone());
    if let Err(e) = init_logging(&log_path) {
        eprintln!("gridscape: logging disabled: {e:#}");
    }

    let mut stored = load_settings(&paths.settings_path);
    let mut effective = stored.clone();
    args.apply(&mut effective);
    info!(?args, "starting");

    let Some(outcome) = app::run(&effective)? else {
        eprintln!("gridscape: needs an interactive terminal");
        return Ok(());
    };

    if !args.no_save {
        stored.show_hud = outcome.show_hud;
        save_settings(&paths.settings_path, &stored)?;
    }
    info!("bye");
    Ok(())
}
