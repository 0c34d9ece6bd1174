use anyhow::{Context, Result};
use directories::ProjectDirs;
use gridscape::EngineConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) background: bool,
    pub(crate) show_hud: bool,
    /// Page length in viewport heights.
    pub(crate) pages: f32,
    /// Virtual pixels per terminal row.
    pub(crate) cell_height_px: f32,
    /// Virtual pixels per wheel notch or arrow key.
    pub(crate) scroll_step_px: f32,
    pub(crate) engine: EngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 60,
            enable_color: true,
            background: true,
            show_hud: true,
            pages: 4.0,
            cell_height_px: 16.0,
            scroll_step_px: 48.0,
            engine: EngineConfig::default(),
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

/// Settings live in the config dir, the log in the local data dir.
pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "gridscape", "Gridscape")
        .context("could not resolve project directories")?;
    let (config, data) = (proj.config_dir(), proj.data_local_dir());
    for dir in [config, data] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(Paths {
        settings_path: config.join("settings.json"),
        log_path: data.join("gridscape.log"),
    })
}

/// Falls back to defaults when the file is absent or unreadable.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
            return Settings::default();
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "settings malformed, using defaults");
        Settings::default()
    })
}

/// Writes a sibling temp file, syncs it and renames it over `path`, so a
/// crash leaves either the old file or the new one.
pub(crate) fn save_settings(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(&data)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    debug!(path = %path.display(), "settings saved");
    Ok(())
}
