use crate::model::MoodKind;
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "A virtual companion living on a terminal clock face")]
pub(crate) struct Cli {
    /// config file (defaults to config.json in the data directory)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// directory holding body.png, background1.png, happy*.png, sad*.png, icon*.png
    #[arg(long)]
    pub(crate) assets: Option<PathBuf>,

    /// RNG seed for motion and face selection
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// simulation tick interval in ms
    #[arg(long)]
    pub(crate) tick_ms: Option<u64>,

    /// display refresh cap
    #[arg(long, default_value_t = 30)]
    pub(crate) fps: u32,

    /// render with braille dots instead of half blocks
    #[arg(long)]
    pub(crate) braille: bool,

    /// walk along a single horizontal lane instead of the 3-D volume
    #[arg(long)]
    pub(crate) lane: bool,

    /// show a status line with mood and attribute levels
    #[arg(long)]
    pub(crate) hud: bool,

    /// log file (defaults to petclock.log in the data directory)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// print the effective config as JSON and exit
    #[arg(long)]
    pub(crate) print_config: bool,

    /// write the default config to the config path and exit
    #[arg(long)]
    pub(crate) init_config: bool,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("axis {axis}: bounds [{min}, {max}] are empty or inverted")]
    InvertedBounds { axis: &'static str, min: f32, max: f32 },
    #[error("axis {axis}: bounds must be finite")]
    NonFiniteBounds { axis: &'static str },
    #[error("depth bounds [{min}, {max}] must be strictly positive")]
    NonPositiveDepth { min: f32, max: f32 },
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("tick interval must be at least 1 ms")]
    ZeroTickInterval,
    #[error("at least one attribute is required")]
    NoAttributes,
    #[error("attribute {0:?} is declared more than once")]
    DuplicateAttribute(String),
    #[error("attribute {0:?} has a max of 0")]
    ZeroMax(String),
    #[error("attribute {0:?} cannot map to the content mood")]
    ContentMood(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct AttributeConfig {
    pub(crate) name: String,
    pub(crate) max: u32,
    pub(crate) mood_on_empty: MoodKind,
}

/// Closed interval `[min, max]`, written as a two-element JSON array.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct AxisBounds(pub(crate) f32, pub(crate) f32);

impl AxisBounds {
    pub(crate) fn min(self) -> f32 {
        self.0
    }
    pub(crate) fn max(self) -> f32 {
        self.1
    }
    pub(crate) fn clamp(self, v: f32) -> f32 {
        v.max(self.0).min(self.1)
    }
    #[cfg(test)]
    pub(crate) fn contains(self, v: f32) -> bool {
        v >= self.0 && v <= self.1
    }

    fn validate(self, axis: &'static str) -> Result<(), ConfigError> {
        if !self.0.is_finite() || !self.1.is_finite() {
            return Err(ConfigError::NonFiniteBounds { axis });
        }
        if self.0 > self.1 {
            return Err(ConfigError::InvertedBounds {
                axis,
                min: self.0,
                max: self.1,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct MotionBounds {
    pub(crate) x: AxisBounds,
    pub(crate) y: AxisBounds,
    /// depth; rendered as scale `1/z`
    pub(crate) z: AxisBounds,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MotionMode {
    Volume,
    Lane,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct MotionConfig {
    pub(crate) mode: MotionMode,
    pub(crate) bounds: MotionBounds,
    pub(crate) step_size: f32,
    pub(crate) re_roll_period: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            mode: MotionMode::Volume,
            bounds: MotionBounds {
                x: AxisBounds(-0.3, 0.3),
                y: AxisBounds(-0.3, 0.3),
                z: AxisBounds(0.7, 1.5),
            },
            step_size: 0.1,
            re_roll_period: 5,
        }
    }
}

/// Face geometry in logical units.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct LayoutConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) indicator_radius: f32,
    pub(crate) indicator_row_y: f32,
    pub(crate) indicator_line_width: f32,
    pub(crate) time_y: f32,
    pub(crate) time_px: f32,
    pub(crate) creature_center_y: f32,
    pub(crate) body_face_offset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 480.0,
            indicator_radius: 35.0,
            indicator_row_y: 100.0,
            indicator_line_width: 10.0,
            time_y: 280.0,
            time_px: 96.0,
            creature_center_y: 380.0,
            body_face_offset: 20.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RenderMode {
    HalfBlock,
    Braille,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) attributes: Vec<AttributeConfig>,
    pub(crate) motion: MotionConfig,
    pub(crate) layout: LayoutConfig,
    pub(crate) tick_interval_ms: u64,
    pub(crate) seed: u64,
    pub(crate) render_mode: RenderMode,
    pub(crate) asset_dir: Option<PathBuf>,
    pub(crate) hud: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attributes: vec![
                AttributeConfig {
                    name: "energy".to_string(),
                    max: 30,
                    mood_on_empty: MoodKind::Tired,
                },
                AttributeConfig {
                    name: "happiness".to_string(),
                    max: 15,
                    mood_on_empty: MoodKind::Sad,
                },
                AttributeConfig {
                    name: "social".to_string(),
                    max: 28,
                    mood_on_empty: MoodKind::Lonely,
                },
            ],
            motion: MotionConfig::default(),
            layout: LayoutConfig::default(),
            tick_interval_ms: 500,
            seed: 0xC0FFEE_u64,
            render_mode: RenderMode::HalfBlock,
            asset_dir: None,
            hud: false,
        }
    }
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let b = self.motion.bounds;
        b.x.validate("x")?;
        b.y.validate("y")?;
        b.z.validate("z")?;
        if b.z.min() <= 0.0 {
            return Err(ConfigError::NonPositiveDepth {
                min: b.z.min(),
                max: b.z.max(),
            });
        }

        positive("motion.step_size", self.motion.step_size)?;
        positive("layout.width", self.layout.width)?;
        positive("layout.height", self.layout.height)?;
        positive("layout.indicator_radius", self.layout.indicator_radius)?;
        positive("layout.indicator_line_width", self.layout.indicator_line_width)?;
        positive("layout.time_px", self.layout.time_px)?;

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        if self.attributes.is_empty() {
            return Err(ConfigError::NoAttributes);
        }
        let mut seen = HashSet::new();
        for a in &self.attributes {
            if !seen.insert(a.name.as_str()) {
                return Err(ConfigError::DuplicateAttribute(a.name.clone()));
            }
            if a.max == 0 {
                return Err(ConfigError::ZeroMax(a.name.clone()));
            }
            if a.mood_on_empty.is_content() {
                return Err(ConfigError::ContentMood(a.name.clone()));
            }
        }
        Ok(())
    }

    pub(crate) fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.assets {
            self.asset_dir = Some(dir.clone());
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(ms) = cli.tick_ms {
            self.tick_interval_ms = ms;
        }
        if cli.braille {
            self.render_mode = RenderMode::Braille;
        }
        if cli.lane {
            self.motion.mode = MotionMode::Lane;
        }
        if cli.hud {
            self.hud = true;
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) struct Paths {
    pub(crate) config_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "petclock", "Petclock")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        config_path: dir.join("config.json"),
        log_path: dir.join("petclock.log"),
    })
}

/// Missing file means defaults. A file that does not parse is reported and
/// replaced by defaults rather than aborting startup.
pub(crate) fn load_config(path: &Path) -> Config {
    let Ok(s) = fs::read_to_string(path) else {
        log::info!("no config at {}, using defaults", path.display());
        return Config::default();
    };
    match serde_json::from_str::<Config>(&s) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("ignoring unreadable config {}: {e}", path.display());
            Config::default()
        }
    }
}

pub(crate) fn save_config_atomic(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(cfg)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}
