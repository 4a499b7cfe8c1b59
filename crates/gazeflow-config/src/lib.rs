//! Configuration for gazeflow sessions
//!
//! Every section has defaults, so a config file only needs the keys it
//! changes. Lookup order for [`AppConfig::load`]:
//! 1. `$GAZEFLOW_CONFIG`
//! 2. `./gazeflow.toml`
//! 3. `<platform config dir>/config.toml`
//! 4. built-in defaults

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use gazeflow_core::layout::TileLayout;
use gazeflow_core::session::{CursorSettings, FixationSettings, MosaicSettings, StarTestSettings};
use gazeflow_core::LayerMask;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "GAZEFLOW_CONFIG";

/// Environment variable overriding the output directory
pub const OUTPUT_DIR_ENV: &str = "GAZEFLOW_OUTPUT_DIR";

const LOCAL_CONFIG_FILE: &str = "gazeflow.toml";

/// Folder created under the platform data directory for CSV logs
const DEFAULT_OUTPUT_SUBDIR: &str = "csv data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gaze: GazeConfig,
    pub mosaic: MosaicConfig,
    pub stars: StarsConfig,
    pub cursor: CursorConfig,
    pub fixation: FixationConfig,
    pub output: OutputConfig,
    pub simulation: SimulationConfig,
}

/// Ray casting and pose fallback shared by the dwell and star sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    pub max_ray_distance: f32,
    /// Layer bitmask; 0 matches every layer
    pub layer_mask: u32,
    pub use_head_fallback: bool,
    /// EMA factor in [0, 1]; unset disables smoothing
    pub smoothing: Option<f32>,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            max_ray_distance: 10.0,
            layer_mask: 0,
            use_head_fallback: true,
            smoothing: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    pub dwell_threshold: f64,
    pub session_duration: f64,
    pub tile_count: usize,
    pub tile_radius: f32,
    /// Layout RNG seed
    pub seed: u64,
    pub layout: TileLayout,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            dwell_threshold: 0.7,
            session_duration: 90.0,
            tile_count: 12,
            tile_radius: 0.3,
            seed: 7,
            layout: TileLayout::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub count: usize,
    pub min_distance: f32,
    pub max_distance: f32,
    pub radius: f32,
    /// Seconds to wait for each star
    pub timeout: f64,
    /// Stars are eye-tracking only unless enabled
    pub use_head_fallback: bool,
    pub seed: u64,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 10,
            min_distance: 5.0,
            max_distance: 20.0,
            radius: 0.1,
            timeout: 3.0,
            use_head_fallback: false,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub cursor_distance: f32,
    pub sample_interval: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            cursor_distance: 2.0,
            sample_interval: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationConfig {
    pub hit_radius: f32,
}

impl Default for FixationConfig {
    fn default() -> Self {
        Self { hit_radius: 0.3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where CSV logs go; the platform data directory when unset
    pub dir: Option<PathBuf>,
    /// Dwell logs are named `<prefix>_<yyyyMMdd_HHmmss>.csv`
    pub mosaic_prefix: String,
    pub stars_file: String,
    pub cursor_file: String,
    pub fixation_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            mosaic_prefix: "MosaicGaze".to_string(),
            stars_file: "stargaze_log.csv".to_string(),
            cursor_file: "eye_control_log.csv".to_string(),
            fixation_file: "gaze_log.csv".to_string(),
        }
    }
}

/// Scripted scan used by `gazeflow simulate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_rate: f64,
    /// Seconds spent on each target
    pub fixation: f64,
    /// Seconds spent looking away between targets
    pub gap: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            fixation: 1.0,
            gap: 0.3,
        }
    }
}

impl AppConfig {
    /// Load from the first config file found, or defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        ProjectDirs::from("", "", "gazeflow")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn validate(&self) -> Result<()> {
        self.check_finite()?;

        if self.gaze.max_ray_distance <= 0.0 {
            bail!("gaze.max_ray_distance must be positive");
        }
        if let Some(alpha) = self.gaze.smoothing {
            if !(0.0..=1.0).contains(&alpha) {
                bail!("gaze.smoothing must be in [0, 1]");
            }
        }
        if self.mosaic.dwell_threshold < 0.0 {
            bail!("mosaic.dwell_threshold must not be negative");
        }
        if self.mosaic.session_duration < 0.0 {
            bail!("mosaic.session_duration must not be negative");
        }
        if self.mosaic.tile_radius <= 0.0 {
            bail!("mosaic.tile_radius must be positive");
        }
        if self.stars.timeout < 0.0 {
            bail!("stars.timeout must not be negative");
        }
        if self.stars.min_distance < 0.0 || self.stars.min_distance > self.stars.max_distance {
            bail!("stars.min_distance must be in [0, max_distance]");
        }
        if self.stars.radius <= 0.0 {
            bail!("stars.radius must be positive");
        }
        if self.cursor.sample_interval < 0.0 {
            bail!("cursor.sample_interval must not be negative");
        }
        if !(0.0..=2.0).contains(&self.fixation.hit_radius) {
            bail!("fixation.hit_radius must be in [0, 2]");
        }
        if self.simulation.tick_rate <= 0.0 {
            bail!("simulation.tick_rate must be positive");
        }
        if self.simulation.fixation < 0.0 || self.simulation.gap < 0.0 {
            bail!("simulation.fixation and simulation.gap must not be negative");
        }
        Ok(())
    }

    /// NaN and infinities compare false against every bound, so reject them first
    fn check_finite(&self) -> Result<()> {
        let mut values: Vec<(&str, f64)> = vec![
            ("gaze.max_ray_distance", f64::from(self.gaze.max_ray_distance)),
            ("mosaic.dwell_threshold", self.mosaic.dwell_threshold),
            ("mosaic.session_duration", self.mosaic.session_duration),
            ("mosaic.tile_radius", f64::from(self.mosaic.tile_radius)),
            ("stars.min_distance", f64::from(self.stars.min_distance)),
            ("stars.max_distance", f64::from(self.stars.max_distance)),
            ("stars.radius", f64::from(self.stars.radius)),
            ("stars.timeout", self.stars.timeout),
            ("cursor.cursor_distance", f64::from(self.cursor.cursor_distance)),
            ("cursor.sample_interval", self.cursor.sample_interval),
            ("fixation.hit_radius", f64::from(self.fixation.hit_radius)),
            ("simulation.tick_rate", self.simulation.tick_rate),
            ("simulation.fixation", self.simulation.fixation),
            ("simulation.gap", self.simulation.gap),
        ];
        if let Some(alpha) = self.gaze.smoothing {
            values.push(("gaze.smoothing", f64::from(alpha)));
        }
        match self.mosaic.layout {
            TileLayout::Sphere {
                radius,
                height_range,
            } => {
                values.push(("mosaic.layout.radius", f64::from(radius)));
                values.push(("mosaic.layout.height_range", f64::from(height_range)));
            }
            TileLayout::Grid { spacing, depth, .. } => {
                values.push(("mosaic.layout.spacing", f64::from(spacing)));
                values.push(("mosaic.layout.depth", f64::from(depth)));
            }
        }

        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            bail!("{} must be a finite number", name);
        }
        Ok(())
    }

    /// Directory CSV logs are written to.
    ///
    /// `$GAZEFLOW_OUTPUT_DIR` wins over `output.dir`, which wins over the
    /// platform data directory.
    pub fn output_dir(&self) -> PathBuf {
        if let Ok(dir) = env::var(OUTPUT_DIR_ENV) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.output.dir {
            return dir.clone();
        }
        ProjectDirs::from("", "", "gazeflow")
            .map(|dirs| dirs.data_dir().join(DEFAULT_OUTPUT_SUBDIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_SUBDIR))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

impl From<&AppConfig> for MosaicSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_ray_distance: config.gaze.max_ray_distance,
            layer_mask: LayerMask(config.gaze.layer_mask),
            dwell_threshold: config.mosaic.dwell_threshold,
            session_duration: config.mosaic.session_duration,
            use_head_fallback: config.gaze.use_head_fallback,
            smoothing: config.gaze.smoothing,
        }
    }
}

impl From<&AppConfig> for StarTestSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_ray_distance: config.gaze.max_ray_distance,
            layer_mask: LayerMask(config.gaze.layer_mask),
            timeout: config.stars.timeout,
            use_head_fallback: config.stars.use_head_fallback,
            smoothing: config.gaze.smoothing,
        }
    }
}

impl From<&AppConfig> for CursorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            cursor_distance: config.cursor.cursor_distance,
            sample_interval: config.cursor.sample_interval,
        }
    }
}

impl From<&AppConfig> for FixationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            hit_radius: config.fixation.hit_radius,
        }
    }
}
