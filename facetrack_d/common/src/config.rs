use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use api::BackendKind;

/// Options the host passes when the tracker is initialized.
///
/// The camelCase aliases accept the keys experiment runners send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    #[serde(alias = "useModernBackend")]
    pub use_modern_backend: bool,
    /// Ask the modern backend for blendshapes as well as the pose.
    #[serde(alias = "useFullTracking")]
    pub use_full_tracking: bool,
    #[serde(alias = "assetLocationOverride")]
    pub asset_location_override: Option<String>,
}

impl InitOptions {
    pub fn backend(&self) -> BackendKind {
        if self.use_modern_backend {
            BackendKind::Modern
        } else {
            BackendKind::Legacy
        }
    }

    /// Blendshapes only exist on the modern backend.
    pub fn wants_blendshapes(&self) -> bool {
        self.use_modern_backend && self.use_full_tracking
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingOptions {
    pub record: bool,
}

/// What to do with a face mesh result that is still queued when the
/// session finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaleResultPolicy {
    #[default]
    #[serde(alias = "deliver")]
    Deliver,
    #[serde(alias = "drop")]
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presentation {
    #[default]
    #[serde(alias = "raw")]
    Raw,
    #[serde(alias = "unity")]
    Unity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub init: InitOptions,
    pub recording: RecordingOptions,
    pub stale_results: StaleResultPolicy,
    /// Upper bound on recorded results per session. `None` keeps everything.
    pub max_log_len: Option<usize>,
    #[serde(default = "default_max_fps")]
    pub max_fps: f32,
    /// Native library under `plugins/native` that provides the engines.
    #[serde(default = "default_plugin")]
    pub plugin: String,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    pub presentation: Presentation,
}

fn default_max_fps() -> f32 {
    60.0
}

fn default_plugin() -> String {
    if cfg!(windows) {
        "test_engine.dll".to_string()
    } else if cfg!(target_os = "macos") {
        "libtest_engine.dylib".to_string()
    } else {
        "libtest_engine.so".to_string()
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("tracking_log.json")
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            init: InitOptions::default(),
            recording: RecordingOptions::default(),
            stale_results: StaleResultPolicy::default(),
            max_log_len: None,
            max_fps: default_max_fps(),
            plugin: default_plugin(),
            output_path: default_output_path(),
            presentation: Presentation::default(),
        }
    }
}

/// Read the config at `path`, writing out the defaults first if it is missing.
pub fn load_config(path: &Path) -> Result<TrackerConfig> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let reader = std::io::BufReader::new(file);
        let config =
            serde_json::from_reader(reader).with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = TrackerConfig::default();
        let file =
            fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &config)?;
        Ok(config)
    }
}
