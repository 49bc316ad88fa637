use anyhow::{Context, Result};
use api::Viewport;
use common::{EngineConfig, Settings};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Replay,
    #[default]
    Synthetic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// JSON-lines landmark recording read by the replay source.
    pub replay_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            replay_path: PathBuf::from("landmarks.jsonl"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Log,
    Osc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub send_address: String,
    pub send_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            send_address: "127.0.0.1".to_string(),
            send_port: 9000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// Initial live settings; the control surface may change them at runtime.
    pub settings: Settings,
    pub viewport: Viewport,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub control_port: u16,
    pub profile: String,
    pub profile_dir: PathBuf,
    pub max_fps: Option<f32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            settings: Settings::default(),
            viewport: Viewport::default(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            control_port: 8737,
            profile: "default".to_string(),
            profile_dir: PathBuf::from("profiles"),
            max_fps: Some(30.0),
        }
    }
}

/// Reads `path`, writing a default config there first if it does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = AppConfig::default();
        let file = fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &config)?;
        Ok(config)
    }
}
