pub mod replay;
pub mod synthetic;

use crate::config::{SourceConfig, SourceKind};
use anyhow::Result;
use api::{LandmarkFrame, LandmarkSource};
use replay::ReplaySource;
use synthetic::SyntheticSource;

pub enum SourceBackend {
    Replay(ReplaySource),
    Synthetic(SyntheticSource),
}

impl LandmarkSource for SourceBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Replay(s) => s.initialize(),
            Self::Synthetic(s) => s.initialize(),
        }
    }

    fn detect(&mut self, timestamp_ms: f64) -> Result<Option<LandmarkFrame>> {
        match self {
            Self::Replay(s) => s.detect(timestamp_ms),
            Self::Synthetic(s) => s.detect(timestamp_ms),
        }
    }

    fn unload(&mut self) {
        match self {
            Self::Replay(s) => s.unload(),
            Self::Synthetic(s) => s.unload(),
        }
    }
}

pub fn create_source(config: &SourceConfig) -> SourceBackend {
    match config.kind {
        SourceKind::Replay => SourceBackend::Replay(ReplaySource::new(config.replay_path.clone())),
        SourceKind::Synthetic => SourceBackend::Synthetic(SyntheticSource::new()),
    }
}
