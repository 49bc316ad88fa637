pub mod logging;
pub mod osc;

use crate::config::{OutputConfig, OutputMode};
use anyhow::Result;
use common::{CalibrationEvent, PointerSink, PointerUpdate, Telemetry};
use logging::LogSink;
use osc::OscSink;

pub enum OutputBackend {
    Log(LogSink),
    Osc(OscSink),
}

impl PointerSink for OutputBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Log(s) => s.initialize(),
            Self::Osc(s) => s.initialize(),
        }
    }

    fn send_pointer(&self, pointer: &PointerUpdate) -> Result<()> {
        match self {
            Self::Log(s) => s.send_pointer(pointer),
            Self::Osc(s) => s.send_pointer(pointer),
        }
    }

    fn send_calibration(&self, event: &CalibrationEvent) -> Result<()> {
        match self {
            Self::Log(s) => s.send_calibration(event),
            Self::Osc(s) => s.send_calibration(event),
        }
    }

    fn send_telemetry(&self, telemetry: &Telemetry) -> Result<()> {
        match self {
            Self::Log(s) => s.send_telemetry(telemetry),
            Self::Osc(s) => s.send_telemetry(telemetry),
        }
    }
}

pub fn create_sink(config: &OutputConfig) -> OutputBackend {
    match config.mode {
        OutputMode::Log => OutputBackend::Log(LogSink::new()),
        OutputMode::Osc => OutputBackend::Osc(OscSink::new(format!(
            "{}:{}",
            config.send_address, config.send_port
        ))),
    }
}
