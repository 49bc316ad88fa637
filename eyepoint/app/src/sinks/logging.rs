use anyhow::Result;
use common::{CalibrationEvent, Mapping, Phase, PointerSink, PointerUpdate, Telemetry};
use log::{debug, info, warn};
use std::cell::Cell;

fn completion_message(mapping: &Mapping) -> String {
    format!("Calibration complete ({} mapping)", mapping.kind())
}

/// Writes pointer updates to the debug log and calibration prompts to the
/// info log, once per target phase.
#[derive(Default)]
pub struct LogSink {
    last_prompt: Cell<Option<(usize, Phase)>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointerSink for LogSink {
    fn initialize(&mut self) -> Result<()> {
        info!("Log sink initialized.");
        Ok(())
    }

    fn send_pointer(&self, pointer: &PointerUpdate) -> Result<()> {
        debug!(
            "Pointer ({:.1}, {:.1}){}",
            pointer.position.x,
            pointer.position.y,
            if pointer.calibrated { "" } else { " [uncalibrated]" }
        );
        Ok(())
    }

    fn send_calibration(&self, event: &CalibrationEvent) -> Result<()> {
        match event {
            CalibrationEvent::Progress(progress) => {
                let key = Some((progress.step, progress.phase));
                if self.last_prompt.get() != key {
                    self.last_prompt.set(key);
                    info!("{}", progress);
                }
            }
            CalibrationEvent::Completed(mapping) => {
                self.last_prompt.set(None);
                info!("{}", completion_message(mapping));
            }
            CalibrationEvent::Failed(e) => {
                self.last_prompt.set(None);
                warn!("Calibration failed, keeping previous mapping: {}", e);
            }
        }
        Ok(())
    }

    fn send_telemetry(&self, telemetry: &Telemetry) -> Result<()> {
        debug!(
            "Gaze x={:.3} y={:.3} face={:.4} depth={:.2}",
            telemetry.centered.x, telemetry.centered.y, telemetry.face_scale, telemetry.depth_scale
        );
        Ok(())
    }
}
