use crate::sinks::OutputBackend;
use anyhow::Result;
use common::{FrameReport, PointerSink};
use std::time::{Duration, Instant};

pub const TELEMETRY_INTERVAL: Duration = Duration::from_millis(200);

/// Lets one telemetry readout through per interval.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl TelemetryThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        if self
            .last
            .is_some_and(|last| now.saturating_duration_since(last) < self.interval)
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}

pub struct Dispatcher {
    backend: OutputBackend,
    telemetry: TelemetryThrottle,
}

impl Dispatcher {
    pub fn new(backend: OutputBackend) -> Self {
        Self {
            backend,
            telemetry: TelemetryThrottle::new(TELEMETRY_INTERVAL),
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.backend.initialize()
    }

    /// Forwards a frame's calibration event, pointer and throttled telemetry
    /// to the sink.
    pub fn send(&mut self, report: &FrameReport) -> Result<()> {
        if let Some(event) = &report.calibration {
            self.backend.send_calibration(event)?;
        }
        if let Some(pointer) = &report.pointer {
            self.backend.send_pointer(pointer)?;
        }
        if let Some(telemetry) = &report.telemetry {
            if self.telemetry.ready(Instant::now()) {
                self.backend.send_telemetry(telemetry)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_passes_once_per_interval() {
        let mut throttle = TelemetryThrottle::new(TELEMETRY_INTERVAL);
        let start = Instant::now();

        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(50)));
        assert!(!throttle.ready(start + Duration::from_millis(199)));
        assert!(throttle.ready(start + Duration::from_millis(200)));
        assert!(!throttle.ready(start + Duration::from_millis(350)));
        assert!(throttle.ready(start + Duration::from_millis(400)));
    }

    #[test]
    fn log_backend_accepts_full_report() {
        use crate::sinks::logging::LogSink;
        use common::{PointerUpdate, Telemetry};
        use glam::Vec2;

        let mut dispatcher = Dispatcher::new(OutputBackend::Log(LogSink::new()));
        dispatcher.initialize().unwrap();
        let report = FrameReport {
            pointer: Some(PointerUpdate {
                position: Vec2::new(10.0, 20.0),
                normalized: Vec2::splat(0.5),
                calibrated: false,
            }),
            telemetry: Some(Telemetry {
                centered: Vec2::ZERO,
                face_scale: 0.1,
                depth_scale: 1.0,
                offset: Vec2::ZERO,
            }),
            ..FrameReport::default()
        };
        dispatcher.send(&report).unwrap();
        dispatcher.send(&report).unwrap();
    }
}
