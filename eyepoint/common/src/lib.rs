pub use api::{Landmark, LandmarkFrame, LandmarkSource, Viewport};

mod baseline;
pub mod calibration;
pub mod calibration_manager;
mod config;
pub mod depth;
mod engine;
mod error;
mod euro_filter;
pub mod eye_metrics;
pub mod mapping;
mod smoothing;

pub use baseline::Baseline;
pub use calibration::{
    CalibrationController, CalibrationEvent, CalibrationProgress, CalibrationState,
    CalibrationTarget, Phase,
};
pub use config::{CalibrationConfig, CalibrationVariant, EngineConfig, EyeMode, Settings};
pub use engine::{FrameReport, GazeEngine, PointerUpdate, Telemetry};
pub use error::{Axis, CalibrationError, FrameError};
pub use euro_filter::{EuroFilter, OffsetFilter};
pub use mapping::{AffineAxis, AffineMapping, BoundsMapping, FallbackMapping, Mapping, ScreenMapping};
pub use smoothing::TemporalSmoother;

/// Output side of the engine (rendering collaborator).
pub trait PointerSink: Send {
    fn initialize(&mut self) -> anyhow::Result<()>;
    fn send_pointer(&self, pointer: &PointerUpdate) -> anyhow::Result<()>;
    fn send_calibration(&self, event: &CalibrationEvent) -> anyhow::Result<()>;
    /// Debug readout (centered gaze, face size, depth scale). Callers throttle it.
    fn send_telemetry(&self, telemetry: &Telemetry) -> anyhow::Result<()>;
}
