use crate::baseline::Baseline;
use crate::calibration::{
    CalibrationController, CalibrationEvent, CalibrationState, CalibrationTarget,
};
use crate::config::{CalibrationVariant, EngineConfig, Settings};
use crate::depth::DepthNormalizer;
use crate::error::FrameError;
use crate::euro_filter::OffsetFilter;
use crate::eye_metrics;
use crate::mapping::{orient, Mapping, ScreenMapping};
use crate::smoothing::TemporalSmoother;
use api::{LandmarkFrame, Viewport};
use glam::Vec2;
use log::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerUpdate {
    /// Smoothed pointer position in pixels.
    pub position: Vec2,
    /// Mapped position in `[0, 1]²` before smoothing.
    pub normalized: Vec2,
    /// False while the uncalibrated fallback mapping is in effect.
    pub calibrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    /// Mapped position re-centered to `[-1, 1]²`.
    pub centered: Vec2,
    pub face_scale: f32,
    pub depth_scale: f32,
    /// Baseline-relative, depth-scaled offset fed to the mapping.
    pub offset: Vec2,
}

/// Everything one call to [`GazeEngine::process_frame`] produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub pointer: Option<PointerUpdate>,
    pub telemetry: Option<Telemetry>,
    pub calibration: Option<CalibrationEvent>,
    pub skipped: Option<FrameError>,
}

struct Measured {
    offset: Vec2,
    face_scale: f32,
    depth_scale: f32,
}

/// All mutable tracking state: baseline, current mapping, calibration
/// session and pointer. One instance per tracked user; driven one frame at a
/// time by the scheduling loop.
pub struct GazeEngine {
    config: EngineConfig,
    baseline: Baseline,
    depth: DepthNormalizer,
    offset_filter: Option<OffsetFilter>,
    calibration: CalibrationController,
    mapping: Mapping,
    viewport: Viewport,
    pointer: TemporalSmoother,
    latest_offset: Option<Vec2>,
}

impl GazeEngine {
    pub fn new(config: EngineConfig, viewport: Viewport) -> Self {
        let depth = DepthNormalizer::new(
            config.depth_min_ratio,
            config.depth_max_ratio,
            config.depth_epsilon,
        );
        let offset_filter = (config.offset_smoothness > 0.0)
            .then(|| OffsetFilter::from_smoothness(config.offset_smoothness.min(1.0)));

        Self {
            baseline: Baseline::new(),
            depth,
            offset_filter,
            calibration: CalibrationController::new(config.calibration.clone()),
            mapping: Mapping::fallback(config.fallback_gain),
            viewport,
            pointer: TemporalSmoother::new(viewport.center()),
            latest_offset: None,
            config,
        }
    }

    /// Runs the full pipeline for one detection result.
    ///
    /// `frame` is None when the detector found no face; calibration timers
    /// still advance by `dt` seconds so warmup and collection track wall time.
    pub fn process_frame(&mut self, settings: &Settings, frame: Option<&LandmarkFrame>, dt: f32) -> FrameReport {
        let measured = match frame {
            Some(frame) => self.measure(settings, frame, dt),
            None => Err(FrameError::NoFaceDetected),
        };

        let mut report = FrameReport::default();

        let sample = measured.as_ref().ok().map(|m| m.offset);
        if let Some(event) = self.calibration.advance(dt, sample, &self.mapping) {
            if let CalibrationEvent::Completed(mapping) = &event {
                self.mapping = *mapping;
            }
            report.calibration = Some(event);
        }

        match measured {
            Ok(m) => {
                let normalized = self.mapping.apply(m.offset);
                let size = self.viewport.size();
                let target = (normalized * size).clamp(Vec2::ZERO, size.max(Vec2::ZERO));
                let position = self.pointer.update(target, settings.effective_alpha());

                report.pointer = Some(PointerUpdate {
                    position,
                    normalized,
                    calibrated: self.mapping.is_calibrated(),
                });
                report.telemetry = Some(Telemetry {
                    centered: normalized * 2.0 - Vec2::ONE,
                    face_scale: m.face_scale,
                    depth_scale: m.depth_scale,
                    offset: m.offset,
                });
            }
            Err(e) => {
                trace!("Frame skipped: {}", e);
                report.skipped = Some(e);
            }
        }

        report
    }

    fn measure(&mut self, settings: &Settings, frame: &LandmarkFrame, dt: f32) -> Result<Measured, FrameError> {
        let reading = eye_metrics::extract(frame, settings.eye_mode)?;
        let depth_scale = self
            .depth
            .update(settings.reference_face_size, reading.face_scale)?;

        let mut oriented = orient(reading.selected.offset(), settings.mirror, settings.invert_y);
        if let Some(filter) = self.offset_filter.as_mut() {
            oriented = filter.filter(oriented, dt);
        }
        self.latest_offset = Some(oriented);

        if self.config.auto_baseline
            && !self.calibration.is_active()
            && self.baseline.seed_if_unset(oriented)
        {
            info!(
                "Baseline seeded from first valid frame: ({:.3}, {:.3})",
                oriented.x, oriented.y
            );
        }

        Ok(Measured {
            offset: self.baseline.apply(oriented) * depth_scale,
            face_scale: reading.face_scale,
            depth_scale,
        })
    }

    /// Makes the latest reading the neutral baseline and re-centers the
    /// pointer. Ignored while calibrating.
    pub fn recenter(&mut self) -> bool {
        if self.calibration.is_active() {
            debug!("Recenter ignored during calibration");
            return false;
        }
        self.apply_recenter();
        true
    }

    fn apply_recenter(&mut self) {
        self.baseline.recenter(self.latest_offset);
        if let Some(filter) = self.offset_filter.as_mut() {
            filter.reset();
        }
        self.pointer.reseed(self.viewport.center());
        match self.latest_offset {
            Some(o) => info!("Baseline recentered to ({:.3}, {:.3})", o.x, o.y),
            None => info!("Baseline cleared; next valid frame will seed it"),
        }
    }

    /// Starts a calibration session with `variant`, or the configured default.
    /// Returns false if one is already running.
    pub fn start_calibration(&mut self, variant: Option<CalibrationVariant>) -> bool {
        if self.calibration.is_active() {
            debug!("Calibration start ignored; session already active");
            return false;
        }
        if self.latest_offset.is_some() {
            self.apply_recenter();
        } else {
            // Samples must be taken against the same baseline the result is used with.
            if self.baseline.seed_if_unset(Vec2::ZERO) {
                info!("No reading yet; calibrating against a zero baseline");
            }
            self.pointer.reseed(self.viewport.center());
        }
        let variant = variant.unwrap_or_else(|| self.calibration.default_variant());
        self.calibration.start(variant)
    }

    pub fn abandon_calibration(&mut self) {
        self.calibration.abandon();
    }

    /// New output surface size. Always re-seeds the pointer at its center.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.pointer.reseed(viewport.center());
    }

    /// Current calibrated mapping, or None while the fallback is active.
    pub fn export_mapping(&self) -> Option<Mapping> {
        self.mapping.is_calibrated().then_some(self.mapping)
    }

    /// Installs a previously exported mapping. Rejects fallback and
    /// non-finite or degenerate mappings.
    pub fn import_mapping(&mut self, mapping: Mapping) -> bool {
        if !mapping.is_calibrated() || !mapping.is_valid() {
            warn!("Rejected imported {} mapping", mapping.kind());
            return false;
        }
        self.mapping = mapping;
        info!("Imported {} mapping", mapping.kind());
        true
    }

    /// Drops calibration, baseline and pointer state back to start-up values.
    pub fn reset(&mut self) {
        self.calibration.abandon();
        self.baseline = Baseline::new();
        self.mapping = Mapping::fallback(self.config.fallback_gain);
        self.latest_offset = None;
        if let Some(filter) = self.offset_filter.as_mut() {
            filter.reset();
        }
        self.pointer.reseed(self.viewport.center());
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn baseline(&self) -> Option<Vec2> {
        self.baseline.get()
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer.value()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn depth_scale(&self) -> f32 {
        self.depth.last_scale()
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    /// Target the user should be looking at, while a session is running.
    pub fn calibration_target(&self) -> Option<&CalibrationTarget> {
        let step = match self.calibration.state() {
            CalibrationState::Warmup { step, .. } | CalibrationState::Collecting { step, .. } => step,
            _ => return None,
        };
        self.calibration.targets().get(step)
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_active()
    }

    pub fn calibration_failed(&self) -> bool {
        self.calibration.last_failed()
    }

}
