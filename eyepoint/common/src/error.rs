use thiserror::Error;

/// Reasons a single frame is skipped. All of them are recovered by waiting
/// for the next detection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("no face detected")]
    NoFaceDetected,
    #[error("landmark anchor missing: {0}")]
    IncompleteLandmarks(&'static str),
    #[error("eye socket has zero width or height")]
    DegenerateEyeSocket,
    #[error("face scale {0} is too small to estimate distance")]
    DegenerateFaceScale(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => f.write_str("horizontal"),
            Self::Y => f.write_str("vertical"),
        }
    }
}

/// A calibration attempt that could not produce a mapping. The previous
/// mapping stays active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("{axis} gaze offsets spread only {spread:.4} across targets; look further toward each dot")]
    DegenerateCalibration { axis: Axis, spread: f32 },
    #[error("only {found} {axis} target(s) produced samples; at least 2 are needed")]
    InsufficientTargets { axis: Axis, found: usize },
}
