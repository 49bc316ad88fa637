use crate::config::{CalibrationConfig, CalibrationVariant};
use crate::error::{Axis, CalibrationError};
use crate::mapping::{AffineAxis, AffineMapping, BoundsMapping, Mapping};
use glam::Vec2;
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetKind {
    Direction(Direction),
    /// Known position in normalized screen space.
    Point(Vec2),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTarget {
    pub kind: TargetKind,
    pub prompt: String,
}

impl CalibrationTarget {
    fn direction(direction: Direction) -> Self {
        let prompt = match direction {
            Direction::Left => "Look to the far LEFT edge",
            Direction::Right => "Look to the far RIGHT edge",
            Direction::Up => "Look at the TOP edge",
            Direction::Down => "Look at the BOTTOM edge",
        };
        Self {
            kind: TargetKind::Direction(direction),
            prompt: prompt.to_string(),
        }
    }

    fn point(position: Vec2) -> Self {
        Self {
            kind: TargetKind::Point(position),
            prompt: format!(
                "Look at the dot at ({:.0}%, {:.0}%)",
                position.x * 100.0,
                position.y * 100.0
            ),
        }
    }

    /// Screen position the pointer should be shown at while this target is active.
    pub fn screen_position(&self) -> Vec2 {
        match self.kind {
            TargetKind::Direction(Direction::Left) => Vec2::new(0.0, 0.5),
            TargetKind::Direction(Direction::Right) => Vec2::new(1.0, 0.5),
            TargetKind::Direction(Direction::Up) => Vec2::new(0.5, 0.0),
            TargetKind::Direction(Direction::Down) => Vec2::new(0.5, 1.0),
            TargetKind::Point(p) => p,
        }
    }
}

/// Ordered target list for a calibration variant.
pub fn targets_for(variant: CalibrationVariant, config: &CalibrationConfig) -> Vec<CalibrationTarget> {
    match variant {
        CalibrationVariant::Directional => [
            Direction::Left,
            Direction::Right,
            Direction::Up,
            Direction::Down,
        ]
        .into_iter()
        .map(CalibrationTarget::direction)
        .collect(),
        CalibrationVariant::Grid => {
            let n = config.grid_size.max(2);
            let margin = config.grid_margin.clamp(0.0, 0.49);
            let step = (1.0 - 2.0 * margin) / (n - 1) as f32;
            let mut targets = Vec::with_capacity(n * n);
            for row in 0..n {
                for col in 0..n {
                    targets.push(CalibrationTarget::point(Vec2::new(
                        margin + col as f32 * step,
                        margin + row as f32 * step,
                    )));
                }
            }
            targets
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    Idle,
    /// Settle delay before sampling target `step`.
    Warmup { step: usize, elapsed: f32 },
    Collecting { step: usize, elapsed: f32 },
    Finalizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Collecting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProgress {
    pub step: usize,
    pub total: usize,
    pub prompt: String,
    pub phase: Phase,
    pub samples: usize,
    /// Normalized screen position of the current target.
    pub target: Vec2,
}

impl std::fmt::Display for CalibrationProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            Phase::Warmup => write!(
                f,
                "[{}/{}] {} (get ready)",
                self.step + 1,
                self.total,
                self.prompt
            ),
            Phase::Collecting => write!(
                f,
                "[{}/{}] {} ({} samples)",
                self.step + 1,
                self.total,
                self.prompt,
                self.samples
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationEvent {
    Progress(CalibrationProgress),
    Completed(Mapping),
    Failed(CalibrationError),
}

/// Runs one calibration session at a time and turns its samples into a mapping.
#[derive(Debug, Clone)]
pub struct CalibrationController {
    config: CalibrationConfig,
    state: CalibrationState,
    variant: CalibrationVariant,
    targets: Vec<CalibrationTarget>,
    samples: Vec<Vec2>,
    averages: Vec<Option<Vec2>>,
    last_failed: bool,
}

impl CalibrationController {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            variant: config.variant,
            config,
            state: CalibrationState::Idle,
            targets: Vec::new(),
            samples: Vec::new(),
            averages: Vec::new(),
            last_failed: false,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, CalibrationState::Idle)
    }

    /// Whether the most recent session ended without producing a mapping.
    pub fn last_failed(&self) -> bool {
        self.last_failed
    }

    pub fn variant(&self) -> CalibrationVariant {
        self.variant
    }

    pub fn targets(&self) -> &[CalibrationTarget] {
        &self.targets
    }

    pub fn default_variant(&self) -> CalibrationVariant {
        self.config.variant
    }

    /// Begins a session. Ignored (returns false) while one is running.
    pub fn start(&mut self, variant: CalibrationVariant) -> bool {
        if self.is_active() {
            debug!("Calibration already running; start request ignored");
            return false;
        }

        self.variant = variant;
        self.targets = targets_for(variant, &self.config);
        self.samples.clear();
        self.averages = vec![None; self.targets.len()];
        self.last_failed = false;
        self.state = CalibrationState::Warmup {
            step: 0,
            elapsed: 0.0,
        };
        info!(
            "Calibration started ({:?}, {} targets)",
            variant,
            self.targets.len()
        );
        true
    }

    /// Drops the running session without touching the current mapping.
    pub fn abandon(&mut self) {
        if self.is_active() {
            info!("Calibration abandoned");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = CalibrationState::Idle;
        self.samples.clear();
    }

    /// Advances timers by `dt` seconds and records `sample` when collecting.
    ///
    /// `sample` is the baseline-relative, depth-scaled offset of this frame, or
    /// None when the frame was skipped. `current` is the mapping in effect,
    /// used to fill directional targets that received no samples.
    pub fn advance(&mut self, dt: f32, sample: Option<Vec2>, current: &Mapping) -> Option<CalibrationEvent> {
        let dt_ms = dt.max(0.0) * 1000.0;

        match self.state {
            CalibrationState::Idle | CalibrationState::Finalizing => None,
            CalibrationState::Warmup { step, elapsed } => {
                let elapsed = elapsed + dt_ms;
                if elapsed >= self.config.warmup_ms {
                    self.samples.clear();
                    self.state = CalibrationState::Collecting { step, elapsed: 0.0 };
                    Some(self.progress(step, Phase::Collecting))
                } else {
                    self.state = CalibrationState::Warmup { step, elapsed };
                    Some(self.progress(step, Phase::Warmup))
                }
            }
            CalibrationState::Collecting { step, elapsed } => {
                let elapsed = elapsed + dt_ms;
                if let Some(s) = sample.filter(|s| s.is_finite()) {
                    self.samples.push(s);
                }

                if self.collection_done(elapsed) {
                    self.averages[step] = mean(&self.samples);
                    debug!(
                        "Target {} collected {} samples, mean {:?}",
                        step,
                        self.samples.len(),
                        self.averages[step]
                    );
                    self.samples.clear();

                    let next = step + 1;
                    if next < self.targets.len() {
                        self.state = CalibrationState::Warmup {
                            step: next,
                            elapsed: 0.0,
                        };
                        Some(self.progress(next, Phase::Warmup))
                    } else {
                        self.state = CalibrationState::Finalizing;
                        Some(self.finalize(current))
                    }
                } else {
                    self.state = CalibrationState::Collecting { step, elapsed };
                    Some(self.progress(step, Phase::Collecting))
                }
            }
        }
    }

    fn collection_done(&self, elapsed_ms: f32) -> bool {
        match self.variant {
            CalibrationVariant::Directional => elapsed_ms >= self.config.collect_ms,
            CalibrationVariant::Grid => {
                self.samples.len() >= self.config.grid_samples.max(1)
                    || elapsed_ms >= self.config.grid_timeout_ms
            }
        }
    }

    fn progress(&self, step: usize, phase: Phase) -> CalibrationEvent {
        let target = &self.targets[step];
        CalibrationEvent::Progress(CalibrationProgress {
            step,
            total: self.targets.len(),
            prompt: target.prompt.clone(),
            phase,
            samples: self.samples.len(),
            target: target.screen_position(),
        })
    }

    fn finalize(&mut self, current: &Mapping) -> CalibrationEvent {
        let result = match self.variant {
            CalibrationVariant::Directional => Ok(self.solve_bounds(current)),
            CalibrationVariant::Grid => self.solve_affine(),
        };
        self.reset();

        match result {
            Ok(mapping) => {
                info!("Calibration complete: {:?}", mapping);
                self.last_failed = false;
                CalibrationEvent::Completed(mapping)
            }
            Err(e) => {
                warn!("Calibration failed: {}", e);
                self.last_failed = true;
                CalibrationEvent::Failed(e)
            }
        }
    }

    fn solve_bounds(&self, current: &Mapping) -> Mapping {
        let prior = match current {
            Mapping::Bounds(b) => *b,
            _ => BoundsMapping::default(),
        };

        let average = |dir: Direction| -> Option<Vec2> {
            self.targets
                .iter()
                .zip(&self.averages)
                .find(|(t, _)| t.kind == TargetKind::Direction(dir))
                .and_then(|(_, avg)| *avg)
        };

        let left = average(Direction::Left).map_or(prior.min_x, |v| v.x);
        let right = average(Direction::Right).map_or(prior.max_x, |v| v.x);
        let up = average(Direction::Up).map_or(prior.min_y, |v| v.y);
        let down = average(Direction::Down).map_or(prior.max_y, |v| v.y);

        let floor_x = self.config.min_extent_x.abs();
        let floor_y = self.config.min_extent_y.abs();

        Mapping::Bounds(BoundsMapping {
            min_x: left.min(-floor_x),
            max_x: right.max(floor_x),
            min_y: up.min(-floor_y),
            max_y: down.max(floor_y),
        })
    }

    fn solve_affine(&self) -> Result<Mapping, CalibrationError> {
        let mut xs = Vec::with_capacity(self.targets.len());
        let mut ys = Vec::with_capacity(self.targets.len());

        for (target, avg) in self.targets.iter().zip(&self.averages) {
            if let (TargetKind::Point(screen), Some(raw)) = (target.kind, avg) {
                xs.push((raw.x, screen.x));
                ys.push((raw.y, screen.y));
            }
        }

        Ok(Mapping::Affine(AffineMapping {
            x: AffineAxis::fit(Axis::X, &xs, self.config.min_spread)?,
            y: AffineAxis::fit(Axis::Y, &ys, self.config.min_spread)?,
        }))
    }
}

fn mean(samples: &[Vec2]) -> Option<Vec2> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().copied().sum::<Vec2>() / samples.len() as f32)
}
