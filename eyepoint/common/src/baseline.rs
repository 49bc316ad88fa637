use glam::Vec2;

/// Neutral offset treated as "looking at screen center".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Baseline {
    neutral: Option<Vec2>,
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Vec2> {
        self.neutral
    }

    /// Replaces the baseline with `current`. With no reading yet the
    /// baseline is cleared, so the next valid frame can seed it.
    pub fn recenter(&mut self, current: Option<Vec2>) {
        self.neutral = current;
    }

    /// Seeds the baseline from `offset` if none exists. Returns true when it did.
    pub fn seed_if_unset(&mut self, offset: Vec2) -> bool {
        if self.neutral.is_some() {
            return false;
        }
        self.neutral = Some(offset);
        true
    }

    /// `offset - baseline`, treating an unset baseline as zero.
    pub fn apply(&self, offset: Vec2) -> Vec2 {
        offset - self.neutral.unwrap_or(Vec2::ZERO)
    }
}
