//! Strip-offset smooth scroll with exponential ease-out.
//!
//! The animator keeps a target offset and a displayed offset.  Each tick the
//! remaining distance decays by `speed`, so the strip slides quickly at first
//! and decelerates into place.  Setting a new target mid-flight simply
//! retargets; there is never more than one animation.

use crate::core::snap::ScrollCommand;

/// Distance (in strip units) below which the animation snaps to the target.
const SETTLE_DISTANCE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    offset: f64,
    target: f64,
    /// Damping: `remaining *= (1 - speed)` each tick.
    speed: f64,
}

impl ScrollAnimator {
    pub fn new(speed: f64) -> Self {
        Self {
            offset: 0.0,
            target: 0.0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.offset != self.target
    }

    /// Apply an engine command, keeping the target inside `[0, max]`.
    pub fn apply(&mut self, command: ScrollCommand, max: f64) {
        let next = match command {
            ScrollCommand::SmoothTo(x) => x,
            ScrollCommand::By(d) => self.target + d,
        };
        self.target = next.clamp(0.0, max.max(0.0));
    }

    /// Move immediately, without animating.
    pub fn jump_to(&mut self, x: f64, max: f64) {
        self.target = x.clamp(0.0, max.max(0.0));
        self.offset = self.target;
    }

    /// Re-clamp after the strip changed length.
    pub fn clamp(&mut self, max: f64) {
        let max = max.max(0.0);
        self.target = self.target.clamp(0.0, max);
        self.offset = self.offset.clamp(0.0, max);
    }

    /// Advance one frame.  Returns `true` when the displayed offset moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }
        let remaining = self.target - self.offset;
        if remaining.abs() < SETTLE_DISTANCE {
            self.offset = self.target;
        } else {
            self.offset += remaining * self.speed;
        }
        true
    }
}
