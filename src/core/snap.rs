//! Snap navigation: discrete section stepping driven by wheel input.
//!
//! While idle, a wheel input whose dominant axis reaches the noise threshold
//! moves the current index one section forward or back and starts a
//! cooldown.  Everything that arrives during the cooldown is dropped, so a
//! single physical gesture (which produces a burst of wheel events) moves
//! exactly one section.

use std::time::{Duration, Instant};

use super::registry::SectionRegistry;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(700);
pub const DEFAULT_NOISE_THRESHOLD: f64 = 20.0;

/// Raw wheel / gesture delta.  Positive values point forward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    pub dx: f64,
    pub dy: f64,
}

impl WheelDelta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Signed delta along whichever axis moved more.
    pub fn dominant(&self) -> f64 {
        if self.dy.abs() > self.dx.abs() {
            self.dy
        } else {
            self.dx
        }
    }
}

/// What the scroll surface should do next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    /// Animate to an absolute offset, superseding any animation in flight.
    SmoothTo(f64),
    /// Move the target by a relative amount.
    By(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapPhase {
    Idle,
    CoolingDown { until: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapConfig {
    pub cooldown: Duration,
    pub noise_threshold: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
        }
    }
}

/// Offset that brings section `index` into place: `0` for the cover,
/// otherwise the section centered in the viewport, clamped to the strip.
pub fn target_offset(registry: &SectionRegistry, index: usize) -> Option<f64> {
    if index == 0 {
        return (!registry.is_empty()).then_some(0.0);
    }
    let bounds = registry.bounds_of(index)?;
    let half_view = registry.metrics().viewport_width / 2.0;
    Some((bounds.center_x() - half_view).clamp(0.0, registry.max_scroll()))
}

/// Index whose snap target lies closest to `offset`.
pub fn nearest_index(registry: &SectionRegistry, offset: f64) -> usize {
    (0..registry.count())
        .filter_map(|i| target_offset(registry, i).map(|t| (i, (t - offset).abs())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i)
}

#[derive(Debug, Clone)]
pub struct SnapController {
    current_index: usize,
    phase: SnapPhase,
    config: SnapConfig,
}

impl SnapController {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            current_index: 0,
            phase: SnapPhase::Idle,
            config,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_cooling_down(&self) -> bool {
        matches!(self.phase, SnapPhase::CoolingDown { .. })
    }

    /// Return to idle once the cooldown has elapsed.  Returns `true` on the
    /// transition.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.phase {
            SnapPhase::CoolingDown { until } if now >= until => {
                self.phase = SnapPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Handle one wheel input.  Returns a scroll command when the index moved.
    pub fn on_wheel(
        &mut self,
        delta: WheelDelta,
        now: Instant,
        registry: &SectionRegistry,
    ) -> Option<ScrollCommand> {
        self.poll(now);
        if self.is_cooling_down() {
            tracing::trace!("snap: input discarded during cooldown");
            return None;
        }

        let amount = delta.dominant();
        if amount.abs() < self.config.noise_threshold || registry.is_empty() {
            return None;
        }

        let last = registry.count() - 1;
        let next = if amount > 0.0 {
            (self.current_index + 1).min(last)
        } else {
            self.current_index.saturating_sub(1)
        };

        self.phase = SnapPhase::CoolingDown {
            until: now + self.config.cooldown,
        };

        if next == self.current_index {
            return None;
        }
        tracing::debug!("snap: {} -> {}", self.current_index, next);
        self.current_index = next;
        target_offset(registry, next).map(ScrollCommand::SmoothTo)
    }

    /// Jump to `index` from outside the wheel path (keys, "scroll to
    /// gallery").  Always re-issues the scroll so the strip re-anchors.
    pub fn set_index(&mut self, index: usize, registry: &SectionRegistry) -> Option<ScrollCommand> {
        if registry.is_empty() {
            self.current_index = 0;
            return None;
        }
        self.current_index = index.min(registry.count() - 1);
        target_offset(registry, self.current_index).map(ScrollCommand::SmoothTo)
    }

    /// Adopt `index` without scrolling (entering snap mode mid-strip).
    pub fn sync_to(&mut self, index: usize, count: usize) {
        self.current_index = index.min(count.saturating_sub(1));
    }

    /// Keep the index valid after the registry was rebuilt.
    pub fn clamp_to(&mut self, count: usize) {
        self.current_index = self.current_index.min(count.saturating_sub(1));
    }

    /// Cancel any pending cooldown.
    pub fn reset_cooldown(&mut self) {
        self.phase = SnapPhase::Idle;
    }
}
