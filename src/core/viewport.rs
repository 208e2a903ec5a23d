//! The viewport engine: one instance per mounted strip.
//!
//! Owns the section registry and every tracker built on top of it, and is
//! the only place that knows how they are wired to the overlap observer.
//! Lifecycle:
//!
//! * [`mount`](ViewportEngine::mount) builds the registry and attaches;
//! * a new photo collection or layout change detaches *first*, rebuilds, then
//!   re-attaches, so no callback ever runs against a stale section;
//! * [`unmount`](ViewportEngine::unmount) detaches and empties everything.

use std::sync::Arc;
use std::time::Instant;

use super::center::{CenterTracker, InputProfile};
use super::geometry::Bounds;
use super::observer::{FrameOverlapObserver, OverlapObserver};
use super::photo::Photo;
use super::progress::{HeaderTransform, ProgressBroadcaster};
use super::registry::{LayoutMode, SectionId, SectionRegistry, StripMetrics};
use super::reveal::{RevealState, RevealTracker, DEFAULT_REVEAL_MARGIN};
use super::snap::{self, ScrollCommand, SnapConfig, SnapController, WheelDelta};

/// Multiplier applied to vertical wheel input in free-scroll mode.
const FREE_SCROLL_GAIN: f64 = 1.5;

/// Tuning knobs for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub snap_navigation: bool,
    pub snap: SnapConfig,
    pub reveal_margin: f64,
    pub input_profile: InputProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_navigation: false,
            snap: SnapConfig::default(),
            reveal_margin: DEFAULT_REVEAL_MARGIN,
            input_profile: InputProfile::Pointer,
        }
    }
}

/// What changed while draining observer entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineUpdate {
    pub revealed: Vec<SectionId>,
    pub centered_changed: bool,
}

impl EngineUpdate {
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty() && !self.centered_changed
    }
}

pub struct ViewportEngine<O: OverlapObserver> {
    observer: O,
    config: EngineConfig,
    photos: Arc<Vec<Photo>>,
    registry: SectionRegistry,
    reveal: RevealTracker,
    center: CenterTracker,
    progress: ProgressBroadcaster,
    snap: SnapController,
    scroll_offset: f64,
    attached: bool,
}

impl<O: OverlapObserver> ViewportEngine<O> {
    pub fn new(observer: O, config: EngineConfig) -> Self {
        Self {
            observer,
            reveal: RevealTracker::new(config.reveal_margin),
            center: CenterTracker::new(config.input_profile),
            progress: ProgressBroadcaster::new(),
            snap: SnapController::new(config.snap),
            config,
            photos: Arc::new(Vec::new()),
            registry: SectionRegistry::empty(),
            scroll_offset: 0.0,
            attached: false,
        }
    }

    // ── lifecycle ───────────────────────────────────────────────

    /// Build the registry for `photos` and start observing.
    pub fn mount(&mut self, photos: Arc<Vec<Photo>>, mode: LayoutMode, metrics: StripMetrics) {
        self.detach();
        self.reveal.reset();
        self.photos = photos;
        self.rebuild(mode, metrics);
        self.attach();
    }

    /// Tear everything down.  The engine can be mounted again afterwards.
    pub fn unmount(&mut self) {
        self.detach();
        self.reveal.reset();
        self.photos = Arc::new(Vec::new());
        self.registry = SectionRegistry::empty();
        self.center.retain_valid(&self.registry);
        self.snap.clamp_to(0);
        tracing::debug!("viewport: unmounted");
    }

    /// Replace the collection.  A different collection is a remount: the
    /// revealed set starts over.  The same `Arc` is a no-op.
    pub fn set_photos(&mut self, photos: Arc<Vec<Photo>>) {
        if Arc::ptr_eq(&self.photos, &photos) {
            return;
        }
        let mode = self.registry.layout_mode();
        let metrics = self.registry.metrics();
        self.mount(photos, mode, metrics);
    }

    /// React to a resize.  Rebuilds only when the layout actually changed;
    /// the revealed set survives.
    pub fn set_layout(&mut self, mode: LayoutMode, metrics: StripMetrics) {
        if mode == self.registry.layout_mode() && metrics == self.registry.metrics() {
            return;
        }
        self.detach();
        self.rebuild(mode, metrics);
        self.attach();
    }

    /// Change the center band width.
    pub fn set_input_profile(&mut self, profile: InputProfile) {
        if profile == self.center.profile() {
            return;
        }
        self.config.input_profile = profile;
        if self.attached {
            self.center
                .set_profile(profile, &self.registry, &mut self.observer);
        } else {
            self.center = CenterTracker::new(profile);
        }
    }

    /// Toggle snap mode.  Entering snap mode adopts the section nearest
    /// the current offset so the next step starts from where the user is.
    pub fn set_snap_navigation(&mut self, enabled: bool) {
        self.config.snap_navigation = enabled;
        self.snap.reset_cooldown();
        if enabled {
            let index = snap::nearest_index(&self.registry, self.scroll_offset);
            self.snap.sync_to(index, self.registry.count());
        }
    }

    fn rebuild(&mut self, mode: LayoutMode, metrics: StripMetrics) {
        self.registry = SectionRegistry::build(&self.photos, mode, metrics);
        self.center.retain_valid(&self.registry);
        self.snap.clamp_to(self.registry.count());
        tracing::debug!(
            "viewport: registry rebuilt ({} sections, {:?}, {:.0}x{:.0})",
            self.registry.count(),
            mode,
            metrics.viewport_width,
            metrics.viewport_height,
        );
    }

    fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.reveal.attach(&self.registry, &mut self.observer);
        self.center.attach(&self.registry, &mut self.observer);
        self.attached = true;
        tracing::debug!(
            "viewport: attached ({} awaiting reveal)",
            self.reveal.pending()
        );
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.reveal.detach(&mut self.observer);
        self.center.detach(&mut self.observer);
        self.snap.reset_cooldown();
        self.attached = false;
    }

    // ── events ──────────────────────────────────────────────────

    /// Apply overlap entries the observer has pushed since the last call.
    pub fn pump(&mut self) -> EngineUpdate {
        EngineUpdate {
            revealed: self.reveal.drain(&self.registry, &mut self.observer),
            centered_changed: self.center.drain(&self.registry),
        }
    }

    /// The scroll offset changed (user scroll or animation step).
    /// Returns the new progress when it changed.
    pub fn on_scroll(&mut self, offset: f64) -> Option<f64> {
        self.scroll_offset = offset;
        self.progress.update(offset, self.registry.cover_width())
    }

    /// Route a wheel input.  In snap mode it may step one section; in free
    /// mode it becomes a relative scroll.
    pub fn on_wheel(&mut self, delta: WheelDelta, now: Instant) -> Option<ScrollCommand> {
        if self.snap_active() {
            return self.snap.on_wheel(delta, now, &self.registry);
        }
        let amount = if delta.dy.abs() > delta.dx.abs() {
            delta.dy * FREE_SCROLL_GAIN
        } else {
            delta.dx
        };
        (amount != 0.0).then_some(ScrollCommand::By(amount))
    }

    /// Step one section from a key press.  Keys bypass the noise threshold
    /// and cooldown; each press is a deliberate step.
    pub fn step(&mut self, forward: bool) -> Option<ScrollCommand> {
        let current = if self.snap_active() {
            self.snap.current_index()
        } else {
            snap::nearest_index(&self.registry, self.scroll_offset)
        };
        let next = if forward {
            current + 1
        } else {
            current.saturating_sub(1)
        };
        self.scroll_to_index(next)
    }

    /// Externally requested jump (e.g. "scroll to gallery").
    pub fn scroll_to_index(&mut self, index: usize) -> Option<ScrollCommand> {
        self.snap.set_index(index, &self.registry)
    }

    /// Advance timers.
    pub fn tick(&mut self, now: Instant) {
        if self.snap.poll(now) {
            tracing::trace!("snap: cooldown over");
        }
    }

    // ── read side ───────────────────────────────────────────────

    /// Current viewport in strip coordinates.
    pub fn viewport_bounds(&self) -> Bounds {
        let m = self.registry.metrics();
        Bounds::new(self.scroll_offset, 0.0, m.viewport_width, m.viewport_height)
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn photos(&self) -> &Arc<Vec<Photo>> {
        &self.photos
    }

    pub fn reveal_state(&self, id: &SectionId) -> RevealState {
        self.reveal.state(id)
    }

    pub fn revealed_count(&self) -> usize {
        self.reveal.revealed_count()
    }

    pub fn centered(&self) -> Option<&SectionId> {
        self.center.centered()
    }

    /// Whether the centered section should be drawn emphasised.  Narrow
    /// layouts suppress the emphasis.
    pub fn emphasis_enabled(&self) -> bool {
        self.registry.layout_mode() == LayoutMode::Wide
    }

    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    pub fn header(&self) -> HeaderTransform {
        HeaderTransform::from_progress(self.progress())
    }

    /// Snap navigation is configured and the layout allows it.
    pub fn snap_active(&self) -> bool {
        self.config.snap_navigation && self.registry.layout_mode() == LayoutMode::Wide
    }

    pub fn snap_index(&self) -> usize {
        self.snap.current_index()
    }

    pub fn snap_cooling_down(&self) -> bool {
        self.snap.is_cooling_down()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }
}

impl ViewportEngine<FrameOverlapObserver> {
    /// Measure the current layout and apply whatever crossed a checkpoint.
    pub fn frame(&mut self) -> EngineUpdate {
        let viewport = self.viewport_bounds();
        self.observer.on_frame(&self.registry, &viewport);
        self.pump()
    }

    pub fn subscription_count(&self) -> usize {
        self.observer.subscription_count()
    }
}
