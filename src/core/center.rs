//! Center determination: which single section sits nearest the midline.
//!
//! Every section is observed against a narrow vertical band around the
//! viewport's center.  The section with the largest overlap ratio inside the
//! band is the centered one, subject to two stabilising rules:
//!
//! * only a strictly larger ratio displaces the held candidate, so an exact
//!   tie never flips the result;
//! * a ratio must exceed [`MIN_SIGNIFICANT_RATIO`] before a new section can
//!   become centered.
//!
//! When no section overlaps the band at all, nothing is centered.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::geometry::{Length, RootMargin, Thresholds};
use super::observer::{ObserveOptions, OverlapEntry, OverlapObserver, SubscriptionHandle};
use super::registry::{SectionId, SectionRegistry};

/// A candidate needs strictly more than this overlap to take the center.
pub const MIN_SIGNIFICANT_RATIO: f64 = 0.1;
/// Ratio checkpoints: quarter steps.
pub const CHECKPOINT_STEPS: usize = 4;

/// Primary input device, which decides how wide the center band is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputProfile {
    /// Mouse / trackpad: the central 20% of the viewport.
    #[default]
    Pointer,
    /// Touch-primary: the central 30%, since touch is harder to center.
    Touch,
}

impl InputProfile {
    /// Inset applied to each horizontal edge of the viewport.
    pub fn band_inset(self) -> f64 {
        match self {
            InputProfile::Pointer => 0.40,
            InputProfile::Touch => 0.35,
        }
    }

    pub fn band_margin(self) -> RootMargin {
        RootMargin::horizontal(Length::Percent(-self.band_inset()))
    }
}

pub struct CenterTracker {
    centered: Option<SectionId>,
    /// Sections currently overlapping the band, in first-observed order.
    overlaps: Vec<(SectionId, f64)>,
    watching: HashMap<SubscriptionHandle, SectionId>,
    profile: InputProfile,
    tx: mpsc::UnboundedSender<OverlapEntry>,
    rx: mpsc::UnboundedReceiver<OverlapEntry>,
}

impl CenterTracker {
    pub fn new(profile: InputProfile) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            centered: None,
            overlaps: Vec::new(),
            watching: HashMap::new(),
            profile,
            tx,
            rx,
        }
    }

    fn options(&self) -> ObserveOptions {
        ObserveOptions {
            margin: self.profile.band_margin(),
            thresholds: Thresholds::steps(CHECKPOINT_STEPS),
        }
    }

    pub fn profile(&self) -> InputProfile {
        self.profile
    }

    /// Subscribe every laid-out section.  An empty registry subscribes
    /// nothing and leaves nothing centered.
    pub fn attach(&mut self, registry: &SectionRegistry, observer: &mut impl OverlapObserver) {
        if registry.is_empty() {
            self.centered = None;
            self.overlaps.clear();
            return;
        }
        for section in registry.sections() {
            if section.bounds.is_empty() {
                continue;
            }
            let handle = observer.subscribe(section.id.clone(), self.options(), self.tx.clone());
            self.watching.insert(handle, section.id.clone());
        }
        let watching = &self.watching;
        self.overlaps.retain(|(id, _)| watching.values().any(|w| w == id));
    }

    /// Unsubscribe everything and forget the measured ratios, except the
    /// held section's: it keeps defending ties until its own entry arrives.
    pub fn detach(&mut self, observer: &mut impl OverlapObserver) {
        for (handle, _) in self.watching.drain() {
            observer.unsubscribe(handle);
        }
        while self.rx.try_recv().is_ok() {}
        let held = &self.centered;
        self.overlaps.retain(|(id, _)| held.as_ref() == Some(id));
    }

    /// Drop a held id that is no longer in `registry`.
    pub fn retain_valid(&mut self, registry: &SectionRegistry) {
        if let Some(id) = &self.centered {
            if !registry.contains(id) {
                tracing::debug!("center: clearing stale {id}");
                self.centered = None;
            }
        }
        self.overlaps.retain(|(id, _)| registry.contains(id));
    }

    /// Switch band width.  Re-subscribes so the next entries are measured
    /// against the new band; the held id stays until they arrive.
    pub fn set_profile(
        &mut self,
        profile: InputProfile,
        registry: &SectionRegistry,
        observer: &mut impl OverlapObserver,
    ) {
        if profile == self.profile {
            return;
        }
        self.detach(observer);
        self.profile = profile;
        self.attach(registry, observer);
    }

    /// Apply queued entries.  Returns `true` when the centered id changed.
    pub fn drain(&mut self, registry: &SectionRegistry) -> bool {
        let before = self.centered.clone();
        while let Ok(entry) = self.rx.try_recv() {
            self.apply(&entry, registry);
        }
        before != self.centered
    }

    fn apply(&mut self, entry: &OverlapEntry, registry: &SectionRegistry) {
        if !self.watching.contains_key(&entry.handle) || !registry.contains(&entry.target) {
            return;
        }

        let ratio = if entry.is_intersecting { entry.ratio.max(0.0) } else { 0.0 };
        match self.overlaps.iter().position(|(id, _)| *id == entry.target) {
            Some(i) if ratio > 0.0 => self.overlaps[i].1 = ratio,
            Some(i) => {
                self.overlaps.remove(i);
            }
            None if ratio > 0.0 => self.overlaps.push((entry.target.clone(), ratio)),
            None => {}
        }

        self.recompute();
    }

    fn recompute(&mut self) {
        let held = self.centered.as_ref().and_then(|id| {
            self.overlaps
                .iter()
                .find(|(o, _)| o == id)
                .map(|(o, r)| (o, *r))
        });

        // Equal ratios never displace the held id, wherever it sits in the
        // list; after a re-subscribe its entry may arrive last.
        let mut best: Option<(&SectionId, f64)> = None;
        for (id, ratio) in &self.overlaps {
            let wins = match best {
                None => true,
                Some((_, b)) => *ratio > b || (*ratio == b && self.centered.as_ref() == Some(id)),
            };
            if wins {
                best = Some((id, *ratio));
            }
        }

        let next = match best {
            None => None,
            Some((id, ratio)) if ratio > MIN_SIGNIFICANT_RATIO => Some(id.clone()),
            // Only insignificant overlaps: keep the held id while it lasts.
            Some(_) => held.map(|(id, _)| id.clone()),
        };

        if next != self.centered {
            tracing::debug!(
                "center: {} -> {}",
                self.centered.as_ref().map_or("none".into(), |i| i.to_string()),
                next.as_ref().map_or("none".into(), |i| i.to_string()),
            );
            self.centered = next;
        }
    }

    pub fn centered(&self) -> Option<&SectionId> {
        self.centered.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Bounds;
    use crate::core::observer::{FrameOverlapObserver, OverlapSink};
    use crate::core::photo::Photo;
    use crate::core::registry::{LayoutMode, StripMetrics};

    /// Observer that records subscriptions so tests can push entries by hand.
    #[derive(Default)]
    struct Scripted {
        subs: Vec<(SubscriptionHandle, SectionId, OverlapSink)>,
        inner: FrameOverlapObserver,
    }

    impl OverlapObserver for Scripted {
        fn subscribe(
            &mut self,
            target: SectionId,
            options: ObserveOptions,
            sink: OverlapSink,
        ) -> SubscriptionHandle {
            // Borrow real handles from the frame observer so they stay unique.
            let handle = self.inner.subscribe(target.clone(), options, sink.clone());
            self.subs.push((handle, target, sink));
            handle
        }

        fn unsubscribe(&mut self, handle: SubscriptionHandle) {
            self.inner.unsubscribe(handle);
            self.subs.retain(|(h, _, _)| *h != handle);
        }
    }

    impl Scripted {
        fn report(&self, target: &SectionId, ratio: f64) {
            let (handle, _, sink) = self
                .subs
                .iter()
                .find(|(_, t, _)| t == target)
                .expect("target subscribed");
            sink.send(OverlapEntry {
                handle: *handle,
                target: target.clone(),
                ratio,
                is_intersecting: ratio > 0.0,
            })
            .expect("tracker alive");
        }
    }

    fn registry(ids: &[&str]) -> SectionRegistry {
        let photos: Vec<Photo> = ids.iter().map(|id| Photo::new(*id, "x.jpg", *id)).collect();
        SectionRegistry::build(
            &photos,
            LayoutMode::Wide,
            StripMetrics {
                viewport_width: 1000.0,
                viewport_height: 600.0,
            },
        )
    }

    fn a() -> SectionId {
        SectionId::photo("a")
    }

    fn b() -> SectionId {
        SectionId::photo("b")
    }

    fn setup() -> (SectionRegistry, Scripted, CenterTracker) {
        let reg = registry(&["a", "b", "c"]);
        let mut obs = Scripted::default();
        let mut tracker = CenterTracker::new(InputProfile::Pointer);
        tracker.attach(&reg, &mut obs);
        (reg, obs, tracker)
    }

    #[test]
    fn equal_ratio_keeps_the_held_section() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&a(), 0.40);
        assert!(tracker.drain(&reg));
        assert_eq!(tracker.centered(), Some(&a()));

        obs.report(&b(), 0.40);
        assert!(!tracker.drain(&reg));
        assert_eq!(tracker.centered(), Some(&a()));
    }

    #[test]
    fn strictly_larger_ratio_takes_over() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&a(), 0.40);
        obs.report(&b(), 0.50);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&b()));
    }

    #[test]
    fn insignificant_overlap_does_not_center() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&a(), 0.10);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), None);
    }

    #[test]
    fn held_section_survives_while_only_insignificant_overlap_remains() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&a(), 0.50);
        tracker.drain(&reg);
        obs.report(&a(), 0.05);
        obs.report(&b(), 0.08);
        tracker.drain(&reg);
        // b is larger but not significant; a still overlaps.
        assert_eq!(tracker.centered(), Some(&a()));
    }

    #[test]
    fn leaving_the_band_clears_the_center() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&a(), 0.75);
        tracker.drain(&reg);
        obs.report(&a(), 0.0);
        assert!(tracker.drain(&reg));
        assert_eq!(tracker.centered(), None);
    }

    #[test]
    fn first_observed_wins_among_new_equals() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&b(), 0.30);
        obs.report(&a(), 0.30);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&b()));
    }

    #[test]
    fn centered_is_always_a_registered_id() {
        let (reg, obs, mut tracker) = setup();
        obs.report(&b(), 0.9);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&b()));

        let smaller = registry(&["a"]);
        tracker.retain_valid(&smaller);
        assert_eq!(tracker.centered(), None);

        // Late entries for the removed section are ignored.
        obs.report(&b(), 1.0);
        tracker.drain(&smaller);
        assert_eq!(tracker.centered(), None);
    }

    #[test]
    fn empty_registry_subscribes_nothing() {
        let reg = SectionRegistry::empty();
        let mut obs = Scripted::default();
        let mut tracker = CenterTracker::new(InputProfile::Pointer);
        tracker.attach(&reg, &mut obs);
        assert!(obs.subs.is_empty());
        assert!(!tracker.drain(&reg));
        assert_eq!(tracker.centered(), None);
    }

    #[test]
    fn band_switch_keeps_held_section_on_tie() {
        let (reg, mut obs, mut tracker) = setup();
        obs.report(&b(), 0.40);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&b()));

        tracker.set_profile(InputProfile::Touch, &reg, &mut obs);
        // Re-measured entries arrive in registry order: a before b.
        obs.report(&a(), 0.40);
        obs.report(&b(), 0.40);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&b()));
    }

    #[test]
    fn layout_rebuild_keeps_held_section_on_tie() {
        let (reg, mut obs, mut tracker) = setup();
        obs.report(&b(), 0.40);
        tracker.drain(&reg);

        // Same sequence the engine runs on resize.
        tracker.detach(&mut obs);
        let rebuilt = registry(&["a", "b", "c"]);
        tracker.retain_valid(&rebuilt);
        tracker.attach(&rebuilt, &mut obs);
        assert_eq!(tracker.centered(), Some(&b()));

        obs.report(&a(), 0.40);
        assert!(!tracker.drain(&rebuilt));
        obs.report(&b(), 0.40);
        tracker.drain(&rebuilt);
        assert_eq!(tracker.centered(), Some(&b()));

        // A strictly larger fresh ratio still takes over.
        obs.report(&a(), 0.50);
        tracker.drain(&rebuilt);
        assert_eq!(tracker.centered(), Some(&a()));
    }

    #[test]
    fn band_switch_reevaluates_on_next_entry() {
        let reg = registry(&["a", "b"]);
        let mut obs = FrameOverlapObserver::new();
        let mut tracker = CenterTracker::new(InputProfile::Pointer);
        tracker.attach(&reg, &mut obs);

        // Photo "a" spans 1200..1650; center a 1000-wide viewport on it.
        let viewport = Bounds::new(925.0, 0.0, 1000.0, 600.0);
        obs.on_frame(&reg, &viewport);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&a()));

        tracker.set_profile(InputProfile::Touch, &reg, &mut obs);
        assert_eq!(tracker.profile(), InputProfile::Touch);
        assert_eq!(tracker.centered(), Some(&a()));

        obs.on_frame(&reg, &viewport);
        tracker.drain(&reg);
        assert_eq!(tracker.centered(), Some(&a()));
    }
}
