//! One-shot reveal tracking.
//!
//! Each section starts hidden.  The first time it comes within the reveal
//! margin of the viewport it flips to revealed, its subscription is dropped,
//! and it is never tracked again.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;

use super::geometry::{Length, RootMargin, Thresholds};
use super::observer::{ObserveOptions, OverlapEntry, OverlapObserver, SubscriptionHandle};
use super::registry::{SectionId, SectionRegistry};

/// Distance beyond the viewport edges at which reveal fires.
pub const DEFAULT_REVEAL_MARGIN: f64 = 200.0;
/// Minimum overlap ratio with the expanded window that counts as "near".
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Visual state of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

pub struct RevealTracker {
    revealed: HashSet<SectionId>,
    watching: HashMap<SubscriptionHandle, SectionId>,
    margin: f64,
    tx: mpsc::UnboundedSender<OverlapEntry>,
    rx: mpsc::UnboundedReceiver<OverlapEntry>,
}

impl RevealTracker {
    pub fn new(margin: f64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            revealed: HashSet::new(),
            watching: HashMap::new(),
            margin: margin.max(0.0),
            tx,
            rx,
        }
    }

    fn options(&self) -> ObserveOptions {
        ObserveOptions {
            margin: RootMargin::horizontal(Length::Units(self.margin)),
            thresholds: Thresholds::single(REVEAL_THRESHOLD),
        }
    }

    /// Subscribe every section that is laid out and not yet revealed.
    pub fn attach(&mut self, registry: &SectionRegistry, observer: &mut impl OverlapObserver) {
        for section in registry.sections() {
            if self.revealed.contains(&section.id) || section.bounds.is_empty() {
                continue;
            }
            let handle = observer.subscribe(section.id.clone(), self.options(), self.tx.clone());
            self.watching.insert(handle, section.id.clone());
        }
        tracing::debug!(
            "reveal: watching {} of {} sections",
            self.watching.len(),
            registry.count()
        );
    }

    /// Drop every subscription and discard entries already queued for them.
    pub fn detach(&mut self, observer: &mut impl OverlapObserver) {
        for (handle, _) in self.watching.drain() {
            observer.unsubscribe(handle);
        }
        while self.rx.try_recv().is_ok() {}
    }

    /// Forget every revealed id.  Only valid on remount.
    pub fn reset(&mut self) {
        self.revealed.clear();
    }

    /// Apply queued entries; returns the ids revealed by this call.
    pub fn drain(
        &mut self,
        registry: &SectionRegistry,
        observer: &mut impl OverlapObserver,
    ) -> Vec<SectionId> {
        let mut newly = Vec::new();
        while let Ok(entry) = self.rx.try_recv() {
            if let Some(id) = self.apply(&entry, registry, observer) {
                newly.push(id);
            }
        }
        newly
    }

    fn apply(
        &mut self,
        entry: &OverlapEntry,
        registry: &SectionRegistry,
        observer: &mut impl OverlapObserver,
    ) -> Option<SectionId> {
        // Stale: unsubscribed, or the section left the registry.
        if !self.watching.contains_key(&entry.handle) || !registry.contains(&entry.target) {
            return None;
        }
        if !entry.is_intersecting || entry.ratio < REVEAL_THRESHOLD {
            return None;
        }

        self.watching.remove(&entry.handle);
        observer.unsubscribe(entry.handle);
        if self.revealed.insert(entry.target.clone()) {
            tracing::debug!("reveal: {} (ratio {:.2})", entry.target, entry.ratio);
            Some(entry.target.clone())
        } else {
            None
        }
    }

    pub fn state(&self, id: &SectionId) -> RevealState {
        if self.revealed.contains(id) {
            RevealState::Revealed
        } else {
            RevealState::Hidden
        }
    }

    pub fn is_revealed(&self, id: &SectionId) -> bool {
        self.revealed.contains(id)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Number of sections still being tracked.
    pub fn pending(&self) -> usize {
        self.watching.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Bounds;
    use crate::core::observer::FrameOverlapObserver;
    use crate::core::photo::Photo;
    use crate::core::registry::{LayoutMode, StripMetrics};

    fn registry(n: usize) -> SectionRegistry {
        let photos: Vec<Photo> = (1..=n)
            .map(|i| Photo::new(i.to_string(), format!("{i}.jpg"), format!("P{i}")))
            .collect();
        SectionRegistry::build(
            &photos,
            LayoutMode::Wide,
            StripMetrics {
                viewport_width: 1000.0,
                viewport_height: 600.0,
            },
        )
    }

    fn viewport(x: f64) -> Bounds {
        Bounds::new(x, 0.0, 1000.0, 600.0)
    }

    #[test]
    fn margin_reveals_ahead_of_the_viewport() {
        let reg = registry(3);
        let mut obs = FrameOverlapObserver::new();
        let mut tracker = RevealTracker::new(DEFAULT_REVEAL_MARGIN);
        tracker.attach(&reg, &mut obs);
        assert_eq!(tracker.pending(), 4);

        obs.on_frame(&reg, &viewport(0.0));
        let newly = tracker.drain(&reg, &mut obs);
        assert_eq!(newly, vec![SectionId::Cover]);

        // Photo 1 starts at 1200.  A viewport ending at 1050 plus the 200
        // margin reaches 1250, covering 50 of its 450 units (11%).
        obs.on_frame(&reg, &viewport(50.0));
        let newly = tracker.drain(&reg, &mut obs);
        assert_eq!(newly, vec![SectionId::photo("1")]);
        assert_eq!(tracker.state(&SectionId::photo("1")), RevealState::Revealed);
        assert_eq!(tracker.state(&SectionId::photo("2")), RevealState::Hidden);
    }

    #[test]
    fn revealed_sections_stop_being_observed() {
        let reg = registry(2);
        let mut obs = FrameOverlapObserver::new();
        let mut tracker = RevealTracker::new(DEFAULT_REVEAL_MARGIN);
        tracker.attach(&reg, &mut obs);
        obs.on_frame(&reg, &viewport(0.0));
        tracker.drain(&reg, &mut obs);
        assert_eq!(obs.subscription_count(), 2);
        assert_eq!(tracker.pending(), 2);
    }

    #[test]
    fn revealed_set_never_shrinks() {
        let reg = registry(4);
        let mut obs = FrameOverlapObserver::new();
        let mut tracker = RevealTracker::new(DEFAULT_REVEAL_MARGIN);
        tracker.attach(&reg, &mut obs);

        let mut last = 0;
        for x in [0.0, 900.0, 2500.0, 0.0, 4000.0, 100.0, 0.0] {
            obs.on_frame(&reg, &viewport(x));
            tracker.drain(&reg, &mut obs);
            assert!(tracker.revealed_count() >= last);
            last = tracker.revealed_count();
        }
        assert!(tracker.is_revealed(&SectionId::Cover));
    }

    #[test]
    fn reattach_skips_revealed_sections() {
        let reg = registry(2);
        let mut obs = FrameOverlapObserver::new();
        let mut tracker = RevealTracker::new(DEFAULT_REVEAL_MARGIN);
        tracker.attach(&reg, &mut obs);
        obs.on_frame(&reg, &viewport(0.0));
        tracker.drain(&reg, &mut obs);

        tracker.detach(&mut obs);
        assert_eq!(obs.subscription_count(), 0);
        tracker.attach(&reg, &mut obs);
        assert_eq!(tracker.pending(), 2);
        assert!(tracker.is_revealed(&SectionId::Cover));
    }

    #[test]
    fn entries_for_removed_sections_are_ignored() {
        let reg = registry(2);
        let smaller = registry(1);
        let mut obs = FrameOverlapObserver::new();
        let mut tracker = RevealTracker::new(DEFAULT_REVEAL_MARGIN);
        tracker.attach(&reg, &mut obs);
        // Everything visible in the old layout…
        obs.on_frame(&reg, &Bounds::new(0.0, 0.0, 10_000.0, 600.0));
        // …but photo 2 is gone by the time the entries are applied.
        tracker.drain(&smaller, &mut obs);
        assert!(!tracker.is_revealed(&SectionId::photo("2")));
        assert!(tracker.is_revealed(&SectionId::photo("1")));
    }
}
