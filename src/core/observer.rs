//! Overlap observation: the push-based geometry collaborator.
//!
//! Trackers never measure layout themselves.  They subscribe a section with
//! a root margin and a set of ratio checkpoints, and the observer pushes an
//! [`OverlapEntry`] into the subscriber's channel whenever that section's
//! overlap with the (margin-adjusted) viewport crosses a checkpoint.
//!
//! [`FrameOverlapObserver`] implements the contract by polling the current
//! layout once per frame tick.

use std::collections::BTreeMap;

use tokio::sync::mpsc;

use super::geometry::{overlap_ratio, Bounds, RootMargin, Thresholds};
use super::registry::{SectionId, SectionRegistry};

/// Identifies one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

/// How a section should be observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    pub margin: RootMargin,
    pub thresholds: Thresholds,
}

/// A single overlap notification.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapEntry {
    pub handle: SubscriptionHandle,
    pub target: SectionId,
    /// Fraction of the section inside the observation window.
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Where entries for a subscription are delivered.
pub type OverlapSink = mpsc::UnboundedSender<OverlapEntry>;

/// Injected geometry-overlap service.
pub trait OverlapObserver {
    fn subscribe(
        &mut self,
        target: SectionId,
        options: ObserveOptions,
        sink: OverlapSink,
    ) -> SubscriptionHandle;

    fn unsubscribe(&mut self, handle: SubscriptionHandle);
}

// ───────────────────────────────────────── frame polling ─────

struct Subscription {
    target: SectionId,
    options: ObserveOptions,
    sink: OverlapSink,
    /// Checkpoint bucket at the last delivery; `None` until the first frame.
    last_bucket: Option<usize>,
}

/// Observer that measures every subscription against the current layout
/// when [`on_frame`](Self::on_frame) is called.
#[derive(Default)]
pub struct FrameOverlapObserver {
    next_handle: u64,
    subscriptions: BTreeMap<SubscriptionHandle, Subscription>,
}

impl FrameOverlapObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Measure all subscriptions and push entries for checkpoint crossings.
    /// The first frame after subscribing always delivers.
    ///
    /// Returns the number of entries delivered.
    pub fn on_frame(&mut self, registry: &SectionRegistry, viewport: &Bounds) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (&handle, sub) in self.subscriptions.iter_mut() {
            let Some(bounds) = registry
                .index_of(&sub.target)
                .and_then(|i| registry.bounds_of(i))
            else {
                continue;
            };
            if bounds.is_empty() {
                continue;
            }

            let root = viewport.expand(&sub.options.margin);
            let ratio = overlap_ratio(&bounds, &root);
            let bucket = sub.options.thresholds.bucket(ratio);
            if sub.last_bucket == Some(bucket) {
                continue;
            }
            sub.last_bucket = Some(bucket);

            let entry = OverlapEntry {
                handle,
                target: sub.target.clone(),
                ratio,
                is_intersecting: ratio > 0.0,
            };
            if sub.sink.send(entry).is_err() {
                closed.push(handle);
            } else {
                delivered += 1;
            }
        }

        for handle in closed {
            self.subscriptions.remove(&handle);
        }
        delivered
    }
}

impl OverlapObserver for FrameOverlapObserver {
    fn subscribe(
        &mut self,
        target: SectionId,
        options: ObserveOptions,
        sink: OverlapSink,
    ) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.subscriptions.insert(
            handle,
            Subscription {
                target,
                options,
                sink,
                last_bucket: None,
            },
        );
        handle
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.subscriptions.remove(&handle);
    }
}
