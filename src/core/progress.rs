//! Scroll progress across the cover section, and the header motion it drives.

/// `offset / reference_width`, clamped to `[0, 1]`.  A non-positive width
/// (cover not laid out yet) yields `0`.
pub fn scroll_progress(offset: f64, reference_width: f64) -> f64 {
    if !(reference_width > 0.0) || !offset.is_finite() {
        return 0.0;
    }
    (offset / reference_width).clamp(0.0, 1.0)
}

/// Emits progress values, skipping repeats of the last one.
#[derive(Debug, Clone, Default)]
pub struct ProgressBroadcaster {
    last: Option<f64>,
}

impl ProgressBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute for a new scroll offset.  Returns the value only when it
    /// differs from the previously emitted one.
    pub fn update(&mut self, offset: f64, reference_width: f64) -> Option<f64> {
        let progress = scroll_progress(offset, reference_width);
        if self.last == Some(progress) {
            return None;
        }
        self.last = Some(progress);
        Some(progress)
    }

    pub fn value(&self) -> f64 {
        self.last.unwrap_or(0.0)
    }
}

/// Decorative header placement derived from progress.  Offsets are
/// fractions of the viewport height; scales are multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderTransform {
    /// Upward shift of the whole header.
    pub lift: f64,
    pub title_scale: f64,
    /// Downward shift of the subtitle relative to the header.
    pub subtitle_drop: f64,
    pub subtitle_scale: f64,
}

impl HeaderTransform {
    pub fn from_progress(progress: f64) -> Self {
        let p = progress.clamp(0.0, 1.0);
        Self {
            lift: p * 0.38,
            title_scale: 1.0 - p * 0.7,
            subtitle_drop: p * 0.76,
            subtitle_scale: 1.0 - p * 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_spans_the_cover_width() {
        for w in [1.0, 640.0, 1920.0] {
            assert_eq!(scroll_progress(0.0, w), 0.0);
            assert_eq!(scroll_progress(w, w), 1.0);
            assert_eq!(scroll_progress(2.0 * w, w), 1.0);
            assert_eq!(scroll_progress(w / 2.0, w), 0.5);
        }
    }

    #[test]
    fn degenerate_inputs_yield_zero() {
        assert_eq!(scroll_progress(100.0, 0.0), 0.0);
        assert_eq!(scroll_progress(100.0, -5.0), 0.0);
        assert_eq!(scroll_progress(f64::NAN, 100.0), 0.0);
        assert_eq!(scroll_progress(-50.0, 100.0), 0.0);
    }

    #[test]
    fn repeated_values_are_suppressed() {
        let mut b = ProgressBroadcaster::new();
        assert_eq!(b.update(0.0, 100.0), Some(0.0));
        assert_eq!(b.update(0.0, 100.0), None);
        assert_eq!(b.update(150.0, 100.0), Some(1.0));
        assert_eq!(b.update(400.0, 100.0), None);
        assert_eq!(b.value(), 1.0);
    }

    #[test]
    fn header_settles_at_full_progress() {
        let h = HeaderTransform::from_progress(1.0);
        assert!((h.title_scale - 0.3).abs() < 1e-9);
        assert!((h.subtitle_scale - 0.7).abs() < 1e-9);
        assert_eq!(HeaderTransform::from_progress(0.0).lift, 0.0);
    }
}
