//! Strip-space geometry: rectangles, root margins, and overlap ratios.
//!
//! Everything in the strip is measured in abstract *units* along a single
//! coordinate space whose origin is the left edge of the cover section.
//! The scroll axis is `x`.

// ───────────────────────────────────────── rectangles ────────

/// Axis-aligned rectangle in strip units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Zero-sized bounds belong to elements that have not been laid out.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Overlapping region, or `None` when the rectangles are disjoint.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Bounds::new(left, top, right - left, bottom - top))
    }

    /// Grow (or, with negative lengths, shrink) each side by `margin`.
    pub fn expand(&self, margin: &RootMargin) -> Bounds {
        let top = margin.top.resolve(self.height);
        let right = margin.right.resolve(self.width);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        Bounds::new(
            self.x - left,
            self.y - top,
            (self.width + left + right).max(0.0),
            (self.height + top + bottom).max(0.0),
        )
    }
}

// ───────────────────────────────────────── margins ───────────

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Units(f64),
    /// Fraction of the root's extent along the same axis (`0.4` = 40%).
    Percent(f64),
}

impl Length {
    fn resolve(self, extent: f64) -> f64 {
        match self {
            Length::Units(u) => u,
            Length::Percent(p) => extent * p,
        }
    }
}

/// Extension applied to the viewport before overlap is measured.
/// Positive values grow the detection window, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    /// Same margin on the left and right edges, none above or below.
    pub const fn horizontal(side: Length) -> Self {
        Self {
            top: Length::Units(0.0),
            right: side,
            bottom: Length::Units(0.0),
            left: side,
        }
    }
}

// ───────────────────────────────────────── thresholds ────────

/// Sorted overlap-ratio checkpoints.  A subscriber is notified whenever the
/// ratio moves into a different checkpoint bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    pub fn new(mut values: Vec<f64>) -> Self {
        values.retain(|v| v.is_finite());
        for v in &mut values {
            *v = v.clamp(0.0, 1.0);
        }
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        if values.is_empty() {
            values.push(0.0);
        }
        Self(values)
    }

    pub fn single(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// `[0, 1/n, 2/n, …, 1]`.
    pub fn steps(n: usize) -> Self {
        let n = n.max(1);
        Self::new((0..=n).map(|i| i as f64 / n as f64).collect())
    }

    /// Number of checkpoints the ratio has reached.  A zero ratio never
    /// counts as reaching the `0.0` checkpoint.
    pub fn bucket(&self, ratio: f64) -> usize {
        if ratio <= 0.0 {
            return 0;
        }
        self.0.iter().filter(|&&t| ratio >= t).count()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Fraction of `target` covered by `root` (0.0 ..= 1.0).
pub fn overlap_ratio(target: &Bounds, root: &Bounds) -> f64 {
    let area = target.area();
    if area <= 0.0 {
        return 0.0;
    }
    match target.intersection(root) {
        Some(hit) => (hit.area() / area).clamp(0.0, 1.0),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_rects_have_no_overlap() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersection(&b).is_none());
        assert_eq!(overlap_ratio(&a, &b), 0.0);
    }

    #[test]
    fn ratio_is_relative_to_target_area() {
        let target = Bounds::new(0.0, 0.0, 100.0, 10.0);
        let root = Bounds::new(75.0, 0.0, 500.0, 10.0);
        assert!((overlap_ratio(&target, &root) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn negative_percent_margin_shrinks_to_band() {
        let viewport = Bounds::new(0.0, 0.0, 1000.0, 500.0);
        let band = viewport.expand(&RootMargin::horizontal(Length::Percent(-0.4)));
        assert_eq!(band.x, 400.0);
        assert_eq!(band.width, 200.0);
        assert_eq!(band.height, 500.0);
    }

    #[test]
    fn unit_margin_extends_both_edges() {
        let viewport = Bounds::new(100.0, 0.0, 1000.0, 500.0);
        let window = viewport.expand(&RootMargin::horizontal(Length::Units(200.0)));
        assert_eq!(window.x, -100.0);
        assert_eq!(window.right(), 1300.0);
    }

    #[test]
    fn buckets_follow_quarter_steps() {
        let t = Thresholds::steps(4);
        assert_eq!(t.values(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(t.bucket(0.0), 0);
        assert_eq!(t.bucket(0.01), 1);
        assert_eq!(t.bucket(0.25), 2);
        assert_eq!(t.bucket(0.6), 3);
        assert_eq!(t.bucket(1.0), 5);
    }

    #[test]
    fn thresholds_are_sanitised() {
        let t = Thresholds::new(vec![1.5, f64::NAN, 0.1, 0.1]);
        assert_eq!(t.values(), &[0.1, 1.0]);
        assert_eq!(Thresholds::new(Vec::new()).values(), &[0.0]);
    }
}
