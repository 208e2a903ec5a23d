//! Viewport section registry: the ordered list of observable sections.
//!
//! A registry is derived from the photo collection and the layout mode and
//! is never edited in place: whenever either input changes, a fresh registry
//! is built and the old one is dropped.

use std::collections::HashMap;
use std::fmt;

use super::geometry::Bounds;
use super::photo::Photo;

/// Fallback aspect ratio for photos whose dimensions are not known yet.
const DEFAULT_ASPECT: f64 = 1.5;

// ───────────────────────────────────────── identity ──────────

/// Identity of a section: the reserved cover, or a photo id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionId {
    Cover,
    Photo(String),
}

impl SectionId {
    pub fn photo(id: impl Into<String>) -> Self {
        SectionId::Photo(id.into())
    }

    pub fn photo_id(&self) -> Option<&str> {
        match self {
            SectionId::Cover => None,
            SectionId::Photo(id) => Some(id),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionId::Cover => f.write_str("cover"),
            SectionId::Photo(id) => write!(f, "photo:{id}"),
        }
    }
}

// ───────────────────────────────────────── layout ────────────

/// Layout class of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Wide,
    Narrow,
}

/// Viewport dimensions the strip is laid out against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StripMetrics {
    pub viewport_width: f64,
    pub viewport_height: f64,
}

/// Per-mode spacing rules.
struct Spacing {
    card_height_frac: f64,
    gap: f64,
    lead: f64,
    trail: f64,
}

impl Spacing {
    fn for_mode(mode: LayoutMode, metrics: &StripMetrics) -> Self {
        match mode {
            LayoutMode::Wide => Self {
                card_height_frac: 0.5,
                gap: 128.0,
                lead: metrics.viewport_width * 0.2,
                trail: metrics.viewport_width * 0.4,
            },
            LayoutMode::Narrow => Self {
                card_height_frac: 0.4,
                gap: 64.0,
                lead: 32.0,
                trail: 32.0,
            },
        }
    }
}

// ───────────────────────────────────────── registry ──────────

/// One laid-out section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub bounds: Bounds,
}

/// Ordered `[cover, photo₁, …, photoₙ]` sequence with geometry.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
    index: HashMap<SectionId, usize>,
    layout_mode: LayoutMode,
    metrics: StripMetrics,
    content_width: f64,
}

impl SectionRegistry {
    /// A registry with no sections (collection swap in progress).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lay out the cover followed by one card per photo.
    ///
    /// Duplicate photo ids keep their first occurrence.
    pub fn build(photos: &[Photo], layout_mode: LayoutMode, metrics: StripMetrics) -> Self {
        let spacing = Spacing::for_mode(layout_mode, &metrics);
        let vw = metrics.viewport_width.max(0.0);
        let vh = metrics.viewport_height.max(0.0);

        let mut sections = Vec::with_capacity(photos.len() + 1);
        let mut index = HashMap::with_capacity(photos.len() + 1);

        sections.push(Section {
            id: SectionId::Cover,
            bounds: Bounds::new(0.0, 0.0, vw, vh),
        });
        index.insert(SectionId::Cover, 0);

        let card_h = vh * spacing.card_height_frac;
        let card_y = (vh - card_h) / 2.0;
        let mut x = vw + spacing.lead;

        for photo in photos {
            let id = SectionId::photo(photo.id.as_str());
            if index.contains_key(&id) {
                tracing::warn!("duplicate photo id {:?} skipped", photo.id);
                continue;
            }
            let aspect = photo
                .aspect_ratio
                .filter(|a| a.is_finite() && *a > 0.0)
                .unwrap_or(DEFAULT_ASPECT);
            let card_w = card_h * aspect;
            if index.len() > 1 {
                x += spacing.gap;
            }
            index.insert(id.clone(), sections.len());
            sections.push(Section {
                id,
                bounds: Bounds::new(x, card_y, card_w, card_h),
            });
            x += card_w;
        }

        let content_width = if sections.len() > 1 { x + spacing.trail } else { vw };

        Self {
            sections,
            index,
            layout_mode,
            metrics,
            content_width,
        }
    }

    pub fn count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn index_of(&self, id: &SectionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &SectionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn bounds_of(&self, index: usize) -> Option<Bounds> {
        self.sections.get(index).map(|s| s.bounds)
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub fn metrics(&self) -> StripMetrics {
        self.metrics
    }

    /// Width of the cover section, the denominator for scroll progress.
    pub fn cover_width(&self) -> f64 {
        self.sections.first().map_or(0.0, |s| s.bounds.width)
    }

    /// Total scrollable extent of the strip.
    pub fn content_width(&self) -> f64 {
        self.content_width
    }

    /// Largest valid scroll offset for the current viewport.
    pub fn max_scroll(&self) -> f64 {
        (self.content_width - self.metrics.viewport_width).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Vec<Photo> {
        (1..=n)
            .map(|i| Photo::new(i.to_string(), format!("p{i}.jpg"), format!("P{i}")))
            .collect()
    }

    fn metrics() -> StripMetrics {
        StripMetrics {
            viewport_width: 1000.0,
            viewport_height: 600.0,
        }
    }

    #[test]
    fn cover_comes_first() {
        let reg = SectionRegistry::build(&photos(5), LayoutMode::Wide, metrics());
        assert_eq!(reg.count(), 6);
        assert_eq!(reg.get(0).map(|s| &s.id), Some(&SectionId::Cover));
        assert_eq!(reg.index_of(&SectionId::photo("3")), Some(3));
        assert_eq!(reg.cover_width(), 1000.0);
    }

    #[test]
    fn cards_are_laid_out_left_to_right() {
        let reg = SectionRegistry::build(&photos(3), LayoutMode::Wide, metrics());
        let first = reg.bounds_of(1).unwrap();
        assert_eq!(first.x, 1200.0);
        assert_eq!(first.height, 300.0);
        assert_eq!(first.width, 450.0);
        let second = reg.bounds_of(2).unwrap();
        assert_eq!(second.x, first.right() + 128.0);
        assert_eq!(reg.content_width(), reg.bounds_of(3).unwrap().right() + 400.0);
        assert!(reg.bounds_of(4).is_none());
    }

    #[test]
    fn narrow_layout_uses_tighter_spacing() {
        let reg = SectionRegistry::build(&photos(2), LayoutMode::Narrow, metrics());
        let first = reg.bounds_of(1).unwrap();
        assert_eq!(first.x, 1032.0);
        assert_eq!(first.height, 240.0);
        assert_eq!(reg.bounds_of(2).unwrap().x, first.right() + 64.0);
    }

    #[test]
    fn duplicate_ids_are_skipped() {
        let mut list = photos(2);
        list.push(Photo::new("1", "dup.jpg", "Dup"));
        let reg = SectionRegistry::build(&list, LayoutMode::Wide, metrics());
        assert_eq!(reg.count(), 3);
        assert_eq!(reg.index_of(&SectionId::photo("1")), Some(1));
    }

    #[test]
    fn empty_registry_has_nothing() {
        let reg = SectionRegistry::empty();
        assert!(reg.is_empty());
        assert_eq!(reg.cover_width(), 0.0);
        assert!(reg.bounds_of(0).is_none());
        assert_eq!(reg.max_scroll(), 0.0);
    }
}
