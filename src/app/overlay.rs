//! Detail overlay state: which photo is open and how to move between them.

use std::sync::Arc;

use crate::core::photo::Photo;

/// An open detail overlay over a snapshot of the collection.
#[derive(Debug, Clone)]
pub struct DetailOverlay {
    photos: Arc<Vec<Photo>>,
    index: usize,
}

impl DetailOverlay {
    /// Open at `index`, clamped into range.  `None` for an empty collection.
    pub fn open(photos: Arc<Vec<Photo>>, index: usize) -> Option<Self> {
        if photos.is_empty() {
            return None;
        }
        let index = index.min(photos.len() - 1);
        Some(Self { photos, index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn current(&self) -> &Photo {
        &self.photos[self.index]
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.photos.len()
    }

    /// Returns `true` when the index moved.
    pub fn on_next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn on_prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.index -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Arc<Vec<Photo>> {
        Arc::new(
            (1..=n)
                .map(|i| Photo::new(i.to_string(), format!("{i}.jpg"), format!("P{i}")))
                .collect(),
        )
    }

    #[test]
    fn open_clamps_and_rejects_empty() {
        assert!(DetailOverlay::open(photos(0), 0).is_none());
        let o = DetailOverlay::open(photos(3), 10).unwrap();
        assert_eq!(o.index(), 2);
        assert_eq!(o.current().id, "3");
    }

    #[test]
    fn navigation_stays_in_range() {
        let mut o = DetailOverlay::open(photos(2), 0).unwrap();
        assert!(!o.on_prev());
        assert!(o.on_next());
        assert!(!o.on_next());
        assert_eq!(o.index(), 1);
        assert!(o.on_prev());
        assert_eq!(o.current().title, "P1");
    }
}
