//! Layout helpers: split the terminal area and map strip units to cells.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::core::geometry::Bounds;
use crate::core::registry::{LayoutMode, StripMetrics};

/// Strip units covered by one terminal column.
pub const UNITS_PER_COL: f64 = 8.0;
/// Strip units covered by one terminal row.  Cells are about twice as tall
/// as wide, so this keeps photo aspect ratios intact.
pub const UNITS_PER_ROW: f64 = 16.0;

/// Primary screen layout with the strip and a bottom status bar.
pub struct AppLayout {
    pub strip_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // strip (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            strip_area: chunks[0],
            status_area: chunks[1],
        }
    }
}

/// Strip metrics for a strip drawn into `area`.
pub fn strip_metrics(area: Rect) -> StripMetrics {
    StripMetrics {
        viewport_width: area.width as f64 * UNITS_PER_COL,
        viewport_height: area.height as f64 * UNITS_PER_ROW,
    }
}

/// Narrow below `narrow_width` columns.
pub fn layout_mode(area: Rect, narrow_width: u16) -> LayoutMode {
    if area.width < narrow_width {
        LayoutMode::Narrow
    } else {
        LayoutMode::Wide
    }
}

/// A rectangle in cell coordinates relative to the screen that may hang off
/// the edges of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Placement {
    /// Place strip-space `bounds` on screen for the given scroll offset.
    pub fn from_bounds(bounds: &Bounds, scroll_offset: f64, area: Rect) -> Self {
        let x = ((bounds.x - scroll_offset) / UNITS_PER_COL).round() as i32;
        let y = (bounds.y / UNITS_PER_ROW).round() as i32;
        Self {
            x: area.x as i32 + x,
            y: area.y as i32 + y,
            width: (bounds.width / UNITS_PER_COL).round().max(0.0) as u16,
            height: (bounds.height / UNITS_PER_ROW).round().max(0.0) as u16,
        }
    }

    /// The visible part of this placement inside `area`, if any.
    pub fn clip(&self, area: Rect) -> Option<Rect> {
        let left = self.x.max(area.x as i32);
        let top = self.y.max(area.y as i32);
        let right = (self.x + self.width as i32).min(area.right() as i32);
        let bottom = (self.y + self.height as i32).min(area.bottom() as i32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    /// Inset by one cell on every side (the border).
    pub fn inner(&self) -> Self {
        Self {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}

impl From<Rect> for Placement {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x as i32,
            y: r.y as i32,
            width: r.width,
            height: r.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_scale_cells_to_units() {
        let m = strip_metrics(Rect::new(0, 0, 120, 40));
        assert_eq!(m.viewport_width, 960.0);
        assert_eq!(m.viewport_height, 640.0);
        assert_eq!(layout_mode(Rect::new(0, 0, 80, 40), 100), LayoutMode::Narrow);
        assert_eq!(layout_mode(Rect::new(0, 0, 100, 40), 100), LayoutMode::Wide);
    }

    #[test]
    fn placement_follows_scroll_and_clips() {
        let area = Rect::new(0, 0, 100, 30);
        let b = Bounds::new(800.0, 160.0, 400.0, 320.0);
        let p = Placement::from_bounds(&b, 0.0, area);
        assert_eq!(p, Placement { x: 100, y: 10, width: 50, height: 20 });
        assert_eq!(p.clip(area), None);

        let p = Placement::from_bounds(&b, 400.0, area);
        assert_eq!(p.x, 50);
        assert_eq!(p.clip(area), Some(Rect::new(50, 10, 50, 20)));

        let p = Placement::from_bounds(&b, 1000.0, area);
        assert_eq!(p.x, -25);
        assert_eq!(p.clip(area), Some(Rect::new(0, 10, 25, 20)));
    }
}
