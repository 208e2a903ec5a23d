//! Full-screen photo detail overlay.
//!
//! Renders the open photo on the left with its metadata on the right,
//! navigation arrows, a close button and a position indicator ("3 / 7").
//! Missing metadata shows an explicit placeholder instead of being omitted.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::overlay::DetailOverlay;
use crate::core::photo::{or_no_description, or_not_set};

use super::halfblock;
use super::layout::Placement;
use super::theme::Theme;

pub struct DetailWidget<'a> {
    pub overlay: &'a DetailOverlay,
    pub thumbnails: &'a HashMap<PathBuf, Arc<image::RgbaImage>>,
    /// Sources whose decode failed; shown with a placeholder, never retried.
    pub failed: &'a HashSet<PathBuf>,
}

/// Clickable regions returned after rendering, for mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailHitZones {
    pub close_rect: Rect,
    pub prev_rect: Rect,
    pub next_rect: Rect,
}

impl<'a> DetailWidget<'a> {
    /// Compute the overlay area (centred, 90% of terminal).
    fn overlay_area(terminal: Rect) -> Rect {
        let margin_x = (terminal.width as f32 * 0.05).round() as u16;
        let margin_y = (terminal.height as f32 * 0.05).round() as u16;
        Rect::new(
            terminal.x + margin_x,
            terminal.y + margin_y,
            terminal.width.saturating_sub(margin_x * 2).max(20),
            terminal.height.saturating_sub(margin_y * 2).max(8),
        )
        .intersection(terminal)
    }

    /// Metadata rows: label and display value.
    fn rows(&self) -> Vec<(&'static str, String)> {
        let photo = self.overlay.current();
        let equipment = photo.equipment();
        vec![
            ("Location", or_not_set(photo.location.as_deref()).to_string()),
            ("Date", or_not_set(photo.date.as_deref()).to_string()),
            ("Equipment", or_not_set(equipment.as_deref()).to_string()),
            ("Settings", or_not_set(photo.settings.as_deref()).to_string()),
            (
                "Description",
                or_no_description(photo.description.as_deref()).to_string(),
            ),
        ]
    }

    /// Render and return hit zones for mouse interaction.
    pub fn render_and_hit(self, terminal_area: Rect, buf: &mut Buffer) -> DetailHitZones {
        let area = Self::overlay_area(terminal_area);
        Clear.render(area, buf);

        let photo = self.overlay.current();
        let title = format!(
            " {} · {}/{} ",
            photo.title,
            self.overlay.index() + 1,
            self.overlay.len(),
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_style())
            .title(Span::styled(title, Theme::title_style()));
        let inner = block.inner(area);
        block.render(area, buf);

        // Close button [X] on the top-right corner of the border.
        let close_rect = Rect::new(area.x + area.width.saturating_sub(5), area.y, 3, 1);
        Paragraph::new(Line::from(Span::styled(
            "[X]",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )))
        .render(close_rect, buf);

        // Navigation arrows on the left/right edges (vertically centred).
        let arrow_y = area.y + area.height / 2;
        let prev_rect = Rect::new(area.x, arrow_y, 3, 1);
        let next_rect = Rect::new(area.x + area.width.saturating_sub(3), arrow_y, 3, 1);
        let arrow_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        if self.overlay.has_prev() {
            Paragraph::new(Span::styled(" ◀", arrow_style)).render(prev_rect, buf);
        }
        if self.overlay.has_next() {
            Paragraph::new(Span::styled("▶ ", arrow_style)).render(next_rect, buf);
        }

        let body = Rect::new(
            inner.x.saturating_add(2),
            inner.y,
            inner.width.saturating_sub(4),
            inner.height.saturating_sub(1), // leave 1 row for footer
        );
        let [image_area, info_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .areas(body);

        match self.thumbnails.get(&photo.src) {
            Some(thumb) if image_area.width > 2 && image_area.height > 1 => {
                halfblock::render_fit(thumb, Placement::from(image_area), image_area, buf);
            }
            Some(_) => {}
            None => {
                let text = if self.failed.contains(&photo.src) {
                    "Could not decode image"
                } else {
                    "Loading…"
                };
                let msg = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center);
                msg.render(
                    Rect::new(image_area.x, image_area.y + image_area.height / 2, image_area.width, 1),
                    buf,
                );
            }
        }

        let mut lines = Vec::new();
        for (label, value) in self.rows() {
            lines.push(Line::from(Span::styled(label.to_uppercase(), Theme::label_style())));
            for part in value.lines() {
                lines.push(Line::from(Span::styled(part.to_string(), Theme::value_style())));
            }
            lines.push(Line::default());
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(info_area.inner(Margin::new(1, 0)), buf);

        // Footer hint.
        let footer_y = inner.y + inner.height.saturating_sub(1);
        Paragraph::new(Span::styled(
            " ←/→ navigate   Esc close ",
            Style::default().fg(Color::DarkGray),
        ))
        .render(Rect::new(inner.x, footer_y, inner.width, 1), buf);

        DetailHitZones {
            close_rect,
            prev_rect,
            next_rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::photo::{Photo, NOT_SET, NO_DESCRIPTION};

    fn overlay(index: usize) -> DetailOverlay {
        let mut a = Photo::new("a", "a.jpg", "Alpha");
        a.location = Some("Tokyo".into());
        a.camera = Some("Sony".into());
        let b = Photo::new("b", "b.jpg", "Beta");
        DetailOverlay::open(Arc::new(vec![a, b]), index).unwrap()
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut s = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                s.push_str(buf[(x, y)].symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn rows_use_placeholders() {
        let thumbnails = HashMap::new();
        let o = overlay(1);
        let rows = DetailWidget {
            overlay: &o,
            thumbnails: &thumbnails,
            failed: &HashSet::new(),
        }
        .rows();
        assert_eq!(rows[0], ("Location", NOT_SET.to_string()));
        assert_eq!(rows[2], ("Equipment", NOT_SET.to_string()));
        assert_eq!(rows[4], ("Description", NO_DESCRIPTION.to_string()));
    }

    #[test]
    fn failed_decode_shows_placeholder_instead_of_loading() {
        let thumbnails = HashMap::new();
        let failed: HashSet<PathBuf> = [PathBuf::from("b.jpg")].into_iter().collect();
        let area = Rect::new(0, 0, 100, 30);

        let o = overlay(1);
        let mut buf = Buffer::empty(area);
        DetailWidget {
            overlay: &o,
            thumbnails: &thumbnails,
            failed: &failed,
        }
        .render_and_hit(area, &mut buf);
        let s = text(&buf);
        assert!(s.contains("Could not decode image"));
        assert!(!s.contains("Loading…"));

        // Other photos are still pending.
        let o = overlay(0);
        let mut buf = Buffer::empty(area);
        DetailWidget {
            overlay: &o,
            thumbnails: &thumbnails,
            failed: &failed,
        }
        .render_and_hit(area, &mut buf);
        assert!(text(&buf).contains("Loading…"));
    }

    #[test]
    fn renders_title_position_and_arrows() {
        let thumbnails = HashMap::new();
        let o = overlay(0);
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        let zones = DetailWidget {
            overlay: &o,
            thumbnails: &thumbnails,
            failed: &HashSet::new(),
        }
        .render_and_hit(area, &mut buf);

        let s = text(&buf);
        assert!(s.contains("Alpha · 1/2"));
        assert!(s.contains("Tokyo"));
        assert!(s.contains("LOCATION"));
        assert!(s.contains("[X]"));
        // First photo: only the forward arrow.
        assert!(s.contains('▶'));
        assert!(!s.contains('◀'));
        assert!(zones.close_rect.x > zones.prev_rect.x);
    }
}
