//! The horizontal strip: cover, photo cards and the floating header.
//!
//! Sections are drawn at full size into a scratch buffer and then copied
//! onto the screen through their visible clip, so a card half off-screen
//! keeps its border on the visible side only.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::core::observer::OverlapObserver;
use crate::core::photo::Photo;
use crate::core::registry::SectionId;
use crate::core::reveal::RevealState;
use crate::core::viewport::ViewportEngine;

use super::halfblock;
use super::layout::Placement;
use super::theme::Theme;

/// Clickable region produced by a strip render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripHit {
    Card { rect: Rect, photo_index: usize },
    /// The "to the gallery" affordance on the cover.
    Gallery(Rect),
}

impl StripHit {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        let rect = match self {
            StripHit::Card { rect, .. } | StripHit::Gallery(rect) => rect,
        };
        rect.contains(Position::new(column, row))
    }
}

pub struct StripWidget<'a, O: OverlapObserver> {
    pub engine: &'a ViewportEngine<O>,
    /// Displayed scroll offset (may lag the engine's target while animating).
    pub offset: f64,
    pub hero: Option<&'a Photo>,
    pub title: &'a str,
    pub subtitle: &'a str,
    pub thumbnails: &'a HashMap<PathBuf, Arc<RgbaImage>>,
}

impl<'a, O: OverlapObserver> StripWidget<'a, O> {
    /// Render and return hit zones for mouse interaction.
    pub fn render_and_hit(self, area: Rect, buf: &mut Buffer) -> Vec<StripHit> {
        let mut hits = Vec::new();
        let registry = self.engine.registry();

        for section in registry.sections() {
            let placement = Placement::from_bounds(&section.bounds, self.offset, area);
            let Some(clip) = placement.clip(area) else {
                continue;
            };
            let local = Rect::new(0, 0, placement.width, placement.height);
            let mut scratch = Buffer::empty(local);

            match &section.id {
                SectionId::Cover => {
                    if let Some(hint) = self.draw_cover(local, &mut scratch) {
                        let on_screen = Placement {
                            x: placement.x + hint.x as i32,
                            y: placement.y + hint.y as i32,
                            width: hint.width,
                            height: hint.height,
                        };
                        if let Some(rect) = on_screen.clip(area) {
                            hits.push(StripHit::Gallery(rect));
                        }
                    }
                }
                SectionId::Photo(id) => {
                    if self.engine.reveal_state(&section.id) != RevealState::Revealed {
                        continue;
                    }
                    let Some(photo_index) = self.engine.photos().iter().position(|p| &p.id == id)
                    else {
                        continue;
                    };
                    let photo = &self.engine.photos()[photo_index];
                    let centered = self.engine.emphasis_enabled()
                        && self.engine.centered() == Some(&section.id);
                    self.draw_card(photo, centered, local, &mut scratch);
                    hits.push(StripHit::Card {
                        rect: clip,
                        photo_index,
                    });
                }
            }

            blit(&scratch, placement, clip, buf);
        }

        self.draw_header(area, buf);
        hits
    }

    /// Hero image plus the gallery affordance.  Returns the affordance rect
    /// relative to the cover.
    fn draw_cover(&self, local: Rect, buf: &mut Buffer) -> Option<Rect> {
        if let Some(thumb) = self.hero.and_then(|h| self.thumbnails.get(h.hero_src())) {
            halfblock::render_fit(thumb, Placement::from(local), local, buf);
        }
        if local.height < 3 || local.width < 8 {
            return None;
        }
        let hint = Rect::new(local.width / 2 - 4, local.height - 2, 8, 1);
        Paragraph::new(Line::from(Span::styled(" g  ›› ", Theme::placeholder_style())))
            .alignment(Alignment::Center)
            .render(hint, buf);
        Some(hint)
    }

    fn draw_card(&self, photo: &Photo, centered: bool, local: Rect, buf: &mut Buffer) {
        let border = match (centered, photo.glow_colors) {
            (true, Some(glow)) => Style::default()
                .fg(Theme::glow_color(&glow, 0.5))
                .add_modifier(Modifier::BOLD),
            (true, None) => Theme::centered_border_style(),
            (false, _) => Theme::card_border_style(),
        };
        let caption = if centered {
            Theme::card_caption_style().add_modifier(Modifier::BOLD)
        } else {
            Theme::card_caption_style()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title_bottom(Line::from(Span::styled(format!(" {} ", photo.title), caption)));
        let inner = block.inner(local);
        block.render(local, buf);

        match self.thumbnails.get(&photo.src) {
            Some(thumb) => halfblock::render_fill(thumb, Placement::from(inner), inner, buf),
            None if inner.height > 0 => {
                let row = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
                Paragraph::new(Span::styled("…", Theme::placeholder_style()))
                    .alignment(Alignment::Center)
                    .render(row, buf);
            }
            None => {}
        }
    }

    /// Title and subtitle floating over the strip.  As progress goes to 1
    /// the title rises and tightens while the subtitle sinks.
    fn draw_header(&self, area: Rect, buf: &mut Buffer) {
        if area.height < 4 {
            return;
        }
        let header = self.engine.header();
        let h = area.height as f64;
        let bottom = area.bottom().saturating_sub(1);

        let mid = area.y + area.height / 2 - 1;
        let title_row = mid.saturating_sub((header.lift * h).round() as u16).max(area.y);
        let subtitle_row = (title_row + 2 + (header.subtitle_drop * h).round() as u16).min(bottom);

        // Letter spacing stands in for scale.
        let title_gap = ((header.title_scale - 0.3) / 0.7 * 2.0).round() as usize;
        let subtitle_gap = ((header.subtitle_scale - 0.7) / 0.3 * 2.0).round() as usize;

        Paragraph::new(Span::styled(spaced(self.title, title_gap), Theme::cover_title_style()))
            .alignment(Alignment::Center)
            .render(Rect::new(area.x, title_row, area.width, 1), buf);
        if subtitle_row > title_row {
            Paragraph::new(Span::styled(
                spaced(&self.subtitle.to_uppercase(), subtitle_gap),
                Theme::cover_subtitle_style(),
            ))
            .alignment(Alignment::Center)
            .render(Rect::new(area.x, subtitle_row, area.width, 1), buf);
        }
    }
}

fn spaced(text: &str, gap: usize) -> String {
    let sep = " ".repeat(gap);
    text.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(&sep)
}

/// Copy the visible part of a section buffer onto the screen.
fn blit(scratch: &Buffer, placement: Placement, clip: Rect, buf: &mut Buffer) {
    for y in clip.top()..clip.bottom() {
        for x in clip.left()..clip.right() {
            let local = Position::new((x as i32 - placement.x) as u16, (y as i32 - placement.y) as u16);
            if let (Some(src), Some(dst)) = (scratch.cell(local), buf.cell_mut(Position::new(x, y))) {
                *dst = src.clone();
            }
        }
    }
}
