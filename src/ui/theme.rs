//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::photo::GlowColors;

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── strip ──────────────────────────────────────────────────
    pub fn card_border_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    /// Border of the centered card.
    pub fn centered_border_style() -> Style {
        Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_caption_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn placeholder_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── cover ──────────────────────────────────────────────────
    pub fn cover_title_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn cover_subtitle_style() -> Style {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC)
    }

    /// Border colour for a card with a glow pair; blends toward `to` as
    /// `t` goes from 0 to 1.
    pub fn glow_color(glow: &GlowColors, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::Rgb(
            mix(glow.from[0], glow.to[0]),
            mix(glow.from[1], glow.to[1]),
            mix(glow.from[2], glow.to[2]),
        )
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label_style() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
