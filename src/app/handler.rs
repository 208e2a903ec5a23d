//! Input handling: maps key/mouse events to state mutations.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::Action;
use crate::core::snap::WheelDelta;
use crate::ui::strip::StripHit;

use super::state::AppState;

/// Process a key event, dispatching on whether the overlay is open.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.detail.is_some() {
        handle_detail_key(state, key);
    } else {
        handle_strip_key(state, key);
    }
}

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.detail.is_some() {
        handle_detail_mouse(state, mouse);
        return;
    }

    let step = state.config.wheel_step;
    let delta = match mouse.kind {
        MouseEventKind::ScrollDown => WheelDelta::new(0.0, step),
        MouseEventKind::ScrollUp => WheelDelta::new(0.0, -step),
        MouseEventKind::ScrollRight => WheelDelta::new(step, 0.0),
        MouseEventKind::ScrollLeft => WheelDelta::new(-step, 0.0),
        MouseEventKind::Down(MouseButton::Left) => {
            handle_strip_click(state, mouse.column, mouse.row);
            return;
        }
        _ => return,
    };
    state.on_wheel(delta, Instant::now());
}

// ── Strip (configurable bindings) ───────────────────────────────

fn handle_strip_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;

    match action {
        Action::Prev => state.step(false),
        Action::Next => state.step(true),
        Action::ToCover => state.scroll_to_index(0),
        Action::ToGallery => state.scroll_to_index(1),
        Action::Open => state.open_focused(),
        Action::ToggleSnap => state.toggle_snap(),
        Action::ToggleTouch => state.toggle_touch(),
        Action::Reload => state.reload(),
        Action::Quit => state.should_quit = true,
    }
}

fn handle_strip_click(state: &mut AppState, column: u16, row: u16) {
    let hit = state
        .strip_hits
        .iter()
        .rev()
        .find(|h| h.contains(column, row))
        .copied();
    match hit {
        Some(StripHit::Card { photo_index, .. }) => state.open_detail(photo_index),
        Some(StripHit::Gallery(_)) => state.scroll_to_index(1),
        None => {}
    }
}

// ── Detail overlay (fixed keys) ─────────────────────────────────

fn handle_detail_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => state.close_detail(),
        KeyCode::Left | KeyCode::Char('h') => state.detail_prev(),
        KeyCode::Right | KeyCode::Char('l') => state.detail_next(),
        _ => {}
    }
}

fn handle_detail_mouse(state: &mut AppState, mouse: MouseEvent) {
    let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
        return;
    };
    let Some(zones) = state.detail_hit_zones else {
        return;
    };
    if point_in_rect(zones.close_rect, mouse.column, mouse.row) {
        state.close_detail();
    } else if point_in_rect(zones.prev_rect, mouse.column, mouse.row) {
        state.detail_prev();
    } else if point_in_rect(zones.next_rect, mouse.column, mouse.row) {
        state.detail_next();
    }
}

// ── helpers ─────────────────────────────────────────────────────

fn point_in_rect(rect: ratatui::layout::Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    use crate::catalog::Catalog;
    use crate::config::AppConfig;
    use crate::core::photo::Photo;
    use crate::core::snap;
    use crate::ui::detail::DetailHitZones;

    fn state(n: usize) -> AppState {
        let catalog = Catalog {
            root: PathBuf::from("/nonexistent"),
            photos: (1..=n)
                .map(|i| Photo::new(i.to_string(), format!("{i}.jpg"), format!("P{i}")))
                .collect(),
            hero: None,
        };
        let mut s = AppState::new(catalog, AppConfig::default());
        s.resize(Rect::new(0, 0, 120, 39));
        s
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn keys_step_through_sections() {
        let mut s = state(3);
        handle_key(&mut s, press(KeyCode::Right));
        let t1 = snap::target_offset(s.engine.registry(), 1).unwrap();
        assert_eq!(s.scroll.target(), t1);
        handle_key(&mut s, press(KeyCode::Home));
        assert_eq!(s.scroll.target(), 0.0);
        handle_key(&mut s, press(KeyCode::Char('g')));
        assert_eq!(s.scroll.target(), t1);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut s = state(2);
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        key.state = KeyEventState::NONE;
        handle_key(&mut s, key);
        assert!(!s.should_quit);
        handle_key(&mut s, press(KeyCode::Char('q')));
        assert!(s.should_quit);
    }

    #[test]
    fn wheel_scrolls_freely_by_default() {
        let mut s = state(3);
        handle_mouse(&mut s, mouse(MouseEventKind::ScrollDown, 10, 10));
        assert_eq!(s.scroll.target(), s.config.wheel_step * 1.5);
        handle_mouse(&mut s, mouse(MouseEventKind::ScrollLeft, 10, 10));
        assert_eq!(s.scroll.target(), s.config.wheel_step * 0.5);
    }

    #[test]
    fn overlay_owns_navigation_keys() {
        let mut s = state(3);
        s.open_detail(0);
        handle_key(&mut s, press(KeyCode::Right));
        handle_key(&mut s, press(KeyCode::Right));
        handle_key(&mut s, press(KeyCode::Right));
        assert_eq!(s.detail.as_ref().map(|d| d.index()), Some(2));
        // The strip did not move underneath.
        assert_eq!(s.scroll.target(), 0.0);
        handle_key(&mut s, press(KeyCode::Esc));
        assert!(s.detail.is_none());
    }

    #[test]
    fn clicks_open_cards_and_close_the_overlay() {
        let mut s = state(3);
        s.strip_hits = vec![StripHit::Card {
            rect: Rect::new(30, 10, 20, 10),
            photo_index: 1,
        }];
        handle_mouse(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 35, 12));
        assert_eq!(s.detail.as_ref().map(|d| d.index()), Some(1));

        s.detail_hit_zones = Some(DetailHitZones {
            close_rect: Rect::new(90, 1, 3, 1),
            prev_rect: Rect::new(5, 15, 3, 1),
            next_rect: Rect::new(92, 15, 3, 1),
        });
        handle_mouse(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 6, 15));
        assert_eq!(s.detail.as_ref().map(|d| d.index()), Some(0));
        handle_mouse(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 91, 1));
        assert!(s.detail.is_none());
    }
}
