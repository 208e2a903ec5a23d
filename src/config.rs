//! User configuration: engine tuning, key bindings, and persistence.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/strip-gallery/config.toml`
//! (default `~/.config/strip-gallery/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::center::InputProfile;
use crate::core::reveal::DEFAULT_REVEAL_MARGIN;
use crate::core::snap::{SnapConfig, DEFAULT_NOISE_THRESHOLD};
use crate::core::viewport::EngineConfig;

// ───────────────────────────────────────── actions ───────────

/// All configurable actions on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Prev,
    Next,
    ToCover,
    ToGallery,
    Open,
    ToggleSnap,
    ToggleTouch,
    Reload,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when writing the config file).
    pub const ALL: &[Action] = &[
        Action::Prev,
        Action::Next,
        Action::ToCover,
        Action::ToGallery,
        Action::Open,
        Action::ToggleSnap,
        Action::ToggleTouch,
        Action::Reload,
        Action::Quit,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::Prev => "prev",
            Action::Next => "next",
            Action::ToCover => "to_cover",
            Action::ToGallery => "to_gallery",
            Action::Open => "open",
            Action::ToggleSnap => "toggle_snap",
            Action::ToggleTouch => "toggle_touch",
            Action::Reload => "reload",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Short label for the status bar (e.g. `"→"`, `"g"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            _ => self.key_name(),
        });
        s
    }

    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&self.key_name());
        s
    }

    fn key_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        }
    }

    /// Parse a key string like `"Ctrl+c"`, `"Right"`, `"l"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Wheel input steps whole sections instead of scrolling freely.
    pub snap_navigation: bool,
    /// Window after a snap during which wheel input is ignored.
    pub cooldown_ms: u64,
    /// Minimum wheel magnitude that counts as a snap gesture.
    pub wheel_threshold: f64,
    /// Units of scroll produced by one terminal wheel notch.
    pub wheel_step: f64,
    /// How far beyond the viewport edges photos start revealing.
    pub reveal_margin: f64,
    /// Treat input as touch-primary (wider center band).
    pub touch_primary: bool,
    /// Terminals narrower than this many columns use the narrow layout.
    pub narrow_width: u16,
    /// Photo id for the cover; overrides the manifest.
    pub hero: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            snap_navigation: false,
            cooldown_ms: 700,
            wheel_threshold: DEFAULT_NOISE_THRESHOLD,
            wheel_step: 60.0,
            reveal_margin: DEFAULT_REVEAL_MARGIN,
            touch_primary: false,
            narrow_width: 100,
            hero: None,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(Prev, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(Next, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(ToCover, vec![KeyBind::new(Home, n)]);
        m.insert(ToGallery, vec![KeyBind::new(Char('g'), n), KeyBind::new(Down, n)]);
        m.insert(Open, vec![KeyBind::new(Enter, n), KeyBind::new(Char(' '), n)]);
        m.insert(ToggleSnap, vec![KeyBind::new(Char('s'), n)]);
        m.insert(ToggleTouch, vec![KeyBind::new(Char('t'), n)]);
        m.insert(Reload, vec![KeyBind::new(Char('r'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action for a key event.  With overlapping bindings the one
    /// with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Status-bar hint built from the current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: move | {}: open | {}: snap | {}: quit",
            self.short_binding(Action::Prev),
            self.short_binding(Action::Next),
            self.short_binding(Action::Open),
            self.short_binding(Action::ToggleSnap),
            self.short_binding(Action::Quit),
        )
    }

    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            snap_navigation: self.snap_navigation,
            snap: SnapConfig {
                cooldown: Duration::from_millis(self.cooldown_ms),
                noise_threshold: self.wheel_threshold,
            },
            reveal_margin: self.reveal_margin,
            input_profile: if self.touch_primary {
                InputProfile::Touch
            } else {
                InputProfile::Pointer
            },
        }
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "snap_navigation" => config.snap_navigation = value == "true",
                "touch_primary" => config.touch_primary = value == "true",
                "cooldown_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.cooldown_ms = v.clamp(100, 3000);
                    }
                }
                "wheel_threshold" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.wheel_threshold = v.max(0.0);
                    }
                }
                "wheel_step" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.wheel_step = v.max(1.0);
                    }
                }
                "reveal_margin" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.reveal_margin = v.max(0.0);
                    }
                }
                "narrow_width" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.narrow_width = v;
                    }
                }
                "hero" if !value.is_empty() => config.hero = Some(value.to_string()),
                _ => {
                    let Some(action) = Action::from_config_key(key) else {
                        continue;
                    };
                    let parsed: Vec<KeyBind> = value
                        .split(',')
                        .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                        .collect();
                    if !parsed.is_empty() {
                        config.bindings.insert(action, parsed);
                    }
                }
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# strip-gallery configuration".to_string(),
            String::new(),
            "# Navigation".to_string(),
            format!("snap_navigation = {}", self.snap_navigation),
            format!("cooldown_ms = {}", self.cooldown_ms),
            format!("wheel_threshold = {}", self.wheel_threshold),
            format!("wheel_step = {}", self.wheel_step),
            format!("reveal_margin = {}", self.reveal_margin),
            format!("touch_primary = {}", self.touch_primary),
            format!("narrow_width = {}", self.narrow_width),
        ];
        if let Some(hero) = &self.hero {
            lines.push(format!("hero = {hero}"));
        }
        lines.extend([
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            String::new(),
        ]);

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/strip-gallery/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("strip-gallery").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_bindings_match() {
        let c = AppConfig::default();
        assert_eq!(c.match_key(key(KeyCode::Right)), Some(Action::Next));
        assert_eq!(c.match_key(key(KeyCode::Char('g'))), Some(Action::ToGallery));
        assert_eq!(c.match_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn parse_reads_tuning_and_clamps() {
        let c = AppConfig::parse(
            "snap_navigation = true\ncooldown_ms = 50\nnarrow_width = 80\nhero = \"a.jpg\"\n",
        );
        assert!(c.snap_navigation);
        assert_eq!(c.cooldown_ms, 100);
        assert_eq!(c.narrow_width, 80);
        assert_eq!(c.hero.as_deref(), Some("a.jpg"));
        assert_eq!(c.engine_config().snap.cooldown, Duration::from_millis(100));
    }

    #[test]
    fn parse_rebinds_actions() {
        let c = AppConfig::parse("next = Ctrl+n, PageDown\nquit = nonsense+x\n");
        assert_eq!(
            c.bindings[&Action::Next],
            vec![
                KeyBind::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
                KeyBind::new(KeyCode::PageDown, KeyModifiers::NONE),
            ]
        );
        // Unparseable value keeps the default.
        assert_eq!(c.bindings[&Action::Quit], AppConfig::default_bindings()[&Action::Quit]);
    }

    #[test]
    fn serialise_then_parse_keeps_settings() {
        let mut c = AppConfig::default();
        c.snap_navigation = true;
        c.touch_primary = true;
        c.wheel_step = 42.0;
        let back = AppConfig::parse(&c.serialise());
        assert!(back.snap_navigation);
        assert!(back.touch_primary);
        assert_eq!(back.wheel_step, 42.0);
        assert_eq!(back.bindings, c.bindings);
        assert_eq!(back.engine_config().input_profile, InputProfile::Touch);
    }
}
