//! A horizontally scrolling photo strip for the terminal.
//!
//! Run the binary with a directory of images.  Photos reveal as they
//! approach the viewport, the centered one is emphasised, and with `--snap`
//! the wheel steps one photo at a time.

mod app;
mod catalog;
mod config;
mod core;
mod error;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Terminal};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    image_runtime::{self, ThumbnailLoaded},
    state::AppState,
};
use crate::ui::{detail::DetailWidget, layout::AppLayout, strip::StripWidget, theme::Theme};

/// Poll interval of the event reader; also the animation frame interval.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Horizontally scrolling photo strip")]
struct Cli {
    /// Directory of images (defaults to `.`).
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Step one photo per wheel gesture instead of scrolling freely.
    #[arg(long)]
    snap: bool,

    /// Use the wider center band meant for touch input.
    #[arg(long)]
    touch: bool,

    /// File name of the photo shown on the cover.
    #[arg(long)]
    hero: Option<String>,

    /// Title shown over the cover (defaults to the directory name).
    #[arg(long)]
    title: Option<String>,

    /// Write the effective configuration to the config file and exit.
    #[arg(long = "write-config")]
    write_config: bool,
}

fn status_text(state: &AppState) -> String {
    let total = state.engine.photos().len();
    let position = match state.current_section() {
        0 => "cover".to_string(),
        i => format!("{i}/{total}"),
    };
    let mode = match (state.engine.snap_active(), state.engine.snap_cooling_down()) {
        (true, true) => "snap ·",
        (true, false) => "snap",
        (false, _) => "free",
    };
    let hint = state.config.status_bar_hint();
    let message = state.status_message.as_deref().unwrap_or(&hint);
    format!(" {position} │ {mode} │ {message}")
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    let mut config = config::AppConfig::load();
    config.snap_navigation |= cli.snap;
    config.touch_primary |= cli.touch;
    if cli.hero.is_some() {
        config.hero = cli.hero;
    }

    if cli.write_config {
        config.save()?;
        return Ok(());
    }

    // ── load the collection ───────────────────────────────────
    let catalog = catalog::load(&cli.path)?;
    let title = cli.title.unwrap_or_else(|| {
        catalog
            .root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "Gallery".to_string())
    });
    let mut state = AppState::new(catalog, config);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(FRAME_INTERVAL);
    let (thumb_tx, mut thumb_rx) = tokio::sync::mpsc::unbounded_channel::<ThumbnailLoaded>();

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());
            state.resize(layout.strip_area);

            let subtitle = format!("{} photographs", state.engine.photos().len());
            let hits = StripWidget {
                engine: &state.engine,
                offset: state.scroll.offset(),
                hero: state.hero(),
                title: &title,
                subtitle: &subtitle,
                thumbnails: &state.thumbnails,
            }
            .render_and_hit(layout.strip_area, frame.buffer_mut());
            state.strip_hits = hits;

            let status = Paragraph::new(status_text(&state)).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);

            if let Some(detail) = state.detail.as_ref() {
                let area = frame.area();
                let zones = DetailWidget {
                    overlay: detail,
                    thumbnails: &state.thumbnails,
                    failed: state.failed_thumbnails(),
                }
                .render_and_hit(area, frame.buffer_mut());
                state.detail_hit_zones = Some(zones);
            }
        })?;

        // Decode whatever became visible during the last frame.
        for path in state.take_thumbnail_requests() {
            image_runtime::spawn_thumbnail(thumb_tx.clone(), state.collection_generation, path);
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(_, _) | AppEvent::Tick => {}
                }
            }

            Some(loaded) = thumb_rx.recv() => {
                state.on_thumbnail(loaded);
                // Batch-drain everything already decoded before redrawing.
                while let Ok(more) = thumb_rx.try_recv() {
                    state.on_thumbnail(more);
                }
            }
        }

        if state.should_quit {
            break;
        }
        state.tick(Instant::now());
    }

    // ── teardown ──────────────────────────────────────────────
    tracing::debug!(
        "shutting down with {} live subscriptions",
        state.engine.subscription_count()
    );
    state.engine.unmount();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
