//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a blocking reader on
//! the runtime's blocking pool that forwards them over a channel, so the main
//! loop stays non-blocking.  A `Tick` is sent whenever the terminal stays
//! quiet for one frame interval; the strip animates on those ticks.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Spawns the reader and returns the receiving end.  The reader stops once
/// the receiver is dropped.
pub fn spawn_event_reader(frame_interval: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let app_event = match event::poll(frame_interval) {
            Ok(true) => match event::read() {
                Ok(CtEvent::Key(k)) => AppEvent::Key(k),
                // Plain pointer motion carries nothing the strip reacts to.
                Ok(CtEvent::Mouse(m)) if m.kind == MouseEventKind::Moved => continue,
                Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                _ => continue,
            },
            Ok(false) => AppEvent::Tick,
            Err(e) => {
                tracing::warn!("terminal event poll failed: {e}");
                break;
            }
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}
