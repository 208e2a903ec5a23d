//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the engine's read side and turns it into cells on the
//! terminal.  No filesystem I/O happens here.

pub mod detail;
pub mod halfblock;
pub mod layout;
pub mod smooth_scroll;
pub mod strip;
pub mod theme;
