//! Core engine – section registry, overlap observation, reveal/center
//! tracking, scroll progress, and snap navigation.
//!
//! Nothing in this module depends on any TUI or rendering crate.  All state
//! is owned by a [`viewport::ViewportEngine`] and driven by discrete events.

pub mod center;
pub mod geometry;
pub mod observer;
pub mod photo;
pub mod progress;
pub mod registry;
pub mod reveal;
pub mod snap;
pub mod viewport;
