//! Location search TUI
//!
//! Pick a place from recent history or a live geocoding search; the choice is
//! remembered and printed as JSON when the screen closes.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod history;
pub mod logging;
pub mod reducer;
pub mod service;
pub mod state;
