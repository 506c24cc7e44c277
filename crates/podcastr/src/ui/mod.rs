//! Ratatui UI loop.
//!
//! Keys:
//! - Up/Down: move selection (scroll on the episode page)
//! - Enter: play the listed episodes from the selected one
//! - i: open the episode page, p: play it, Esc/Backspace: back
//! - Space: play/pause, n/b: next/previous, r: loop, s: shuffle, x: stop
//! - Left/Right: seek (Shift for a longer jump)
//! - g: reload episodes, L: logs, h: help, q: quit

mod app;
mod render;
mod view_model;

pub(crate) use app::run_tui;
