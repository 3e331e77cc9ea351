//! TUI Module - the interactive control panel
//!
//! - event_loop: terminal setup, key and response dispatch
//! - input: key bindings
//! - layout: panel rectangles
//! - render: drawing the panel
//! - heatmap: half-block heatmap rendering
//! - utils: help overlay and helpers

mod event_loop;
mod heatmap;
mod input;
mod layout;
mod render;
mod utils;

pub use event_loop::run;
pub use heatmap::heatmap_lines;
pub use input::{handle_key, KeyCommand};
pub use render::draw_ui;
