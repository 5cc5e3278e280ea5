//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, status bar and overlays
//! - `map`: the map canvas with tile grid and markers
//! - `favorites`: the favorites panel
//! - `input`: keyboard and mouse handling
//! - `styles`: color scheme and text styling

pub mod favorites;
pub mod input;
pub mod map;
pub mod render;
pub mod styles;
