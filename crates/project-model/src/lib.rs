//! InstaVid Project Model
//!
//! Defines the data contracts shared by the editor, renderer and exporter:
//! - **Elements:** positioned, timed, styled canvas objects and their patches
//! - **Animation:** the named entrance curves
//! - **Color:** CSS-style color parsing
//! - **Scene:** background, export settings and scene files
//!
//! All element coordinates live in a fixed 1080×1920 logical canvas; output
//! resolution is applied at render time.

pub mod animation;
pub mod color;
pub mod defaults;
pub mod element;
pub mod scene;

pub use animation::*;
pub use color::*;
pub use element::*;
pub use scene::*;
