//! InstaVid Render Engine
//!
//! Turns an element list into pixels, one timeline instant at a time, and
//! drives those renders into video files.
//!
//! # Pipeline Architecture
//!
//! ```text
//! elements ──► animation::resolve (curve, progress, eased)
//!                      │
//!                      ▼
//!              paint::paint_element ──► dyn Surface
//!                                        ├── RasterSurface   (pixels)
//!                                        └── RecordingSurface (draw ops)
//!
//! export:  k / fps ──► FrameRenderer ──► PNG buffer ──► EncoderSink
//!                                                       ├── FfmpegSink
//!                                                       └── PngSequenceSink
//! ```

pub mod animation;
pub mod easing;
pub mod export;
pub mod ffmpeg;
pub mod geometry;
pub mod paint;
pub mod raster;
pub mod recording;
pub mod renderer;
pub mod sink;
pub mod surface;

pub use animation::{resolve, AnimationFrame, VisualTransform};
pub use export::*;
pub use ffmpeg::{command_exists, FfmpegSink};
pub use raster::{FontBook, RasterSurface};
pub use recording::{DrawCommand, DrawOp, RecordingSurface};
pub use renderer::*;
pub use sink::{EncoderSink, MemorySink, PngSequenceSink, StreamSpec};
pub use surface::Surface;
