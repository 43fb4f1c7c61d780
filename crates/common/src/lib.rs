//! InstaVid Common Utilities
//!
//! Shared infrastructure for all InstaVid crates:
//! - Error types and result aliases
//! - Wall clocks for playback and tick pacing
//! - Seedable random source for jittery animations
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod rng;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use rng::SeededRng;
