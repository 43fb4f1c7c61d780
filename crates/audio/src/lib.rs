//! InstaVid Audio
//!
//! Synthetic sound effects, no samples on disk:
//! - **Tones:** exponentially swept sine keystroke blips
//! - **Tracks:** mono PCM buffers with additive mixing and WAV output
//! - **Typing track:** one keystroke per revealed character of every
//!   typewriter-animated text element, laid out for export

pub mod tone;
pub mod track;
pub mod typing;

pub use tone::*;
pub use track::*;
pub use typing::*;

/// Sample rate used for every generated buffer.
pub const SAMPLE_RATE: u32 = 48_000;
