//! InstaVid Editor
//!
//! The editing session as an explicit context object:
//! - **State:** ordered element list, selection, timeline duration, background
//! - **History:** bounded undo/redo over element-list snapshots
//! - **Playback:** wall-clock driven timeline position
//! - **Events:** typed change notifications with disposable subscriptions
//!
//! Rendering and export are delegated to `instavid-render-engine`.

pub mod error;
pub mod events;
pub mod history;
pub mod playback;
pub mod state;

pub use error::{EditorError, EditorResult};
pub use events::{EditorEvent, EventBus, Subscription};
pub use history::{History, HISTORY_LIMIT};
pub use playback::{PlaybackClock, PlaybackState, Tick};
pub use state::{EditorState, Reorder};
