//! Model types for beo-state

mod listening_mode;
mod metadata;
mod playback_state;
mod progress;
mod source;
mod volume;

pub use listening_mode::ListeningMode;
pub use metadata::Metadata;
pub use playback_state::PlaybackState;
pub use progress::Progress;
pub use source::{KnownSource, KnownSources, SourceRef};
pub use volume::Volume;
