//! Playback core: the episode queue store and the view that binds it to an audio resource.

pub mod output;
pub mod store;
pub mod view;

pub use output::{AudioEvent, AudioEventKind, AudioOutput, MediaRequest};
pub use store::{PlaybackError, PlaybackSnapshot, PlayerStore, SelectionId};
pub use view::{ControlState, Controls, PlayerPhase, PlayerView};
