//! Playback state store.
//!
//! Holds the active episode queue, the current index and the play/loop/shuffle flags.
//! All mutation goes through the methods here; the store is owned by the caller and
//! passed explicitly to whatever needs it.
//!
//! Invariants:
//! - `current_episode_index < episode_list.len()` whenever the queue is non-empty.
//! - With an empty queue, `is_playing`, `is_looping` and `is_shuffling` are all false.

use podcast_types::Episode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Rejected queue replacement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("cannot start playback from an empty episode list")]
    EmptyQueue,
    #[error("episode index {index} is out of range for a queue of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Comparable copy of the observable store state.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub episode_list: Vec<Episode>,
    pub current_episode_index: usize,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
}

/// Identifies one selection of the current episode.
///
/// Bumped every time the store points at a (possibly identical) episode anew, so a
/// shuffle pick of the current index still counts as a fresh selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionId(u64);

impl std::fmt::Display for SelectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct PlayerStore {
    episode_list: Vec<Episode>,
    current_episode_index: usize,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    selection: SelectionId,
    rng: StdRng,
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore {
    /// Empty store with an entropy-seeded shuffle source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Empty store with a deterministic shuffle source.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            episode_list: Vec::new(),
            current_episode_index: 0,
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
            selection: SelectionId::default(),
            rng,
        }
    }

    pub fn episode_list(&self) -> &[Episode] {
        &self.episode_list
    }

    pub fn current_episode_index(&self) -> usize {
        self.current_episode_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.episode_list.get(self.current_episode_index)
    }

    pub fn is_empty(&self) -> bool {
        self.episode_list.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn selection(&self) -> SelectionId {
        self.selection
    }

    pub fn has_previous(&self) -> bool {
        self.current_episode_index > 0
    }

    /// Shuffling always has a next episode, since any episode is eligible.
    pub fn has_next(&self) -> bool {
        self.is_shuffling || self.current_episode_index + 1 < self.episode_list.len()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            episode_list: self.episode_list.clone(),
            current_episode_index: self.current_episode_index,
            is_playing: self.is_playing,
            is_looping: self.is_looping,
            is_shuffling: self.is_shuffling,
        }
    }

    /// Replace the queue with a single episode and start playing it.
    ///
    /// Playing the episode that is already the whole queue only resumes it.
    pub fn play(&mut self, episode: Episode) {
        if self.is_current(std::slice::from_ref(&episode), 0) {
            tracing::debug!(episode_id = %episode.id, "episode already selected; resuming");
            self.is_playing = true;
            return;
        }
        tracing::info!(episode_id = %episode.id, "play episode");
        self.episode_list = vec![episode];
        self.select(0);
        self.is_playing = true;
    }

    /// Replace the queue with `list`, pointing at `index`.
    ///
    /// The same queue at the same index keeps the current selection and only sets the
    /// play flag. On error the store is left untouched.
    pub fn play_list(
        &mut self,
        list: Vec<Episode>,
        index: usize,
        is_play: bool,
    ) -> Result<(), PlaybackError> {
        if list.is_empty() {
            tracing::warn!(index, "play_list called with an empty list");
            return Err(PlaybackError::EmptyQueue);
        }
        if index >= list.len() {
            tracing::warn!(index, len = list.len(), "play_list index out of range");
            return Err(PlaybackError::IndexOutOfRange {
                index,
                len: list.len(),
            });
        }
        if self.is_current(&list, index) {
            tracing::debug!(index, is_play, "queue already selected");
            self.is_playing = is_play;
            return Ok(());
        }
        tracing::info!(
            len = list.len(),
            index,
            episode_id = %list[index].id,
            is_play,
            "play list"
        );
        self.episode_list = list;
        self.select(index);
        self.is_playing = is_play;
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        self.set_play_state(!self.is_playing);
    }

    /// Set the playing flag from an authoritative source (the audio resource).
    pub fn set_play_state(&mut self, state: bool) {
        if state && self.is_empty() {
            tracing::warn!("ignoring play request with an empty queue");
            return;
        }
        if self.is_playing != state {
            tracing::debug!(is_playing = state, "play state changed");
        }
        self.is_playing = state;
    }

    pub fn toggle_loop(&mut self) {
        if self.is_empty() {
            tracing::warn!("ignoring loop toggle with an empty queue");
            return;
        }
        self.is_looping = !self.is_looping;
        tracing::debug!(is_looping = self.is_looping, "loop toggled");
    }

    pub fn toggle_shuffle(&mut self) {
        if self.is_empty() {
            tracing::warn!("ignoring shuffle toggle with an empty queue");
            return;
        }
        self.is_shuffling = !self.is_shuffling;
        tracing::debug!(is_shuffling = self.is_shuffling, "shuffle toggled");
    }

    /// Advance the queue. Returns `true` when a new selection was made.
    ///
    /// With shuffle on, any index (including the current one) may be picked.
    pub fn play_next(&mut self) -> bool {
        if self.is_empty() {
            tracing::warn!("play_next called with an empty queue");
            return false;
        }
        if self.is_shuffling {
            let next = self.rng.gen_range(0..self.episode_list.len());
            tracing::debug!(from = self.current_episode_index, to = next, "shuffle pick");
            self.select(next);
            return true;
        }
        if self.has_next() {
            self.select(self.current_episode_index + 1);
            return true;
        }
        false
    }

    /// Step back one episode. Returns `true` when the selection moved.
    pub fn play_previous(&mut self) -> bool {
        if self.is_empty() {
            tracing::warn!("play_previous called with an empty queue");
            return false;
        }
        if !self.has_previous() {
            return false;
        }
        self.select(self.current_episode_index - 1);
        true
    }

    /// Clear the queue and every flag.
    pub fn stop(&mut self) {
        if !self.is_empty() {
            tracing::info!("stop playback");
        }
        self.episode_list.clear();
        self.current_episode_index = 0;
        self.is_playing = false;
        self.is_looping = false;
        self.is_shuffling = false;
    }

    fn is_current(&self, list: &[Episode], index: usize) -> bool {
        !self.is_empty() && self.current_episode_index == index && self.episode_list == list
    }

    fn select(&mut self, index: usize) {
        self.current_episode_index = index;
        self.selection = SelectionId(self.selection.0.wrapping_add(1));
    }
}
