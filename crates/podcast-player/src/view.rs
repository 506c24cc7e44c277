//! Player view: binds one [`AudioOutput`] to a [`PlayerStore`].
//!
//! The view is driven from a single event loop:
//! 1. after any store mutation the loop calls [`PlayerView::reconcile`], which issues the
//!    audio commands needed to match the store (load/unload, play/pause, looping);
//! 2. events coming back from the resource go through [`PlayerView::handle_event`], which
//!    updates the displayed progress and feeds play/pause/end back into the store.
//!
//! The view remembers which state it already applied, so each store transition turns into
//! exactly one audio command and event-sourced changes are not echoed back to the resource.

use podcast_types::format::duration_to_time_string;

use crate::output::{AudioEvent, AudioEventKind, AudioOutput, MediaRequest};
use crate::store::{PlayerStore, SelectionId};

const TITLE_PREFIX: &str = "Podcastr";

/// Coarse player state derived from the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerPhase {
    Empty,
    Loaded { playing: bool },
}

/// Visual state of one player button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    /// Toggled look (shuffle/loop on, or pause shown on the play button).
    pub active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub shuffle: ControlState,
    pub previous: ControlState,
    pub play_pause: ControlState,
    pub next: ControlState,
    pub repeat: ControlState,
}

pub struct PlayerView<A: AudioOutput> {
    audio: A,
    loaded: Option<SelectionId>,
    applied_playing: bool,
    applied_looping: bool,
    listening: bool,
    progress: u64,
    last_error: Option<String>,
}

impl<A: AudioOutput> PlayerView<A> {
    pub fn new(audio: A) -> Self {
        Self {
            audio,
            loaded: None,
            applied_playing: false,
            applied_looping: false,
            listening: false,
            progress: 0,
            last_error: None,
        }
    }

    /// Selection currently loaded into the resource.
    pub fn loaded_media(&self) -> Option<SelectionId> {
        self.loaded
    }

    /// Elapsed whole seconds shown in the UI.
    pub fn progress(&self) -> u64 {
        self.progress
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn phase(&self, store: &PlayerStore) -> PlayerPhase {
        if store.current_episode().is_none() {
            PlayerPhase::Empty
        } else {
            PlayerPhase::Loaded {
                playing: store.is_playing(),
            }
        }
    }

    /// Bring the audio resource in line with `store`.
    pub fn reconcile(&mut self, store: &PlayerStore) {
        let Some(episode) = store.current_episode() else {
            if self.loaded.take().is_some() {
                tracing::debug!("queue emptied; unloading media");
                self.audio.unload();
            }
            self.reset_media();
            self.applied_playing = false;
            self.applied_looping = false;
            return;
        };

        let selection = store.selection();
        if self.loaded != Some(selection) {
            tracing::info!(
                episode_id = %episode.id,
                selection = %selection,
                autoplay = store.is_playing(),
                "loading episode media"
            );
            self.reset_media();
            self.audio.load(MediaRequest {
                id: selection,
                url: episode.file.url.clone(),
                media_type: episode.file.media_type.clone(),
                declared_duration: episode.file.duration,
                autoplay: store.is_playing(),
                looping: store.is_looping(),
            });
            self.loaded = Some(selection);
            self.applied_playing = store.is_playing();
            self.applied_looping = store.is_looping();
            return;
        }

        if self.applied_playing != store.is_playing() {
            self.applied_playing = store.is_playing();
            if self.applied_playing {
                self.audio.play();
            } else {
                self.audio.pause();
            }
        }
        if self.applied_looping != store.is_looping() {
            self.applied_looping = store.is_looping();
            self.audio.set_looping(self.applied_looping);
        }
    }

    /// Apply an event reported by the audio resource.
    ///
    /// Events for media other than the loaded one are dropped.
    pub fn handle_event(&mut self, store: &mut PlayerStore, event: AudioEvent) {
        if self.loaded != Some(event.media) {
            tracing::trace!(media = %event.media, kind = ?event.kind, "dropping stale audio event");
            return;
        }
        match event.kind {
            AudioEventKind::LoadedMetadata { duration } => {
                tracing::debug!(media = %event.media, ?duration, "media ready");
                self.audio.set_current_time(0.0);
                self.progress = 0;
                self.listening = true;
                self.last_error = None;
            }
            AudioEventKind::TimeUpdate { current_time } => {
                if self.listening && current_time.is_finite() {
                    self.progress = current_time.max(0.0).floor() as u64;
                }
            }
            AudioEventKind::Play => {
                store.set_play_state(true);
                self.applied_playing = store.is_playing();
            }
            AudioEventKind::Pause => {
                store.set_play_state(false);
                self.applied_playing = false;
            }
            AudioEventKind::Ended => self.handle_ended(store),
            AudioEventKind::Error(message) => {
                tracing::warn!(media = %event.media, error = %message, "audio resource error");
                self.last_error = Some(message);
            }
        }
    }

    /// Natural end of the current episode: advance when possible, otherwise stop.
    pub fn handle_ended(&mut self, store: &mut PlayerStore) {
        if store.has_next() {
            store.play_next();
        } else {
            store.stop();
        }
        self.reconcile(store);
    }

    /// Jump to `amount` seconds, clamped to the episode's declared duration.
    ///
    /// The displayed progress updates immediately.
    pub fn handle_seek(&mut self, store: &PlayerStore, amount: f64) {
        let Some(episode) = store.current_episode() else {
            return;
        };
        if self.loaded.is_none() || !amount.is_finite() {
            return;
        }
        let target = amount.clamp(0.0, episode.file.duration as f64);
        self.audio.set_current_time(target);
        self.progress = target.floor() as u64;
    }

    /// Seek relative to the displayed progress.
    pub fn seek_by(&mut self, store: &PlayerStore, delta_seconds: i64) {
        let target = self.progress as f64 + delta_seconds as f64;
        self.handle_seek(store, target);
    }

    /// Progress as a `[0, 1]` ratio of the declared duration.
    pub fn progress_ratio(&self, store: &PlayerStore) -> Option<f64> {
        let duration = store.current_episode()?.file.duration;
        if duration == 0 {
            return Some(0.0);
        }
        Some((self.progress as f64 / duration as f64).clamp(0.0, 1.0))
    }

    pub fn controls(&self, store: &PlayerStore) -> Controls {
        let has_episode = store.current_episode().is_some();
        Controls {
            shuffle: ControlState {
                enabled: has_episode && store.episode_list().len() != 1,
                active: store.is_shuffling(),
            },
            previous: ControlState {
                enabled: has_episode && store.has_previous(),
                active: false,
            },
            play_pause: ControlState {
                enabled: has_episode,
                active: store.is_playing(),
            },
            next: ControlState {
                enabled: has_episode && store.has_next(),
                active: false,
            },
            repeat: ControlState {
                enabled: has_episode,
                active: store.is_looping(),
            },
        }
    }

    /// Window title: elapsed time and episode title, or `Stop` when idle.
    pub fn title(&self, store: &PlayerStore) -> String {
        match store.current_episode() {
            Some(episode) => format!(
                "{TITLE_PREFIX} | {} - {}",
                duration_to_time_string(self.progress),
                episode.title
            ),
            None => format!("{TITLE_PREFIX} | Stop"),
        }
    }

    fn reset_media(&mut self) {
        self.progress = 0;
        self.listening = false;
        self.last_error = None;
    }
}
