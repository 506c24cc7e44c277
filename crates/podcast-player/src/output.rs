//! The audio resource seam.
//!
//! An [`AudioOutput`] accepts commands and reports what actually happened through
//! [`AudioEvent`]s delivered back to the event loop. Commands never fail synchronously;
//! a resource that cannot honor one reports [`AudioEventKind::Error`].

use crate::store::SelectionId;

/// Media to load into the resource.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaRequest {
    /// Selection the media belongs to; echoed back on every event.
    pub id: SelectionId,
    pub url: String,
    pub media_type: String,
    /// Duration declared by the API, in seconds.
    pub declared_duration: u64,
    /// Start playing as soon as the media is ready.
    pub autoplay: bool,
    /// Restart at the end instead of reporting [`AudioEventKind::Ended`].
    pub looping: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioEventKind {
    /// Media decoded and ready; `duration` in seconds when the resource knows it.
    LoadedMetadata { duration: Option<f64> },
    /// Playback position, in seconds.
    TimeUpdate { current_time: f64 },
    Play,
    Pause,
    /// Natural end of a non-looping media.
    Ended,
    Error(String),
}

/// An event emitted by the resource for a specific loaded media.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioEvent {
    pub media: SelectionId,
    pub kind: AudioEventKind,
}

impl AudioEvent {
    pub fn new(media: SelectionId, kind: AudioEventKind) -> Self {
        Self { media, kind }
    }
}

/// Handle to a single audio output resource.
pub trait AudioOutput {
    /// Replace the current media.
    fn load(&mut self, request: MediaRequest);
    /// Drop the current media, if any.
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playback position, in seconds.
    fn set_current_time(&mut self, seconds: f64);
    fn set_looping(&mut self, looping: bool);
}

impl<T: AudioOutput + ?Sized> AudioOutput for Box<T> {
    fn load(&mut self, request: MediaRequest) {
        (**self).load(request);
    }

    fn unload(&mut self) {
        (**self).unload();
    }

    fn play(&mut self) {
        (**self).play();
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn set_current_time(&mut self, seconds: f64) {
        (**self).set_current_time(seconds);
    }

    fn set_looping(&mut self, looping: bool) {
        (**self).set_looping(looping);
    }
}
