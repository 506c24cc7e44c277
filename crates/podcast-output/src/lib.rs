//! Device-backed audio resource for the player view.
//!
//! [`DeviceOutput`] owns a rodio output stream on a dedicated thread. Commands travel
//! over a channel; [`podcast_player::AudioEvent`]s come back on the receiver returned by
//! [`DeviceOutput::spawn`].

pub mod config;
pub mod device;
mod fetch;

pub use config::OutputConfig;
pub use device::DeviceOutput;
