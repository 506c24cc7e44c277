use std::time::Duration;

/// Tuning for the output thread.
#[derive(Clone, Debug)]
pub struct OutputConfig {
    /// Interval between progress reports while playing.
    pub tick: Duration,
    /// Largest media body accepted when loading an episode.
    pub max_media_bytes: u64,
    /// Limit for opening a connection to the media host.
    pub connect_timeout: Duration,
    /// Limit for the media host to start answering.
    pub response_timeout: Duration,
    /// How long dropping the output waits for its thread before detaching it.
    pub quit_grace: Duration,
}

impl Default for OutputConfig {
    /// Progress at the cadence of an HTML media element's `timeupdate`.
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            max_media_bytes: 512 * 1024 * 1024,
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(30),
            quit_grace: Duration::from_secs(2),
        }
    }
}
