//! Output thread driving a rodio sink.
//!
//! The output stream is not `Send`, so it is created and kept on the worker thread. The
//! thread handles one command at a time. Every `load`, `unload` and drop bumps a shared
//! generation counter; a queued load from an older generation is skipped, and a download
//! in progress stops at the next chunk once its generation is stale.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use podcast_player::{AudioEvent, AudioEventKind, AudioOutput, MediaRequest, SelectionId};

use crate::config::OutputConfig;
use crate::fetch::{MediaLocation, fetch_media, media_agent};

#[derive(Debug, PartialEq)]
enum OutputCommand {
    Load { request: MediaRequest, generation: u64 },
    Unload,
    Play,
    Pause,
    Seek(f64),
    SetLooping(bool),
    Quit,
}

/// Handle for sending playback commands to the output thread.
pub struct DeviceOutput {
    cmd_tx: Sender<OutputCommand>,
    generation: Arc<AtomicU64>,
    /// Disconnects when the worker thread returns.
    exited: Receiver<()>,
    quit_grace: Duration,
    join: Option<JoinHandle<()>>,
}

impl DeviceOutput {
    /// Open the default output device and start the worker thread.
    pub fn spawn(config: OutputConfig) -> Result<(Self, Receiver<AudioEvent>)> {
        let (cmd_tx, cmd_rx) = unbounded::<OutputCommand>();
        let (evt_tx, evt_rx) = unbounded::<AudioEvent>();
        let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);
        let (exit_tx, exited) = bounded::<()>(0);
        let generation = Arc::new(AtomicU64::new(0));
        let worker_generation = Arc::clone(&generation);
        let quit_grace = config.quit_grace;

        let join = std::thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let _exit = exit_tx;
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        pair
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                OutputWorker::new(RodioSinks { handle }, config, evt_tx, worker_generation)
                    .run(cmd_rx);
            })
            .context("spawn audio output thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = join.join();
                return Err(anyhow!("open default audio output: {e}"));
            }
            Err(_) => return Err(anyhow!("audio output thread exited during startup")),
        }
        tracing::info!("audio output ready");

        Ok((
            Self {
                cmd_tx,
                generation,
                exited,
                quit_grace,
                join: Some(join),
            },
            evt_rx,
        ))
    }

    fn send(&self, cmd: OutputCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("audio output thread is not running");
        }
    }

    /// Invalidate every load sent so far and return the new generation.
    fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl AudioOutput for DeviceOutput {
    fn load(&mut self, request: MediaRequest) {
        let generation = self.supersede();
        self.send(OutputCommand::Load {
            request,
            generation,
        });
    }

    fn unload(&mut self) {
        self.supersede();
        self.send(OutputCommand::Unload);
    }

    fn play(&mut self) {
        self.send(OutputCommand::Play);
    }

    fn pause(&mut self) {
        self.send(OutputCommand::Pause);
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.send(OutputCommand::Seek(seconds));
    }

    fn set_looping(&mut self, looping: bool) {
        self.send(OutputCommand::SetLooping(looping));
    }
}

impl Drop for DeviceOutput {
    fn drop(&mut self) {
        self.supersede();
        let _ = self.cmd_tx.send(OutputCommand::Quit);
        let Some(join) = self.join.take() else {
            return;
        };
        match self.exited.recv_timeout(self.quit_grace) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    grace_ms = self.quit_grace.as_millis() as u64,
                    "audio output thread still busy; detaching it"
                );
            }
            _ => {
                let _ = join.join();
            }
        }
    }
}

/// Playback handle for one decoded media.
trait MediaSink {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    /// `true` once the decoded media has played out.
    fn is_drained(&self) -> bool;
    fn position(&self) -> Duration;
    fn seek(&self, to: Duration) -> Result<()>;
}

impl MediaSink for Sink {
    fn play(&self) {
        Sink::play(self);
    }

    fn pause(&self) {
        Sink::pause(self);
    }

    fn stop(&self) {
        Sink::stop(self);
    }

    fn is_drained(&self) -> bool {
        self.empty()
    }

    fn position(&self) -> Duration {
        self.get_pos()
    }

    fn seek(&self, to: Duration) -> Result<()> {
        self.try_seek(to).map_err(|e| anyhow!("seek to {to:?}: {e}"))
    }
}

/// Opens sinks for fetched media.
trait SinkFactory {
    type Sink: MediaSink;

    /// Decode `bytes` into a fresh, paused sink, with the decoded duration when known.
    fn open(&self, bytes: &Arc<[u8]>) -> Result<(Self::Sink, Option<Duration>)>;
}

struct RodioSinks {
    handle: OutputStreamHandle,
}

impl SinkFactory for RodioSinks {
    type Sink = Sink;

    fn open(&self, bytes: &Arc<[u8]>) -> Result<(Sink, Option<Duration>)> {
        let source = Decoder::new(Cursor::new(Arc::clone(bytes))).context("decode media")?;
        let duration = source.total_duration();
        let sink = Sink::try_new(&self.handle).context("create audio sink")?;
        sink.pause();
        sink.append(source);
        Ok((sink, duration))
    }
}

/// Duration reported with `LoadedMetadata`: the decoder's, else the API's when non-zero.
fn reported_duration(decoded: Option<Duration>, declared_secs: u64) -> Option<f64> {
    decoded
        .map(|d| d.as_secs_f64())
        .or((declared_secs > 0).then_some(declared_secs as f64))
}

struct LoadedMedia<S> {
    request: MediaRequest,
    bytes: Arc<[u8]>,
    sink: S,
    ended: bool,
}

struct OutputWorker<F: SinkFactory> {
    sinks: F,
    agent: ureq::Agent,
    config: OutputConfig,
    events: Sender<AudioEvent>,
    generation: Arc<AtomicU64>,
    current: Option<LoadedMedia<F::Sink>>,
    playing: bool,
}

impl<F: SinkFactory> OutputWorker<F> {
    fn new(
        sinks: F,
        config: OutputConfig,
        events: Sender<AudioEvent>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            sinks,
            agent: media_agent(&config),
            config,
            events,
            generation,
            current: None,
            playing: false,
        }
    }

    fn run(mut self, cmd_rx: Receiver<OutputCommand>) {
        let mut last_tick = Instant::now();
        loop {
            let timeout = self.config.tick.saturating_sub(last_tick.elapsed());
            match cmd_rx.recv_timeout(timeout) {
                Ok(OutputCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(cmd) => self.apply(cmd),
                Err(RecvTimeoutError::Timeout) => {}
            }
            if last_tick.elapsed() >= self.config.tick {
                last_tick = Instant::now();
                self.tick();
            }
        }
        self.unload();
        tracing::debug!("audio output thread exiting");
    }

    fn apply(&mut self, cmd: OutputCommand) {
        match cmd {
            OutputCommand::Load {
                request,
                generation,
            } => self.load(request, generation),
            OutputCommand::Unload => self.unload(),
            OutputCommand::Play => self.play(),
            OutputCommand::Pause => self.pause(),
            OutputCommand::Seek(seconds) => self.seek(seconds),
            OutputCommand::SetLooping(looping) => {
                if let Some(current) = self.current.as_mut() {
                    current.request.looping = looping;
                }
            }
            OutputCommand::Quit => {}
        }
    }

    fn emit(&self, media: SelectionId, kind: AudioEventKind) {
        let _ = self.events.send(AudioEvent::new(media, kind));
    }

    fn load(&mut self, request: MediaRequest, generation: u64) {
        self.unload();
        let id = request.id;
        let latest = Arc::clone(&self.generation);
        let superseded = move || latest.load(Ordering::SeqCst) != generation;
        if superseded() {
            tracing::debug!(media = %id, "skipping superseded load");
            return;
        }
        tracing::info!(
            media = %id,
            url = %request.url,
            media_type = %request.media_type,
            "loading media"
        );

        let opened = MediaLocation::parse(&request.url)
            .and_then(|location| {
                fetch_media(
                    &self.agent,
                    &location,
                    self.config.max_media_bytes,
                    &superseded,
                )
            })
            .and_then(|data| {
                let bytes: Arc<[u8]> = data.into();
                let (sink, duration) = self.sinks.open(&bytes)?;
                Ok((bytes, sink, duration))
            });
        let (bytes, sink, duration) = match opened {
            Ok(parts) => parts,
            Err(_) if superseded() => {
                tracing::debug!(media = %id, "load superseded while fetching");
                return;
            }
            Err(e) => {
                tracing::warn!(media = %id, url = %request.url, error = %format!("{e:#}"), "load failed");
                self.emit(id, AudioEventKind::Error(format!("{e:#}")));
                return;
            }
        };

        let duration = reported_duration(duration, request.declared_duration);
        let autoplay = request.autoplay;
        self.current = Some(LoadedMedia {
            request,
            bytes,
            sink,
            ended: false,
        });
        self.emit(id, AudioEventKind::LoadedMetadata { duration });
        if autoplay {
            self.play();
        }
    }

    fn unload(&mut self) {
        if let Some(current) = self.current.take() {
            current.sink.stop();
            tracing::debug!(media = %current.request.id, "media unloaded");
        }
        self.playing = false;
    }

    /// Reopen the media from the start if it already played out.
    fn rewind_if_drained(sinks: &F, current: &mut LoadedMedia<F::Sink>) -> Result<()> {
        if current.ended || current.sink.is_drained() {
            let (sink, _) = sinks.open(&current.bytes)?;
            current.sink = sink;
            current.ended = false;
        }
        Ok(())
    }

    fn play(&mut self) {
        let Some(current) = self.current.as_mut() else {
            tracing::debug!("play ignored without media");
            return;
        };
        let id = current.request.id;
        if let Err(e) = Self::rewind_if_drained(&self.sinks, current) {
            self.emit(id, AudioEventKind::Error(format!("{e:#}")));
            return;
        }
        current.sink.play();
        self.playing = true;
        self.emit(id, AudioEventKind::Play);
    }

    fn pause(&mut self) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        current.sink.pause();
        self.playing = false;
        self.emit(current.request.id, AudioEventKind::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if let Err(e) = Self::rewind_if_drained(&self.sinks, current) {
            tracing::warn!(error = %format!("{e:#}"), "restart for seek failed");
            return;
        }
        let target = seconds.max(0.0);
        if let Err(e) = current.sink.seek(Duration::from_secs_f64(target)) {
            tracing::warn!(seconds, error = %format!("{e:#}"), "seek failed");
            return;
        }
        let id = current.request.id;
        self.emit(id, AudioEventKind::TimeUpdate { current_time: target });
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let id = current.request.id;
        if !current.sink.is_drained() {
            let position = current.sink.position().as_secs_f64();
            self.emit(id, AudioEventKind::TimeUpdate { current_time: position });
            return;
        }

        if current.request.looping {
            match self.sinks.open(&current.bytes) {
                Ok((sink, _)) => {
                    sink.play();
                    current.sink = sink;
                    tracing::debug!(media = %id, "looping media");
                    self.emit(id, AudioEventKind::TimeUpdate { current_time: 0.0 });
                }
                Err(e) => {
                    self.playing = false;
                    self.emit(id, AudioEventKind::Error(format!("{e:#}")));
                }
            }
            return;
        }

        current.ended = true;
        self.playing = false;
        tracing::info!(media = %id, "media ended");
        self.emit(id, AudioEventKind::Ended);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;

    use super::*;

    fn detached() -> (DeviceOutput, Receiver<OutputCommand>) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (_, exited) = bounded(0);
        (
            DeviceOutput {
                cmd_tx,
                generation: Arc::new(AtomicU64::new(0)),
                exited,
                quit_grace: Duration::from_millis(50),
                join: None,
            },
            cmd_rx,
        )
    }

    fn request() -> MediaRequest {
        MediaRequest {
            id: SelectionId::default(),
            url: "file:///tmp/ep.mp3".to_string(),
            media_type: "audio/mpeg".to_string(),
            declared_duration: 90,
            autoplay: true,
            looping: false,
        }
    }

    #[test]
    fn commands_are_forwarded_in_order() {
        let (mut output, cmd_rx) = detached();
        output.load(request());
        output.pause();
        output.set_current_time(12.5);
        output.set_looping(true);
        output.play();
        output.unload();

        let got: Vec<OutputCommand> = cmd_rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                OutputCommand::Load {
                    request: request(),
                    generation: 1
                },
                OutputCommand::Pause,
                OutputCommand::Seek(12.5),
                OutputCommand::SetLooping(true),
                OutputCommand::Play,
                OutputCommand::Unload,
            ]
        );
    }

    #[test]
    fn each_load_supersedes_the_previous_one() {
        let (mut output, cmd_rx) = detached();
        output.load(request());
        output.load(request());
        output.unload();
        let generations: Vec<u64> = cmd_rx
            .try_iter()
            .filter_map(|cmd| match cmd {
                OutputCommand::Load { generation, .. } => Some(generation),
                _ => None,
            })
            .collect();
        assert_eq!(generations, vec![1, 2]);
        assert_eq!(output.generation.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn drop_asks_the_thread_to_quit() {
        let (output, cmd_rx) = detached();
        let generation = Arc::clone(&output.generation);
        drop(output);
        assert_eq!(cmd_rx.try_recv().ok(), Some(OutputCommand::Quit));
        assert_eq!(generation.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_joins_a_thread_that_exits() {
        let (cmd_tx, cmd_rx) = unbounded::<OutputCommand>();
        let (exit_tx, exited) = bounded::<()>(0);
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let join = std::thread::spawn(move || {
            let _exit = exit_tx;
            while let Ok(cmd) = cmd_rx.recv() {
                if cmd == OutputCommand::Quit {
                    break;
                }
            }
            flag.store(true, Ordering::SeqCst);
        });
        let output = DeviceOutput {
            cmd_tx,
            generation: Arc::new(AtomicU64::new(0)),
            exited,
            quit_grace: Duration::from_secs(5),
            join: Some(join),
        };
        drop(output);
        assert!(finished.load(Ordering::SeqCst));
    }

    #[test]
    fn drop_does_not_wait_for_a_busy_thread() {
        let (cmd_tx, _cmd_rx) = unbounded::<OutputCommand>();
        let (exit_tx, exited) = bounded::<()>(0);
        let (release_tx, release_rx) = bounded::<()>(0);
        let join = std::thread::spawn(move || {
            let _exit = exit_tx;
            let _ = release_rx.recv();
        });
        let output = DeviceOutput {
            cmd_tx,
            generation: Arc::new(AtomicU64::new(0)),
            exited,
            quit_grace: Duration::from_millis(50),
            join: Some(join),
        };
        let started = Instant::now();
        drop(output);
        assert!(started.elapsed() < Duration::from_secs(2));
        drop(release_tx);
    }

    #[test]
    fn commands_after_thread_exit_do_not_panic() {
        let (mut output, cmd_rx) = detached();
        drop(cmd_rx);
        output.play();
        output.load(request());
    }

    #[test]
    fn decoded_duration_wins_over_declared() {
        assert_eq!(
            reported_duration(Some(Duration::from_millis(59_500)), 60),
            Some(59.5)
        );
        assert_eq!(reported_duration(None, 90), Some(90.0));
        assert_eq!(reported_duration(None, 0), None);
    }

    #[derive(Default)]
    struct SinkLog {
        opened: Cell<usize>,
        playing: Cell<bool>,
        drained: Cell<bool>,
        position: Cell<Duration>,
        seeks: RefCell<Vec<Duration>>,
    }

    struct FakeSink {
        log: Rc<SinkLog>,
    }

    impl MediaSink for FakeSink {
        fn play(&self) {
            self.log.playing.set(true);
        }

        fn pause(&self) {
            self.log.playing.set(false);
        }

        fn stop(&self) {
            self.log.playing.set(false);
        }

        fn is_drained(&self) -> bool {
            self.log.drained.get()
        }

        fn position(&self) -> Duration {
            self.log.position.get()
        }

        fn seek(&self, to: Duration) -> Result<()> {
            self.log.seeks.borrow_mut().push(to);
            self.log.position.set(to);
            Ok(())
        }
    }

    struct FakeSinks {
        log: Rc<SinkLog>,
        decoded: Option<Duration>,
        broken: bool,
    }

    impl SinkFactory for FakeSinks {
        type Sink = FakeSink;

        fn open(&self, _bytes: &Arc<[u8]>) -> Result<(FakeSink, Option<Duration>)> {
            if self.broken {
                return Err(anyhow!("decode media: unsupported format"));
            }
            self.log.opened.set(self.log.opened.get() + 1);
            self.log.playing.set(false);
            self.log.drained.set(false);
            self.log.position.set(Duration::ZERO);
            Ok((
                FakeSink {
                    log: Rc::clone(&self.log),
                },
                self.decoded,
            ))
        }
    }

    struct Rig {
        worker: OutputWorker<FakeSinks>,
        log: Rc<SinkLog>,
        events: Receiver<AudioEvent>,
        media: PathBuf,
    }

    impl Rig {
        fn new(name: &str, decoded: Option<Duration>, broken: bool) -> Self {
            let media = std::env::temp_dir().join(format!(
                "podcast-device-{}-{name}.mp3",
                std::process::id()
            ));
            std::fs::write(&media, b"fake media").unwrap();
            let log = Rc::new(SinkLog::default());
            let (evt_tx, events) = unbounded();
            let sinks = FakeSinks {
                log: Rc::clone(&log),
                decoded,
                broken,
            };
            let worker = OutputWorker::new(
                sinks,
                OutputConfig::default(),
                evt_tx,
                Arc::new(AtomicU64::new(1)),
            );
            Self {
                worker,
                log,
                events,
                media,
            }
        }

        fn request(&self, looping: bool) -> MediaRequest {
            MediaRequest {
                url: self.media.to_string_lossy().into_owned(),
                looping,
                ..request()
            }
        }

        fn load(&mut self, request: MediaRequest) {
            self.worker.apply(OutputCommand::Load {
                request,
                generation: 1,
            });
        }

        fn events(&self) -> Vec<AudioEventKind> {
            self.events.try_iter().map(|e| e.kind).collect()
        }
    }

    impl Drop for Rig {
        fn drop(&mut self) {
            std::fs::remove_file(&self.media).ok();
        }
    }

    #[test]
    fn load_reports_metadata_then_autoplays() {
        let mut rig = Rig::new("autoplay", Some(Duration::from_millis(59_500)), false);
        rig.load(rig.request(false));
        assert_eq!(
            rig.events(),
            vec![
                AudioEventKind::LoadedMetadata {
                    duration: Some(59.5)
                },
                AudioEventKind::Play,
            ]
        );
        assert!(rig.log.playing.get());
    }

    #[test]
    fn metadata_falls_back_to_declared_duration() {
        let mut rig = Rig::new("declared", None, false);
        rig.load(MediaRequest {
            autoplay: false,
            ..rig.request(false)
        });
        assert_eq!(
            rig.events(),
            vec![AudioEventKind::LoadedMetadata {
                duration: Some(90.0)
            }]
        );
        assert!(!rig.log.playing.get());
    }

    #[test]
    fn missing_media_reports_error() {
        let mut rig = Rig::new("missing", None, false);
        rig.load(MediaRequest {
            url: "/definitely/not/here.mp3".to_string(),
            ..rig.request(false)
        });
        let events = rig.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], AudioEventKind::Error(msg) if msg.contains("not/here.mp3")));
        assert_eq!(rig.log.opened.get(), 0);
    }

    #[test]
    fn undecodable_media_reports_error() {
        let mut rig = Rig::new("broken", None, true);
        rig.load(rig.request(false));
        let events = rig.events();
        assert!(matches!(&events[..], [AudioEventKind::Error(msg)] if msg.contains("unsupported")));
        rig.worker.apply(OutputCommand::Play);
        assert!(rig.events().is_empty());
    }

    #[test]
    fn stale_load_is_skipped() {
        let mut rig = Rig::new("stale", None, false);
        rig.worker.generation.store(2, Ordering::SeqCst);
        rig.load(rig.request(false));
        assert!(rig.events().is_empty());
        assert_eq!(rig.log.opened.get(), 0);
    }

    #[test]
    fn tick_reports_position_while_playing() {
        let mut rig = Rig::new("position", None, false);
        rig.load(rig.request(false));
        rig.events();
        rig.log.position.set(Duration::from_secs(12));
        rig.worker.tick();
        assert_eq!(
            rig.events(),
            vec![AudioEventKind::TimeUpdate { current_time: 12.0 }]
        );

        rig.worker.apply(OutputCommand::Pause);
        rig.worker.tick();
        assert_eq!(rig.events(), vec![AudioEventKind::Pause]);
    }

    #[test]
    fn natural_end_is_reported_once() {
        let mut rig = Rig::new("ended", None, false);
        rig.load(rig.request(false));
        rig.events();
        rig.log.drained.set(true);
        rig.worker.tick();
        rig.worker.tick();
        assert_eq!(rig.events(), vec![AudioEventKind::Ended]);
        assert_eq!(rig.log.opened.get(), 1);
    }

    #[test]
    fn looping_restarts_without_ended() {
        let mut rig = Rig::new("looping", None, false);
        rig.load(rig.request(true));
        rig.events();
        rig.log.drained.set(true);
        rig.worker.tick();
        assert_eq!(
            rig.events(),
            vec![AudioEventKind::TimeUpdate { current_time: 0.0 }]
        );
        assert_eq!(rig.log.opened.get(), 2);
        assert!(rig.log.playing.get());
    }

    #[test]
    fn looping_can_be_switched_on_after_load() {
        let mut rig = Rig::new("switch-loop", None, false);
        rig.load(rig.request(false));
        rig.worker.apply(OutputCommand::SetLooping(true));
        rig.events();
        rig.log.drained.set(true);
        rig.worker.tick();
        assert!(!rig.events().contains(&AudioEventKind::Ended));
        assert_eq!(rig.log.opened.get(), 2);
    }

    #[test]
    fn play_after_end_starts_over() {
        let mut rig = Rig::new("replay", None, false);
        rig.load(rig.request(false));
        rig.log.position.set(Duration::from_secs(90));
        rig.log.drained.set(true);
        rig.worker.tick();
        rig.events();

        rig.worker.apply(OutputCommand::Play);
        assert_eq!(rig.events(), vec![AudioEventKind::Play]);
        assert_eq!(rig.log.opened.get(), 2);
        assert_eq!(rig.log.position.get(), Duration::ZERO);
        assert!(rig.log.playing.get());
    }

    #[test]
    fn seek_clamps_negative_targets() {
        let mut rig = Rig::new("seek", None, false);
        rig.load(rig.request(false));
        rig.events();
        rig.worker.apply(OutputCommand::Seek(-4.0));
        rig.worker.apply(OutputCommand::Seek(30.0));
        assert_eq!(
            rig.events(),
            vec![
                AudioEventKind::TimeUpdate { current_time: 0.0 },
                AudioEventKind::TimeUpdate { current_time: 30.0 },
            ]
        );
        assert_eq!(
            *rig.log.seeks.borrow(),
            vec![Duration::ZERO, Duration::from_secs(30)]
        );
    }

    #[test]
    fn unload_drops_the_media() {
        let mut rig = Rig::new("unload", None, false);
        rig.load(rig.request(false));
        rig.events();
        rig.worker.apply(OutputCommand::Unload);
        assert!(!rig.log.playing.get());
        rig.worker.apply(OutputCommand::Play);
        rig.worker.tick();
        assert!(rig.events().is_empty());
    }
}
