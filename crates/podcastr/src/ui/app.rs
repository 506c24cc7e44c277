use std::collections::VecDeque;
use std::io;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend, widgets::ListState};

use podcast_output::{DeviceOutput, OutputConfig};
use podcast_player::{AudioEvent, AudioEventKind, AudioOutput, PlayerStore, PlayerView};
use podcast_types::Episode;

use crate::config::Settings;
use crate::server_api;

use super::render;

const LOG_CAP: usize = 500;
const LONG_SEEK_FACTOR: i64 = 6;

enum FetchReq {
    List,
    Detail(String),
}

enum FetchResp {
    List(Result<Vec<Episode>, String>),
    Detail {
        id: String,
        episode: Result<Episode, String>,
    },
}

/// Launch the TUI, spawn the audio and fetch threads, and drive the event loop.
pub(crate) fn run_tui(settings: Settings, log_rx: Receiver<String>) -> Result<()> {
    let episodes = server_api::list_episodes(&settings.api_url, settings.episode_limit)
        .with_context(|| format!("load episodes from {}", settings.api_url))?;
    tracing::info!(count = episodes.len(), api_url = %settings.api_url, "episodes loaded");

    let (output, audio_rx) = DeviceOutput::spawn(OutputConfig {
        max_media_bytes: settings.max_media_bytes,
        ..OutputConfig::default()
    })?;

    let (fetch_tx, fetch_rx) = unbounded::<FetchReq>();
    let (fetch_done_tx, fetch_done_rx) = unbounded::<FetchResp>();
    std::thread::Builder::new()
        .name("episode-fetch".to_string())
        .spawn({
            let server = settings.api_url.clone();
            let limit = settings.episode_limit;
            move || {
                while let Ok(req) = fetch_rx.recv() {
                    let resp = match req {
                        FetchReq::List => FetchResp::List(
                            server_api::list_episodes(&server, limit).map_err(|e| format!("{e:#}")),
                        ),
                        FetchReq::Detail(id) => {
                            let episode =
                                server_api::get_episode(&server, &id).map_err(|e| format!("{e:#}"));
                            FetchResp::Detail { id, episode }
                        }
                    };
                    if fetch_done_tx.send(resp).is_err() {
                        break;
                    }
                }
            }
        })
        .context("spawn episode fetch thread")?;

    let mut app = App::new(
        settings,
        episodes,
        PlayerStore::new(),
        PlayerView::new(Box::new(output) as Box<dyn AudioOutput>),
        audio_rx,
        fetch_tx,
        fetch_done_rx,
        log_rx,
    );

    let mut term = init_terminal()?;
    let result = ui_loop(&mut term, &mut app);

    restore_terminal(&mut term)?;
    result
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Page {
    Home,
    Episode(Episode),
}

/// In-memory UI state for rendering + interaction.
pub(crate) struct App {
    pub(crate) settings: Settings,
    pub(crate) episodes: Vec<Episode>,
    pub(crate) list_state: ListState,
    pub(crate) page: Page,
    pub(crate) detail_scroll: u16,
    pub(crate) store: PlayerStore,
    pub(crate) player: PlayerView<Box<dyn AudioOutput>>,

    pub(crate) status: String,
    pub(crate) help_open: bool,
    pub(crate) logs_open: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) logs_scroll: usize,
    pub(crate) list_view_height: usize,

    audio_rx: Receiver<AudioEvent>,
    fetch_tx: Sender<FetchReq>,
    fetch_rx: Receiver<FetchResp>,
    pending_list: bool,
    pending_detail: Option<String>,
    last_status_snapshot: String,
    last_title: Option<String>,
    log_rx: Receiver<String>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    fn new(
        settings: Settings,
        episodes: Vec<Episode>,
        store: PlayerStore,
        player: PlayerView<Box<dyn AudioOutput>>,
        audio_rx: Receiver<AudioEvent>,
        fetch_tx: Sender<FetchReq>,
        fetch_rx: Receiver<FetchResp>,
        log_rx: Receiver<String>,
    ) -> Self {
        let mut list_state = ListState::default();
        if !episodes.is_empty() {
            list_state.select(Some(0));
        }
        let status = if episodes.is_empty() {
            "No episodes published yet".to_string()
        } else {
            "Ready".to_string()
        };

        Self {
            settings,
            episodes,
            list_state,
            page: Page::Home,
            detail_scroll: 0,
            store,
            player,
            status,
            help_open: false,
            logs_open: false,
            logs: VecDeque::new(),
            logs_scroll: 0,
            list_view_height: 0,
            audio_rx,
            fetch_tx,
            fetch_rx,
            pending_list: false,
            pending_detail: None,
            last_status_snapshot: String::new(),
            last_title: None,
            log_rx,
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    fn selected_episode(&self) -> Option<&Episode> {
        self.selected_index().and_then(|i| self.episodes.get(i))
    }

    /// Push the store's state to the audio output.
    fn sync(&mut self) {
        self.player.reconcile(&self.store);
    }

    fn select_next(&mut self) {
        if self.episodes.is_empty() {
            return;
        }
        let i = self.selected_index().unwrap_or(0);
        let ni = (i + 1).min(self.episodes.len() - 1);
        self.list_state.select(Some(ni));
    }

    fn select_prev(&mut self) {
        if self.episodes.is_empty() {
            return;
        }
        let i = self.selected_index().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
    }

    fn page_step(&self) -> usize {
        self.list_view_height.max(1)
    }

    fn page_down(&mut self) {
        if self.episodes.is_empty() {
            return;
        }
        let i = self.selected_index().unwrap_or(0);
        let ni = (i + self.page_step()).min(self.episodes.len() - 1);
        self.list_state.select(Some(ni));
    }

    fn page_up(&mut self) {
        if self.episodes.is_empty() {
            return;
        }
        let i = self.selected_index().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(self.page_step())));
    }

    /// Queue every listed episode and start at the selected one.
    fn play_selected(&mut self) {
        let Some(index) = self.selected_index() else {
            self.status = "Nothing selected".into();
            return;
        };
        match self.store.play_list(self.episodes.clone(), index, true) {
            Ok(()) => {
                let title = self.episodes[index].title.clone();
                self.status = format!("Playing: {title}");
            }
            Err(e) => self.status = format!("Cannot play: {e}"),
        }
        self.sync();
    }

    fn open_selected(&mut self) {
        let Some(episode) = self.selected_episode().cloned() else {
            return;
        };
        self.request_detail(episode.id.clone());
        self.page = Page::Episode(episode);
        self.detail_scroll = 0;
    }

    fn play_open_episode(&mut self) {
        let Page::Episode(episode) = &self.page else {
            return;
        };
        let episode = episode.clone();
        self.status = format!("Playing: {}", episode.title);
        self.store.play(episode);
        self.sync();
    }

    /// Leave the episode page; playback stops the way the page's back button does.
    fn go_back(&mut self) {
        if self.page == Page::Home {
            return;
        }
        self.page = Page::Home;
        self.pending_detail = None;
        if !self.store.is_empty() {
            self.store.stop();
            self.sync();
            self.status = "Stopped".into();
        }
    }

    fn toggle_play(&mut self) {
        if !self.player.controls(&self.store).play_pause.enabled {
            self.status = "Nothing to play".into();
            return;
        }
        self.store.toggle_play();
        self.sync();
    }

    fn next(&mut self) {
        if !self.player.controls(&self.store).next.enabled {
            self.status = "No next episode".into();
            return;
        }
        if self.store.play_next() {
            self.status = self.now_playing_status();
        }
        self.sync();
    }

    fn previous(&mut self) {
        if !self.player.controls(&self.store).previous.enabled {
            self.status = "No previous episode".into();
            return;
        }
        if self.store.play_previous() {
            self.status = self.now_playing_status();
        }
        self.sync();
    }

    fn toggle_loop(&mut self) {
        if !self.player.controls(&self.store).repeat.enabled {
            return;
        }
        self.store.toggle_loop();
        self.status = if self.store.is_looping() { "Loop on" } else { "Loop off" }.into();
        self.sync();
    }

    fn toggle_shuffle(&mut self) {
        if !self.player.controls(&self.store).shuffle.enabled {
            self.status = "Shuffle needs more than one episode".into();
            return;
        }
        self.store.toggle_shuffle();
        self.status = if self.store.is_shuffling() { "Shuffle on" } else { "Shuffle off" }.into();
        self.sync();
    }

    fn stop(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.store.stop();
        self.sync();
        self.status = "Stopped".into();
    }

    fn seek(&mut self, delta_seconds: i64) {
        if self.store.current_episode().is_none() {
            return;
        }
        self.player.seek_by(&self.store, delta_seconds);
    }

    fn now_playing_status(&self) -> String {
        self.store
            .current_episode()
            .map(|e| format!("Playing: {}", e.title))
            .unwrap_or_else(|| "Stopped".to_string())
    }

    fn request_list(&mut self) {
        if self.pending_list {
            return;
        }
        if self.fetch_tx.send(FetchReq::List).is_err() {
            self.status = "Episode fetch thread is not available".into();
            return;
        }
        self.pending_list = true;
        self.status = "Reloading episodes...".into();
    }

    fn request_detail(&mut self, id: String) {
        if self.fetch_tx.send(FetchReq::Detail(id.clone())).is_err() {
            tracing::warn!(episode_id = %id, "episode fetch thread is not available");
            return;
        }
        self.pending_detail = Some(id);
    }

    fn drain_fetch_results(&mut self) {
        while let Ok(resp) = self.fetch_rx.try_recv() {
            match resp {
                FetchResp::List(result) => {
                    self.pending_list = false;
                    match result {
                        Ok(episodes) => {
                            let selected_id = self.selected_episode().map(|e| e.id.clone());
                            self.episodes = episodes;
                            let index = selected_id
                                .and_then(|id| self.episodes.iter().position(|e| e.id == id))
                                .or((!self.episodes.is_empty()).then_some(0));
                            self.list_state.select(index);
                            self.status = format!("Loaded {} episodes", self.episodes.len());
                        }
                        Err(e) => self.status = format!("Reload failed: {e}"),
                    }
                }
                FetchResp::Detail { id, episode } => {
                    if self.pending_detail.as_deref() != Some(id.as_str()) {
                        continue;
                    }
                    self.pending_detail = None;
                    match episode {
                        Ok(episode) => {
                            if matches!(&self.page, Page::Episode(open) if open.id == id) {
                                self.page = Page::Episode(episode);
                            }
                        }
                        Err(e) => self.status = format!("Episode refresh failed: {e}"),
                    }
                }
            }
        }
    }

    fn drain_audio_events(&mut self) {
        let mut drained = false;
        while let Ok(ev) = self.audio_rx.try_recv() {
            drained = true;
            let failed = matches!(ev.kind, AudioEventKind::Error(_));
            let ended = ev.kind == AudioEventKind::Ended;
            self.player.handle_event(&mut self.store, ev);
            if failed {
                if let Some(err) = self.player.last_error() {
                    self.status = format!("Playback error: {err}");
                }
            } else if ended {
                self.status = self.now_playing_status();
            }
        }
        if drained {
            self.sync();
        }
    }

    /// Window title when it changed since the last call.
    fn take_title_change(&mut self) -> Option<String> {
        let title = self.player.title(&self.store);
        if self.last_title.as_deref() == Some(title.as_str()) {
            return None;
        }
        self.last_title = Some(title.clone());
        Some(title)
    }

    fn scroll_detail_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    fn scroll_detail_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    fn toggle_logs(&mut self) {
        self.logs_open = !self.logs_open;
        if !self.logs_open {
            self.logs_scroll = 0;
        }
    }

    fn scroll_logs_up(&mut self) {
        let max = self.logs.len().saturating_sub(1);
        self.logs_scroll = (self.logs_scroll + 1).min(max);
    }

    fn scroll_logs_down(&mut self) {
        self.logs_scroll = self.logs_scroll.saturating_sub(1);
    }

    fn push_log_line(&mut self, line: String) {
        if self.logs.len() >= LOG_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    fn note_status_change(&mut self) {
        if self.last_status_snapshot == self.status {
            return;
        }
        let line = self.status.clone();
        self.last_status_snapshot = self.status.clone();
        self.push_log_line(line);
    }

    fn drain_logs(&mut self) {
        while let Ok(line) = self.log_rx.try_recv() {
            self.push_log_line(line);
        }
    }

    /// Apply one key press. Returns `true` when the app should quit.
    /// Apply one terminal event; returns `true` once the user quit and playback stopped.
    fn handle_terminal_event(&mut self, ev: CEvent) -> bool {
        let CEvent::Key(key) = ev else {
            return false;
        };
        if key.kind == KeyEventKind::Release || !self.handle_key(key) {
            return false;
        }
        self.store.stop();
        self.sync();
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.logs_open {
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Char('L') => self.toggle_logs(),
                KeyCode::Up => self.scroll_logs_up(),
                KeyCode::Down => self.scroll_logs_down(),
                _ => {}
            }
            return false;
        }
        if self.help_open {
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?') => self.help_open = false,
                _ => {}
            }
            return false;
        }

        let step = self.settings.seek_step_secs as i64;
        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            step * LONG_SEEK_FACTOR
        } else {
            step
        };
        let on_episode_page = matches!(self.page, Page::Episode(_));

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Up if on_episode_page => self.scroll_detail_up(),
            KeyCode::Down if on_episode_page => self.scroll_detail_down(),
            KeyCode::Up => self.select_prev(),
            KeyCode::Down => self.select_next(),
            KeyCode::PageUp if !on_episode_page => self.page_up(),
            KeyCode::PageDown if !on_episode_page => self.page_down(),
            KeyCode::Enter if !on_episode_page => self.play_selected(),
            KeyCode::Char('i') if !on_episode_page => self.open_selected(),
            KeyCode::Char('p') if on_episode_page => self.play_open_episode(),
            KeyCode::Esc | KeyCode::Backspace => self.go_back(),
            KeyCode::Char(' ') => self.toggle_play(),
            KeyCode::Char('n') => self.next(),
            KeyCode::Char('b') => self.previous(),
            KeyCode::Char('r') => self.toggle_loop(),
            KeyCode::Char('s') => self.toggle_shuffle(),
            KeyCode::Char('x') => self.stop(),
            KeyCode::Left => self.seek(-step),
            KeyCode::Right => self.seek(step),
            KeyCode::Char('g') => self.request_list(),
            KeyCode::Char('L') => self.toggle_logs(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.help_open = true,
            _ => {}
        }
        false
    }
}

fn ui_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.drain_audio_events();
        app.drain_fetch_results();
        app.drain_logs();
        if let Some(title) = app.take_title_change() {
            execute!(terminal.backend_mut(), SetTitle(title)).ok();
        }
        terminal.draw(|f| render::draw(f, app))?;

        if event::poll(app.settings.tick).context("poll terminal events")? {
            let ev = event::read().context("read terminal event")?;
            if app.handle_terminal_event(ev) {
                return Ok(());
            }
        }
        app.note_status_change();
    }
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use podcast_player::{MediaRequest, SelectionId};
    use podcast_types::EpisodeFile;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Load(String),
        Unload,
        Play,
        Pause,
        Seek(f64),
        Looping(bool),
    }

    #[derive(Clone, Default)]
    struct RecordingOutput {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl AudioOutput for RecordingOutput {
        fn load(&mut self, request: MediaRequest) {
            self.calls.borrow_mut().push(Call::Load(request.url));
        }
        fn unload(&mut self) {
            self.calls.borrow_mut().push(Call::Unload);
        }
        fn play(&mut self) {
            self.calls.borrow_mut().push(Call::Play);
        }
        fn pause(&mut self) {
            self.calls.borrow_mut().push(Call::Pause);
        }
        fn set_current_time(&mut self, seconds: f64) {
            self.calls.borrow_mut().push(Call::Seek(seconds));
        }
        fn set_looping(&mut self, looping: bool) {
            self.calls.borrow_mut().push(Call::Looping(looping));
        }
    }

    struct Harness {
        app: App,
        calls: Rc<RefCell<Vec<Call>>>,
        audio_tx: Sender<AudioEvent>,
        fetch_req_rx: Receiver<FetchReq>,
        fetch_done_tx: Sender<FetchResp>,
        log_tx: Sender<String>,
    }

    impl Harness {
        fn new(episodes: Vec<Episode>) -> Self {
            let output = RecordingOutput::default();
            let calls = Rc::clone(&output.calls);
            let (audio_tx, audio_rx) = unbounded();
            let (fetch_tx, fetch_req_rx) = unbounded();
            let (fetch_done_tx, fetch_rx) = unbounded();
            let (log_tx, log_rx) = unbounded();
            let app = App::new(
                Settings::default(),
                episodes,
                PlayerStore::with_seed(7),
                PlayerView::new(Box::new(output) as Box<dyn AudioOutput>),
                audio_rx,
                fetch_tx,
                fetch_rx,
                log_rx,
            );
            Self {
                app,
                calls,
                audio_tx,
                fetch_req_rx,
                fetch_done_tx,
                log_tx,
            }
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn emit(&self, kind: AudioEventKind) {
            self.emit_for(self.app.store.selection(), kind);
        }

        fn emit_for(&self, media: SelectionId, kind: AudioEventKind) {
            self.audio_tx.send(AudioEvent::new(media, kind)).unwrap();
        }
    }

    fn episode(id: &str, duration: u64) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("Episode {id}"),
            duration_as_string: podcast_types::format::duration_to_time_string(duration),
            file: EpisodeFile {
                url: format!("https://example.com/{id}.mp3"),
                media_type: "audio/mpeg".to_string(),
                duration,
            },
            ..Episode::default()
        }
    }

    fn three() -> Vec<Episode> {
        vec![episode("a", 600), episode("b", 700), episode("c", 800)]
    }

    #[test]
    fn enter_queues_all_episodes_from_selection() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);

        assert_eq!(h.app.store.episode_list().len(), 3);
        assert_eq!(h.app.store.current_episode_index(), 1);
        assert!(h.app.store.is_playing());
        assert_eq!(
            h.calls(),
            vec![Call::Load("https://example.com/b.mp3".to_string())]
        );
        assert_eq!(h.app.status, "Playing: Episode b");
    }

    #[test]
    fn space_pauses_once_and_events_are_not_echoed() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Enter);
        h.press(KeyCode::Char(' '));
        assert!(!h.app.store.is_playing());

        h.emit(AudioEventKind::Pause);
        h.app.drain_audio_events();
        h.emit(AudioEventKind::Play);
        h.app.drain_audio_events();

        assert!(h.app.store.is_playing());
        assert_eq!(
            h.calls(),
            vec![
                Call::Load("https://example.com/a.mp3".to_string()),
                Call::Pause,
            ]
        );
    }

    #[test]
    fn next_and_previous_follow_the_queue() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Enter);
        h.press(KeyCode::Char('n'));
        assert_eq!(h.app.store.current_episode_index(), 1);
        h.press(KeyCode::Char('b'));
        assert_eq!(h.app.store.current_episode_index(), 0);
        h.press(KeyCode::Char('b'));
        assert_eq!(h.app.store.current_episode_index(), 0);
        assert_eq!(h.app.status, "No previous episode");
    }

    #[test]
    fn ended_on_last_episode_stops_and_unloads() {
        let mut h = Harness::new(three());
        h.press(KeyCode::End);
        h.app.list_state.select(Some(2));
        h.press(KeyCode::Enter);
        h.emit(AudioEventKind::Ended);
        h.app.drain_audio_events();

        assert!(h.app.store.is_empty());
        assert_eq!(h.calls().last(), Some(&Call::Unload));
        assert_eq!(h.app.status, "Stopped");
    }

    #[test]
    fn ended_mid_queue_loads_next_episode() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Enter);
        h.emit(AudioEventKind::Ended);
        h.app.drain_audio_events();

        assert_eq!(h.app.store.current_episode_index(), 1);
        assert!(h.app.store.is_playing());
        assert_eq!(
            h.calls().last(),
            Some(&Call::Load("https://example.com/b.mp3".to_string()))
        );
    }

    #[test]
    fn shuffle_is_refused_for_single_episode() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Char('i'));
        h.press(KeyCode::Char('p'));
        assert_eq!(h.app.store.episode_list().len(), 1);

        h.press(KeyCode::Char('s'));
        assert!(!h.app.store.is_shuffling());

        h.press(KeyCode::Char('r'));
        assert!(h.app.store.is_looping());
        assert_eq!(h.calls().last(), Some(&Call::Looping(true)));
    }

    #[test]
    fn leaving_episode_page_stops_playback() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Char('i'));
        assert!(matches!(h.app.page, Page::Episode(ref e) if e.id == "a"));
        assert!(matches!(h.fetch_req_rx.try_recv(), Ok(FetchReq::Detail(ref id)) if id == "a"));

        h.press(KeyCode::Char('p'));
        assert!(h.app.store.is_playing());
        h.press(KeyCode::Esc);

        assert_eq!(h.app.page, Page::Home);
        assert!(h.app.store.is_empty());
        assert_eq!(h.calls().last(), Some(&Call::Unload));
    }

    #[test]
    fn seek_moves_progress_by_step() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Enter);
        h.emit(AudioEventKind::LoadedMetadata { duration: Some(600.0) });
        h.app.drain_audio_events();

        h.press(KeyCode::Right);
        assert_eq!(h.app.player.progress(), 5);
        h.app
            .handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        assert_eq!(h.app.player.progress(), 35);
        h.app
            .handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(h.app.player.progress(), 5);
        assert_eq!(h.calls().last(), Some(&Call::Seek(5.0)));
    }

    #[test]
    fn controls_are_ignored_without_an_episode() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Char(' '));
        h.press(KeyCode::Char('n'));
        h.press(KeyCode::Char('r'));
        h.press(KeyCode::Right);
        assert!(h.app.store.is_empty());
        assert!(!h.app.store.is_looping());
        assert!(h.calls().is_empty());
    }

    #[test]
    fn audio_error_reaches_status() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Enter);
        h.emit(AudioEventKind::Error("decode media".to_string()));
        h.app.drain_audio_events();
        assert_eq!(h.app.status, "Playback error: decode media");
    }

    #[test]
    fn reload_replaces_episodes_and_keeps_selection() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Down);
        h.press(KeyCode::Char('g'));
        assert!(matches!(h.fetch_req_rx.try_recv(), Ok(FetchReq::List)));

        h.fetch_done_tx
            .send(FetchResp::List(Ok(vec![
                episode("new", 100),
                episode("a", 600),
                episode("b", 700),
            ])))
            .unwrap();
        h.app.drain_fetch_results();

        assert_eq!(h.app.episodes.len(), 3);
        assert_eq!(h.app.selected_episode().map(|e| e.id.as_str()), Some("b"));
        assert_eq!(h.app.status, "Loaded 3 episodes");
    }

    #[test]
    fn stale_detail_response_is_ignored() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Char('i'));
        h.press(KeyCode::Esc);
        h.press(KeyCode::Down);
        h.press(KeyCode::Char('i'));

        let mut refreshed = episode("a", 600);
        refreshed.title = "Stale".to_string();
        h.fetch_done_tx
            .send(FetchResp::Detail {
                id: "a".to_string(),
                episode: Ok(refreshed),
            })
            .unwrap();
        let mut current = episode("b", 700);
        current.title = "Fresh".to_string();
        h.fetch_done_tx
            .send(FetchResp::Detail {
                id: "b".to_string(),
                episode: Ok(current),
            })
            .unwrap();
        h.app.drain_fetch_results();

        assert!(matches!(h.app.page, Page::Episode(ref e) if e.title == "Fresh"));
    }

    #[test]
    fn title_change_is_reported_once() {
        let mut h = Harness::new(three());
        assert_eq!(h.app.take_title_change().as_deref(), Some("Podcastr | Stop"));
        assert_eq!(h.app.take_title_change(), None);

        h.press(KeyCode::Enter);
        assert_eq!(
            h.app.take_title_change().as_deref(),
            Some("Podcastr | 00:00:00 - Episode a")
        );
    }

    #[test]
    fn modals_capture_keys() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Char('h'));
        assert!(h.app.help_open);
        h.press(KeyCode::Enter);
        assert!(h.app.store.is_empty());
        h.press(KeyCode::Esc);
        assert!(!h.app.help_open);

        h.log_tx.send("INFO line".to_string()).unwrap();
        h.app.drain_logs();
        h.press(KeyCode::Char('L'));
        assert!(h.app.logs_open);
        assert_eq!(h.app.logs.back().map(String::as_str), Some("INFO line"));
        assert!(h.press(KeyCode::Char('q')));
    }

    #[test]
    fn quit_stops_playback_and_key_release_is_ignored() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Enter);

        let release = KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert!(!h.app.handle_terminal_event(CEvent::Key(release)));
        assert!(!h.app.handle_terminal_event(CEvent::FocusGained));
        assert!(h.app.store.is_playing());

        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(h.app.handle_terminal_event(CEvent::Key(quit)));
        assert!(h.app.store.is_empty());
        assert_eq!(h.calls().last(), Some(&Call::Unload));
    }

    #[test]
    fn enter_on_the_playing_row_keeps_playing() {
        let mut h = Harness::new(three());
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        h.emit(AudioEventKind::LoadedMetadata { duration: Some(700.0) });
        h.emit(AudioEventKind::TimeUpdate { current_time: 42.0 });
        h.app.drain_audio_events();
        h.press(KeyCode::Char(' '));

        h.press(KeyCode::Enter);

        assert!(h.app.store.is_playing());
        assert_eq!(h.app.player.progress(), 42);
        assert_eq!(
            h.calls(),
            vec![
                Call::Load("https://example.com/b.mp3".to_string()),
                Call::Seek(0.0),
                Call::Pause,
                Call::Play,
            ]
        );
    }

    #[test]
    fn log_buffer_is_capped() {
        let mut h = Harness::new(Vec::new());
        for i in 0..(LOG_CAP + 10) {
            h.app.push_log_line(format!("line {i}"));
        }
        assert_eq!(h.app.logs.len(), LOG_CAP);
        assert_eq!(h.app.logs.front().map(String::as_str), Some("line 10"));
        assert_eq!(h.app.status, "No episodes published yet");
    }
}
