//! UI view-models for the TUI.
//!
//! This module converts `App` state into render-ready strings, labels,
//! and modal payloads so `render.rs` stays layout-focused.

use podcast_player::{ControlState, PlayerPhase};
use podcast_types::Episode;
use podcast_types::format::duration_to_time_string;

use crate::ui::app::{App, Page};

pub(crate) struct UiView {
    pub(crate) header_lines: Vec<String>,
    pub(crate) page: PageView,
    pub(crate) player_panel: PlayerPanel,
    pub(crate) progress: ProgressView,
    pub(crate) controls: Vec<ControlLabel>,
    pub(crate) status_line: String,
    pub(crate) keys_line: String,
    pub(crate) active_modal: Option<UiModal>,
}

pub(crate) enum PageView {
    Home {
        latest: Vec<String>,
        all: Vec<String>,
        selected: Option<usize>,
    },
    Episode {
        title: String,
        lines: Vec<String>,
        scroll: u16,
    },
}

pub(crate) struct PlayerPanel {
    pub(crate) title: String,
    pub(crate) lines: Vec<String>,
}

pub(crate) struct ProgressView {
    pub(crate) elapsed: String,
    pub(crate) total: String,
    pub(crate) ratio: f64,
    pub(crate) enabled: bool,
}

pub(crate) struct ControlLabel {
    pub(crate) label: &'static str,
    pub(crate) state: ControlState,
}

pub(crate) enum UiModal {
    Help { title: String, body: String, layout: ModalLayout },
    Logs { title: String, empty: bool, layout: ModalLayout },
}

pub(crate) struct ModalLayout {
    pub(crate) width_pct: u16,
    pub(crate) height_pct: u16,
}

impl UiView {
    pub(crate) fn from_app(app: &App) -> Self {
        let header_lines = vec![
            format!("podcastr  →  {}", app.settings.api_url),
            match &app.page {
                Page::Home => format!("episodes: {}", app.episodes.len()),
                Page::Episode(episode) => format!("episode: {}", episode.title),
            },
        ];
        let page = build_page(app);
        let player_panel = build_player_panel(app);
        let progress = build_progress(app);
        let controls = build_controls(app);
        let status_line = format!("status: {}", app.status);
        let keys_line = match app.page {
            Page::Home => "keys: ↑/↓ select | Enter play | i details | Space pause | n/b next/prev | r loop | s shuffle | x stop | ←/→ seek | h help | q quit",
            Page::Episode(_) => "keys: p play episode | Esc back | ↑/↓ scroll | Space pause | n/b next/prev | r loop | s shuffle | ←/→ seek | h help | q quit",
        }
        .to_string();
        let active_modal = build_active_modal(app);

        Self {
            header_lines,
            page,
            player_panel,
            progress,
            controls,
            status_line,
            keys_line,
            active_modal,
        }
    }
}

fn build_page(app: &App) -> PageView {
    match &app.page {
        Page::Home => {
            let playing_id = app.store.current_episode().map(|e| e.id.as_str());
            let split = app.settings.latest_count.min(app.episodes.len());
            let labels: Vec<String> = app
                .episodes
                .iter()
                .map(|episode| episode_label(episode, playing_id == Some(episode.id.as_str())))
                .collect();
            let (latest, all) = labels.split_at(split);
            PageView::Home {
                latest: latest.to_vec(),
                all: all.to_vec(),
                selected: app.list_state.selected(),
            }
        }
        Page::Episode(episode) => PageView::Episode {
            title: episode.title.clone(),
            lines: episode_detail_lines(episode),
            scroll: app.detail_scroll,
        },
    }
}

pub(crate) fn episode_label(episode: &Episode, playing: bool) -> String {
    let mut label = format!(
        "{}  ·  {}  ·  {}  ·  {}",
        episode.title, episode.members, episode.published_at, episode.duration_as_string
    );
    if playing {
        label.push_str("  [playing]");
    }
    label
}

pub(crate) fn episode_detail_lines(episode: &Episode) -> Vec<String> {
    let mut lines = vec![
        episode.title.clone(),
        episode.members.clone(),
        format!("{}  ·  {}", episode.published_at, episode.duration_as_string),
        String::new(),
    ];
    let description = episode.description_text();
    if description.is_empty() {
        lines.push("<no description>".to_string());
    } else {
        lines.extend(description.lines().map(str::to_string));
    }
    lines
}

fn build_player_panel(app: &App) -> PlayerPanel {
    let title = "Now playing".to_string();
    let Some(episode) = app.store.current_episode() else {
        return PlayerPanel {
            title,
            lines: vec!["Select a podcast to listen to".to_string()],
        };
    };
    let state = match app.player.phase(&app.store) {
        PlayerPhase::Loaded { playing: true } => "playing",
        PlayerPhase::Loaded { playing: false } => "paused",
        PlayerPhase::Empty => "-",
    };
    let mut flags = Vec::new();
    if app.store.is_looping() {
        flags.push("loop");
    }
    if app.store.is_shuffling() {
        flags.push("shuffle");
    }
    let mut lines = vec![
        episode.title.clone(),
        episode.members.clone(),
        String::new(),
        format!("state: {state}"),
        format!(
            "queue: {}/{}",
            app.store.current_episode_index() + 1,
            app.store.episode_list().len()
        ),
    ];
    if !flags.is_empty() {
        lines.push(format!("mode: {}", flags.join(", ")));
    }
    if let Some(err) = app.player.last_error() {
        lines.push(format!("error: {err}"));
    }
    PlayerPanel { title, lines }
}

fn build_progress(app: &App) -> ProgressView {
    match app.store.current_episode() {
        Some(episode) => ProgressView {
            elapsed: duration_to_time_string(app.player.progress()),
            total: episode.duration_as_string.clone(),
            ratio: app.player.progress_ratio(&app.store).unwrap_or(0.0),
            enabled: true,
        },
        None => ProgressView {
            elapsed: duration_to_time_string(0),
            total: duration_to_time_string(0),
            ratio: 0.0,
            enabled: false,
        },
    }
}

fn build_controls(app: &App) -> Vec<ControlLabel> {
    let controls = app.player.controls(&app.store);
    vec![
        ControlLabel { label: "shuffle", state: controls.shuffle },
        ControlLabel { label: "prev", state: controls.previous },
        ControlLabel {
            label: if controls.play_pause.active { "pause" } else { "play" },
            state: controls.play_pause,
        },
        ControlLabel { label: "next", state: controls.next },
        ControlLabel { label: "loop", state: controls.repeat },
    ]
}

fn build_help_lines(seek_step: u64) -> Vec<String> {
    vec![
        "Navigation".to_string(),
        "  ↑/↓          select / scroll".to_string(),
        "  PgUp/PgDn    page".to_string(),
        "  Enter        play from the list".to_string(),
        "  i            episode details".to_string(),
        "  p            play the open episode".to_string(),
        "  Esc/Bksp     back (stops playback)".to_string(),
        String::new(),
        "Playback".to_string(),
        "  Space        play/pause".to_string(),
        "  n / b        next / previous".to_string(),
        "  r            loop".to_string(),
        "  s            shuffle".to_string(),
        "  x            stop".to_string(),
        format!("  ←/→          seek −{seek_step}s / +{seek_step}s"),
        format!("  Shift+←/→    seek −{}s / +{}s", seek_step * 6, seek_step * 6),
        String::new(),
        "Other".to_string(),
        "  g            reload episodes".to_string(),
        "  L            logs".to_string(),
        "  h or ?       help".to_string(),
        "  q            quit".to_string(),
    ]
}

fn build_active_modal(app: &App) -> Option<UiModal> {
    if app.logs_open {
        return Some(UiModal::Logs {
            title: "Logs (Esc to close, ↑/↓ scroll)".to_string(),
            empty: app.logs.is_empty(),
            layout: ModalLayout { width_pct: 90, height_pct: 80 },
        });
    }
    if app.help_open {
        return Some(UiModal::Help {
            title: "Help".to_string(),
            body: build_help_lines(app.settings.seek_step_secs).join("\n"),
            layout: ModalLayout { width_pct: 60, height_pct: 75 },
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcast_types::EpisodeFile;

    fn sample() -> Episode {
        Episode {
            id: "a-importancia-da-contribuicao-em-open-source".to_string(),
            title: "Faladev #30 | A importância da contribuição em Open Source".to_string(),
            members: "Diego Fernandes, João Pedro".to_string(),
            published_at: "8 Jan 21".to_string(),
            description: "<p>Nesse episódio <b>falamos</b></p><p>Segundo parágrafo</p>".to_string(),
            duration_as_string: "01:15:45".to_string(),
            file: EpisodeFile {
                url: "https://example.com/open-source.m4a".to_string(),
                media_type: "audio/x-m4a".to_string(),
                duration: 4545,
            },
            ..Episode::default()
        }
    }

    #[test]
    fn label_marks_playing_episode() {
        let episode = sample();
        let label = episode_label(&episode, false);
        assert!(label.starts_with("Faladev #30"));
        assert!(label.contains("8 Jan 21"));
        assert!(label.ends_with("01:15:45"));
        assert!(episode_label(&episode, true).ends_with("[playing]"));
    }

    #[test]
    fn detail_lines_render_description_as_text() {
        let lines = episode_detail_lines(&sample());
        assert_eq!(lines[2], "8 Jan 21  ·  01:15:45");
        assert!(lines.iter().any(|l| l.contains("Nesse episódio falamos")));
        assert!(lines.iter().all(|l| !l.contains('<')));
    }

    #[test]
    fn detail_lines_note_missing_description() {
        let episode = Episode {
            description: String::new(),
            ..sample()
        };
        assert_eq!(
            episode_detail_lines(&episode).last().map(String::as_str),
            Some("<no description>")
        );
    }

    #[test]
    fn help_mentions_scaled_seek_step() {
        let help = build_help_lines(5).join("\n");
        assert!(help.contains("+5s"));
        assert!(help.contains("+30s"));
    }
}
