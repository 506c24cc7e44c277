//! `podcastr`: browse a podcast's episodes and listen to them from the terminal.
//!
//! Commands:
//! - `tui` (default): home page with the latest releases, episode pages and a player bar
//! - `list`: print the newest episodes and exit
//! - `show <ID>`: print one episode and exit

mod config;
mod logging;
mod server_api;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use podcast_types::Episode;

use crate::config::{ClientConfig, Settings};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "podcastr", version = VERSION)]
struct Args {
    /// Path to a TOML config file (defaults to config.toml next to the binary).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the episodes API, e.g. http://localhost:3333
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Interactive player (default).
    Tui,
    /// Print the newest episodes.
    List,
    /// Print one episode.
    Show {
        /// Episode id.
        id: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (file_config, config_path) = ClientConfig::locate(args.config.as_deref())?;
    let settings = Settings::resolve(&file_config, args.api_url.as_deref())?;

    match args.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let log_rx = logging::init_channel(&settings.log_filter);
            log_config(&settings, config_path.as_ref());
            ui::run_tui(settings, log_rx)
        }
        Command::List => {
            logging::init_stderr(&settings.log_filter);
            log_config(&settings, config_path.as_ref());
            let episodes = server_api::list_episodes(&settings.api_url, settings.episode_limit)?;
            print!("{}", episode_table(&episodes, settings.latest_count));
            Ok(())
        }
        Command::Show { id } => {
            logging::init_stderr(&settings.log_filter);
            log_config(&settings, config_path.as_ref());
            let episode = server_api::get_episode(&settings.api_url, &id)?;
            print!("{}", episode_details(&episode));
            Ok(())
        }
    }
}

fn log_config(settings: &Settings, path: Option<&PathBuf>) {
    match path {
        Some(path) => tracing::info!(config = ?path, api_url = %settings.api_url, "config loaded"),
        None => tracing::info!(api_url = %settings.api_url, "no config file; using defaults"),
    }
}

fn episode_table(episodes: &[Episode], latest_count: usize) -> String {
    if episodes.is_empty() {
        return "no episodes\n".to_string();
    }
    let id_width = episodes.iter().map(|e| e.id.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (idx, episode) in episodes.iter().enumerate() {
        if idx == 0 && latest_count > 0 {
            out.push_str("Latest releases\n");
        }
        if idx == latest_count {
            out.push_str("All episodes\n");
        }
        out.push_str(&format!(
            "  {:<id_width$}  {:>9}  {:>8}  {}\n",
            episode.id, episode.published_at, episode.duration_as_string, episode.title
        ));
    }
    out
}

fn episode_details(episode: &Episode) -> String {
    let mut out = format!(
        "{}\n{}\n{}  ·  {}\n{}\n",
        episode.title,
        episode.members,
        episode.published_at,
        episode.duration_as_string,
        episode.file.url
    );
    let description = episode.description_text();
    if !description.is_empty() {
        out.push('\n');
        out.push_str(&description);
        out.push('\n');
    }
    out
}
