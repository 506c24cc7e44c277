//! Blocking client for the episodes API.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use podcast_types::{ApiEpisode, Episode};

/// Newest episodes first, at most `limit` of them.
pub(crate) fn list_episodes(server: &str, limit: usize) -> Result<Vec<Episode>> {
    let url = episodes_url(server, limit);
    let resp: Vec<ApiEpisode> = read_json(
        ureq::get(&url).call().context("request /episodes")?,
        "episodes",
    )?;
    tracing::debug!(count = resp.len(), "episodes fetched");
    Ok(resp.into_iter().map(Episode::from).collect())
}

pub(crate) fn get_episode(server: &str, id: &str) -> Result<Episode> {
    let url = episode_url(server, id);
    let resp: ApiEpisode = read_json(
        ureq::get(&url)
            .call()
            .with_context(|| format!("request /episodes/{id}"))?,
        "episodes/:id",
    )?;
    Ok(resp.into())
}

fn episodes_url(server: &str, limit: usize) -> String {
    format!(
        "{}/episodes?_limit={}&_sort=published_at&_order=desc",
        server.trim_end_matches('/'),
        limit
    )
}

fn episode_url(server: &str, id: &str) -> String {
    format!(
        "{}/episodes/{}",
        server.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

fn read_json<T: DeserializeOwned>(
    mut resp: ureq::http::Response<ureq::Body>,
    label: &str,
) -> Result<T> {
    let body = resp
        .body_mut()
        .read_to_string()
        .with_context(|| format!("read /{label} response body"))?;
    serde_json::from_str(&body).with_context(|| format!("decode /{label} response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_url_sorts_newest_first() {
        assert_eq!(
            episodes_url("http://localhost:3333/", 12),
            "http://localhost:3333/episodes?_limit=12&_sort=published_at&_order=desc"
        );
    }

    #[test]
    fn episode_url_encodes_id() {
        assert_eq!(
            episode_url("http://localhost:3333", "a-semana-de-4 dias"),
            "http://localhost:3333/episodes/a-semana-de-4%20dias"
        );
        assert_eq!(
            episode_url("http://localhost:3333", "../admin"),
            "http://localhost:3333/episodes/..%2Fadmin"
        );
    }
}
