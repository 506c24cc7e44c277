//! Media loading for the output thread.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::config::OutputConfig;

const CHUNK_BYTES: usize = 64 * 1024;

/// Where an episode's media lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MediaLocation {
    Remote(String),
    Local(PathBuf),
}

impl MediaLocation {
    pub(crate) fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(anyhow!("episode has no media url"));
        }
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Remote(url.to_string()));
        }
        if let Some(rest) = url.strip_prefix("file://") {
            let decoded = urlencoding::decode(rest)
                .with_context(|| format!("decode file url {url}"))?;
            return Ok(Self::Local(PathBuf::from(decoded.into_owned())));
        }
        Ok(Self::Local(PathBuf::from(url)))
    }
}

/// HTTP agent for media downloads; a stalled connect or response fails instead of hanging.
pub(crate) fn media_agent(config: &OutputConfig) -> ureq::Agent {
    let agent_config = ureq::Agent::config_builder()
        .timeout_connect(Some(config.connect_timeout))
        .timeout_recv_response(Some(config.response_timeout))
        .build();
    ureq::Agent::new_with_config(agent_config)
}

/// Read the whole media body, refusing anything larger than `limit` bytes.
///
/// `cancelled` is checked between chunks; once it returns `true` the read stops.
pub(crate) fn fetch_media(
    agent: &ureq::Agent,
    location: &MediaLocation,
    limit: u64,
    cancelled: &dyn Fn() -> bool,
) -> Result<Vec<u8>> {
    match location {
        MediaLocation::Remote(url) => {
            let resp = agent
                .get(url)
                .call()
                .with_context(|| format!("request {url}"))?;
            let data = read_capped(resp.into_body().into_reader(), limit, cancelled)
                .with_context(|| format!("read media body from {url}"))?;
            tracing::debug!(url = %url, bytes = data.len(), "fetched remote media");
            Ok(data)
        }
        MediaLocation::Local(path) => {
            let meta = std::fs::metadata(path).with_context(|| format!("stat {:?}", path))?;
            check_limit(meta.len(), limit)?;
            let file = std::fs::File::open(path).with_context(|| format!("open {:?}", path))?;
            read_capped(file, limit, cancelled).with_context(|| format!("read {:?}", path))
        }
    }
}

fn read_capped<R: Read>(reader: R, limit: u64, cancelled: &dyn Fn() -> bool) -> Result<Vec<u8>> {
    let mut reader = reader.take(limit.saturating_add(1));
    let mut data = Vec::new();
    let mut chunk = vec![0u8; CHUNK_BYTES];
    loop {
        if cancelled() {
            return Err(anyhow!("media load cancelled"));
        }
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        check_limit(data.len() as u64, limit)?;
    }
    Ok(data)
}

fn check_limit(len: u64, limit: u64) -> Result<()> {
    if len > limit {
        return Err(anyhow!("media is larger than the {limit} byte limit"));
    }
    Ok(())
}
