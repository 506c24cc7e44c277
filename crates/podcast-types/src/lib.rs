//! Episode types shared by the player core and the client.
//!
//! [`ApiEpisode`] is the wire shape returned by the episodes API. [`Episode`] is the
//! display-ready form the rest of the workspace works with.

pub mod format;

use serde::{Deserialize, Deserializer, Serialize};

/// Audio file attached to an episode.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeFile {
    /// Location of the media (http(s) URL, `file://` URL or local path).
    pub url: String,
    /// Declared MIME type, for example `audio/mpeg`.
    #[serde(rename = "type", default)]
    pub media_type: String,
    /// Declared duration in whole seconds.
    pub duration: u64,
}

/// A podcast episode ready for display and playback.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub id: String,
    pub title: String,
    /// Hosts/guests line.
    pub members: String,
    /// Publication date already formatted for display (`d MMM yy`).
    pub published_at: String,
    /// Artwork URL.
    pub thumbnail: String,
    /// Episode notes as HTML.
    pub description: String,
    /// `file.duration` rendered as `HH:MM:SS`.
    pub duration_as_string: String,
    pub file: EpisodeFile,
}

impl Episode {
    /// Episode notes with markup removed.
    pub fn description_text(&self) -> String {
        format::description_to_text(&self.description)
    }
}

/// Episode file as returned by the API.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiEpisodeFile {
    pub url: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    /// Accepts a JSON number or a numeric string.
    #[serde(deserialize_with = "de_seconds")]
    pub duration: u64,
}

/// Episode as returned by `GET /episodes` and `GET /episodes/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiEpisode {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub members: String,
    /// ISO-8601 publication timestamp.
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: String,
    pub file: ApiEpisodeFile,
}

impl From<ApiEpisode> for Episode {
    fn from(api: ApiEpisode) -> Self {
        Self {
            published_at: format::format_published_at(&api.published_at),
            duration_as_string: format::duration_to_time_string(api.file.duration),
            id: api.id,
            title: api.title,
            members: api.members,
            thumbnail: api.thumbnail,
            description: api.description,
            file: EpisodeFile {
                url: api.file.url,
                media_type: api.file.media_type,
                duration: api.file.duration,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(u64),
    Float(f64),
    Text(String),
}

fn de_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(v) => Ok(v),
        NumberOrText::Float(v) if v.is_finite() && v >= 0.0 => Ok(v.floor() as u64),
        NumberOrText::Float(v) => Err(serde::de::Error::custom(format!("invalid duration {v}"))),
        NumberOrText::Text(s) => {
            let v: f64 = s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid duration {s:?}")))?;
            if v.is_finite() && v >= 0.0 {
                Ok(v.floor() as u64)
            } else {
                Err(serde::de::Error::custom(format!("invalid duration {s:?}")))
            }
        }
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(v) => Ok(v.to_string()),
        NumberOrText::Float(v) => Ok(v.to_string()),
        NumberOrText::Text(s) => Ok(s),
    }
}
