//! Display formatting for episode fields.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

static BREAK_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>|</li\s*>|</h[1-6]\s*>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Render whole seconds as `HH:MM:SS`.
pub fn duration_to_time_string(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Format an API timestamp as `d MMM yy`; unparseable input is returned as-is.
pub fn format_published_at(raw: &str) -> String {
    let raw = raw.trim();
    match parse_date(raw) {
        Some(date) => date.format("%-d %b %y").to_string(),
        None => raw.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Turn episode HTML notes into plain text paragraphs.
pub fn description_to_text(html: &str) -> String {
    let with_breaks = BREAK_TAGS.replace_all(html, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    let mut out: Vec<&str> = Vec::new();
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_pads_each_component() {
        assert_eq!(duration_to_time_string(0), "00:00:00");
        assert_eq!(duration_to_time_string(59), "00:00:59");
        assert_eq!(duration_to_time_string(3600 + 61), "01:01:01");
        assert_eq!(duration_to_time_string(100 * 3600), "100:00:00");
    }

    #[test]
    fn published_at_accepts_common_timestamp_shapes() {
        assert_eq!(format_published_at("2021-01-08 16:00:00"), "8 Jan 21");
        assert_eq!(format_published_at("2021-03-15T10:30:00"), "15 Mar 21");
        assert_eq!(format_published_at("2020-12-31T23:00:00-03:00"), "31 Dec 20");
        assert_eq!(format_published_at("2021-02-01"), "1 Feb 21");
        assert_eq!(format_published_at("yesterday"), "yesterday");
    }

    #[test]
    fn description_keeps_paragraphs_and_decodes_entities() {
        let html = "<p>First &amp; foremost</p>\n\n<p>Second<br/>line</p><p></p><p>&lt;end&gt;</p>";
        assert_eq!(
            description_to_text(html),
            "First & foremost\n\nSecond\nline\n\n<end>"
        );
    }
}
