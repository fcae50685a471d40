//! Playlist parsing and M3U output
//!
//! Reads PLS, ASX (also `.wax`/`.wvx`), XSPF and M3U playlists into a flat
//! track list and writes it back as extended M3U.

use crate::conversion::{output_name, NamedFile, Transcoder};
use crate::error::{AppError, Result};
use app_fs::vpath;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub url: String,
    pub title: Option<String>,
    /// Length in whole seconds
    pub duration: Option<u64>,
}

impl Track {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            duration: None,
        }
    }
}

/// Parse `content` according to the playlist `extension` (with dot)
pub fn tracks_from_playlist(content: &str, extension: &str) -> Result<Vec<Track>> {
    match extension {
        ".pls" => Ok(parse_pls(content)),
        ".asx" | ".wax" | ".wvx" => Ok(parse_asx(content)),
        ".xspf" => Ok(parse_xspf(content)),
        ".m3u" | ".m3u8" => Ok(parse_m3u(content)),
        other => Err(AppError::Playlist(format!("unknown playlist type {}", other))),
    }
}

/// `FileN=`, `TitleN=` and `LengthN=` keys, ordered by N
pub fn parse_pls(content: &str) -> Vec<Track> {
    let mut tracks: std::collections::BTreeMap<u32, Track> = Default::default();

    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        let (field, index) = match ["file", "title", "length"]
            .into_iter()
            .find(|field| key.starts_with(field))
        {
            Some(field) => (field, &key[field.len()..]),
            None => continue,
        };
        let Ok(index) = index.parse::<u32>() else {
            continue;
        };

        let track = tracks.entry(index).or_insert_with(|| Track::new(""));
        match field {
            "file" => track.url = value.to_string(),
            "title" if !value.is_empty() => track.title = Some(value.to_string()),
            "length" => track.duration = value.parse::<i64>().ok().and_then(|d| u64::try_from(d).ok()),
            _ => {}
        }
    }

    tracks
        .into_values()
        .filter(|track| !track.url.is_empty())
        .collect()
}

/// `<entry>` blocks with a `<ref href>` and optional `<title>`
pub fn parse_asx(content: &str) -> Vec<Track> {
    elements(content, "entry")
        .into_iter()
        .filter_map(|entry| {
            let url = attribute(entry, "ref", "href")?;
            Some(Track {
                url,
                title: element_text(entry, "title"),
                duration: None,
            })
        })
        .collect()
}

/// `<track>` blocks with `<location>`, `<title>` and a millisecond `<duration>`
pub fn parse_xspf(content: &str) -> Vec<Track> {
    elements(content, "track")
        .into_iter()
        .filter_map(|track| {
            let url = element_text(track, "location")?;
            Some(Track {
                url,
                title: element_text(track, "title"),
                duration: element_text(track, "duration")
                    .and_then(|ms| ms.parse::<u64>().ok())
                    .map(|ms| ms / 1000),
            })
        })
        .collect()
}

/// Plain or extended M3U
pub fn parse_m3u(content: &str) -> Vec<Track> {
    let mut tracks = Vec::new();
    let mut pending: Option<(Option<u64>, Option<String>)> = None;

    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(info) = line.strip_prefix("#EXTINF:") {
            let (duration, title) = info.split_once(',').unwrap_or((info, ""));
            let duration = duration.trim().parse::<u64>().ok();
            let title = Some(title.trim().to_string()).filter(|title| !title.is_empty());
            pending = Some((duration, title));
        } else if !line.starts_with('#') {
            let (duration, title) = pending.take().unwrap_or((None, None));
            tracks.push(Track {
                url: line.to_string(),
                title,
                duration,
            });
        }
    }

    tracks
}

/// Extended M3U, `-1` for unknown lengths
pub fn create_m3u_playlist(tracks: &[Track]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for track in tracks {
        let duration = track
            .duration
            .map_or_else(|| "-1".to_string(), |d| d.to_string());
        let title = track
            .title
            .clone()
            .unwrap_or_else(|| vpath::stem(&track.url).to_string());
        out.push_str(&format!("#EXTINF:{},{}\n{}\n", duration, title, track.url));
    }
    out
}

/// Rewrites any readable playlist as M3U
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistTranscoder;

#[async_trait]
impl Transcoder for PlaylistTranscoder {
    async fn convert(&self, files: Vec<NamedFile>, extension: &str) -> Result<Vec<NamedFile>> {
        if extension != "m3u" {
            return Err(AppError::UnsupportedFormat(extension.to_string()));
        }

        files
            .into_iter()
            .map(|(path, data)| {
                let content = String::from_utf8_lossy(&data);
                let tracks = tracks_from_playlist(&content, &vpath::extension(&path))?;
                tracing::debug!(path = %path, tracks = tracks.len(), "Playlist parsed");
                Ok((output_name(&path, extension), create_m3u_playlist(&tracks).into_bytes()))
            })
            .collect()
    }
}

/// Bodies of every `<tag ...>...</tag>` element, case-insensitive
fn elements<'a>(content: &'a str, tag: &str) -> Vec<&'a str> {
    let lower = content.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(start) = lower[cursor..].find(&open).map(|i| i + cursor) {
        let after_name = start + open.len();
        // `<entryref` is a different element
        let boundary = lower[after_name..].chars().next();
        if !matches!(boundary, Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
            cursor = after_name;
            continue;
        }
        let Some(body_start) = lower[after_name..].find('>').map(|i| i + after_name + 1) else {
            break;
        };
        let Some(end) = lower[body_start..].find(&close).map(|i| i + body_start) else {
            break;
        };
        found.push(&content[body_start..end]);
        cursor = end + close.len();
    }

    found
}

/// Trimmed text of the first `<tag>` element
fn element_text(content: &str, tag: &str) -> Option<String> {
    elements(content, tag)
        .first()
        .map(|text| unescape(text.trim()))
        .filter(|text| !text.is_empty())
}

/// Value of `name` on the first `<tag ...>` start tag
fn attribute(content: &str, tag: &str, name: &str) -> Option<String> {
    let lower = content.to_ascii_lowercase();
    let start = lower.find(&format!("<{}", tag))?;
    let end = lower[start..].find('>')? + start;
    let start_tag = &content[start..end];
    let lower_tag = &lower[start..end];

    let key = lower_tag.find(&format!("{}=", name))? + name.len() + 1;
    let quote = start_tag[key..].chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value_start = key + 1;
    let value_end = start_tag[value_start..].find(quote)? + value_start;
    Some(unescape(&start_tag[value_start..value_end]))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
