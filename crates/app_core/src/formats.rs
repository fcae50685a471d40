//! Fixed extension tables
//!
//! Every capability decision is a lookup in one of these tables. Extensions
//! are stored lower-case with their leading dot.

use crate::conversion::ConversionFamily;
use std::collections::{HashMap, HashSet};

/// Media kinds with a "Convert to" submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
    Image,
}

impl MediaKind {
    /// Strategy that transcodes this kind
    pub fn family(self) -> ConversionFamily {
        match self {
            MediaKind::Audio | MediaKind::Video => ConversionFamily::AudioVideo,
            MediaKind::Image => ConversionFamily::Image,
        }
    }
}

/// Extension tables supplied by the environment
#[derive(Debug, Clone)]
pub struct FormatTables {
    pub audio_decode: HashSet<&'static str>,
    pub audio_encode: Vec<&'static str>,
    pub video_decode: HashSet<&'static str>,
    pub video_encode: Vec<&'static str>,
    pub image_decode: HashSet<&'static str>,
    pub image_encode: Vec<&'static str>,
    pub spreadsheet: Vec<&'static str>,
    pub audio_playlist: HashSet<&'static str>,
    pub canonical_playlist: &'static str,
    pub cursor: HashSet<&'static str>,
    pub editable_image: HashSet<&'static str>,
    pub image: HashSet<&'static str>,
    pub video: HashSet<&'static str>,
    /// Images that cannot be used as wallpaper
    pub vector_image: HashSet<&'static str>,
    pub summarizable: HashSet<&'static str>,
    pub extractable: HashSet<&'static str>,
    pub mountable: HashSet<&'static str>,
    pub shortcut: &'static str,
    /// Extension -> handler processes, the first one being the default
    pub associations: HashMap<&'static str, Vec<&'static str>>,
}

fn set(items: &[&'static str]) -> HashSet<&'static str> {
    items.iter().copied().collect()
}

impl Default for FormatTables {
    fn default() -> Self {
        let mut associations: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        let mut associate = |exts: &[&'static str], processes: &[&'static str]| {
            for ext in exts {
                associations.insert(*ext, processes.to_vec());
            }
        };

        associate(
            &[".apng", ".avif", ".bmp", ".gif", ".ico", ".jfif", ".jpeg", ".jpg", ".jxl", ".png", ".tif", ".tiff", ".webp", ".ani", ".cur"],
            &["Photos"],
        );
        associate(&[".svg"], &["Photos", "Browser"]);
        associate(&[".aac", ".flac", ".m4a", ".mp3", ".oga", ".ogg", ".opus", ".wav", ".weba", ".wma"], &["Webamp", "VideoPlayer"]);
        associate(&[".asx", ".m3u", ".pls", ".wax", ".wvx", ".xspf"], &["Webamp"]);
        associate(&[".avi", ".m4v", ".mkv", ".mov", ".mp4", ".mpeg", ".mpg", ".ogv", ".webm", ".wmv"], &["VideoPlayer"]);
        associate(&[".csv", ".numbers", ".ods", ".xls", ".xlsx"], &["Spreadsheet"]);
        associate(&[".md"], &["Marked", "MonacoEditor"]);
        associate(&[".txt", ".json", ".rtf"], &["MonacoEditor"]);
        associate(&[".htm", ".html"], &["Browser", "MonacoEditor"]);
        associate(&[".pdf"], &["PDF"]);
        associate(&[".7z", ".bz2", ".cab", ".gz", ".iso", ".lzh", ".rar", ".tar", ".tgz", ".xz", ".zip"], &["FileExplorer"]);
        associate(&[".jsdos"], &["JSDOS"]);
        associate(&[".wsz"], &["Webamp"]);

        Self {
            audio_decode: set(&[
                ".aac", ".ac3", ".aif", ".aiff", ".amr", ".flac", ".m4a", ".mp2", ".mp3", ".oga",
                ".ogg", ".opus", ".wav", ".weba", ".wma",
            ]),
            audio_encode: vec![".aac", ".flac", ".m4a", ".mp3", ".ogg", ".opus", ".wav"],
            video_decode: set(&[
                ".3gp", ".avi", ".flv", ".m2ts", ".m4v", ".mkv", ".mov", ".mp4", ".mpeg", ".mpg",
                ".ogv", ".ts", ".webm", ".wmv",
            ]),
            video_encode: vec![".avi", ".m4v", ".mkv", ".mov", ".mp4", ".ogv", ".webm"],
            image_decode: set(&[
                ".avif", ".bmp", ".cur", ".dds", ".gif", ".heic", ".ico", ".jfif", ".jpeg", ".jpg",
                ".jxl", ".pcx", ".png", ".psd", ".qoi", ".svg", ".tga", ".tif", ".tiff", ".webp",
                ".xbm",
            ]),
            image_encode: vec![
                ".bmp", ".gif", ".ico", ".jpeg", ".jpg", ".png", ".tiff", ".webp",
            ],
            spreadsheet: vec![".csv", ".numbers", ".ods", ".xls", ".xlsx"],
            audio_playlist: set(&[".asx", ".m3u", ".pls", ".wax", ".wvx", ".xspf"]),
            canonical_playlist: ".m3u",
            cursor: set(&[".ani", ".cur"]),
            editable_image: set(&[
                ".bmp", ".gif", ".ico", ".jfif", ".jpeg", ".jpg", ".png", ".svg", ".webp",
            ]),
            image: set(&[
                ".ani", ".apng", ".avif", ".bmp", ".cur", ".gif", ".ico", ".jfif", ".jif", ".jpe",
                ".jpeg", ".jpg", ".jxl", ".pjp", ".pjpeg", ".png", ".qoi", ".svg", ".tif", ".tiff",
                ".webp", ".xbm",
            ]),
            video: set(&[".m4v", ".mkv", ".mov", ".mp4", ".ogv", ".webm"]),
            vector_image: set(&[".svg"]),
            summarizable: set(&[".htm", ".html", ".md", ".rtf", ".txt"]),
            extractable: set(&[
                ".7z", ".bz2", ".cab", ".gz", ".lzh", ".rar", ".tar", ".tgz", ".xz", ".zip",
            ]),
            mountable: set(&[".iso", ".jsdos", ".wsz", ".zip"]),
            shortcut: ".url",
            associations,
        }
    }
}

impl FormatTables {
    /// Handler processes for an extension, default first
    pub fn handlers(&self, extension: &str) -> &[&'static str] {
        self.associations
            .get(extension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Default handler process for an extension
    pub fn default_process(&self, extension: &str) -> Option<&'static str> {
        self.handlers(extension).first().copied()
    }

    /// Ordered encode targets of a media kind
    pub fn encode_formats(&self, kind: MediaKind) -> &[&'static str] {
        match kind {
            MediaKind::Audio => &self.audio_encode,
            MediaKind::Video => &self.video_encode,
            MediaKind::Image => &self.image_encode,
        }
    }

    /// Media kind decoding `extension`; audio wins over video, video over image
    pub fn decodable_media(&self, extension: &str) -> Option<MediaKind> {
        if self.audio_decode.contains(extension) {
            Some(MediaKind::Audio)
        } else if self.video_decode.contains(extension) {
            Some(MediaKind::Video)
        } else if self.image_decode.contains(extension) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    pub fn is_spreadsheet(&self, extension: &str) -> bool {
        self.spreadsheet.iter().any(|format| *format == extension)
    }

    /// Playlist that can be rewritten as the canonical playlist format
    pub fn is_convertible_playlist(&self, extension: &str) -> bool {
        extension != self.canonical_playlist && self.audio_playlist.contains(extension)
    }
}
