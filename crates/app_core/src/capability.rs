//! Capability classification
//!
//! Pure function from a file's url/path (plus the mount snapshot and AI
//! availability handed in by the caller) to the facts the menu rules test.

use crate::formats::{FormatTables, MediaKind};
use app_fs::{vpath, MountRegistry};

/// AI availability at menu time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiAvailability {
    /// Session-wide AI flag
    pub enabled: bool,
    /// Local summarizer capability probe result
    pub local_summarizer: bool,
}

impl AiAvailability {
    pub fn is_available(&self) -> bool {
        self.enabled || self.local_summarizer
    }
}

/// How a file can become the desktop background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Video,
    Image,
}

/// Facts about a file derived from its extension and url
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub url_extension: String,
    pub path_extension: String,
    pub is_shortcut: bool,
    /// Neither the path nor the url carries an extension
    pub has_no_extension: bool,
    /// The path is itself a disconnectable folder mount
    pub is_remote_mount: bool,
    /// The path lives inside a non-root mount
    pub is_under_mount: bool,
    pub decodable_media: Option<MediaKind>,
    pub is_spreadsheet: bool,
    pub is_convertible_playlist: bool,
    pub is_cursor: bool,
    pub is_editable_image: bool,
    pub background: Option<BackgroundKind>,
    pub is_summarizable: bool,
    pub is_extractable_or_mountable: bool,
    pub is_mountable: bool,
    pub is_video: bool,
}

impl CapabilityFlags {
    pub fn can_decode_audio(&self) -> bool {
        self.decodable_media == Some(MediaKind::Audio)
    }

    pub fn can_decode_video(&self) -> bool {
        self.decodable_media == Some(MediaKind::Video)
    }

    pub fn can_decode_image(&self) -> bool {
        self.decodable_media == Some(MediaKind::Image)
    }
}

/// Classifies files against a set of format tables
#[derive(Debug, Clone, Copy)]
pub struct CapabilityClassifier<'a> {
    tables: &'a FormatTables,
}

impl<'a> CapabilityClassifier<'a> {
    pub fn new(tables: &'a FormatTables) -> Self {
        Self { tables }
    }

    pub fn classify(
        &self,
        url: &str,
        path: &str,
        mounts: &MountRegistry,
        ai: AiAvailability,
    ) -> CapabilityFlags {
        let tables = self.tables;
        let url_extension = vpath::extension(url);
        let path_extension = vpath::extension(path);
        let ext = url_extension.as_str();

        let is_video = tables.video.contains(ext);
        let is_cursor = tables.cursor.contains(ext);
        let is_still_image =
            tables.image.contains(ext) && !is_cursor && !tables.vector_image.contains(ext);
        let background = if is_video {
            Some(BackgroundKind::Video)
        } else if is_still_image {
            Some(BackgroundKind::Image)
        } else {
            None
        };

        CapabilityFlags {
            is_shortcut: path_extension == tables.shortcut,
            has_no_extension: path_extension.is_empty() && url_extension.is_empty(),
            is_remote_mount: mounts.is_remote_mount(path),
            is_under_mount: mounts.is_under_mount(path),
            decodable_media: tables.decodable_media(&path_extension),
            is_spreadsheet: tables.is_spreadsheet(&path_extension),
            is_convertible_playlist: tables.is_convertible_playlist(&path_extension),
            is_cursor,
            is_editable_image: tables.editable_image.contains(ext),
            background,
            is_summarizable: ai.is_available() && tables.summarizable.contains(ext),
            is_extractable_or_mountable: tables.extractable.contains(ext)
                || tables.mountable.contains(ext),
            is_mountable: tables.mountable.contains(ext),
            is_video,
            url_extension,
            path_extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_fs::MountKind;

    fn classify(path: &str) -> CapabilityFlags {
        let tables = FormatTables::default();
        CapabilityClassifier::new(&tables).classify(
            path,
            path,
            &MountRegistry::new(),
            AiAvailability::default(),
        )
    }

    #[test]
    fn test_png_flags() {
        let flags = classify("/Users/Desktop/photo.PNG");
        assert_eq!(flags.url_extension, ".png");
        assert!(flags.can_decode_image());
        assert!(flags.is_editable_image);
        assert!(!flags.is_cursor);
        assert_eq!(flags.background, Some(BackgroundKind::Image));
        assert!(!flags.is_shortcut);
    }

    #[test]
    fn test_cursor_and_vector_are_not_backgrounds() {
        assert_eq!(classify("/a/arrow.cur").background, None);
        assert!(classify("/a/arrow.cur").is_cursor);
        assert_eq!(classify("/a/logo.svg").background, None);
        assert_eq!(classify("/a/clip.mp4").background, Some(BackgroundKind::Video));
    }

    #[test]
    fn test_summarizable_needs_ai() {
        let tables = FormatTables::default();
        let classifier = CapabilityClassifier::new(&tables);
        let mounts = MountRegistry::new();

        for (enabled, local_summarizer, expected) in [
            (false, false, false),
            (true, false, true),
            (false, true, true),
            (true, true, true),
        ] {
            let ai = AiAvailability { enabled, local_summarizer };
            let flags = classifier.classify("/a/notes.txt", "/a/notes.txt", &mounts, ai);
            assert_eq!(flags.is_summarizable, expected, "enabled={enabled} local={local_summarizer}");
        }

        let ai = AiAvailability { enabled: true, local_summarizer: true };
        assert!(!classifier.classify("/a/x.png", "/a/x.png", &mounts, ai).is_summarizable);
    }

    #[test]
    fn test_shortcut_uses_path_extension() {
        let tables = FormatTables::default();
        let flags = CapabilityClassifier::new(&tables).classify(
            "/Users/Music/song.mp3",
            "/Users/Desktop/song.url",
            &MountRegistry::new(),
            AiAvailability::default(),
        );
        assert!(flags.is_shortcut);
        assert_eq!(flags.url_extension, ".mp3");
        assert_eq!(flags.decodable_media, None);
    }

    #[test]
    fn test_mount_flags() {
        let tables = FormatTables::default();
        let mounts = MountRegistry::new().with_mount("/Drive", MountKind::FileSystemAccess);
        let classifier = CapabilityClassifier::new(&tables);

        let root = classifier.classify("/Drive", "/Drive", &mounts, AiAvailability::default());
        assert!(root.is_remote_mount);
        assert!(root.has_no_extension);

        let inner = classifier.classify("/Drive/a.txt", "/Drive/a.txt", &mounts, AiAvailability::default());
        assert!(!inner.is_remote_mount);
        assert!(inner.is_under_mount);
    }

    #[test]
    fn test_playlist_and_archive() {
        assert!(classify("/a/list.pls").is_convertible_playlist);
        assert!(!classify("/a/list.m3u").is_convertible_playlist);
        assert!(classify("/a/disc.iso").is_extractable_or_mountable);
        assert!(classify("/a/disc.iso").is_mountable);
        assert!(classify("/a/pack.7z").is_extractable_or_mountable);
        assert!(!classify("/a/pack.7z").is_mountable);
    }
}
