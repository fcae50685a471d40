//! Session, preference and assistant contracts

use serde::{Deserialize, Serialize};

/// Wallpaper placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperFit {
    Fill,
    Fit,
    Stretch,
    Tile,
    Center,
}

impl WallpaperFit {
    /// Menu order
    pub const ALL: [WallpaperFit; 5] = [
        WallpaperFit::Fill,
        WallpaperFit::Fit,
        WallpaperFit::Stretch,
        WallpaperFit::Tile,
        WallpaperFit::Center,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WallpaperFit::Fill => "Fill",
            WallpaperFit::Fit => "Fit",
            WallpaperFit::Stretch => "Stretch",
            WallpaperFit::Tile => "Tile",
            WallpaperFit::Center => "Center",
        }
    }
}

/// Session state and user preferences
pub trait Session: Send + Sync {
    fn ai_enabled(&self) -> bool;

    fn set_cursor(&self, url: &str);

    /// `fit` is `None` for video wallpapers
    fn set_wallpaper(&self, url: &str, fit: Option<WallpaperFit>);

    /// Pin desktop icons that only had an implicit grid position
    fn save_unpositioned_desktop_icons(&self);

    fn update_recent_files(&self, url: &str, process: &str);
}

/// External AI assistant surface
pub trait AiAssistant: Send + Sync {
    fn has_open_session(&self) -> bool;

    /// Start a new topic in the open session
    fn start_new_topic(&self, prompt: &str);

    /// Open the assistant seeded with `prompt`
    fn open_with_prompt(&self, prompt: &str);
}

/// Send `prompt`, preferring an already open session
pub fn dispatch_prompt(assistant: &dyn AiAssistant, prompt: &str) {
    if assistant.has_open_session() {
        assistant.start_new_topic(prompt);
    } else {
        assistant.open_with_prompt(prompt);
    }
}
