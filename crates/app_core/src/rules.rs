//! Menu rules
//!
//! A rule inspects the resolved `RuleContext` and returns at most one
//! contribution. `PIPELINE` order matters: the tail block is appended in
//! declaration order, and every later prepend lands above the earlier ones.

use crate::builder::{FileReference, MenuRequest, Services};
use crate::capability::{BackgroundKind, CapabilityFlags};
use crate::config::AppConfig;
use crate::conversion::{ConversionFamily, ConversionJob};
use crate::formats::FormatTables;
use crate::menu::{Action, MenuEntry};
use crate::pipeline::Contribution;
use crate::platform::{probe, ShareData};
use crate::process::{
    process_id, ProcessArgs, ProcessDirectory, FILE_EXPLORER, OPEN_WITH, PAINT, PROPERTIES,
};
use crate::session::{dispatch_prompt, WallpaperFit};
use app_fs::{vpath, DirectoryHandle, MountKind, MountRegistry};
use std::sync::Arc;

const SHARE_ICON: &str = "/System/Icons/share.webp";

/// Url schemes that "Open location" never applies to
const WEB_SCHEMES: [&str; 3] = ["http:", "https:", "nostr:"];

/// Everything a rule may look at
pub struct RuleContext<'a> {
    pub services: &'a Arc<Services>,
    pub config: &'a AppConfig,
    pub tables: &'a FormatTables,
    pub directory: &'a ProcessDirectory,
    pub request: &'a MenuRequest,
    pub file: &'a FileReference,
    pub mounts: MountRegistry,
    pub flags: CapabilityFlags,
    pub single_selection: bool,
    pub operands: Arc<Vec<String>>,
    pub default_process: Option<&'static str>,
}

impl RuleContext<'_> {
    /// Not read-only and not a disconnectable mount
    pub fn is_editable(&self) -> bool {
        !self.request.read_only && !self.flags.is_remote_mount
    }

    pub fn is_root_shortcut(&self) -> bool {
        self.file.path == self.config.root_shortcut_path()
    }

    /// Editable entry with a path other than the root shortcut
    pub fn is_regular_entry(&self) -> bool {
        self.is_editable() && !self.file.path.is_empty() && !self.is_root_shortcut()
    }

    pub fn has_process(&self) -> bool {
        !self.file.pid.is_empty()
    }

    /// Handlers offered under "Open with", in menu order
    pub fn open_with_candidates(&self) -> Vec<String> {
        let pid = self.file.pid.as_str();
        let mut candidates: Vec<String> = self
            .tables
            .handlers(&self.flags.url_extension)
            .iter()
            .filter(|process| **process != pid)
            .map(|process| process.to_string())
            .collect();

        if self.is_regular_entry() && !self.flags.is_shortcut && !self.file.opens_in_file_explorer() {
            for editor in &self.config.menu.text_editors {
                if self.default_process != Some(editor.as_str())
                    && editor != pid
                    && !candidates.contains(editor)
                {
                    candidates.push(editor.clone());
                }
            }
        }

        candidates
    }

    /// Open the entry's url in `process` and record it
    fn open_file(&self, process: &str) -> Action {
        let services = self.services.clone();
        let url = self.file.url.clone();
        let process = process.to_string();

        Action::sync(move || {
            services
                .processes
                .open(&process, ProcessArgs::url(url.clone()), None);
            if !url.is_empty() {
                services.session.update_recent_files(&url, &process);
            }
        })
    }

    fn share_data(&self) -> ShareData {
        let name = vpath::basename(&self.file.url);
        ShareData {
            title: name.to_string(),
            text: format!("{} - {}", name, self.config.general.alias),
            url: format!("{}?url={}", self.config.general.origin, self.file.url),
        }
    }
}

/// One named step of the pipeline
pub struct Rule {
    pub name: &'static str,
    pub contribute: fn(&RuleContext<'_>) -> Option<Contribution>,
}

/// Rules in application order
pub const PIPELINE: &[Rule] = &[
    Rule { name: "file_operations", contribute: file_operations },
    Rule { name: "directory_mapping", contribute: directory_mapping },
    Rule { name: "regular_entry_separator", contribute: regular_entry_separator },
    Rule { name: "media_conversion", contribute: media_conversion },
    Rule { name: "spreadsheet_conversion", contribute: spreadsheet_conversion },
    Rule { name: "playlist_conversion", contribute: playlist_conversion },
    Rule { name: "share", contribute: share },
    Rule { name: "archive", contribute: archive },
    Rule { name: "editable_separator", contribute: editable_separator },
    Rule { name: "disconnect", contribute: disconnect },
    Rule { name: "edit_image", contribute: edit_image },
    Rule { name: "set_cursor", contribute: set_cursor },
    Rule { name: "summarize", contribute: summarize },
    Rule { name: "background", contribute: background },
    Rule { name: "open_with", contribute: open_with },
    Rule { name: "open_location", contribute: open_location },
    Rule { name: "open_in_new_window", contribute: open_in_new_window },
    Rule { name: "open", contribute: open },
];

/// Streaming video url that cannot be shared as a file
pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com/") || url.contains("youtu.be/")
}

fn file_operations(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_editable() {
        return None;
    }

    let mut entries = vec![
        MenuEntry::leaf("Cut", {
            let services = ctx.services.clone();
            let operands = ctx.operands.clone();
            Action::sync(move || services.storage.move_entries(&operands))
        }),
        MenuEntry::leaf("Copy", {
            let services = ctx.services.clone();
            let operands = ctx.operands.clone();
            Action::sync(move || services.storage.copy_entries(&operands))
        }),
        MenuEntry::Separator,
    ];

    if ctx.default_process.is_some() || ctx.flags.is_shortcut || ctx.flags.has_no_extension {
        entries.push(MenuEntry::leaf("Create shortcut", create_shortcut(ctx)));
    }

    entries.extend([
        MenuEntry::leaf("Delete", delete(ctx)),
        MenuEntry::leaf("Rename", {
            let services = ctx.services.clone();
            let name = vpath::basename(&ctx.file.path).to_string();
            Action::sync(move || services.file_actions.begin_rename(&name))
        }),
        MenuEntry::Separator,
        MenuEntry::leaf("Properties", properties(ctx)),
    ]);

    Some(Contribution::append(entries))
}

fn create_shortcut(ctx: &RuleContext<'_>) -> Action {
    let services = ctx.services.clone();
    let operands = ctx.operands.clone();
    let default_process = ctx.default_process;

    Action::new(move || {
        let services = services.clone();
        let operands = operands.clone();
        async move {
            for entry in operands.iter() {
                let stat = match services.storage.lstat(entry).await {
                    Ok(stat) => stat,
                    Err(e) => {
                        tracing::debug!(path = %entry, error = %e, "lstat failed, no shortcut");
                        continue;
                    }
                };
                let process = match default_process {
                    Some(process) if !stat.is_directory() => process,
                    _ => FILE_EXPLORER,
                };
                services.file_actions.new_shortcut(entry, process).await;
            }
        }
    })
}

fn delete(ctx: &RuleContext<'_>) -> Action {
    let services = ctx.services.clone();
    let operands = ctx.operands.clone();
    let path = ctx.file.path.clone();
    let desktop = ctx.config.desktop.path.clone();

    Action::new(move || {
        let services = services.clone();
        let operands = operands.clone();
        let path = path.clone();
        let desktop = desktop.clone();
        async move {
            let directory = vpath::dirname(&path);
            if vpath::normalize(directory) == vpath::normalize(&desktop) {
                services.session.save_unpositioned_desktop_icons();
            }
            for entry in operands.iter() {
                if let Err(e) = services.storage.delete_local_path(entry).await {
                    tracing::warn!(path = %entry, "Delete failed: {}", e);
                }
            }
            services.storage.update_folder(directory, None);
        }
    })
}

fn properties(ctx: &RuleContext<'_>) -> Action {
    let services = ctx.services.clone();
    let url = ctx.file.url.clone();
    let path = ctx.file.path.clone();
    let is_shortcut = ctx.flags.is_shortcut;

    Action::sync(move || {
        let id = process_id(PROPERTIES, &url);
        match services.processes.get(&id) {
            Some(state) => {
                if state.minimized {
                    services.processes.minimize(&id);
                }
                services.processes.set_foreground(&id);
            }
            None => {
                let args = if is_shortcut {
                    ProcessArgs {
                        url: Some(path.clone()),
                        shortcut_path: Some(path.clone()),
                    }
                } else {
                    ProcessArgs::url(url.clone())
                };
                services.processes.open(PROPERTIES, args, None);
            }
        }
    })
}

fn directory_mapping(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_editable() || ctx.file.path.is_empty() || !ctx.is_root_shortcut() {
        return None;
    }

    let platform = &ctx.services.platform;
    if !probe("FileSystemHandle", platform.has_file_system_handle()) {
        return None;
    }

    let mut entries = Vec::new();
    if probe("showDirectoryPicker", platform.has_directory_picker()) {
        let services = ctx.services.clone();
        entries.push(MenuEntry::leaf(
            "Map directory",
            Action::new(move || {
                let services = services.clone();
                async move {
                    match services.platform.pick_directory().await {
                        Ok(handle) => map_and_open(&services, "/", handle).await,
                        Err(e) => tracing::debug!(error = %e, "No directory picked"),
                    }
                }
            }),
        ));
    }

    let opfs = probe("storage.getDirectory", platform.has_origin_private_storage())
        && !probe("restrictive browser", platform.is_restrictive_browser());
    if opfs {
        let services = ctx.services.clone();
        entries.push(MenuEntry::leaf(
            "Map OPFS",
            Action::new(move || {
                let services = services.clone();
                async move {
                    match services.platform.origin_private_directory().await {
                        Ok(handle) => map_and_open(&services, "/OPFS", handle).await,
                        Err(e) => tracing::debug!(error = %e, "Origin-private storage unavailable"),
                    }
                }
            }),
        ));
    }

    if !entries.is_empty() {
        entries.push(MenuEntry::Separator);
    }
    Some(Contribution::prepend(entries))
}

async fn map_and_open(services: &Services, root: &str, handle: DirectoryHandle) {
    match services.storage.map_directory(root, Some(handle)).await {
        Ok(folder) => {
            services.storage.update_folder("/", Some(&folder));
            services
                .processes
                .open(FILE_EXPLORER, ProcessArgs::url(vpath::join("/", &folder)), None);
        }
        Err(e) => tracing::debug!(root, error = %e, "Mapping failed"),
    }
}

fn regular_entry_separator(ctx: &RuleContext<'_>) -> Option<Contribution> {
    ctx.is_regular_entry()
        .then(|| Contribution::prepend(vec![MenuEntry::Separator]))
}

/// "Convert to" leaf for one target format
fn convert_leaf(ctx: &RuleContext<'_>, format: &str, family: ConversionFamily) -> MenuEntry {
    let extension = format.trim_start_matches('.').to_string();
    let label = extension.to_uppercase();
    let services = ctx.services.clone();
    let operands = ctx.operands.clone();
    let path = ctx.file.path.clone();

    MenuEntry::leaf(
        label,
        Action::sync(move || {
            let job = ConversionJob::new(path.clone(), extension.clone());
            services.conversions.start(&job, &operands, family);
        }),
    )
}

fn conversion_submenu(
    ctx: &RuleContext<'_>,
    formats: &[&'static str],
    family: ConversionFamily,
) -> Contribution {
    let targets = formats
        .iter()
        .filter(|format| **format != ctx.flags.path_extension)
        .map(|format| convert_leaf(ctx, format, family))
        .collect();
    Contribution::prepend(vec![MenuEntry::Separator, MenuEntry::submenu("Convert to", targets)])
}

fn media_conversion(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_regular_entry() {
        return None;
    }
    let kind = ctx.flags.decodable_media?;
    Some(conversion_submenu(ctx, ctx.tables.encode_formats(kind), kind.family()))
}

fn spreadsheet_conversion(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_regular_entry() || !ctx.flags.is_spreadsheet {
        return None;
    }
    Some(conversion_submenu(ctx, &ctx.tables.spreadsheet, ConversionFamily::Spreadsheet))
}

fn playlist_conversion(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_regular_entry() || !ctx.flags.is_convertible_playlist {
        return None;
    }

    let mut leaf = convert_leaf(ctx, ctx.tables.canonical_playlist, ConversionFamily::Playlist);
    if let MenuEntry::Leaf(inner) = &mut leaf {
        inner.label = format!("Convert to {}", inner.label);
    }
    Some(Contribution::prepend(vec![MenuEntry::Separator, leaf]))
}

fn share(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_regular_entry()
        || !ctx.single_selection
        || ctx.file.opens_in_file_explorer()
        || is_youtube_url(&ctx.file.url)
        || ctx.flags.is_under_mount
        || !ctx.request.stat.is_some_and(|stat| stat.is_file())
    {
        return None;
    }

    let data = ctx.share_data();
    if !probe("canShare", ctx.services.platform.can_share(&data)) {
        return None;
    }

    let services = ctx.services.clone();
    let action = Action::new(move || {
        let services = services.clone();
        let data = data.clone();
        async move {
            if let Err(e) = services.platform.share(data).await {
                tracing::debug!(error = %e, "Share failed");
            }
        }
    });
    Some(Contribution::prepend(vec![
        MenuEntry::leaf("Share", action).with_icon(Some(SHARE_ICON.to_string())),
    ]))
}

fn archive(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.is_regular_entry() {
        return None;
    }

    let mut entries = vec![MenuEntry::leaf("Add to archive...", {
        let services = ctx.services.clone();
        let operands = ctx.operands.clone();
        Action::new(move || {
            let services = services.clone();
            let operands = operands.clone();
            async move { services.file_actions.archive_files(operands.to_vec()).await }
        })
    })];

    if ctx.flags.is_extractable_or_mountable {
        let services = ctx.services.clone();
        let url = ctx.file.url.clone();
        entries.push(MenuEntry::leaf(
            "Extract Here",
            Action::new(move || {
                let services = services.clone();
                let url = url.clone();
                async move { services.file_actions.extract_files(&url).await }
            }),
        ));
        entries.push(MenuEntry::Separator);
    }

    entries.push(MenuEntry::leaf("Download", {
        let services = ctx.services.clone();
        let operands = ctx.operands.clone();
        Action::new(move || {
            let services = services.clone();
            let operands = operands.clone();
            async move { services.file_actions.download_files(operands.to_vec()).await }
        })
    }));

    Some(Contribution::prepend(entries))
}

fn editable_separator(ctx: &RuleContext<'_>) -> Option<Contribution> {
    ctx.is_editable()
        .then(|| Contribution::prepend(vec![MenuEntry::Separator]))
}

fn disconnect(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.flags.is_remote_mount {
        return None;
    }

    let services = ctx.services.clone();
    let path = ctx.file.path.clone();
    let action = Action::new(move || {
        let services = services.clone();
        let path = path.clone();
        async move {
            let preserve = services
                .storage
                .mounts()
                .get(&path)
                .map_or(true, |kind| kind != MountKind::FileSystemAccess);
            if let Err(e) = services.storage.unmount(&path, preserve).await {
                tracing::warn!(path = %path, "Disconnect failed: {}", e);
            }
        }
    });
    Some(Contribution::append(vec![
        MenuEntry::Separator,
        MenuEntry::leaf("Disconnect", action),
    ]))
}

fn edit_image(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.flags.is_editable_image {
        return None;
    }
    Some(Contribution::prepend(vec![MenuEntry::leaf("Edit", ctx.open_file(PAINT))]))
}

fn set_cursor(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.flags.is_cursor {
        return None;
    }
    let services = ctx.services.clone();
    let url = ctx.file.url.clone();
    Some(Contribution::prepend(vec![MenuEntry::leaf(
        "Set as mouse pointer",
        Action::sync(move || services.session.set_cursor(&url)),
    )]))
}

fn summarize(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.flags.is_summarizable {
        return None;
    }
    let services = ctx.services.clone();
    let prompt = format!("Summarize: {}", ctx.file.url);
    Some(Contribution::prepend(vec![
        MenuEntry::Separator,
        MenuEntry::leaf(
            "Summarize Text (AI)",
            Action::sync(move || dispatch_prompt(services.assistant.as_ref(), &prompt)),
        ),
    ]))
}

fn wallpaper(ctx: &RuleContext<'_>, fit: Option<WallpaperFit>) -> Action {
    let services = ctx.services.clone();
    let url = ctx.file.url.clone();
    Action::sync(move || services.session.set_wallpaper(&url, fit))
}

fn background(ctx: &RuleContext<'_>) -> Option<Contribution> {
    let entry = match ctx.flags.background? {
        BackgroundKind::Video => MenuEntry::leaf("Set as background", wallpaper(ctx, None)),
        BackgroundKind::Image => MenuEntry::submenu(
            "Set as background",
            WallpaperFit::ALL
                .iter()
                .map(|fit| MenuEntry::leaf(fit.label(), wallpaper(ctx, Some(*fit))))
                .collect(),
        ),
    };
    Some(Contribution::prepend(vec![entry]))
}

fn open_with(ctx: &RuleContext<'_>) -> Option<Contribution> {
    let candidates = ctx.open_with_candidates();
    if candidates.is_empty() {
        return None;
    }

    let mut entries: Vec<MenuEntry> = candidates
        .iter()
        .map(|id| {
            MenuEntry::leaf(ctx.directory.title(id), ctx.open_file(id))
                .with_icon(ctx.directory.icon(id))
        })
        .collect();

    let services = ctx.services.clone();
    let url = ctx.file.url.clone();
    entries.push(MenuEntry::Separator);
    entries.push(MenuEntry::leaf(
        "Choose another app",
        Action::sync(move || {
            services
                .processes
                .open(OPEN_WITH, ProcessArgs::url(url.clone()), None)
        }),
    ));

    Some(Contribution::prepend(vec![
        MenuEntry::submenu("Open with", entries).with_primary(!ctx.has_process()),
    ]))
}

fn open_location(ctx: &RuleContext<'_>) -> Option<Contribution> {
    let url = ctx.file.url.as_str();
    if !ctx.has_process()
        || !ctx.flags.is_shortcut
        || url.is_empty()
        || url == "/"
        || WEB_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
    {
        return None;
    }

    let is_folder = matches!(ctx.flags.url_extension.as_str(), "" | ".zip");
    let label = format!("Open {} location", if is_folder { "folder" } else { "file" });
    let services = ctx.services.clone();
    let directory = vpath::dirname(url).to_string();

    Some(Contribution::prepend(vec![MenuEntry::leaf(
        label,
        Action::sync(move || {
            services
                .processes
                .open(FILE_EXPLORER, ProcessArgs::url(directory.clone()), Some(""))
        }),
    )]))
}

/// FileExplorer entry that can be browsed in place
fn browses_in_place(ctx: &RuleContext<'_>) -> bool {
    ctx.request.file_manager_id.is_some()
        && ctx.file.opens_in_file_explorer()
        && !ctx.flags.is_mountable
}

fn open_in_new_window(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.has_process() || !browses_in_place(ctx) {
        return None;
    }
    Some(Contribution::prepend(vec![MenuEntry::leaf(
        "Open in new window",
        ctx.open_file(&ctx.file.pid),
    )]))
}

fn open(ctx: &RuleContext<'_>) -> Option<Contribution> {
    if !ctx.has_process() {
        return None;
    }

    let label = if ctx.flags.is_video { "Play" } else { "Open" };
    let action = match (&ctx.request.file_manager_id, browses_in_place(ctx)) {
        (Some(window), true) => {
            let services = ctx.services.clone();
            let window = window.clone();
            let url = ctx.file.url.clone();
            Action::sync(move || services.processes.change_url(&window, &url))
        }
        _ => ctx.open_file(&ctx.file.pid),
    };

    Some(Contribution::prepend(vec![MenuEntry::leaf(label, action)
        .with_icon(ctx.directory.icon(&ctx.file.pid))
        .with_primary(true)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_youtube_urls() {
        assert!(is_youtube_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_youtube_url("https://youtu.be/abc"));
        assert!(!is_youtube_url("/Users/Videos/youtube.mp4"));
    }

    #[test]
    fn test_rule_names_are_unique() {
        let names: HashSet<_> = PIPELINE.iter().map(|rule| rule.name).collect();
        assert_eq!(names.len(), PIPELINE.len());
        assert_eq!(PIPELINE.last().map(|rule| rule.name), Some("open"));
    }
}
