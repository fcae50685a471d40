//! End-to-end menu scenarios over in-memory collaborators

use app_core::menu::{find_path, labels, MenuEntry};
use app_core::{
    AppConfig, ConversionFamily, ConversionGateway, DesktopConfig, FileReference, FormatTables,
    MenuBuilder,
    MenuRequest, NamedFile, ProbeOutcome, ProcessArgs, ProcessState, RecordingShell, Services,
    SequentialTransfer, ShellCall, StaticCapabilities, StrategyRegistry, Transcoder,
    TransferState, WallpaperFit,
};
use app_fs::{FileStat, MemoryStorage, MountKind, StorageEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Stand-in audio encoder: output is the input with a marker prefix
struct FakeAudio;

#[async_trait]
impl Transcoder for FakeAudio {
    async fn convert(
        &self,
        files: Vec<NamedFile>,
        extension: &str,
    ) -> app_core::error::Result<Vec<NamedFile>> {
        Ok(files
            .into_iter()
            .map(|(path, mut data)| {
                data.splice(0..0, extension.bytes());
                (app_core::conversion::output_name(&path, extension), data)
            })
            .collect())
    }
}

struct Fixture {
    storage: Arc<MemoryStorage>,
    shell: Arc<RecordingShell>,
    platform: Arc<StaticCapabilities>,
    transfer: Arc<SequentialTransfer>,
    builder: MenuBuilder,
}

impl Fixture {
    fn new(storage: MemoryStorage, shell: RecordingShell, platform: StaticCapabilities) -> Self {
        let storage = Arc::new(storage);
        let shell = Arc::new(shell);
        let platform = Arc::new(platform);
        let transfer = Arc::new(SequentialTransfer::new());

        let mut registry = StrategyRegistry::with_builtin();
        registry.register(ConversionFamily::AudioVideo, Arc::new(FakeAudio));

        let services = Services {
            storage: storage.clone(),
            processes: shell.clone(),
            session: shell.clone(),
            file_actions: shell.clone(),
            platform: platform.clone(),
            assistant: shell.clone(),
            conversions: Arc::new(ConversionGateway::new(
                registry,
                storage.clone(),
                transfer.clone(),
            )),
        };
        let config = AppConfig {
            desktop: DesktopConfig {
                path: "/Users/Desktop".to_string(),
                ..DesktopConfig::default()
            },
            ..AppConfig::default()
        };

        Self {
            builder: MenuBuilder::new(Arc::new(services), Arc::new(config)),
            storage,
            shell,
            platform,
            transfer,
        }
    }

    fn simple() -> Self {
        Self::new(MemoryStorage::new(), RecordingShell::new(), StaticCapabilities::all())
    }

    fn build(&self, request: MenuRequest) -> Vec<MenuEntry> {
        self.builder.build(&request)
    }
}

async fn activate(menu: &[MenuEntry], path: &[&str]) {
    find_path(menu, path)
        .and_then(MenuEntry::action)
        .unwrap_or_else(|| panic!("no action at {:?}", path))
        .invoke()
        .await;
}

fn photo_request() -> MenuRequest {
    MenuRequest::new(FileReference::entry("/Users/Desktop/photo.png", "Photos"))
        .stat(FileStat::file(1024))
}

#[test]
fn test_golden_order_for_image() {
    let fixture = Fixture::simple();
    let menu = fixture.build(photo_request());

    assert_eq!(
        labels(&menu),
        vec![
            "Open",
            "Open with",
            "Set as background",
            "Edit",
            "---",
            "Add to archive...",
            "Download",
            "Share",
            "---",
            "Convert to",
            "---",
            "Cut",
            "Copy",
            "---",
            "Create shortcut",
            "Delete",
            "Rename",
            "---",
            "Properties",
        ]
    );

    assert!(menu[0].is_primary());
    assert_eq!(menu[0].icon(), Some("/System/Icons/photo.webp"));
    assert!(!menu[1].is_primary());
    assert_eq!(
        labels(menu[1].children()),
        vec!["Monaco Editor", "Vim", "---", "Choose another app"]
    );
    assert_eq!(
        labels(menu[2].children()),
        vec!["Fill", "Fit", "Stretch", "Tile", "Center"]
    );
    assert_eq!(
        labels(menu[9].children()),
        vec!["BMP", "GIF", "ICO", "JPEG", "JPG", "TIFF", "WEBP"]
    );
}

#[test]
fn test_read_only_view_hides_file_operations() {
    let fixture = Fixture::simple();
    let menu = fixture.build(photo_request().read_only(true));

    assert_eq!(labels(&menu), vec!["Open", "Set as background", "Edit"]);
}

#[test]
fn test_empty_path_keeps_only_tail_block() {
    let fixture = Fixture::simple();
    let menu = fixture.build(MenuRequest::new(FileReference::default()));

    assert_eq!(
        labels(&menu),
        vec!["Cut", "Copy", "---", "Create shortcut", "Delete", "Rename", "---", "Properties"]
    );
}

#[test]
fn test_no_menu_starts_with_separator() {
    let fixture = Fixture::simple();
    for request in [
        photo_request(),
        photo_request().read_only(true),
        MenuRequest::new(FileReference::entry("/Users/file", "")),
        MenuRequest::new(FileReference::entry("/Users/notes.txt", "")).read_only(true),
    ] {
        let menu = fixture.build(request);
        assert!(menu.first().map_or(true, |entry| !entry.is_separator()));
    }
}

#[tokio::test]
async fn test_remote_mount_offers_disconnect() {
    let fixture = Fixture::new(
        MemoryStorage::new().with_mount("/Drive", MountKind::FileSystemAccess),
        RecordingShell::new(),
        StaticCapabilities::all(),
    );
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Drive", "FileExplorer")).stat(FileStat::directory()),
    );
    assert_eq!(labels(&menu), vec!["Open", "---", "Disconnect"]);

    activate(&menu, &["Disconnect"]).await;
    assert!(fixture.storage.journal().contains(&StorageEvent::Unmounted {
        path: "/Drive".to_string(),
        preserve_contents: false,
    }));
}

#[tokio::test]
async fn test_database_mount_keeps_contents() {
    let fixture = Fixture::new(
        MemoryStorage::new().with_mount("/OPFS", MountKind::IndexedDb),
        RecordingShell::new(),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(MenuRequest::new(FileReference::entry("/OPFS", "")).read_only(true));
    assert_eq!(labels(&menu), vec!["Disconnect"]);

    activate(&menu, &["Disconnect"]).await;
    assert!(fixture.storage.journal().contains(&StorageEvent::Unmounted {
        path: "/OPFS".to_string(),
        preserve_contents: true,
    }));
}

#[test]
fn test_file_inside_mount_is_not_shared() {
    let fixture = Fixture::new(
        MemoryStorage::new().with_mount("/Drive", MountKind::FileSystemAccess),
        RecordingShell::new(),
        StaticCapabilities::all(),
    );
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Drive/photo.png", "Photos")).stat(FileStat::file(1)),
    );
    assert!(find_path(&menu, &["Share"]).is_none());
    assert!(find_path(&menu, &["Disconnect"]).is_none());
    assert!(find_path(&menu, &["Cut"]).is_some());
}

#[tokio::test]
async fn test_summarize_truth_table() {
    for (ai_enabled, summarizer, expected) in [
        (false, ProbeOutcome::Absent, false),
        (false, ProbeOutcome::Fails, false),
        (true, ProbeOutcome::Absent, true),
        (false, ProbeOutcome::Present, true),
        (true, ProbeOutcome::Present, true),
    ] {
        let platform = StaticCapabilities::none().with_local_summarizer(summarizer);
        let fixture = Fixture::new(
            MemoryStorage::new(),
            RecordingShell::new().with_ai(ai_enabled),
            platform,
        );
        let menu = fixture.build(MenuRequest::new(FileReference::entry(
            "/Users/Documents/notes.txt",
            "MonacoEditor",
        )));

        let entry = find_path(&menu, &["Summarize Text (AI)"]);
        assert_eq!(entry.is_some(), expected, "ai={ai_enabled} summarizer={summarizer:?}");

        if expected {
            activate(&menu, &["Summarize Text (AI)"]).await;
            assert_eq!(
                fixture.shell.calls(),
                vec![ShellCall::OpenAssistant {
                    prompt: "Summarize: /Users/Documents/notes.txt".to_string()
                }]
            );
        }
    }
}

#[test]
fn test_summarize_sits_below_its_separator() {
    let fixture = Fixture::new(
        MemoryStorage::new(),
        RecordingShell::new().with_ai(true),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(MenuRequest::new(FileReference::entry(
        "/Users/Documents/notes.txt",
        "MonacoEditor",
    )));

    assert_eq!(
        labels(&menu)[..5].to_vec(),
        vec!["Open", "Open with", "---", "Summarize Text (AI)", "---"]
    );
    // the default handler is not repeated as an alternative
    assert_eq!(labels(menu[1].children()), vec!["Vim", "---", "Choose another app"]);
}

#[tokio::test]
async fn test_multi_selection_delete_runs_per_operand() {
    let fixture = Fixture::new(
        MemoryStorage::new()
            .with_file("/Users/Desktop/a.txt", "a")
            .with_file("/Users/Desktop/b.txt", "b")
            .with_file("/Users/Desktop/c.txt", "c"),
        RecordingShell::new(),
        StaticCapabilities::all(),
    );
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Desktop/a.txt", "MonacoEditor"))
            .focused(["a.txt", "b.txt"])
            .stat(FileStat::file(1)),
    );

    // not a single selection
    assert!(find_path(&menu, &["Share"]).is_none());

    activate(&menu, &["Delete"]).await;

    let deleted: Vec<_> = fixture
        .storage
        .journal()
        .into_iter()
        .filter_map(|event| match event {
            StorageEvent::Deleted { path } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(deleted, vec!["/Users/Desktop/a.txt", "/Users/Desktop/b.txt"]);
    assert!(fixture.storage.exists("/Users/Desktop/c.txt"));
    assert_eq!(fixture.shell.calls(), vec![ShellCall::SaveUnpositionedIcons]);
}

#[tokio::test]
async fn test_clipboard_uses_resolved_operands() {
    let fixture = Fixture::simple();
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Documents/b.txt", "MonacoEditor"))
            .focused(["a.txt", "b.txt", "a.txt"]),
    );

    activate(&menu, &["Cut"]).await;
    activate(&menu, &["Copy"]).await;

    let journal = fixture.storage.journal();
    let expected = vec![
        "/Users/Documents/b.txt".to_string(),
        "/Users/Documents/a.txt".to_string(),
    ];
    assert_eq!(
        journal,
        vec![
            StorageEvent::Clipboard {
                mode: app_fs::ClipboardMode::Cut,
                paths: expected.clone(),
            },
            StorageEvent::Clipboard {
                mode: app_fs::ClipboardMode::Copy,
                paths: expected,
            },
        ]
    );
}

#[tokio::test]
async fn test_create_shortcut_per_operand_kind() {
    let fixture = Fixture::new(
        MemoryStorage::new()
            .with_file("/Users/Documents/a.txt", "a")
            .with_dir("/Users/Documents/Folder"),
        RecordingShell::new(),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Documents/a.txt", "MonacoEditor"))
            .focused(["a.txt", "Folder", "missing.txt"]),
    );

    activate(&menu, &["Create shortcut"]).await;

    assert_eq!(
        fixture.shell.calls(),
        vec![
            ShellCall::NewShortcut {
                path: "/Users/Documents/a.txt".to_string(),
                process: "MonacoEditor".to_string(),
            },
            ShellCall::NewShortcut {
                path: "/Users/Documents/Folder".to_string(),
                process: "FileExplorer".to_string(),
            },
        ]
    );
}

#[test]
fn test_create_shortcut_needs_handler_or_no_extension() {
    let fixture = Fixture::simple();

    let unknown = fixture.build(MenuRequest::new(FileReference::entry("/Users/data.bin", "")));
    assert!(find_path(&unknown, &["Create shortcut"]).is_none());

    let bare = fixture.build(MenuRequest::new(FileReference::entry("/Users/Documents", "FileExplorer")));
    assert!(find_path(&bare, &["Create shortcut"]).is_some());
}

#[tokio::test]
async fn test_properties_focuses_existing_window() {
    let fixture = Fixture::new(
        MemoryStorage::new(),
        RecordingShell::new().with_window(
            "Properties__/Users/Desktop/photo.png",
            ProcessState { minimized: true },
        ),
        StaticCapabilities::all(),
    );
    let menu = fixture.build(photo_request());
    activate(&menu, &["Properties"]).await;

    assert_eq!(
        fixture.shell.calls(),
        vec![
            ShellCall::Minimize { id: "Properties__/Users/Desktop/photo.png".to_string() },
            ShellCall::SetForeground { id: "Properties__/Users/Desktop/photo.png".to_string() },
        ]
    );
}

#[tokio::test]
async fn test_properties_of_shortcut_opens_with_shortcut_path() {
    let fixture = Fixture::simple();
    let menu = fixture.build(MenuRequest::new(FileReference::new(
        "/Users/Desktop/song.url",
        "/Users/Music/song.mp3",
        "Webamp",
    )));
    activate(&menu, &["Properties"]).await;

    assert_eq!(
        fixture.shell.calls(),
        vec![ShellCall::Open {
            process: "Properties".to_string(),
            args: ProcessArgs {
                url: Some("/Users/Desktop/song.url".to_string()),
                shortcut_path: Some("/Users/Desktop/song.url".to_string()),
            },
            id: None,
        }]
    );
}

#[tokio::test]
async fn test_shortcut_open_location() {
    let fixture = Fixture::simple();
    let menu = fixture.build(MenuRequest::new(FileReference::new(
        "/Users/Desktop/song.url",
        "/Users/Music/song.mp3",
        "Webamp",
    )));

    assert_eq!(labels(&menu)[..3].to_vec(), vec!["Open", "Open file location", "Open with"]);
    // shortcuts never get the text editors
    assert_eq!(labels(menu[2].children()), vec!["Video Player", "---", "Choose another app"]);
    // conversion looks at the shortcut itself
    assert!(find_path(&menu, &["Convert to"]).is_none());

    activate(&menu, &["Open file location"]).await;
    assert_eq!(
        fixture.shell.calls(),
        vec![ShellCall::Open {
            process: "FileExplorer".to_string(),
            args: ProcessArgs::url("/Users/Music"),
            id: Some(String::new()),
        }]
    );
}

#[test]
fn test_web_shortcut_has_no_location() {
    let fixture = Fixture::simple();
    for url in ["https://example.com/page.html", "/", "nostr:npub1"] {
        let menu = fixture.build(MenuRequest::new(FileReference::new(
            "/Users/Desktop/link.url",
            url,
            "Browser",
        )));
        assert!(find_path(&menu, &["Open file location"]).is_none(), "{url}");
        assert!(find_path(&menu, &["Open folder location"]).is_none(), "{url}");
    }

    let folder = fixture.build(MenuRequest::new(FileReference::new(
        "/Users/Desktop/Docs.url",
        "/Users/Documents",
        "FileExplorer",
    )));
    assert!(find_path(&folder, &["Open folder location"]).is_some());
}

#[tokio::test]
async fn test_file_explorer_redirects_in_place() {
    let fixture = Fixture::simple();
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Documents", "FileExplorer"))
            .file_manager("FileExplorer__/Users"),
    );

    assert_eq!(labels(&menu)[..2].to_vec(), vec!["Open", "Open in new window"]);
    assert_eq!(menu[0].icon(), Some("/System/Icons/explorer.webp"));

    activate(&menu, &["Open"]).await;
    activate(&menu, &["Open in new window"]).await;
    assert_eq!(
        fixture.shell.calls(),
        vec![
            ShellCall::ChangeUrl {
                id: "FileExplorer__/Users".to_string(),
                url: "/Users/Documents".to_string(),
            },
            ShellCall::Open {
                process: "FileExplorer".to_string(),
                args: ProcessArgs::url("/Users/Documents"),
                id: None,
            },
            ShellCall::UpdateRecentFiles {
                url: "/Users/Documents".to_string(),
                process: "FileExplorer".to_string(),
            },
        ]
    );
}

#[test]
fn test_mountable_archive_opens_normally() {
    let fixture = Fixture::simple();
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Downloads/disc.iso", "FileExplorer"))
            .file_manager("FileExplorer__/Users/Downloads"),
    );

    assert!(find_path(&menu, &["Open in new window"]).is_none());
    let archive_block: Vec<_> = labels(&menu)
        .into_iter()
        .skip_while(|label| *label != "Add to archive...")
        .take(4)
        .collect();
    assert_eq!(archive_block, vec!["Add to archive...", "Extract Here", "---", "Download"]);
}

#[tokio::test]
async fn test_video_plays_and_sets_background() {
    let fixture = Fixture::simple();
    let menu = fixture.build(MenuRequest::new(FileReference::entry(
        "/Users/Videos/clip.mp4",
        "VideoPlayer",
    )));

    assert_eq!(labels(&menu)[0], "Play");
    let background = find_path(&menu, &["Set as background"]).unwrap();
    assert!(background.children().is_empty());

    activate(&menu, &["Set as background"]).await;
    activate(&menu, &["Convert to", "WEBM"]).await;
    assert_eq!(
        fixture.shell.calls()[0],
        ShellCall::SetWallpaper {
            url: "/Users/Videos/clip.mp4".to_string(),
            fit: None,
        }
    );
}

#[tokio::test]
async fn test_image_background_fit() {
    let fixture = Fixture::simple();
    let menu = fixture.build(photo_request());
    activate(&menu, &["Set as background", "Tile"]).await;
    activate(&menu, &["Edit"]).await;

    assert_eq!(
        fixture.shell.calls(),
        vec![
            ShellCall::SetWallpaper {
                url: "/Users/Desktop/photo.png".to_string(),
                fit: Some(WallpaperFit::Tile),
            },
            ShellCall::Open {
                process: "Paint".to_string(),
                args: ProcessArgs::url("/Users/Desktop/photo.png"),
                id: None,
            },
            ShellCall::UpdateRecentFiles {
                url: "/Users/Desktop/photo.png".to_string(),
                process: "Paint".to_string(),
            },
        ]
    );
}

#[test]
fn test_cursor_and_vector_images() {
    let fixture = Fixture::simple();

    let cursor = fixture.build(MenuRequest::new(FileReference::entry("/Users/arrow.cur", "Photos")));
    assert!(find_path(&cursor, &["Set as mouse pointer"]).is_some());
    assert!(find_path(&cursor, &["Set as background"]).is_none());

    let vector = fixture.build(MenuRequest::new(FileReference::entry("/Users/logo.svg", "Photos")));
    assert!(find_path(&vector, &["Set as background"]).is_none());
    assert!(find_path(&vector, &["Edit"]).is_some());
    assert_eq!(
        labels(find_path(&vector, &["Open with"]).unwrap().children()),
        vec!["Browser", "Monaco Editor", "Vim", "---", "Choose another app"]
    );
}

#[test]
fn test_open_with_is_primary_without_process() {
    let fixture = Fixture::simple();
    let menu = fixture.build(MenuRequest::new(FileReference::entry("/Users/readme.md", "")));

    assert_eq!(labels(&menu)[0], "Open with");
    assert!(menu[0].is_primary());
    assert_eq!(
        labels(menu[0].children()),
        vec!["Marked", "Monaco Editor", "Vim", "---", "Choose another app"]
    );
}

#[tokio::test]
async fn test_share_payload_and_suppression() {
    let fixture = Fixture::simple();
    let menu = fixture.build(photo_request());
    activate(&menu, &["Share"]).await;

    let shared = fixture.platform.shared();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].title, "photo.png");
    assert_eq!(shared[0].text, "photo.png - ContextShell");
    assert_eq!(shared[0].url, "https://localhost?url=/Users/Desktop/photo.png");

    let failing = Fixture::new(
        MemoryStorage::new(),
        RecordingShell::new(),
        StaticCapabilities::all().with_share(ProbeOutcome::Fails),
    );
    assert!(find_path(&failing.build(photo_request()), &["Share"]).is_none());

    // a directory or a missing stat is never shared
    let directory = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Desktop/photo.png", "Photos"))
            .stat(FileStat::directory()),
    );
    assert!(find_path(&directory, &["Share"]).is_none());
    let unknown = fixture.build(MenuRequest::new(FileReference::entry(
        "/Users/Desktop/photo.png",
        "Photos",
    )));
    assert!(find_path(&unknown, &["Share"]).is_none());
}

#[tokio::test]
async fn test_root_shortcut_maps_directories() {
    let fixture = Fixture::simple();
    let request = MenuRequest::new(FileReference::new("/Users/Desktop/My PC.url", "/", "FileExplorer"));
    let menu = fixture.build(request.clone());

    assert_eq!(
        labels(&menu),
        vec![
            "Open",
            "---",
            "Map directory",
            "Map OPFS",
            "---",
            "Cut",
            "Copy",
            "---",
            "Create shortcut",
            "Delete",
            "Rename",
            "---",
            "Properties",
        ]
    );

    activate(&menu, &["Map directory"]).await;
    let journal = fixture.storage.journal();
    assert_eq!(
        journal,
        vec![
            StorageEvent::Mapped {
                root: "/".to_string(),
                folder: "Picked".to_string(),
            },
            StorageEvent::FolderUpdated {
                directory: "/".to_string(),
                added: Some("Picked".to_string()),
            },
        ]
    );
    assert_eq!(
        fixture.shell.calls(),
        vec![ShellCall::Open {
            process: "FileExplorer".to_string(),
            args: ProcessArgs::url("/Picked"),
            id: None,
        }]
    );

    let restrictive = Fixture::new(
        MemoryStorage::new(),
        RecordingShell::new(),
        StaticCapabilities::all()
            .with_restrictive_browser(ProbeOutcome::Present)
            .with_directory_picker(ProbeOutcome::Fails),
    );
    let menu = restrictive.build(request);
    assert!(find_path(&menu, &["Map directory"]).is_none());
    assert!(find_path(&menu, &["Map OPFS"]).is_none());
    assert_eq!(labels(&menu)[..3].to_vec(), vec!["Open", "---", "Cut"]);
}

#[tokio::test]
async fn test_convert_audio_commits_next_to_source() {
    let fixture = Fixture::new(
        MemoryStorage::new().with_file("/Users/Music/song.wav", "RIFF"),
        RecordingShell::new(),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(MenuRequest::new(FileReference::entry("/Users/Music/song.wav", "Webamp")));

    assert_eq!(
        labels(find_path(&menu, &["Convert to"]).unwrap().children()),
        vec!["AAC", "FLAC", "M4A", "MP3", "OGG", "OPUS"]
    );

    activate(&menu, &["Convert to", "MP3"]).await;
    let progress = fixture
        .transfer
        .handle("/Users/Music/song.wav")
        .unwrap()
        .finished()
        .await;

    assert_eq!(progress.state, TransferState::Done);
    assert_eq!(fixture.storage.contents("/Users/Music/song.mp3").unwrap(), b"mp3RIFF");
    assert!(fixture.storage.journal().contains(&StorageEvent::FolderUpdated {
        directory: "/Users/Music".to_string(),
        added: Some("song.mp3".to_string()),
    }));
}

#[test]
fn test_media_never_converts_to_its_own_extension() {
    let fixture = Fixture::new(MemoryStorage::new(), RecordingShell::new(), StaticCapabilities::none());
    let tables = FormatTables::default();
    let mut extensions: Vec<_> = tables.audio_decode.iter().chain(&tables.video_decode).collect();
    extensions.sort();

    for extension in extensions {
        let path = format!("/Users/Media/clip{}", extension);
        let menu = fixture.build(MenuRequest::new(FileReference::entry(&path, "VideoPlayer")));
        let convert = find_path(&menu, &["Convert to"]).unwrap_or_else(|| panic!("{extension}"));

        let own = extension.trim_start_matches('.').to_uppercase();
        let targets = labels(convert.children());
        assert!(!targets.is_empty(), "{extension}");
        assert!(!targets.contains(&own.as_str()), "{extension} offers {own}");
    }
}

#[tokio::test]
async fn test_cancelled_conversion_writes_nothing() {
    let fixture = Fixture::new(
        MemoryStorage::new()
            .with_file("/Users/Music/a.wav", "a")
            .with_file("/Users/Music/b.wav", "b"),
        RecordingShell::new(),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Music/a.wav", "Webamp")).focused(["a.wav", "b.wav"]),
    );

    activate(&menu, &["Convert to", "OGG"]).await;
    let handle = fixture.transfer.handle("/Users/Music/a.wav").unwrap();
    handle.cancel();
    let progress = handle.finished().await;

    assert_eq!(progress.state, TransferState::Cancelled);
    assert!(!fixture.storage.exists("/Users/Music/a.ogg"));
    assert!(!fixture.storage.exists("/Users/Music/b.ogg"));
}

#[tokio::test]
async fn test_spreadsheet_without_converter_closes_dialog() {
    let fixture = Fixture::new(
        MemoryStorage::new().with_file("/Users/Documents/sheet.csv", "1,2"),
        RecordingShell::new(),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(MenuRequest::new(FileReference::entry(
        "/Users/Documents/sheet.csv",
        "Spreadsheet",
    )));

    assert_eq!(
        labels(find_path(&menu, &["Convert to"]).unwrap().children()),
        vec!["NUMBERS", "ODS", "XLS", "XLSX"]
    );

    activate(&menu, &["Convert to", "XLSX"]).await;
    assert!(!fixture.transfer.is_open("/Users/Documents/sheet.csv"));
    assert!(!fixture.storage.exists("/Users/Documents/sheet.xlsx"));
}

#[tokio::test]
async fn test_playlist_converts_to_m3u() {
    let fixture = Fixture::new(
        MemoryStorage::new().with_file(
            "/Users/Music/mix.pls",
            "[playlist]\nFile1=/Users/Music/song.mp3\nTitle1=Song\nLength1=90\n",
        ),
        RecordingShell::new(),
        StaticCapabilities::none(),
    );
    let menu = fixture.build(MenuRequest::new(FileReference::entry("/Users/Music/mix.pls", "Webamp")));

    activate(&menu, &["Convert to M3U"]).await;
    fixture
        .transfer
        .handle("/Users/Music/mix.pls")
        .unwrap()
        .finished()
        .await;

    let playlist = fixture.storage.contents("/Users/Music/mix.m3u").unwrap();
    assert_eq!(
        String::from_utf8(playlist).unwrap(),
        "#EXTM3U\n#EXTINF:90,Song\n/Users/Music/song.mp3\n"
    );
}

#[tokio::test]
async fn test_rename_and_archive_actions() {
    let fixture = Fixture::simple();
    let menu = fixture.build(
        MenuRequest::new(FileReference::entry("/Users/Downloads/pack.zip", "FileExplorer"))
            .focused(["pack.zip", "other.zip"]),
    );

    activate(&menu, &["Rename"]).await;
    activate(&menu, &["Add to archive..."]).await;
    activate(&menu, &["Extract Here"]).await;
    activate(&menu, &["Download"]).await;

    let operands = vec![
        "/Users/Downloads/pack.zip".to_string(),
        "/Users/Downloads/other.zip".to_string(),
    ];
    assert_eq!(
        fixture.shell.calls(),
        vec![
            ShellCall::BeginRename { name: "pack.zip".to_string() },
            ShellCall::ArchiveFiles { paths: operands.clone() },
            ShellCall::ExtractFiles { url: "/Users/Downloads/pack.zip".to_string() },
            ShellCall::DownloadFiles { paths: operands },
        ]
    );
}
