//! Virtual path helpers
//!
//! Shell paths are always `/`-separated strings regardless of host OS, so
//! these helpers work on `&str` instead of `std::path::Path`.

/// Path separator used by the virtual file system
pub const SEPARATOR: char = '/';

/// Last component of a path (`/a/b.txt` -> `b.txt`)
pub fn basename(path: &str) -> &str {
    let trimmed = trim_trailing_separators(path);
    if trimmed == "/" {
        return "";
    }
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Parent directory of a path (`/a/b.txt` -> `/a`, `/a` -> `/`, `a` -> `.`)
pub fn dirname(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = trim_trailing_separators(path);
    if trimmed == "/" {
        return "/";
    }
    match trimmed.rfind(SEPARATOR) {
        Some(0) => "/",
        Some(idx) => trim_trailing_separators(&trimmed[..idx]),
        None => ".",
    }
}

/// Extension of the last component including the dot, as written.
///
/// Dotfiles have no extension (`.bashrc` -> `""`).
pub fn extname(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// Case-normalized extension used for every table lookup
pub fn extension(path: &str) -> String {
    extname(path).to_lowercase()
}

/// Base name without its extension (`/a/song.wav` -> `song`)
pub fn stem(path: &str) -> &str {
    let name = basename(path);
    let ext = extname(name);
    &name[..name.len() - ext.len()]
}

/// Join two paths and normalize the result
pub fn join(base: &str, child: &str) -> String {
    if child.is_empty() {
        return normalize(base);
    }
    if base.is_empty() {
        return normalize(child);
    }
    normalize(&format!("{}{}{}", base, SEPARATOR, child))
}

/// Collapse duplicate separators and resolve `.` / `..` components
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with(SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(SEPARATOR) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().map_or(false, |last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Path is strictly inside `directory`
pub fn is_within(path: &str, directory: &str) -> bool {
    let prefix = if directory.ends_with(SEPARATOR) {
        directory.to_string()
    } else {
        format!("{}{}", directory, SEPARATOR)
    };
    path.len() > prefix.len() && path.starts_with(&prefix)
}

fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() && path.starts_with(SEPARATOR) {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_dirname() {
        assert_eq!(basename("/Users/Desktop/photo.png"), "photo.png");
        assert_eq!(dirname("/Users/Desktop/photo.png"), "/Users/Desktop");
        assert_eq!(dirname("/photo.png"), "/");
        assert_eq!(dirname("photo.png"), ".");
        assert_eq!(dirname("/"), "/");
        assert_eq!(basename("/Users/"), "Users");
        assert_eq!(basename("/"), "");
    }

    #[test]
    fn test_extension_is_case_normalized() {
        assert_eq!(extname("/a/Song.WAV"), ".WAV");
        assert_eq!(extension("/a/Song.WAV"), ".wav");
        assert_eq!(extension("/a/.bashrc"), "");
        assert_eq!(extension("/a/folder"), "");
        assert_eq!(extension("/a/archive.tar.gz"), ".gz");
    }

    #[test]
    fn test_stem() {
        assert_eq!(stem("/music/song.wav"), "song");
        assert_eq!(stem("/music/README"), "README");
    }

    #[test]
    fn test_join_normalizes() {
        assert_eq!(join("/dir", "a.txt"), "/dir/a.txt");
        assert_eq!(join("/", "OPFS"), "/OPFS");
        assert_eq!(join("/dir/", "./b.txt"), "/dir/b.txt");
        assert_eq!(join("/dir/sub", "../c.txt"), "/dir/c.txt");
        assert_eq!(normalize("//a//b/"), "/a/b");
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("/mnt/drive/a.txt", "/mnt/drive"));
        assert!(!is_within("/mnt/drive", "/mnt/drive"));
        assert!(!is_within("/mnt/drive2/a.txt", "/mnt/drive"));
    }
}
