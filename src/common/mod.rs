//! Common utilities and types module.
// Shared path helpers and the per-entry metadata used by the builtin backend.

use std::path::{Component, Path, PathBuf};

/// Extension given to every archive produced by a batch.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Metadata for a single file or directory that goes into an archive.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub absolute_path: PathBuf,
    /// Entry name inside the archive, relative to the archived folder's parent.
    pub path: PathBuf,
    pub size: u64,
    pub permissions: u32,
    pub modified_time: Option<std::time::SystemTime>,
    pub is_dir: bool,
}

/// Name shown to the user for a folder: its last path component, or the
/// whole path when there is none (e.g. `/`).
pub fn folder_display_name(folder: &Path) -> String {
    match folder.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => folder.display().to_string(),
    }
}

/// `<parent>/<name>.zip`, the sibling archive path for `folder`.
///
/// Returns `None` when the folder has no usable base name (filesystem roots,
/// paths ending in `..`).
pub fn archive_destination(folder: &Path) -> Option<PathBuf> {
    let name = folder.file_name()?;
    let mut file_name = name.to_os_string();
    file_name.push(".");
    file_name.push(ARCHIVE_EXTENSION);
    let parent = folder.parent().unwrap_or_else(|| Path::new(""));
    Some(parent.join(file_name))
}

/// Lexically normalizes a path without touching the filesystem.
///
/// Drops `.` components, redundant and trailing separators, and folds `..`
/// against a preceding normal component. Leading `..` on relative paths is
/// kept since there is nothing to fold it into.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Renders a relative path as a ZIP entry name (always `/`-separated).
pub fn zip_entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_sibling_zip() {
        let dest = archive_destination(Path::new("/data/photos")).unwrap();
        assert_eq!(dest, PathBuf::from("/data/photos.zip"));
    }

    #[test]
    fn destination_keeps_dots_in_name() {
        let dest = archive_destination(Path::new("work/v1.2")).unwrap();
        assert_eq!(dest, PathBuf::from("work/v1.2.zip"));
    }

    #[test]
    fn root_has_no_destination() {
        assert!(archive_destination(Path::new("/")).is_none());
    }

    #[test]
    fn normalize_folds_dots_and_trailing_separator() {
        assert_eq!(normalize_path(Path::new("/a/./b/")), PathBuf::from("/a/b"));
        assert_eq!(normalize_path(Path::new("/a//b")), PathBuf::from("/a/b"));
        assert_eq!(normalize_path(Path::new("/a/c/../b")), PathBuf::from("/a/b"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let rel: PathBuf = ["proj", "sub", "b.txt"].iter().collect();
        assert_eq!(zip_entry_name(&rel), "proj/sub/b.txt");
    }
}
