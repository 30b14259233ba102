//! Cross-platform filesystem wrapper.
//!
//! On Unix we transparently re-export std::fs. On Windows, removing a tree
//! fails as soon as one file carries the read-only attribute, so
//! [`remove_tree`] clears that attribute across the tree and retries once.
//!
//! [`remove_tree`] refuses a symbolic link: removing it would delete only the
//! link and leave the linked folder's contents on disk.
//!
//! The rest of the crate imports `crate::fsx as fs` instead of touching
//! `std::fs` directly, keeping call-sites identical across OSes.

use std::io;
use std::path::Path;

pub use std::fs::*;

/// Recursively removes `path` and everything below it.
#[cfg(not(target_os = "windows"))]
pub fn remove_tree(path: &Path) -> io::Result<()> {
    refuse_symlink(path)?;
    std::fs::remove_dir_all(path)
}

/// Recursively removes `path` and everything below it.
#[cfg(target_os = "windows")]
pub fn remove_tree(path: &Path) -> io::Result<()> {
    refuse_symlink(path)?;
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            clear_readonly(path);
            std::fs::remove_dir_all(path)
        }
        other => other,
    }
}

fn refuse_symlink(path: &Path) -> io::Result<()> {
    if std::fs::symlink_metadata(path)?.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path is a symbolic link; the linked folder was left in place",
        ));
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn clear_readonly(path: &Path) {
    for entry in walkdir::WalkDir::new(path).into_iter().filter_map(Result::ok) {
        let Ok(metadata) = entry.metadata() else { continue };
        let mut perms = metadata.permissions();
        if perms.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            let _ = std::fs::set_permissions(entry.path(), perms);
        }
    }
}

/// Removes `path` if it is an existing file; a missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
