//! Builtin ZIP writer.
//!
//! Walks the folder, then writes one Deflate entry per regular file and one
//! directory entry per directory. Entry names are relative to the folder's
//! parent, so the folder itself is the archive's top-level entry.
//!
//! Symbolic links are skipped (neither followed nor stored), as are sockets,
//! FIFOs and device nodes.

use super::{ArchiveBackend, Compressor};
use crate::common::{zip_entry_name, FileMetadata};
use crate::error::ArchiveError;
use crate::fsx as fs;

use chrono::{Datelike, Local, Timelike};
use std::io::{self, BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Files at or above this size need ZIP64 headers.
const LARGE_FILE_THRESHOLD: u64 = u32::MAX as u64;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinZip;

impl Compressor for BuiltinZip {
    fn kind(&self) -> ArchiveBackend {
        ArchiveBackend::Builtin
    }

    fn build(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
        let entries = collect_file_metadata(source)?;

        let file = fs::File::create(destination).map_err(|e| ArchiveError::Io {
            source: e,
            path: destination.to_path_buf(),
        })?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        for entry in &entries {
            let name = zip_entry_name(&entry.path);
            let options = entry_options(entry);

            if entry.is_dir {
                zip.add_directory(name, options)?;
                continue;
            }

            zip.start_file(name, options)?;
            let mut input = fs::File::open(&entry.absolute_path).map_err(|e| ArchiveError::Io {
                source: e,
                path: entry.absolute_path.clone(),
            })?;
            io::copy(&mut input, &mut zip).map_err(|e| ArchiveError::Io {
                source: e,
                path: entry.absolute_path.clone(),
            })?;
        }

        let mut writer = zip.finish()?;
        writer.flush().map_err(|e| ArchiveError::Io {
            source: e,
            path: destination.to_path_buf(),
        })?;
        Ok(())
    }
}

fn entry_options(entry: &FileMetadata) -> FileOptions {
    let mut options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(entry.size >= LARGE_FILE_THRESHOLD);

    #[cfg(unix)]
    {
        options = options.unix_permissions(entry.permissions & 0o7777);
    }

    if let Some(mtime) = entry.modified_time.and_then(zip_datetime) {
        options = options.last_modified_time(mtime);
    }
    options
}

// ZIP timestamps are local time, 1980..=2107, two-second resolution.
fn zip_datetime(time: SystemTime) -> Option<zip::DateTime> {
    let local: chrono::DateTime<Local> = time.into();
    let year = u16::try_from(local.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second().min(59) as u8,
    )
    .ok()
}

/// Walks `source` and returns the directories and regular files to archive,
/// in a stable (name-sorted) order.
pub fn collect_file_metadata(source: &Path) -> Result<Vec<FileMetadata>, ArchiveError> {
    let base = source.parent().unwrap_or_else(|| Path::new(""));
    let mut metadata_list = Vec::new();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf()),
            source: e,
        })?;
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            debug!(path = %entry.path().display(), "skipping symbolic link");
            continue;
        }
        if !file_type.is_dir() && !file_type.is_file() {
            debug!(path = %entry.path().display(), "skipping special file");
            continue;
        }

        let metadata = entry.metadata().map_err(|e| ArchiveError::Walk {
            path: entry.path().to_path_buf(),
            source: e,
        })?;

        let relative_path: PathBuf = entry
            .path()
            .strip_prefix(base)
            .map_err(|_e| ArchiveError::StripPrefix {
                prefix: base.to_path_buf(),
                path: entry.path().to_path_buf(),
            })?
            .to_path_buf();

        let permissions: u32 = {
            #[cfg(unix)]
            { metadata.permissions().mode() }
            #[cfg(not(unix))]
            { 0 }
        };

        metadata_list.push(FileMetadata {
            absolute_path: entry.path().to_path_buf(),
            path: relative_path,
            size: if file_type.is_dir() { 0 } else { metadata.len() },
            permissions,
            modified_time: metadata.modified().ok(),
            is_dir: file_type.is_dir(),
        });
    }
    Ok(metadata_list)
}
