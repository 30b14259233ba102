//! # Folder Set
//!
//! The ordered, deduplicated list of folders queued for archiving.
//!
//! Adding never checks the filesystem: a folder that does not exist (or is
//! deleted before the batch starts) is only reported when the batch reaches
//! it. Only [`list_subfolders`] and [`FolderSet::add_dropped`] read from disk.

use crate::common::normalize_path;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a single [`FolderSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// Counts returned by [`FolderSet::add_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddManyReport {
    pub added: usize,
    pub duplicate: usize,
}

/// Counts returned by [`FolderSet::add_dropped`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropReport {
    pub added: usize,
    pub duplicate: usize,
    /// Dropped items that were not existing directories.
    pub invalid: usize,
}

/// Insertion-ordered set of folder paths.
#[derive(Debug, Clone, Default)]
pub struct FolderSet {
    entries: Vec<PathBuf>,
}

impl FolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes `path` and appends it unless an equal path is already queued.
    pub fn add(&mut self, path: impl AsRef<Path>) -> AddOutcome {
        let normalized = normalize_path(path.as_ref());
        if self.entries.contains(&normalized) {
            return AddOutcome::Duplicate;
        }
        self.entries.push(normalized);
        AddOutcome::Added
    }

    /// Adds every path in caller order.
    pub fn add_many<I, P>(&mut self, paths: I) -> AddManyReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = AddManyReport::default();
        for path in paths {
            match self.add(path) {
                AddOutcome::Added => report.added += 1,
                AddOutcome::Duplicate => report.duplicate += 1,
            }
        }
        report
    }

    /// Adds the directories named in a drag-and-drop payload.
    ///
    /// The payload is either newline separated or a Tcl-style list where
    /// items containing spaces are wrapped in braces. Items that are not
    /// existing directories are counted as invalid and skipped.
    pub fn add_dropped(&mut self, payload: &str) -> DropReport {
        let mut report = DropReport::default();
        for item in parse_drop_payload(payload) {
            if !Path::new(&item).is_dir() {
                report.invalid += 1;
                continue;
            }
            match self.add(&item) {
                AddOutcome::Added => report.added += 1,
                AddOutcome::Duplicate => report.duplicate += 1,
            }
        }
        report
    }

    /// Removes the entries at `indices`, returning how many were removed.
    ///
    /// Indices refer to positions before the call. They are deduplicated and
    /// removed highest first so earlier removals never shift later targets.
    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.entries.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        for &index in sorted.iter().rev() {
            self.entries.remove(index);
        }
        sorted.len()
    }

    /// Empties the set. Confirming with the user is the caller's job.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains(&normalize_path(path.as_ref()))
    }
}

/// Immediate child directories of `parent`, sorted case-insensitively by name.
///
/// This is the order in which sub-folders are offered when picking several
/// folders out of one parent.
pub fn list_subfolders(parent: &Path) -> io::Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(parent)? {
        let entry = entry?;
        // Follows symlinks, so a link to a directory is offered too.
        if entry.path().is_dir() {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort_by_cached_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(subdirs)
}

/// Splits a drop payload into cleaned path strings.
pub fn parse_drop_payload(payload: &str) -> Vec<String> {
    let raw: Vec<String> = if payload.contains('\n') {
        payload.trim().lines().map(str::to_string).collect()
    } else {
        split_brace_list(payload)
    };

    raw.into_iter()
        .map(|item| {
            item.trim_matches(|c| c == '{' || c == '}')
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

// `{/a b/c} /a\ b /d` -> ["/a b/c", "/a b", "/d"]
//
// Outside braces a backslash escapes whitespace, braces and quotes; any other
// backslash is kept so Windows paths like `C:\Users` survive.
fn split_brace_list(payload: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = payload.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if depth == 0 => match chars.peek() {
                Some(&next) if next.is_whitespace() || matches!(next, '{' | '}' | '"') => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(c),
            },
            '{' => {
                if depth > 0 {
                    current.push(c);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    current.push(c);
                } else {
                    items.push(std::mem::take(&mut current));
                }
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    items.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}
