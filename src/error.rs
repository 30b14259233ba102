use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while producing a single ZIP archive.
///
/// Both backends report through this type so the batch runner can treat them
/// interchangeably.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An I/O error occurred while reading a source file or writing the archive.
    /// Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io { source: std::io::Error, path: PathBuf },

    /// A walked entry did not live under the folder's parent directory.
    #[error("Could not strip prefix '{}' from path '{}'", .prefix.display(), .path.display())]
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// The folder path has no base name to derive `<name>.zip` from.
    #[error("'{}' has no folder name to derive an archive name from", .path.display())]
    NoFolderName { path: PathBuf },

    /// The directory walk itself failed (unreadable sub-directory, loop, ...).
    #[error("Could not walk '{}': {source}", .path.display())]
    Walk { source: walkdir::Error, path: PathBuf },

    /// The ZIP writer rejected an entry or failed to finalize the archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The external compressor could not be started at all.
    #[error("failed to run '{}': {source}", .tool.display())]
    ToolSpawn { source: std::io::Error, tool: PathBuf },

    /// The external compressor ran but exited unsuccessfully.
    #[error("external compressor exited with {status}: {diagnostics}")]
    ToolFailed { status: ExitStatus, diagnostics: String },
}

/// Folder-scoped failure recorded by the batch runner.
///
/// None of these abort a batch; each one ends up as a line in the summary.
#[derive(Debug, Error)]
pub enum FolderError {
    #[error("folder does not exist")]
    NotFound,

    #[error("not a valid folder")]
    NotADirectory,

    #[error("archive creation failed: {0}")]
    ArchiveCreationFailed(#[source] ArchiveError),

    /// The archive was written, but removing the original folder failed.
    #[error("archive created but the original folder could not be removed: {0}")]
    DeletionFailed(#[source] std::io::Error),
}

/// Misuse of a [`Session`](crate::session::Session).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no folders have been added")]
    EmptySet,

    #[error("a batch is already running")]
    AlreadyRunning,

    #[error("the folder list cannot be changed while a batch is running")]
    Busy,

    #[error("the batch worker thread panicked")]
    WorkerPanicked,

    #[error("failed to spawn the batch worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}
