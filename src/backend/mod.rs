//! # Archive Backends
//!
//! Two interchangeable ways of turning one folder into one ZIP file:
//!
//! - [`BuiltinZip`]: the `zip` crate with Deflate, entries named relative to
//!   the folder's parent.
//! - [`ExternalTool`]: shells out to a 7-Zip compatible binary in ZIP mode at
//!   maximum compression.
//!
//! [`discovery`] finds the external binary once per process; [`select`] turns
//! the user's preference plus that discovery result into a [`Backend`].

pub mod builtin;
pub mod discovery;
pub mod external;

pub use builtin::BuiltinZip;
pub use external::ExternalTool;

use crate::error::ArchiveError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which mechanism produced (or will produce) the archives of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveBackend {
    Builtin,
    ExternalTool,
}

impl std::fmt::Display for ArchiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveBackend::Builtin => write!(f, "builtin"),
            ArchiveBackend::ExternalTool => write!(f, "external"),
        }
    }
}

/// The contract every backend satisfies.
pub trait Compressor: Send + Sync {
    fn kind(&self) -> ArchiveBackend;

    /// Creates `destination` from the contents of `source`.
    ///
    /// `destination` is expected not to exist; the runner removes any stale
    /// archive beforehand.
    fn build(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError>;
}

/// A resolved backend, ready to run.
#[derive(Debug, Clone)]
pub enum Backend {
    Builtin(BuiltinZip),
    External(ExternalTool),
}

impl Backend {
    pub fn builtin() -> Self {
        Backend::Builtin(BuiltinZip::default())
    }

    pub fn external(program: impl Into<PathBuf>) -> Self {
        Backend::External(ExternalTool::new(program))
    }
}

impl Compressor for Backend {
    fn kind(&self) -> ArchiveBackend {
        match self {
            Backend::Builtin(b) => b.kind(),
            Backend::External(e) => e.kind(),
        }
    }

    fn build(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
        match self {
            Backend::Builtin(b) => b.build(source, destination),
            Backend::External(e) => e.build(source, destination),
        }
    }
}

/// User preference for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// External tool when one was discovered, builtin otherwise.
    #[default]
    Auto,
    Builtin,
    External,
}

impl std::str::FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "builtin" => Ok(BackendPreference::Builtin),
            "external" | "7z" | "7zip" => Ok(BackendPreference::External),
            other => Err(format!("unknown backend '{other}' (expected auto, builtin or external)")),
        }
    }
}

/// Resolves a preference against the discovered external tool.
///
/// Asking for the external tool when none was found falls back to the
/// builtin writer.
pub fn select(preference: BackendPreference, discovered: Option<&Path>) -> Backend {
    match (preference, discovered) {
        (BackendPreference::Builtin, _) => Backend::builtin(),
        (BackendPreference::Auto | BackendPreference::External, Some(tool)) => Backend::external(tool),
        (BackendPreference::External, None) => {
            tracing::warn!("external compressor requested but none was found; using builtin ZIP writer");
            Backend::builtin()
        }
        (BackendPreference::Auto, None) => Backend::builtin(),
    }
}
