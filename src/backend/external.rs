//! External 7-Zip compatible compressor.

use super::{ArchiveBackend, Compressor};
use crate::error::ArchiveError;

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Runs `<program> a -tzip -mx=9 <destination> <source>`.
///
/// The tool stores the folder under its own name, which gives the same entry
/// layout as the builtin writer. There is no timeout: a hung tool hangs the
/// batch.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: PathBuf,
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, source: &Path, destination: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("a")
            .arg("-tzip")
            .arg("-mx=9")
            .arg(destination)
            .arg(source);
        cmd
    }
}

impl Compressor for ExternalTool {
    fn kind(&self) -> ArchiveBackend {
        ArchiveBackend::ExternalTool
    }

    fn build(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
        let mut cmd = self.command(source, destination);
        debug!(command = ?cmd, "running external compressor");

        let output = cmd.output().map_err(|e| ArchiveError::ToolSpawn {
            source: e,
            tool: self.program.clone(),
        })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(ArchiveError::ToolFailed { status: output.status, diagnostics })
    }
}
