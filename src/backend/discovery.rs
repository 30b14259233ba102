//! One-shot discovery of an external 7-Zip compatible binary.
//!
//! Priority:
//! 1. `BATCHZIP_7Z` environment variable, when it names an existing file.
//! 2. Well-known install locations for the host OS.
//! 3. `7z`, `7za` or `7zz` on `PATH`, resolved with `which` (so `PATHEXT`
//!    shims such as `7z.cmd` count on Windows).

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that points at a specific compressor binary.
pub const TOOL_ENV: &str = "BATCHZIP_7Z";

const PATH_NAMES: [&str; 3] = ["7z", "7za", "7zz"];

#[cfg(target_os = "windows")]
const WELL_KNOWN: &[&str] = &[
    r"C:\Program Files\7-Zip\7z.exe",
    r"C:\Program Files (x86)\7-Zip\7z.exe",
];

#[cfg(target_os = "macos")]
const WELL_KNOWN: &[&str] = &["/usr/local/bin/7z", "/opt/homebrew/bin/7z", "/usr/bin/7z"];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const WELL_KNOWN: &[&str] = &["/usr/bin/7z", "/usr/local/bin/7z"];

/// Probes the host using the process environment.
pub fn discover() -> Option<PathBuf> {
    let found = discover_with(
        std::env::var_os(TOOL_ENV),
        WELL_KNOWN,
        std::env::var_os("PATH"),
    );
    match &found {
        Some(path) => debug!(tool = %path.display(), "external compressor found"),
        None => debug!("no external compressor found"),
    }
    found
}

/// Discovery with every input supplied by the caller.
pub fn discover_with(
    override_path: Option<OsString>,
    well_known: &[&str],
    path_var: Option<OsString>,
) -> Option<PathBuf> {
    if let Some(candidate) = override_path.filter(|p| !p.is_empty()) {
        let candidate = PathBuf::from(candidate);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        warn!(path = %candidate.display(), "{TOOL_ENV} does not point at an executable file; ignoring");
    }

    if let Some(found) = well_known.iter().map(PathBuf::from).find(|p| is_executable(p)) {
        return Some(found);
    }

    let path_var = path_var?;
    PATH_NAMES
        .iter()
        .find_map(|name| which::which_in(name, Some(&path_var), ".").ok())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
