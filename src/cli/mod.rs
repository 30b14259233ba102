use crate::backend::BackendPreference;
use crate::batch::OperationMode;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Environment variable holding the default backend (`auto`, `builtin`, `external`).
pub const BACKEND_ENV: &str = "BATCHZIP_BACKEND";

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch-compress folders into sibling ZIP archives", long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compress each folder into `<folder>.zip` next to it.
    #[command(alias = "z")]
    Zip {
        /// Folders to compress.
        folders: Vec<PathBuf>,

        /// Add every sub-folder of this directory (may be repeated).
        #[arg(long = "from-parent", value_name = "DIR")]
        from_parent: Vec<PathBuf>,

        /// Keep the originals (replace) or remove them after archiving (delete).
        #[arg(long, value_enum, default_value_t = OperationMode::Replace)]
        mode: OperationMode,

        /// Archive backend. Falls back to BATCHZIP_BACKEND, then auto.
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,

        /// Show a progress bar on stderr.
        #[arg(long)]
        progress: bool,

        /// Print the final summary as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// List the sub-folders of a directory in selection order.
    #[command(alias = "ls")]
    Subfolders {
        #[arg(required = true)]
        parent: PathBuf,
    },

    /// Report which external compressor, if any, would be used.
    Probe,
}

/// `--backend` values.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendArg {
    /// External tool when available, builtin otherwise.
    Auto,
    /// Builtin Deflate ZIP writer.
    Builtin,
    /// External 7-Zip compatible tool at maximum compression.
    External,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendPreference::Auto,
            BackendArg::Builtin => BackendPreference::Builtin,
            BackendArg::External => BackendPreference::External,
        }
    }
}

/// Gets the backend preference from the command-line option or the
/// `BATCHZIP_BACKEND` environment variable.
///
/// Priority:
/// 1. `--backend` command-line argument.
/// 2. `BATCHZIP_BACKEND` environment variable.
/// 3. [`BackendPreference::Auto`].
pub fn backend_from_opt_or_env(opt: Option<BackendArg>) -> Result<BackendPreference, String> {
    resolve_backend(opt, std::env::var(BACKEND_ENV).ok())
}

fn resolve_backend(opt: Option<BackendArg>, env: Option<String>) -> Result<BackendPreference, String> {
    if let Some(arg) = opt {
        return Ok(arg.into());
    }
    match env {
        Some(value) if !value.trim().is_empty() => value.parse(),
        _ => Ok(BackendPreference::Auto),
    }
}

/// Parses command-line arguments using `clap`.
///
/// On a parse error clap prints usage and exits the process.
pub fn run() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        let pref = resolve_backend(Some(BackendArg::Builtin), Some("external".into())).unwrap();
        assert_eq!(pref, BackendPreference::Builtin);
    }

    #[test]
    fn environment_used_when_flag_absent() {
        assert_eq!(resolve_backend(None, Some("external".into())).unwrap(), BackendPreference::External);
        assert_eq!(resolve_backend(None, Some("  ".into())).unwrap(), BackendPreference::Auto);
        assert_eq!(resolve_backend(None, None).unwrap(), BackendPreference::Auto);
        assert!(resolve_backend(None, Some("rar".into())).is_err());
    }

    #[test]
    fn zip_command_parses() {
        let args = Args::try_parse_from([
            "batchzip", "-v", "zip", "a", "b", "--from-parent", "p", "--mode", "delete", "--yes",
        ])
        .unwrap();
        assert_eq!(args.verbose, 1);
        match args.command {
            Commands::Zip { folders, from_parent, mode, yes, backend, .. } => {
                assert_eq!(folders, vec![PathBuf::from("a"), PathBuf::from("b")]);
                assert_eq!(from_parent, vec![PathBuf::from("p")]);
                assert_eq!(mode, OperationMode::Delete);
                assert!(yes);
                assert_eq!(backend, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
