//! Command-line front end: turns parsed [`Args`] into a session run and
//! renders progress and the final summary.

use crate::backend::{discovery, ArchiveBackend, Compressor};
use crate::batch::{BatchSummary, OperationMode};
use crate::cli::{self, Args, Commands};
use crate::folder_set::list_subfolders;
use crate::progress::BatchProgress;
use crate::session::Session;

use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Parses the process arguments and runs the selected command.
pub fn run_cli_app() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::run();
    init_logging(args.verbose);
    run_with_args(args)
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run_with_args(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Commands::Zip { folders, from_parent, mode, backend, yes, progress, json } => {
            let mut session = Session::new();
            session.set_mode(mode);
            session.set_backend_preference(cli::backend_from_opt_or_env(backend)?);

            let mut duplicates = session.add_many(&folders)?.duplicate;
            for parent in &from_parent {
                let subfolders = list_subfolders(parent)
                    .map_err(|e| format!("cannot list '{}': {e}", parent.display()))?;
                if subfolders.is_empty() {
                    eprintln!("No sub-folders in '{}'.", parent.display());
                }
                duplicates += session.add_many(subfolders)?.duplicate;
            }
            if duplicates > 0 {
                eprintln!("Skipped {duplicates} folder(s) already in the list.");
            }
            if session.folders().is_empty() {
                return Err("no folders to compress; pass folders or --from-parent".into());
            }

            let backend = session.backend();
            if !yes && !confirm(session.folders().len(), mode, backend.kind())? {
                eprintln!("Aborted.");
                return Ok(());
            }

            let handle = session.start()?;
            let result = if progress {
                let mut render = create_cli_progress_callback("zip");
                handle.wait_with(|p| render(&p))?
            } else {
                handle.wait()?
            };

            let summary = result.summary();
            if json {
                let report = JsonReport { mode, backend: result.backend, summary: &summary };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{summary}");
            }

            if summary.has_errors() {
                return Err(format!("{} folder(s) failed", summary.error_count).into());
            }
        }
        Commands::Subfolders { parent } => {
            for sub in list_subfolders(&parent)? {
                println!("{}", sub.display());
            }
        }
        Commands::Probe => match discovery::discover() {
            Some(tool) => println!("{}", tool.display()),
            None => println!("not found"),
        },
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: OperationMode,
    backend: ArchiveBackend,
    #[serde(flatten)]
    summary: &'a BatchSummary,
}

fn confirm(count: usize, mode: OperationMode, backend: ArchiveBackend) -> io::Result<bool> {
    let mode_text = match mode {
        OperationMode::Replace => "keep originals",
        OperationMode::Delete => "delete originals",
    };
    let mut stderr = io::stderr();
    write!(stderr, "About to compress {count} folder(s) with the {backend} backend ({mode_text}).")?;
    if mode == OperationMode::Delete {
        write!(stderr, "\nWARNING: the original folders will be deleted!")?;
    }
    write!(stderr, "\nContinue? [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// --- utils for CLI progress -------------------------------------------------

fn create_cli_progress_callback(operation: &str) -> impl FnMut(&BatchProgress) {
    let operation = operation.to_uppercase();
    let mut prev_len = 0usize;

    move |state: &BatchProgress| {
        // Determine terminal width (default 80)
        let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);

        let mut bar_width: usize = 40;
        let line = loop {
            let line = format_progress_line(&operation, state, bar_width);
            if line.chars().count() <= term_width || bar_width <= 10 {
                break line;
            }
            bar_width -= 4;
        };

        // Pad over leftovers of a longer previous line.
        let len = line.chars().count();
        let padding = " ".repeat(prev_len.saturating_sub(len));
        prev_len = len;

        eprint!("\r\x1B[2K{line}{padding}");
        io::stderr().flush().ok();

        if state.is_last() {
            eprintln!();
        }
    }
}

fn format_progress_line(operation: &str, state: &BatchProgress, bar_width: usize) -> String {
    let filled = ((state.percent() / 100.0) * bar_width as f32) as usize;
    let filled = filled.min(bar_width);
    format!(
        "[{}] [{}{}] {:.1}% | {}/{} folders | {}",
        operation,
        "█".repeat(filled),
        "░".repeat(bar_width - filled),
        state.percent(),
        state.current_index,
        state.total,
        state.folder_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_layout() {
        let state = BatchProgress { current_index: 1, total: 2, folder_name: "photos".into() };
        let line = format_progress_line("ZIP", &state, 10);
        assert_eq!(line, "[ZIP] [█████░░░░░] 50.0% | 1/2 folders | photos");
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}
