//! # batchzip Core Library
//!
//! This crate provides the core functionality for the `batchzip` tool: take
//! a list of folders and compress each one into a sibling `<name>.zip`,
//! optionally deleting the original afterwards.
//!
//! It is designed to be used by the `batchzip` command-line application, but
//! the [`session`] API can drive the same pipeline from any front end.
//!
//! ## Key Modules
//!
//! - [`folder_set`]: the ordered, deduplicated list of folders to process.
//! - [`batch`]: the sequential archive-and-optionally-delete runner.
//! - [`backend`]: builtin ZIP writer, external 7-Zip tool and its discovery.
//! - [`session`]: owns the folder set and runs batches on a worker thread.
//!
//! ## Examples
//!
//! ```no_run
//! use batchzip::batch::{run_batch, OperationMode};
//! use batchzip::backend::BuiltinZip;
//! use std::path::PathBuf;
//!
//! let folders = vec![PathBuf::from("/data/photos"), PathBuf::from("/data/scans")];
//! let result = run_batch(&folders, OperationMode::Replace, &BuiltinZip, |p| {
//!     println!("{}/{} {}", p.current_index, p.total, p.folder_name);
//! });
//! println!("{}", result.summary());
//! ```

pub mod backend;
pub mod batch;
pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod error;
pub mod folder_set;
pub mod progress;
pub mod session;

pub use error::{ArchiveError, FolderError, SessionError};

// Cross-platform filesystem wrapper
pub mod fsx;
