//! Session state and the single background worker.
//!
//! A [`Session`] owns the folder set, the operation mode and the backend
//! preference. [`Session::start`] snapshots the folder list and runs the
//! whole batch on one worker thread; progress and the final result come back
//! over a channel. While that worker is alive the session rejects a second
//! start and any change to the folder set.

use crate::backend::{self, discovery, Backend, BackendPreference, Compressor};
use crate::batch::{self, BatchResult, OperationMode};
use crate::error::SessionError;
use crate::folder_set::{AddManyReport, AddOutcome, DropReport, FolderSet};
use crate::progress::BatchProgress;

use crossbeam_channel::{unbounded, Receiver};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Messages sent by the worker.
#[derive(Debug)]
pub enum RunEvent {
    Progress(BatchProgress),
    Finished(BatchResult),
}

pub struct Session {
    folders: FolderSet,
    mode: OperationMode,
    preference: BackendPreference,
    discovered_tool: Option<PathBuf>,
    running: Arc<AtomicBool>,
}

impl Session {
    /// Creates a session and probes the host for an external compressor.
    pub fn new() -> Self {
        Self::with_discovered_tool(discovery::discover())
    }

    /// Creates a session with a pre-computed discovery result.
    pub fn with_discovered_tool(discovered_tool: Option<PathBuf>) -> Self {
        Self {
            folders: FolderSet::new(),
            mode: OperationMode::default(),
            preference: BackendPreference::default(),
            discovered_tool,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn folders(&self) -> &FolderSet {
        &self.folders
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OperationMode) {
        self.mode = mode;
    }

    pub fn set_backend_preference(&mut self, preference: BackendPreference) {
        self.preference = preference;
    }

    pub fn discovered_tool(&self) -> Option<&Path> {
        self.discovered_tool.as_deref()
    }

    /// The backend the next run would use.
    pub fn backend(&self) -> Backend {
        backend::select(self.preference, self.discovered_tool.as_deref())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.is_running() {
            Err(SessionError::Busy)
        } else {
            Ok(())
        }
    }

    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<AddOutcome, SessionError> {
        self.ensure_idle()?;
        Ok(self.folders.add(path))
    }

    pub fn add_many<I, P>(&mut self, paths: I) -> Result<AddManyReport, SessionError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.ensure_idle()?;
        Ok(self.folders.add_many(paths))
    }

    pub fn add_dropped(&mut self, payload: &str) -> Result<DropReport, SessionError> {
        self.ensure_idle()?;
        Ok(self.folders.add_dropped(payload))
    }

    pub fn remove(&mut self, indices: &[usize]) -> Result<usize, SessionError> {
        self.ensure_idle()?;
        Ok(self.folders.remove(indices))
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.folders.clear();
        Ok(())
    }

    /// Starts a batch over a snapshot of the current folder set.
    pub fn start(&self) -> Result<RunHandle, SessionError> {
        if self.folders.is_empty() {
            return Err(SessionError::EmptySet);
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyRunning);
        }

        let folders = self.folders.as_slice().to_vec();
        let mode = self.mode;
        let compressor = self.backend();
        let running = Arc::clone(&self.running);
        let (tx, rx) = unbounded::<RunEvent>();

        let spawned = thread::Builder::new()
            .name("batchzip-worker".into())
            .spawn(move || {
                scopeguard::defer! {
                    running.store(false, Ordering::Release);
                }
                let progress_tx = tx.clone();
                let result = batch::run_batch(&folders, mode, &compressor as &dyn Compressor, |p| {
                    let _ = progress_tx.send(RunEvent::Progress(p));
                });
                let _ = tx.send(RunEvent::Finished(result));
            });

        match spawned {
            Ok(join) => Ok(RunHandle { events: rx, join }),
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(SessionError::Spawn(e))
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a batch running on the worker thread.
pub struct RunHandle {
    events: Receiver<RunEvent>,
    join: JoinHandle<()>,
}

impl RunHandle {
    /// Raw event stream, for callers that poll from a UI loop.
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Blocks until the batch finishes, forwarding each progress update.
    pub fn wait_with<F>(self, mut on_progress: F) -> Result<BatchResult, SessionError>
    where
        F: FnMut(BatchProgress),
    {
        let mut finished = None;
        for event in self.events.iter() {
            match event {
                RunEvent::Progress(p) => on_progress(p),
                RunEvent::Finished(result) => {
                    finished = Some(result);
                    break;
                }
            }
        }
        self.join.join().map_err(|_| SessionError::WorkerPanicked)?;
        finished.ok_or(SessionError::WorkerPanicked)
    }

    pub fn wait(self) -> Result<BatchResult, SessionError> {
        self.wait_with(|_| {})
    }
}
