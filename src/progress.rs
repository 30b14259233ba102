//! Progress reporting for batch runs.
//!
//! The runner emits one [`BatchProgress`] after each folder, success or
//! failure. Rendering is left to the observer (terminal bar, channel, ...).

use serde::Serialize;

/// Snapshot sent after a folder has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// 1-based position of the folder just processed.
    pub current_index: usize,
    pub total: usize,
    pub folder_name: String,
}

impl BatchProgress {
    /// Completion in percent, 0.0 for an empty batch.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current_index as f32 / self.total as f32 * 100.0).min(100.0)
    }

    pub fn is_last(&self) -> bool {
        self.current_index >= self.total
    }
}
