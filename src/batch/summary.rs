use serde::Serialize;
use std::fmt;

/// How many failure lines a summary shows verbatim.
pub const MAX_REPORTED_ERRORS: usize = 5;

/// What the user is told at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub success_count: usize,
    pub error_count: usize,
    /// At most [`MAX_REPORTED_ERRORS`] failure lines, in processing order.
    pub errors: Vec<String>,
    /// Failures not listed in `errors`.
    pub omitted_errors: usize,
}

impl BatchSummary {
    pub fn new(success_count: usize, mut error_lines: Vec<String>) -> Self {
        let error_count = error_lines.len();
        let omitted_errors = error_count.saturating_sub(MAX_REPORTED_ERRORS);
        error_lines.truncate(MAX_REPORTED_ERRORS);
        Self { success_count, error_count, errors: error_lines, omitted_errors }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch finished.")?;
        writeln!(f, "Succeeded: {}", self.success_count)?;
        write!(f, "Failed: {}", self.error_count)?;
        if !self.errors.is_empty() {
            write!(f, "\n\nErrors:")?;
            for line in &self.errors {
                write!(f, "\n{line}")?;
            }
            if self.omitted_errors > 0 {
                write!(f, "\n... and {} more error(s)", self.omitted_errors)?;
            }
        }
        Ok(())
    }
}
