use chrono::NaiveDate;

use dayplan_shared::schemas::Task;

/// Selection applied by [`TaskStore::list`](super::TaskStore::list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    /// Tasks dated exactly this day.
    Date(NaiveDate),
    /// Tasks dated within `[from, to]`, inclusive on both ends.
    Range { from: NaiveDate, to: NaiveDate },
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Date(date) => task.date == *date,
            TaskFilter::Range { from, to } => task.date >= *from && task.date <= *to,
        }
    }
}

/// Error type for task store operations.
///
/// A missing id is NOT an error; those come back as `Ok(None)` so callers
/// branch on them explicitly.
#[derive(Debug)]
pub enum StoreError {
    /// A required input was missing or empty. Maps to HTTP 400.
    Validation(String),
    /// The durable document could not be read or written. Maps to HTTP 500.
    Io(std::io::Error),
    /// The durable document could not be encoded or decoded. Maps to HTTP 500.
    Serde(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "{msg}"),
            StoreError::Io(err) => write!(f, "task document I/O failed: {err}"),
            StoreError::Serde(err) => write!(f, "task document is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Validation(_) => None,
            StoreError::Io(err) => Some(err),
            StoreError::Serde(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}
