use std::collections::TryReserveError;
use std::fmt;
use std::sync::Arc;

/// Errors recorded by list widgets.
///
/// None of these escape `render`; they are stored on the widget and surfaced as a status line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataListError {
    /// Building or storing the row for `index` could not allocate. The row is skipped and rows
    /// already materialized stay valid.
    #[error("allocation failed while materializing row {index}")]
    Allocation { index: usize },
    /// The filter projection could not allocate; the previous filter stays active.
    #[error("allocation failed while building the filter projection")]
    FilterAllocation,
    /// The data source reported a failure through a `Failed` event.
    #[error("data source failed: {0}")]
    Source(#[from] SourceError),
}

impl DataListError {
    pub(crate) fn allocation(index: usize, _cause: TryReserveError) -> Self {
        Self::Allocation { index }
    }
}

/// A failure reported by a data source. Cheap to clone so one event can reach every observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceError {
    message: Arc<str>,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

impl From<&str> for SourceError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for SourceError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
