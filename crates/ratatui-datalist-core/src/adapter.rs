use std::fmt::Display;

use crate::error::DataListError;
use crate::row::VisualRow;

/// Turns source items into [`VisualRow`]s.
///
/// `index` is the item's position in the source. Building a row may only fail through
/// allocation; the list skips that row and records the error.
pub trait RowAdapter<T> {
    fn build_row(&mut self, item: &T, index: usize) -> Result<VisualRow, DataListError>;
}

impl<T, F> RowAdapter<T> for F
where
    F: FnMut(&T, usize) -> VisualRow,
{
    fn build_row(&mut self, item: &T, index: usize) -> Result<VisualRow, DataListError> {
        Ok(self(item, index))
    }
}

/// Uses the item's `Display` output as the primary text.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplayAdapter;

impl<T: Display> RowAdapter<T> for DisplayAdapter {
    fn build_row(&mut self, item: &T, _index: usize) -> Result<VisualRow, DataListError> {
        Ok(VisualRow::new(item.to_string()))
    }
}
