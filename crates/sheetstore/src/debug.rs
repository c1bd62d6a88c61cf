//! In-memory sheet with scripted failures for exercising retry behavior.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use sheets_connector::errors::SheetsApiError;
use sheets_connector::spreadsheet::Cell;

use crate::access::SheetAccess;

/// Error kind an upcoming call should fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedError {
    RateLimit,
    Server,
}

impl InjectedError {
    fn to_error(self) -> SheetsApiError {
        match self {
            InjectedError::RateLimit => SheetsApiError::RateLimited {
                code: 429,
                message: "injected rate limit".to_string(),
            },
            InjectedError::Server => SheetsApiError::ApiError {
                code: 500,
                status: "INTERNAL".to_string(),
                message: "injected server error".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct DebugSheetState {
    rows: Vec<Vec<String>>,
    failures: VecDeque<InjectedError>,
    call_log: Vec<&'static str>,
}

/// In-memory [`SheetAccess`] implementation.
///
/// Writes past the current bounds grow the grid, padding intermediate cells
/// with empty strings the way a grid backend does. Failures queued with
/// [`fail_next`] are consumed one per call, in order, across all operations.
/// Clones share the underlying state.
///
/// [`fail_next`]: DebugSheet::fail_next
#[derive(Debug, Default, Clone)]
pub struct DebugSheet {
    state: Arc<Mutex<DebugSheetState>>,
}

impl DebugSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DebugSheetState {
                rows,
                ..Default::default()
            })),
        }
    }

    /// Snapshot of the current grid.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.state.lock().rows.clone()
    }

    /// Queue `count` copies of an error; each subsequent call consumes one.
    pub fn fail_next(&self, count: usize, error: InjectedError) {
        let mut state = self.state.lock();
        for _ in 0..count {
            state.failures.push_back(error);
        }
    }

    /// Number of calls made to the named operation so far.
    pub fn calls(&self, op: &str) -> usize {
        self.state
            .lock()
            .call_log
            .iter()
            .filter(|logged| **logged == op)
            .count()
    }

    fn begin(&self, op: &'static str) -> Result<MutexGuard<'_, DebugSheetState>, SheetsApiError> {
        let mut state = self.state.lock();
        state.call_log.push(op);
        if let Some(err) = state.failures.pop_front() {
            return Err(err.to_error());
        }
        Ok(state)
    }
}

#[async_trait]
impl SheetAccess for DebugSheet {
    async fn read_header(&self) -> Result<Vec<String>, SheetsApiError> {
        let state = self.begin("read_header")?;
        Ok(state.rows.first().cloned().unwrap_or_default())
    }

    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>, SheetsApiError> {
        let state = self.begin("read_all_rows")?;
        Ok(state.rows.clone())
    }

    async fn insert_row(&self, index: i64, values: &[String]) -> Result<(), SheetsApiError> {
        let mut state = self.begin("insert_row")?;
        let at = (index - 1).max(0) as usize;
        while state.rows.len() < at {
            state.rows.push(Vec::new());
        }
        state.rows.insert(at, values.to_vec());
        Ok(())
    }

    async fn update_cell(&self, row: i64, col: i64, value: &str) -> Result<(), SheetsApiError> {
        let mut state = self.begin("update_cell")?;
        let row = (row - 1).max(0) as usize;
        let col = (col - 1).max(0) as usize;
        while state.rows.len() <= row {
            state.rows.push(Vec::new());
        }
        let cells = &mut state.rows[row];
        while cells.len() <= col {
            cells.push(String::new());
        }
        cells[col] = value.to_string();
        Ok(())
    }

    async fn delete_row(&self, index: i64) -> Result<(), SheetsApiError> {
        let mut state = self.begin("delete_row")?;
        let at = index - 1;
        if at < 0 || at as usize >= state.rows.len() {
            return Err(SheetsApiError::ApiError {
                code: 400,
                status: "INVALID_ARGUMENT".to_string(),
                message: format!("no row at index {index}"),
            });
        }
        state.rows.remove(at as usize);
        Ok(())
    }

    async fn find_all(&self, query: &str) -> Result<Vec<Cell>, SheetsApiError> {
        let state = self.begin("find_all")?;
        let mut cells = Vec::new();
        for (row_idx, row) in state.rows.iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                if value == query {
                    cells.push(Cell {
                        row: row_idx as i64 + 1,
                        col: col_idx as i64 + 1,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_update_cell_grows_grid() {
        let sheet = DebugSheet::new();
        sheet.update_cell(2, 1, "Null").await.unwrap();

        let rows = sheet.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec!["Null".to_string()]);

        sheet.update_cell(1, 3, "c").await.unwrap();
        let rows = sheet.rows();
        assert_eq!(rows[0], vec!["".to_string(), "".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_insert_and_delete_rows() {
        let sheet = DebugSheet::from_rows(grid(&[&["id"], &["1"], &["2"]]));

        sheet
            .insert_row(3, &["1.5".to_string()])
            .await
            .unwrap();
        assert_eq!(sheet.rows()[2], vec!["1.5".to_string()]);

        sheet.delete_row(3).await.unwrap();
        assert_eq!(sheet.rows().len(), 3);

        let err = sheet.delete_row(10).await.unwrap_err();
        assert!(!err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_fail_next_consumes_in_order() {
        let sheet = DebugSheet::from_rows(grid(&[&["id"]]));
        sheet.fail_next(2, InjectedError::RateLimit);

        assert!(sheet.read_all_rows().await.unwrap_err().is_rate_limit());
        assert!(sheet.read_header().await.unwrap_err().is_rate_limit());
        assert!(sheet.read_all_rows().await.is_ok());

        assert_eq!(sheet.calls("read_all_rows"), 2);
        assert_eq!(sheet.calls("read_header"), 1);
    }
}
