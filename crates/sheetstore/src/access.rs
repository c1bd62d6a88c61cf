//! Worksheet row access behind a narrow trait.

use async_trait::async_trait;
use sheets_connector::errors::SheetsApiError;
use sheets_connector::spreadsheet::{Cell, Worksheet};

/// Row and cell operations against one worksheet.
///
/// Implemented by the live connector worksheet and by the in-memory sheet
/// used in tests. All positions are 1-based and row 1 is the header row.
#[async_trait]
pub trait SheetAccess: Send + Sync {
    /// The header row.
    async fn read_header(&self) -> Result<Vec<String>, SheetsApiError>;

    /// Every row including the header.
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>, SheetsApiError>;

    /// Insert a row at the given position, shifting later rows down.
    async fn insert_row(&self, index: i64, values: &[String]) -> Result<(), SheetsApiError>;

    async fn update_cell(&self, row: i64, col: i64, value: &str) -> Result<(), SheetsApiError>;

    /// Delete the row at the given position, shifting later rows up.
    async fn delete_row(&self, index: i64) -> Result<(), SheetsApiError>;

    /// Cells whose value equals `query` exactly.
    async fn find_all(&self, query: &str) -> Result<Vec<Cell>, SheetsApiError>;
}

#[async_trait]
impl SheetAccess for Worksheet {
    async fn read_header(&self) -> Result<Vec<String>, SheetsApiError> {
        self.row_values(1).await
    }

    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>, SheetsApiError> {
        self.get_all_values().await
    }

    async fn insert_row(&self, index: i64, values: &[String]) -> Result<(), SheetsApiError> {
        Worksheet::insert_row(self, index, values).await
    }

    async fn update_cell(&self, row: i64, col: i64, value: &str) -> Result<(), SheetsApiError> {
        Worksheet::update_cell(self, row, col, value).await
    }

    async fn delete_row(&self, index: i64) -> Result<(), SheetsApiError> {
        Worksheet::delete_row(self, index).await
    }

    async fn find_all(&self, query: &str) -> Result<Vec<Cell>, SheetsApiError> {
        Worksheet::find_all(self, query).await
    }
}
