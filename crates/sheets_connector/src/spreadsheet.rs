//! Spreadsheet and worksheet handles.

use tracing::debug;

use crate::SheetsClient;
use crate::errors::{Result, SheetsApiError};
use crate::req::EmptySerde;
use crate::rest::{
    BatchUpdateRequest, DeleteDimensionRequest, Dimension, DimensionRange, InsertDimensionRequest,
    SheetProperties, SheetRequest, UpdateValuesParams, UpdateValuesResponse, ValueInputOption,
    ValueRange,
};

/// Handle to one spreadsheet resolved by title.
#[derive(Debug)]
pub struct Spreadsheet {
    pub(crate) client: SheetsClient,
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) sheets: Vec<SheetProperties>,
}

impl Spreadsheet {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The first worksheet tab of this spreadsheet.
    pub fn first_worksheet(&self) -> Result<Worksheet> {
        let props = self
            .sheets
            .iter()
            .min_by_key(|p| p.index)
            .ok_or_else(|| SheetsApiError::NoWorksheets(self.title.clone()))?;
        Ok(self.worksheet_from_props(props))
    }

    pub fn worksheet(&self, title: &str) -> Result<Worksheet> {
        let props = self
            .sheets
            .iter()
            .find(|p| p.title == title)
            .ok_or_else(|| SheetsApiError::WorksheetNotFound(title.to_string()))?;
        Ok(self.worksheet_from_props(props))
    }

    fn worksheet_from_props(&self, props: &SheetProperties) -> Worksheet {
        Worksheet {
            client: self.client.clone(),
            spreadsheet_id: self.id.clone(),
            sheet_id: props.sheet_id,
            title: props.title.clone(),
        }
    }
}

/// Handle to one worksheet tab.
///
/// Row and column numbers are 1-based throughout, matching the coordinates a
/// user sees in the UI.
#[derive(Debug, Clone)]
pub struct Worksheet {
    client: SheetsClient,
    spreadsheet_id: String,
    sheet_id: i64,
    title: String,
}

/// A matched cell returned by [`Worksheet::find_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: i64,
    pub col: i64,
    pub value: String,
}

impl Worksheet {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Every row of the used range, trailing empty cells omitted per row.
    pub async fn get_all_values(&self) -> Result<Vec<Vec<String>>> {
        let quoted = quote_sheet_title(&self.title);
        let url = self.client.api().sheets_path([
            self.spreadsheet_id.as_str(),
            "values",
            quoted.as_str(),
        ])?;
        let range: ValueRange = self.client.get(url, &EmptySerde::default()).await?;
        Ok(range.values)
    }

    /// Values of a single row.
    pub async fn row_values(&self, row: i64) -> Result<Vec<String>> {
        let range_ref = row_range(&self.title, row);
        let url = self.client.api().sheets_path([
            self.spreadsheet_id.as_str(),
            "values",
            range_ref.as_str(),
        ])?;
        let range: ValueRange = self.client.get(url, &EmptySerde::default()).await?;
        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    /// Overwrite a single cell.
    pub async fn update_cell(&self, row: i64, col: i64, value: &str) -> Result<()> {
        let range_ref = cell_range(&self.title, row, col);
        let url = self.client.api().sheets_path([
            self.spreadsheet_id.as_str(),
            "values",
            range_ref.as_str(),
        ])?;
        let params = UpdateValuesParams {
            value_input_option: ValueInputOption::UserEntered,
        };
        let body = ValueRange {
            range: None,
            major_dimension: None,
            values: vec![vec![value.to_string()]],
        };
        let res: UpdateValuesResponse = self.client.put(url, &params, &body).await?;
        debug!(row, col, cells = res.updated_cells, worksheet = %self.title, "updated cell");
        Ok(())
    }

    /// Insert a new row at the given position, shifting later rows down.
    ///
    /// The dimension insert and the value write are two separate calls; an
    /// error between them leaves an empty row behind.
    pub async fn insert_row(&self, index: i64, values: &[String]) -> Result<()> {
        let body = BatchUpdateRequest {
            requests: vec![SheetRequest::InsertDimension(InsertDimensionRequest {
                range: DimensionRange {
                    sheet_id: self.sheet_id,
                    dimension: Dimension::Rows,
                    start_index: index - 1,
                    end_index: index,
                },
                inherit_from_before: false,
            })],
        };
        let _: EmptySerde = self
            .client
            .post(self.batch_update_url()?, &EmptySerde::default(), &body)
            .await?;

        let range_ref = cell_range(&self.title, index, 1);
        let url = self.client.api().sheets_path([
            self.spreadsheet_id.as_str(),
            "values",
            range_ref.as_str(),
        ])?;
        let params = UpdateValuesParams {
            value_input_option: ValueInputOption::Raw,
        };
        let body = ValueRange {
            range: None,
            major_dimension: None,
            values: vec![values.to_vec()],
        };
        let res: UpdateValuesResponse = self.client.put(url, &params, &body).await?;
        debug!(index, cells = res.updated_cells, worksheet = %self.title, "inserted row");
        Ok(())
    }

    /// Delete the row at the given position, shifting later rows up.
    pub async fn delete_row(&self, index: i64) -> Result<()> {
        let body = BatchUpdateRequest {
            requests: vec![SheetRequest::DeleteDimension(DeleteDimensionRequest {
                range: DimensionRange {
                    sheet_id: self.sheet_id,
                    dimension: Dimension::Rows,
                    start_index: index - 1,
                    end_index: index,
                },
            })],
        };
        let _: EmptySerde = self
            .client
            .post(self.batch_update_url()?, &EmptySerde::default(), &body)
            .await?;
        debug!(index, worksheet = %self.title, "deleted row");
        Ok(())
    }

    /// All cells whose value equals `query` exactly.
    ///
    /// The scan runs client side over a single fetch of the sheet, so one
    /// call costs one read regardless of match count.
    pub async fn find_all(&self, query: &str) -> Result<Vec<Cell>> {
        let values = self.get_all_values().await?;
        Ok(scan_for(&values, query))
    }

    fn batch_update_url(&self) -> Result<reqwest::Url> {
        let seg = format!("{}:batchUpdate", self.spreadsheet_id);
        self.client.api().sheets_path([seg.as_str()])
    }
}

fn scan_for(values: &[Vec<String>], query: &str) -> Vec<Cell> {
    let mut cells = Vec::new();
    for (row_idx, row) in values.iter().enumerate() {
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
    cells
}

/// Quote a sheet title for an A1 range reference. Embedded quotes double.
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_range(title: &str, row: i64, col: i64) -> String {
    format!("{}!{}{}", quote_sheet_title(title), col_to_letters(col), row)
}

fn row_range(title: &str, row: i64) -> String {
    format!("{}!{}:{}", quote_sheet_title(title), row, row)
}

/// 1-based column number to its letter form (1 -> A, 27 -> AA).
fn col_to_letters(col: i64) -> String {
    debug_assert!(col >= 1);
    let mut col = col;
    let mut letters = String::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.insert(0, (b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    letters
}
