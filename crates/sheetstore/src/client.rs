//! CRUD operations over one worksheet with retry on rate limiting.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sheets_connector::errors::SheetsApiError;
use sheets_connector::spreadsheet::{Cell, Worksheet};
use sheets_connector::{SheetsClient, SheetsClientBuilder};
use tracing::{error, info, warn};

use crate::access::SheetAccess;
use crate::errors::{Result, SheetError};
use crate::fallback::FallbackSheet;
use crate::record::{NULL_SENTINEL, Record, records_from_rows};
use crate::retry::{CELL_SEARCH_RETRY, RetryPolicy, WORKSHEET_RETRY, retry};

/// Identifies the spreadsheet table a client should work against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetAccess {
    /// Exact title of the spreadsheet.
    pub spreadsheet_title: String,
    /// Path to the service account key file.
    pub credentials_path: String,
    /// Worksheet tab to use. Defaults to the first tab.
    #[serde(default)]
    pub worksheet_title: Option<String>,
}

#[derive(Debug)]
enum Connection<S> {
    Connected(S),
    Disconnected(FallbackSheet),
}

/// CRUD client for one worksheet.
///
/// Connecting never fails past the credential stage: when the sheet cannot
/// be opened the client runs disconnected, serving empty reads and ignoring
/// writes. Row 1 of the sheet is the header row; data rows are reconstructed
/// into [`Record`]s on every read.
#[derive(Debug)]
pub struct SheetClient<S = Worksheet> {
    connection: Connection<S>,
    worksheet_retry: RetryPolicy,
    cell_search_retry: RetryPolicy,
}

impl SheetClient<Worksheet> {
    /// Authenticate and open the worksheet described by `access`.
    ///
    /// Credential problems (unreadable or invalid key file) are errors.
    /// Failure to open the worksheet itself is not: rate limiting during
    /// the open is retried, and any other open failure leaves the client
    /// disconnected.
    pub async fn connect(access: &SpreadsheetAccess) -> Result<Self> {
        let client = SheetsClientBuilder::default().build_with_key_file(&access.credentials_path)?;
        Ok(Self::connect_with_client(&client, access).await)
    }

    /// Open the worksheet described by `access` using an existing client.
    pub async fn connect_with_client(client: &SheetsClient, access: &SpreadsheetAccess) -> Self {
        info!(
            spreadsheet = %access.spreadsheet_title,
            "establishing sheet connection",
        );
        let opened = retry(WORKSHEET_RETRY, "open worksheet", || {
            open_worksheet(client, access)
        })
        .await;

        match opened {
            Ok(worksheet) => {
                info!(
                    spreadsheet = %access.spreadsheet_title,
                    worksheet = %worksheet.title(),
                    "sheet connection established",
                );
                Self::new(worksheet)
            }
            Err(err) => {
                error!(
                    %err,
                    spreadsheet = %access.spreadsheet_title,
                    "could not open sheet, continuing without a connection",
                );
                Self::disconnected()
            }
        }
    }
}

impl<S: SheetAccess> SheetClient<S> {
    /// Client over an already opened sheet.
    pub fn new(access: S) -> Self {
        Self {
            connection: Connection::Connected(access),
            worksheet_retry: WORKSHEET_RETRY,
            cell_search_retry: CELL_SEARCH_RETRY,
        }
    }

    /// Client with no sheet connection; every operation takes the fallback
    /// path.
    pub fn disconnected() -> Self {
        Self {
            connection: Connection::Disconnected(FallbackSheet),
            worksheet_retry: WORKSHEET_RETRY,
            cell_search_retry: CELL_SEARCH_RETRY,
        }
    }

    pub fn with_worksheet_retry(mut self, policy: RetryPolicy) -> Self {
        self.worksheet_retry = policy;
        self
    }

    pub fn with_cell_search_retry(mut self, policy: RetryPolicy) -> Self {
        self.cell_search_retry = policy;
        self
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, Connection::Connected(_))
    }

    /// All data rows as records.
    ///
    /// An empty table triggers the seed heuristic: write the null sentinel
    /// into the first data cell and fetch once more, so callers always have
    /// at least one record to take headers from.
    pub async fn get_records(&self) -> Result<Vec<Record>> {
        let sheet = match &self.connection {
            Connection::Connected(sheet) => sheet,
            Connection::Disconnected(fallback) => return Ok(fallback.get_records()),
        };

        let mut rows =
            retry(self.worksheet_retry, "get records", || sheet.read_all_rows()).await?;
        if rows.len() <= 1 {
            info!("sheet has no data rows, seeding first data cell");
            sheet.update_cell(2, 1, NULL_SENTINEL).await?;
            rows = sheet.read_all_rows().await?;
        }

        let records = records_from_rows(&rows);
        info!(count = records.len(), "fetched records");
        Ok(records)
    }

    /// Insert `record` unless `unique_column` already holds its key value.
    ///
    /// The record is a sequence of field values in column order, reconciled
    /// against the header row. Missing trailing fields fill with the null
    /// sentinel; a record with more fields than the sheet has columns is not
    /// inserted. Returns whether a row was inserted.
    pub async fn add_unique_record(&self, record: &[String], unique_column: &str) -> Result<bool> {
        let sheet = match &self.connection {
            Connection::Connected(sheet) => sheet,
            Connection::Disconnected(fallback) => return Ok(fallback.add_unique_record()),
        };

        let headers = retry(self.worksheet_retry, "read header", || sheet.read_header()).await?;

        let mut values = record.to_vec();
        if values.len() > headers.len() {
            warn!(
                fields = values.len(),
                columns = headers.len(),
                "record has more fields than the sheet has columns, not inserting",
            );
            return Ok(false);
        }
        if values.len() < headers.len() {
            warn!(
                fields = values.len(),
                columns = headers.len(),
                "record missing trailing fields, filling with the null sentinel",
            );
            values.resize(headers.len(), NULL_SENTINEL.to_string());
        }

        let check_idx = headers
            .iter()
            .position(|h| h == unique_column)
            .ok_or_else(|| SheetError::MissingColumn(unique_column.to_string()))?;
        let check_value = values[check_idx].trim().to_string();

        let records = self.get_records().await?;
        let exists = records.iter().any(|r| {
            r.get(unique_column)
                .map(|v| v.trim() == check_value)
                .unwrap_or(false)
        });
        if exists {
            info!(
                column = unique_column,
                value = %check_value,
                "record already exists, skipping insert",
            );
            return Ok(false);
        }

        let last_index = records.len() as i64 + 2;
        retry(self.worksheet_retry, "insert row", || {
            sheet.insert_row(last_index, &values)
        })
        .await?;
        info!(
            column = unique_column,
            value = %check_value,
            row = last_index,
            "added record",
        );
        Ok(true)
    }

    /// Last data row, if any.
    ///
    /// Recency is physical row order, newest rows append at the bottom.
    pub async fn get_most_recent_record(&self) -> Result<Option<Record>> {
        if let Connection::Disconnected(fallback) = &self.connection {
            return Ok(fallback.get_most_recent_record());
        }
        let records = self.get_records().await?;
        Ok(records.into_iter().next_back())
    }

    /// First data row, if any.
    pub async fn get_oldest_record(&self) -> Result<Option<Record>> {
        if let Connection::Disconnected(fallback) = &self.connection {
            return Ok(fallback.get_oldest_record());
        }
        let records = self.get_records().await?;
        Ok(records.into_iter().next())
    }

    /// Records where any column's value equals `term` exactly.
    pub async fn get_records_matching_filter(&self, term: impl Display) -> Result<Vec<Record>> {
        let term = term.to_string();
        if let Connection::Disconnected(fallback) = &self.connection {
            return Ok(fallback.get_records_matching_filter());
        }

        let records = self.get_records().await?;
        let matches: Vec<Record> = records
            .into_iter()
            .filter(|r| r.values().any(|v| *v == term))
            .collect();

        if matches.is_empty() {
            info!(%term, "filter matched no records");
        } else {
            info!(%term, count = matches.len(), "filter matched records");
        }
        Ok(matches)
    }

    /// Append `record` as-is, no duplicate check and no field reconciliation.
    pub async fn add_none_unique_record(&self, record: &[String]) -> Result<()> {
        let sheet = match &self.connection {
            Connection::Connected(sheet) => sheet,
            Connection::Disconnected(fallback) => return Ok(fallback.add_none_unique_record()),
        };

        let records = self.get_records().await?;
        let last_index = records.len() as i64 + 2;
        retry(self.worksheet_retry, "insert row", || {
            sheet.insert_row(last_index, record)
        })
        .await?;
        info!(row = last_index, "added record");
        Ok(())
    }

    /// Raw cell matches for `term` across the whole sheet.
    ///
    /// Runs under the cell search policy, which waits far longer between
    /// attempts than the worksheet policy.
    pub async fn find_matching_cells(&self, term: impl Display) -> Result<Vec<Cell>> {
        let term = term.to_string();
        let sheet = match &self.connection {
            Connection::Connected(sheet) => sheet,
            Connection::Disconnected(fallback) => return Ok(fallback.find_matching_cells()),
        };
        self.search_cells(sheet, &term).await
    }

    async fn search_cells(&self, sheet: &S, term: &str) -> Result<Vec<Cell>> {
        let cells = retry(self.cell_search_retry, "cell search", || {
            sheet.find_all(term)
        })
        .await?;
        if cells.is_empty() {
            info!(%term, "search term not found in sheet");
        }
        Ok(cells)
    }

    /// Overwrite every row containing `term` with `updated_record`.
    ///
    /// Matches de-duplicate by row, then each matching row is rewritten
    /// positionally, one cell per column, left to right. Returns the number
    /// of rows updated.
    pub async fn update_record(
        &self,
        term: impl Display,
        updated_record: &[String],
    ) -> Result<usize> {
        let term = term.to_string();
        let sheet = match &self.connection {
            Connection::Connected(sheet) => sheet,
            Connection::Disconnected(fallback) => return Ok(fallback.update_record()),
        };

        let headers = retry(self.worksheet_retry, "read header", || sheet.read_header()).await?;
        let num_columns = headers.len();
        if updated_record.len() < num_columns {
            return Err(SheetError::FieldCountMismatch {
                record: updated_record.len(),
                header: num_columns,
            });
        }

        let matches = self.search_cells(sheet, &term).await?;

        let mut updated_rows: Vec<i64> = Vec::new();
        for cell in &matches {
            if updated_rows.contains(&cell.row) {
                continue;
            }

            info!(row = cell.row, %term, "updating record");
            let row = cell.row;
            for (col, value) in updated_record.iter().take(num_columns).enumerate() {
                retry(self.worksheet_retry, "update cell", || {
                    sheet.update_cell(row, col as i64 + 1, value)
                })
                .await?;
            }
            updated_rows.push(cell.row);
        }

        Ok(updated_rows.len())
    }

    /// Delete every row containing `value`.
    ///
    /// Deletes one row at a time and re-runs the search after each deletion;
    /// row numbers from a previous search are stale the moment a row is
    /// removed. Returns the number of rows deleted.
    pub async fn delete_record(&self, value: impl Display) -> Result<usize> {
        let value = value.to_string();
        let sheet = match &self.connection {
            Connection::Connected(sheet) => sheet,
            Connection::Disconnected(fallback) => return Ok(fallback.delete_record()),
        };

        let mut deleted = 0usize;
        loop {
            let matches = self.search_cells(sheet, &value).await?;
            let Some(cell) = matches.first() else {
                break;
            };

            let row = cell.row;
            retry(self.worksheet_retry, "delete row", || sheet.delete_row(row)).await?;
            info!(row, %value, "deleted record");
            deleted += 1;
        }

        Ok(deleted)
    }
}

async fn open_worksheet(
    client: &SheetsClient,
    access: &SpreadsheetAccess,
) -> Result<Worksheet, SheetsApiError> {
    let spreadsheet = client.open_spreadsheet(&access.spreadsheet_title).await?;
    match access.worksheet_title.as_deref() {
        Some(title) => spreadsheet.worksheet(title),
        None => spreadsheet.first_worksheet(),
    }
}
