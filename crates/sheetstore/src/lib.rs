//! CRUD client for a hosted spreadsheet table with rate-limit retries.
//!
//! [`SheetClient`] wraps a single worksheet whose first row holds column
//! names. Reads reconstruct data rows into ordered column-to-value maps,
//! mutations go through bounded retry policies that only retry rate
//! limiting, and a client whose connection failed keeps working in a
//! disconnected mode that serves neutral results.

pub mod access;
pub mod client;
pub mod debug;
pub mod errors;
pub mod fallback;
pub mod record;
pub mod retry;

pub use client::{SheetClient, SpreadsheetAccess};
pub use record::{NULL_SENTINEL, Record};
pub use retry::{CELL_SEARCH_RETRY, RetryPolicy, WORKSHEET_RETRY};
