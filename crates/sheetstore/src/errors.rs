#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error(transparent)]
    Api(#[from] sheets_connector::errors::SheetsApiError),

    #[error("Gave up on {operation} after {attempts} attempts: {message}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        message: String,
    },

    #[error("Column not present in sheet header: {0}")]
    MissingColumn(String),

    #[error("Record has {record} fields but the sheet has {header} columns")]
    FieldCountMismatch { record: usize, header: usize },
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;
