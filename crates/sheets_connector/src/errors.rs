#[derive(Debug, thiserror::Error)]
pub enum SheetsApiError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlParseError(String),

    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Failed to sign token request: {0}")]
    SigningError(String),

    #[error("Auth error ({code}): {message}")]
    AuthError { code: u16, message: String },

    #[error("Rate limit exceeded ({code}): {message}")]
    RateLimited { code: u16, message: String },

    #[error("API error ({code}, {status}): {message}")]
    ApiError {
        code: u16,
        status: String,
        message: String,
    },

    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("Spreadsheet has no worksheets: {0}")]
    NoWorksheets(String),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),
}

impl SheetsApiError {
    /// Whether the remote service asked us to back off.
    ///
    /// Retry loops treat only this class of error as transient; everything
    /// else surfaces immediately.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, SheetsApiError::RateLimited { .. })
    }
}

pub type Result<T, E = SheetsApiError> = std::result::Result<T, E>;
