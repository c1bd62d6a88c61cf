use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, IntoUrl, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::auth::Token;
use crate::errors::{Result, SheetsApiError};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy)]
pub enum ExecMethod {
    Get,
    Post,
    Put,
}

impl From<ExecMethod> for Method {
    fn from(value: ExecMethod) -> Self {
        match value {
            ExecMethod::Get => Method::GET,
            ExecMethod::Post => Method::POST,
            ExecMethod::Put => Method::PUT,
        }
    }
}

/// Serializes to no query parameters and an empty JSON object.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EmptySerde {}

#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn build<S: IntoUrl, D: IntoUrl>(self, sheets_url: S, drive_url: D) -> Result<ApiClient> {
        let mut builder = Client::builder().user_agent(APP_USER_AGENT);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder.build()?;
        Ok(ApiClient {
            sheets_url: sheets_url.into_url()?,
            drive_url: drive_url.into_url()?,
            inner: client,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    sheets_url: Url,
    drive_url: Url,
    inner: Client,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner
    }

    /// Spreadsheet endpoint URL with the given path segments appended.
    ///
    /// Segments are percent-encoded individually, so A1 ranges with spaces or
    /// quoted sheet titles are safe to pass through.
    pub(crate) fn sheets_path<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        join_segments(self.sheets_url.clone(), segments)
    }

    /// File listing endpoint URL with the given path segments appended.
    pub(crate) fn drive_path<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        join_segments(self.drive_url.clone(), segments)
    }

    pub(crate) async fn execute<P, B, R>(
        &self,
        method: ExecMethod,
        url: Url,
        params: &P,
        body: Option<&B>,
        token: &Token,
    ) -> Result<R>
    where
        P: Serialize,
        B: Serialize,
        R: DeserializeOwned,
    {
        let mut req = self.inner.request(method.into(), url).query(params);
        if let Some(body) = body {
            req = req.json(body);
        }

        let val = format!("Bearer {}", token.value());
        req = req.header(
            AUTHORIZATION,
            HeaderValue::from_str(&val).expect("access token must be a valid header value"),
        );

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &body));
        }

        let res = res.text().await?;
        trace!(%res, "api response");

        let res: R = serde_json::from_str(&res)?;
        Ok(res)
    }
}

fn join_segments<I>(mut url: Url, segments: I) -> Result<Url>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| SheetsApiError::UrlParseError("endpoint cannot be a base".to_string()))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Classify a non-success response.
///
/// Rate limiting is reported either as HTTP 429 or as a `RESOURCE_EXHAUSTED`
/// status in the error body; both map to the retryable error kind.
pub(crate) fn classify_api_error(status: StatusCode, body: &str) -> SheetsApiError {
    let detail = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    let api_status = detail
        .as_ref()
        .and_then(|d| d.status.clone())
        .unwrap_or_default();
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        return SheetsApiError::RateLimited {
            code: status.as_u16(),
            message,
        };
    }

    SheetsApiError::ApiError {
        code: status.as_u16(),
        status: api_status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quota_errors() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded for quota metric 'Read requests'", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = classify_api_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(err.is_rate_limit());

        // Some quota responses carry the status in the body with a different
        // http code.
        let err = classify_api_error(StatusCode::FORBIDDEN, body);
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_classify_other_errors() {
        let body = r#"{"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}"#;
        let err = classify_api_error(StatusCode::NOT_FOUND, body);
        assert!(!err.is_rate_limit());
        match err {
            SheetsApiError::ApiError { code, status, .. } => {
                assert_eq!(code, 404);
                assert_eq!(status, "NOT_FOUND");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_unparseable_body() {
        let err = classify_api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        match err {
            SheetsApiError::ApiError { code, message, .. } => {
                assert_eq!(code, 502);
                assert_eq!(message, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_path_segments_escaped() {
        let client = ApiClient::builder()
            .build(
                "https://sheets.googleapis.com/v4/spreadsheets",
                "https://www.googleapis.com/drive/v3/files",
            )
            .unwrap();

        let url = client
            .sheets_path(["sheet-id", "values", "'My Sheet'!A2:C4"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-id/values/'My%20Sheet'!A2:C4"
        );

        let url = client.drive_path(std::iter::empty::<&str>()).unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/drive/v3/files");
    }
}
