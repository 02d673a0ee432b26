//! Spreadsheet persistence: configuration, errors, the store abstraction and
//! the Google Sheets v4 client.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "web")]
use async_trait::async_trait;
#[cfg(feature = "web")]
use serde::Deserialize;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Errors from any sheet store
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Google Sheets is not configured: {0}")]
    NotConfigured(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("workbook I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetsError {
    /// Status-like code reported to API callers
    pub fn code(&self) -> u16 {
        match self {
            SheetsError::PermissionDenied(_) => 403,
            SheetsError::NotFound(_) => 404,
            SheetsError::InvalidRange(_) => 400,
            SheetsError::Api { status, .. } => *status,
            SheetsError::Transport(_) => 502,
            SheetsError::NotConfigured(_) | SheetsError::Decode(_) | SheetsError::Io(_) => 500,
        }
    }

    /// Operator hints for fixing the failure
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            SheetsError::PermissionDenied(_) => vec![
                "Enable the Google Sheets API in the Google Cloud Console",
                "Share the spreadsheet with the account that owns the access token",
                "Verify GOOGLE_SHEET_ID is correct",
                "Make sure the access token has not expired",
            ],
            SheetsError::NotFound(_) => vec![
                "Verify GOOGLE_SHEET_ID is correct",
                "Check that the sheet tab exists",
                "Verify the range format (e.g. 'Participants!A1:H100')",
            ],
            SheetsError::NotConfigured(_) => vec![
                "Set GOOGLE_SHEET_ID and GOOGLE_SHEETS_ACCESS_TOKEN",
                "Restart the server",
            ],
            SheetsError::Transport(_) => vec![
                "Check the internet connection",
                "Check the Google Cloud status page",
            ],
            _ => Vec::new(),
        }
    }
}

#[cfg(feature = "web")]
impl From<reqwest::Error> for SheetsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SheetsError::Decode(e.to_string())
        } else {
            SheetsError::Transport(e.to_string())
        }
    }
}

/// How the Sheets API should authenticate requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsCredentials {
    /// OAuth 2.0 bearer token; allows reads and appends
    AccessToken(String),
    /// API key; only works for reads of link-shared spreadsheets
    ApiKey(String),
}

/// Everything needed to reach one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub sheet_id: String,
    pub credentials: SheetsCredentials,
    pub base_url: String,
    pub timeout: Duration,
}

impl SheetsConfig {
    pub fn new(sheet_id: &str, credentials: SheetsCredentials) -> Self {
        SheetsConfig {
            sheet_id: sheet_id.to_string(),
            credentials,
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// How appended cells are interpreted by the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInput {
    /// Stored exactly as given
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas)
    UserEntered,
}

impl ValueInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInput::Raw => "RAW",
            ValueInput::UserEntered => "USER_ENTERED",
        }
    }
}

/// Cells read from a range, row-major, trailing empty cells omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetValues {
    pub range: String,
    pub rows: Vec<Vec<String>>,
}

/// Spreadsheet title and tab names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadsheetInfo {
    pub title: String,
    pub sheets: Vec<String>,
}

/// Read/append access to a spreadsheet
#[cfg(feature = "web")]
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_range(&self, range: &str) -> Result<SheetValues, SheetsError>;

    /// Append rows after the last row of the range's table; returns rows written
    async fn append_rows(
        &self,
        range: &str,
        rows: Vec<Vec<String>>,
        input: ValueInput,
    ) -> Result<u64, SheetsError>;

    async fn info(&self) -> Result<SpreadsheetInfo, SheetsError>;

    /// Short human-readable name for logs
    fn describe(&self) -> String;
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
struct ValueRangeBody {
    #[serde(default)]
    range: String,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendBody {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_rows: Option<u64>,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
struct SpreadsheetBody {
    properties: TitleBody,
    #[serde(default)]
    sheets: Vec<SheetBody>,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
struct SheetBody {
    properties: TitleBody,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
struct TitleBody {
    #[serde(default)]
    title: String,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Text of one JSON cell value; `null` is an empty cell
#[cfg(feature = "web")]
pub(crate) fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Client for the Google Sheets v4 REST API
#[cfg(feature = "web")]
pub struct GoogleSheetsClient {
    config: SheetsConfig,
    http: reqwest::Client,
}

#[cfg(feature = "web")]
impl GoogleSheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetsError> {
        if config.sheet_id.trim().is_empty() {
            return Err(SheetsError::NotConfigured("sheet id is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SheetsError::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(GoogleSheetsClient { config, http })
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn url(&self, tail: &[&str]) -> Result<reqwest::Url, SheetsError> {
        let mut url = reqwest::Url::parse(&self.config.base_url)
            .map_err(|e| SheetsError::NotConfigured(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::NotConfigured("base url cannot have a path".to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.config.sheet_id)
            .extend(tail);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.credentials {
            SheetsCredentials::AccessToken(token) => request.bearer_auth(token),
            SheetsCredentials::ApiKey(key) => request.query(&[("key", key.as_str())]),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, SheetsError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
        Err(match status.as_u16() {
            401 | 403 => SheetsError::PermissionDenied(message),
            404 => SheetsError::NotFound(message),
            400 if message.contains("Unable to parse range") => SheetsError::InvalidRange(message),
            code => SheetsError::Api { status: code, message },
        })
    }
}

#[cfg(feature = "web")]
#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn read_range(&self, range: &str) -> Result<SheetValues, SheetsError> {
        let url = self.url(&["values", range])?;
        log::debug!("GET values range={}", range);
        let response = self.send(self.http.get(url)).await?;
        let body: ValueRangeBody = response.json().await?;
        Ok(SheetValues {
            range: if body.range.is_empty() { range.to_string() } else { body.range },
            rows: body
                .values
                .into_iter()
                .map(|row| row.into_iter().map(cell_text).collect())
                .collect(),
        })
    }

    async fn append_rows(
        &self,
        range: &str,
        rows: Vec<Vec<String>>,
        input: ValueInput,
    ) -> Result<u64, SheetsError> {
        let target = format!("{}:append", range);
        let url = self.url(&["values", target.as_str()])?;
        let count = rows.len() as u64;
        log::debug!("POST append range={} rows={}", range, count);
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", input.as_str())])
            .json(&serde_json::json!({ "values": rows }));
        let body: AppendBody = self.send(request).await?.json().await?;
        Ok(body.updates.and_then(|u| u.updated_rows).unwrap_or(count))
    }

    async fn info(&self) -> Result<SpreadsheetInfo, SheetsError> {
        let url = self.url(&[])?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", "properties.title,sheets.properties.title")]);
        let body: SpreadsheetBody = self.send(request).await?.json().await?;
        Ok(SpreadsheetInfo {
            title: body.properties.title,
            sheets: body.sheets.into_iter().map(|s| s.properties.title).collect(),
        })
    }

    fn describe(&self) -> String {
        format!("google-sheets:{}", self.config.sheet_id)
    }
}
