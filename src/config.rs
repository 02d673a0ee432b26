//! Command-line and environment configuration.
//!
//! Every setting is a `clap` flag with an environment fallback. Nothing below
//! the binaries reads the environment; they resolve an [`AppConfig`] once and
//! hand the pieces down.

use clap::{Args, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::default_roster;
use crate::service::{EventService, FallbackPolicy};
use crate::sheets::{
    DEFAULT_SHEETS_BASE_URL, GoogleSheetsClient, SheetStore, SheetsConfig, SheetsCredentials, SheetsError,
};
use crate::workbook::LocalWorkbook;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GOOGLE_SHEET_ID is set but neither an access token nor an API key was given")]
    MissingCredentials,

    #[error("the Sheets request timeout must be at least one second")]
    ZeroTimeout,

    #[error("invalid Sheets base url '{0}'")]
    InvalidBaseUrl(String),

    #[error("cannot open the data store: {0}")]
    Store(#[from] SheetsError),
}

/// Where event data is read from and written to
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Google spreadsheet id; without it the local workbook is used
    #[arg(long, env = "GOOGLE_SHEET_ID")]
    pub sheet_id: Option<String>,

    /// OAuth access token for the Sheets API (read and write)
    #[arg(long, env = "GOOGLE_SHEETS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// API key for the Sheets API (read-only, link-shared sheets)
    #[arg(long, env = "GOOGLE_SHEETS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GOOGLE_SHEETS_BASE_URL", default_value = DEFAULT_SHEETS_BASE_URL)]
    pub sheets_base_url: String,

    /// Sheets request timeout in seconds
    #[arg(long, env = "GOOGLE_SHEETS_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// Local workbook file used when no spreadsheet id is configured
    #[arg(long, env = "GUMBIRA_WORKBOOK", default_value = "database/workbook.bin.gz")]
    pub workbook: PathBuf,

    /// Serve demo rows, visibly flagged, when the store cannot be read
    #[arg(long, env = "GUMBIRA_DEMO_FALLBACK")]
    pub demo_fallback: bool,

    /// Competing teams in display order (repeat or comma-separate); defaults to the event roster
    #[arg(long = "team", env = "GUMBIRA_TEAMS", value_delimiter = ',')]
    pub teams: Vec<String>,
}

/// Arguments of the `website` binary
#[derive(Parser, Debug, Clone)]
#[command(name = "website")]
#[command(about = "Leaderboard and registration site for the Alifia Gumbira event", long_about = None)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "GUMBIRA_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments of the `gumbira` standings printer
#[derive(Parser, Debug, Clone)]
#[command(name = "gumbira")]
#[command(about = "Print the current event standings", long_about = None)]
pub struct StandingsArgs {
    /// Print the standings as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Google(SheetsConfig),
    Workbook(PathBuf),
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub fallback: FallbackPolicy,
    pub roster: Vec<String>,
}

impl SourceArgs {
    /// Check the flags for consistency and build an [`AppConfig`]
    ///
    /// # Errors
    /// * `ConfigError::MissingCredentials` if a sheet id is given without a token or key
    /// * `ConfigError::ZeroTimeout` if the timeout is 0
    /// * `ConfigError::InvalidBaseUrl` if the base url does not parse
    pub fn resolve(&self) -> Result<AppConfig, ConfigError> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let store = match non_empty(&self.sheet_id) {
            Some(sheet_id) => {
                let credentials = match (non_empty(&self.access_token), non_empty(&self.api_key)) {
                    (Some(token), _) => SheetsCredentials::AccessToken(token),
                    (None, Some(key)) => SheetsCredentials::ApiKey(key),
                    (None, None) => return Err(ConfigError::MissingCredentials),
                };
                if self.timeout_secs == 0 {
                    return Err(ConfigError::ZeroTimeout);
                }
                if reqwest::Url::parse(&self.sheets_base_url).is_err() {
                    return Err(ConfigError::InvalidBaseUrl(self.sheets_base_url.clone()));
                }
                StoreConfig::Google(
                    SheetsConfig::new(&sheet_id, credentials)
                        .with_base_url(&self.sheets_base_url)
                        .with_timeout(Duration::from_secs(self.timeout_secs)),
                )
            }
            None => StoreConfig::Workbook(self.workbook.clone()),
        };

        let roster: Vec<String> = self
            .teams
            .iter()
            .map(|team| team.trim().to_string())
            .filter(|team| !team.is_empty())
            .collect();

        Ok(AppConfig {
            store,
            fallback: if self.demo_fallback {
                FallbackPolicy::Demo
            } else {
                FallbackPolicy::Fail
            },
            roster: if roster.is_empty() { default_roster() } else { roster },
        })
    }
}

/// Open the configured store
pub fn build_store(store: &StoreConfig) -> Result<Arc<dyn SheetStore>, ConfigError> {
    let store: Arc<dyn SheetStore> = match store {
        StoreConfig::Google(config) => Arc::new(GoogleSheetsClient::new(config.clone())?),
        StoreConfig::Workbook(path) => Arc::new(LocalWorkbook::open(path)?),
    };
    Ok(store)
}

impl AppConfig {
    pub fn service(&self) -> Result<EventService, ConfigError> {
        let store = build_store(&self.store)?;
        log::info!("Using data store {}", store.describe());
        Ok(EventService::new(store, self.fallback))
    }
}
