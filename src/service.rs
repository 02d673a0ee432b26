//! Typed event operations over a [`SheetStore`].
//!
//! `EventService` decodes sheet rows into records, validates submissions
//! before they are appended, and decides what happens when a read fails:
//! either the error is returned, or, in demo mode, sample rows are served and
//! the result is marked as demo data so callers can say so.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::category_group;
use crate::demo;
use crate::records::{
    BAZAAR_APPEND_RANGE, BAZAAR_READ_RANGE, BazaarEntry, CompetitionResult, LEADERBOARD_APPEND_RANGE,
    LEADERBOARD_READ_RANGE, PARTICIPANTS_APPEND_RANGE, PARTICIPANTS_READ_RANGE, Participant, RegistrationStatus,
    now_timestamp,
};
use crate::sheets::{SheetStore, SheetValues, SheetsError, ValueInput};
use crate::standings::{Standing, compute_standings};
use crate::validation::{BazaarSubmission, FieldErrors, RegistrationSubmission, ResultSubmission};

/// What to do when the store cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Return the store error
    #[default]
    Fail,
    /// Serve demo rows, flagged as such
    Demo,
}

/// Where the rows behind a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Demo,
}

/// Data read through the service, tagged with its source
#[derive(Debug, Clone, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> Fetched<T> {
    fn live(data: T) -> Self {
        Fetched {
            data,
            source: DataSource::Live,
            warning: None,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.source == DataSource::Demo
    }

    /// Same source and warning, different payload
    pub fn with_data<U>(&self, data: U) -> Fetched<U> {
        Fetched {
            data,
            source: self.source,
            warning: self.warning.clone(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            source: self.source,
            warning: self.warning,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Invalid(#[from] FieldErrors),

    #[error(transparent)]
    Store(#[from] SheetsError),
}

/// Result of reading one tab during a connection test
#[derive(Debug, Clone, Serialize)]
pub struct TabCheck {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_title: Option<String>,
    pub sheets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants_test: Option<TabCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bazaar_test: Option<TabCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

/// Outcome of probing the configured store
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    pub details: ConnectionDetails,
    pub steps: Vec<String>,
}

fn step(ok: bool, pass: &str, fail: &str) -> String {
    if ok { format!("✅ {}", pass) } else { format!("❌ {}", fail) }
}

pub struct EventService {
    store: Arc<dyn SheetStore>,
    fallback: FallbackPolicy,
}

impl EventService {
    pub fn new(store: Arc<dyn SheetStore>, fallback: FallbackPolicy) -> Self {
        EventService { store, fallback }
    }

    pub fn store(&self) -> &dyn SheetStore {
        self.store.as_ref()
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    async fn read_rows(&self, range: &str) -> Result<Fetched<Vec<Vec<String>>>, SheetsError> {
        match self.store.read_range(range).await {
            Ok(values) => Ok(Fetched::live(values.rows)),
            Err(e) if self.fallback == FallbackPolicy::Demo => {
                log::warn!("Reading {} from {} failed, serving demo rows: {}", range, self.store.describe(), e);
                Ok(Fetched {
                    data: demo::rows_for(range),
                    source: DataSource::Demo,
                    warning: Some(format!("Showing demo data because the spreadsheet could not be read: {}", e)),
                })
            }
            Err(e) => {
                log::warn!("Reading {} from {} failed: {}", range, self.store.describe(), e);
                Err(e)
            }
        }
    }

    async fn append(&self, range: &str, row: Vec<String>, input: ValueInput) -> Result<u64, SheetsError> {
        self.store
            .append_rows(range, vec![row], input)
            .await
            .inspect_err(|e| log::error!("Appending to {} on {} failed: {}", range, self.store.describe(), e))
    }

    /// The whole result log, in sheet order
    pub async fn fetch_results(&self) -> Result<Fetched<Vec<CompetitionResult>>, SheetsError> {
        let rows = self.read_rows(LEADERBOARD_READ_RANGE).await?;
        Ok(rows.map(|rows| rows.iter().map(|r| CompetitionResult::from_row(r)).collect()))
    }

    /// Validate and store a result with a fresh id and timestamp
    ///
    /// # Errors
    /// * `ServiceError::Invalid` when a required field is missing
    /// * `ServiceError::Store` when the append fails
    pub async fn add_result(&self, submission: ResultSubmission) -> Result<CompetitionResult, ServiceError> {
        let valid = submission.validate()?;
        let result = CompetitionResult {
            id: Uuid::new_v4().to_string(),
            competition: valid.competition,
            team: valid.team,
            position: valid.position,
            points: valid.points,
            notes: valid.notes,
            timestamp: now_timestamp(),
        };
        self.append(LEADERBOARD_APPEND_RANGE, result.to_row(), ValueInput::Raw)
            .await?;
        log::info!(
            "Recorded result {} for {} in {} ({} points)",
            result.id,
            result.team,
            result.competition,
            result.points
        );
        Ok(result)
    }

    /// Ranked standings of `roster` over the current result log
    pub async fn standings<T: AsRef<str>>(&self, roster: &[T]) -> Result<Fetched<Vec<Standing>>, SheetsError> {
        let results = self.fetch_results().await?;
        Ok(results.map(|results| compute_standings(roster, &results)))
    }

    pub async fn participants(&self) -> Result<Fetched<Vec<Participant>>, SheetsError> {
        let rows = self.read_rows(PARTICIPANTS_READ_RANGE).await?;
        Ok(rows.map(|rows| rows.iter().map(|r| Participant::from_row(r)).collect()))
    }

    /// Register a competition participant; new registrations start as pending
    pub async fn add_participant(&self, submission: RegistrationSubmission) -> Result<Participant, ServiceError> {
        let valid = submission.validate()?;
        let participant = Participant {
            name: valid.name,
            phone: valid.phone,
            team: valid.team,
            competition: valid.competition,
            category: category_group(&valid.category).to_string(),
            notes: valid.notes,
            timestamp: now_timestamp(),
            status: RegistrationStatus::Pending,
        };
        self.append(PARTICIPANTS_APPEND_RANGE, participant.to_row(), ValueInput::UserEntered)
            .await?;
        Ok(participant)
    }

    pub async fn bazaar(&self) -> Result<Fetched<Vec<BazaarEntry>>, SheetsError> {
        let rows = self.read_rows(BAZAAR_READ_RANGE).await?;
        Ok(rows.map(|rows| rows.iter().map(|r| BazaarEntry::from_row(r)).collect()))
    }

    pub async fn add_bazaar(&self, submission: BazaarSubmission) -> Result<BazaarEntry, ServiceError> {
        let valid = submission.validate()?;
        let entry = BazaarEntry {
            name: valid.name,
            phone: valid.phone,
            team: valid.team,
            business_name: valid.business_name,
            business_type: valid.business_type,
            products: valid.products,
            need_electricity: valid.need_electricity,
            need_table: valid.need_table,
            need_chair: valid.need_chair,
            special_requests: valid.special_requests,
            notes: valid.notes,
            timestamp: now_timestamp(),
            status: RegistrationStatus::Pending,
        };
        self.append(BAZAAR_APPEND_RANGE, entry.to_row(), ValueInput::UserEntered)
            .await?;
        Ok(entry)
    }

    /// Read any range as-is; never falls back to demo rows
    pub async fn read_raw(&self, range: &str) -> Result<SheetValues, SheetsError> {
        self.store.read_range(range).await
    }

    pub async fn append_raw(&self, range: &str, values: Vec<Vec<String>>) -> Result<u64, SheetsError> {
        self.store
            .append_rows(range, values, ValueInput::UserEntered)
            .await
            .inspect_err(|e| log::error!("Appending to {} on {} failed: {}", range, self.store.describe(), e))
    }

    async fn check_tab(&self, tab: &str, headers: &[&str]) -> TabCheck {
        match self.store.read_range(&format!("{}!A1:A1", tab)).await {
            Ok(values) => TabCheck {
                success: true,
                message: format!("Can read {} sheet", tab),
                data: Some(values.rows),
                suggestions: Vec::new(),
            },
            Err(e) => TabCheck {
                success: false,
                message: format!("Cannot read {} sheet: {}", tab, e),
                data: None,
                suggestions: vec![
                    format!("Create '{}' sheet in the spreadsheet", tab),
                    format!("Add headers in row 1: {}", headers.join(", ")),
                ],
            },
        }
    }

    /// Probe the store: spreadsheet metadata, then the Participants and Bazaar tabs
    pub async fn test_connection(&self) -> ConnectionReport {
        use crate::records::{BAZAAR_HEADERS, PARTICIPANTS_HEADERS};

        let store = self.store.describe();
        let info = match self.store.info().await {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Connection test against {} failed: {}", store, e);
                return ConnectionReport {
                    success: false,
                    message: format!("Connection test failed: {}", e),
                    details: ConnectionDetails {
                        store,
                        sheet_title: None,
                        sheets: Vec::new(),
                        participants_test: None,
                        bazaar_test: None,
                        code: Some(e.code()),
                    },
                    steps: e.suggestions().into_iter().map(String::from).collect(),
                };
            }
        };

        let participants = self.check_tab("Participants", &PARTICIPANTS_HEADERS).await;
        let bazaar = self.check_tab("Bazaar", &BAZAAR_HEADERS).await;
        let steps = vec![
            "✅ Authentication successful".to_string(),
            "✅ Can access the spreadsheet".to_string(),
            step(participants.success, "Participants sheet accessible", "Participants sheet needs setup"),
            step(bazaar.success, "Bazaar sheet accessible", "Bazaar sheet needs setup"),
        ];

        ConnectionReport {
            success: true,
            message: format!("Successfully connected to sheet: {}", info.title),
            details: ConnectionDetails {
                store,
                sheet_title: Some(info.title),
                sheets: info.sheets,
                participants_test: Some(participants),
                bazaar_test: Some(bazaar),
                code: None,
            },
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::LocalWorkbook;

    fn service(fallback: FallbackPolicy) -> (Arc<LocalWorkbook>, EventService) {
        let workbook = Arc::new(LocalWorkbook::in_memory("Test Event"));
        let service = EventService::new(workbook.clone(), fallback);
        (workbook, service)
    }

    fn result(competition: &str, team: &str, position: i64, points: i64) -> ResultSubmission {
        ResultSubmission {
            competition: competition.into(),
            team: team.into(),
            position: Some(position),
            points: Some(points),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn added_results_feed_standings() {
        let (_, service) = service(FallbackPolicy::Fail);
        let first = service.add_result(result("Gaple", "Cendana (Pattimura)", 1, 5)).await.unwrap();
        let second = service.add_result(result("Gaple", "Boulevard (Soedirman)", 2, 3)).await.unwrap();
        assert_ne!(first.id, second.id);

        let fetched = service.fetch_results().await.unwrap();
        assert_eq!(fetched.source, DataSource::Live);
        assert_eq!(fetched.data, vec![first, second]);

        let standings = service
            .standings(&["Boulevard (Soedirman)", "Cendana (Pattimura)"])
            .await
            .unwrap();
        assert_eq!(standings.data[0].team, "Cendana (Pattimura)");
        assert_eq!(standings.data[0].gold_count, 1);
        assert!(standings.warning.is_none());
    }

    #[tokio::test]
    async fn invalid_submissions_are_not_stored() {
        let (workbook, service) = service(FallbackPolicy::Fail);
        let err = service.add_result(result("", "A", 0, 5)).await.unwrap_err();
        match err {
            ServiceError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(workbook.read(LEADERBOARD_READ_RANGE).unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn registrations_start_pending_with_group_names() {
        let (_, service) = service(FallbackPolicy::Fail);
        let participant = service
            .add_participant(RegistrationSubmission {
                name: "Siti".into(),
                phone: "08234567890".into(),
                team: "Cendana (Pattimura)".into(),
                competition: "Suit Jepang".into(),
                category: "ibu".into(),
                notes: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(participant.category, "Ibu-ibu");
        assert_eq!(participant.status, RegistrationStatus::Pending);

        let listed = service.participants().await.unwrap().data;
        assert_eq!(listed, vec![participant]);
    }

    #[tokio::test]
    async fn failed_reads_respect_the_fallback_policy() {
        let workbook = Arc::new(LocalWorkbook::empty("no tabs"));
        let strict = EventService::new(workbook.clone(), FallbackPolicy::Fail);
        assert!(matches!(strict.fetch_results().await, Err(SheetsError::NotFound(_))));

        let demo = EventService::new(workbook, FallbackPolicy::Demo);
        let fetched = demo.fetch_results().await.unwrap();
        assert!(fetched.is_demo());
        assert_eq!(fetched.data.len(), 3);
        assert!(fetched.warning.unwrap().starts_with("Showing demo data"));

        let standings = demo.standings(&crate::catalog::DEFAULT_ROSTER).await.unwrap();
        assert!(standings.is_demo());
        assert_eq!(standings.data[0].team, "Boulevard (Soedirman)");
    }

    #[tokio::test]
    async fn writes_never_fall_back() {
        let demo = EventService::new(Arc::new(LocalWorkbook::empty("no tabs")), FallbackPolicy::Demo);
        let err = demo.add_result(result("Gaple", "A", 1, 5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(SheetsError::NotFound(_))));
    }

    #[tokio::test]
    async fn connection_report_flags_missing_tabs() {
        let workbook = Arc::new(LocalWorkbook::empty("Partial"));
        workbook.add_sheet("Participants", &["Name"]);
        let service = EventService::new(workbook, FallbackPolicy::Fail);

        let report = service.test_connection().await;
        assert!(report.success);
        assert_eq!(report.details.sheet_title.as_deref(), Some("Partial"));
        assert!(report.details.participants_test.as_ref().unwrap().success);
        let bazaar = report.details.bazaar_test.as_ref().unwrap();
        assert!(!bazaar.success);
        assert_eq!(bazaar.suggestions.len(), 2);
        assert_eq!(report.steps[3], "❌ Bazaar sheet needs setup");
    }
}
