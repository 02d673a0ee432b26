use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Range holding the result log, header row excluded
pub const LEADERBOARD_READ_RANGE: &str = "Leaderboard!A2:G";
/// Range results are appended to
pub const LEADERBOARD_APPEND_RANGE: &str = "Leaderboard!A:G";
pub const PARTICIPANTS_READ_RANGE: &str = "Participants!A2:H";
pub const PARTICIPANTS_APPEND_RANGE: &str = "Participants!A:H";
pub const BAZAAR_READ_RANGE: &str = "Bazaar!A2:M";
pub const BAZAAR_APPEND_RANGE: &str = "Bazaar!A:M";

pub const LEADERBOARD_HEADERS: [&str; 7] =
    ["ID", "Competition", "Team", "Position", "Points", "Notes", "Timestamp"];
pub const PARTICIPANTS_HEADERS: [&str; 8] = [
    "Name",
    "Phone",
    "Team",
    "Competition",
    "Category",
    "Notes",
    "Timestamp",
    "Status",
];
pub const BAZAAR_HEADERS: [&str; 13] = [
    "Name",
    "Phone",
    "Team",
    "Business Name",
    "Business Type",
    "Products",
    "Need Electricity",
    "Need Table",
    "Need Chair",
    "Special Requests",
    "Notes",
    "Timestamp",
    "Status",
];

/// Current time as an RFC 3339 string with millisecond precision
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse the leading integer of a cell, 0 when there is none
///
/// Accepts surrounding whitespace, an optional sign and trailing garbage, so
/// `"5"`, `" 3 pts"` and `"-2"` parse while `""` and `"abc"` give 0.
pub fn parse_leading_int(cell: &str) -> i64 {
    let trimmed = cell.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn cell_or_now(row: &[String], index: usize) -> String {
    match row.get(index) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => now_timestamp(),
    }
}

/// One scored outcome of one competition for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionResult {
    /// Opaque unique identifier assigned when the result is stored
    pub id: String,
    pub competition: String,
    /// Team credited with the result; must match a roster name to count
    pub team: String,
    /// Finishing rank, 1 = first place
    pub position: i64,
    /// Points as stored, never recomputed from `position`
    pub points: i64,
    #[serde(default)]
    pub notes: String,
    pub timestamp: String,
}

impl CompetitionResult {
    /// Result with empty id, notes and timestamp, mostly useful for building logs by hand
    pub fn scored(competition: &str, team: &str, position: i64, points: i64) -> Self {
        CompetitionResult {
            id: String::new(),
            competition: competition.to_string(),
            team: team.to_string(),
            position,
            points,
            notes: String::new(),
            timestamp: String::new(),
        }
    }

    pub fn from_row(row: &[String]) -> Self {
        CompetitionResult {
            id: cell(row, 0),
            competition: cell(row, 1),
            team: cell(row, 2),
            position: parse_leading_int(&cell(row, 3)),
            points: parse_leading_int(&cell(row, 4)),
            notes: cell(row, 5),
            timestamp: cell_or_now(row, 6),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.competition.clone(),
            self.team.clone(),
            self.position.to_string(),
            self.points.to_string(),
            self.notes.clone(),
            self.timestamp.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
}

impl RegistrationStatus {
    /// Anything other than `"confirmed"` is still pending
    pub fn from_cell(value: &str) -> Self {
        if value == "confirmed" {
            RegistrationStatus::Confirmed
        } else {
            RegistrationStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Confirmed => "confirmed",
        }
    }
}

/// A competition registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub phone: String,
    pub team: String,
    pub competition: String,
    pub category: String,
    #[serde(default)]
    pub notes: String,
    pub timestamp: String,
    pub status: RegistrationStatus,
}

impl Participant {
    pub fn from_row(row: &[String]) -> Self {
        Participant {
            name: cell(row, 0),
            phone: cell(row, 1),
            team: cell(row, 2),
            competition: cell(row, 3),
            category: cell(row, 4),
            notes: cell(row, 5),
            timestamp: cell_or_now(row, 6),
            status: RegistrationStatus::from_cell(&cell(row, 7)),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.phone.clone(),
            self.team.clone(),
            self.competition.clone(),
            self.category.clone(),
            self.notes.clone(),
            self.timestamp.clone(),
            self.status.as_str().to_string(),
        ]
    }
}

/// A bazaar stand registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BazaarEntry {
    pub name: String,
    pub phone: String,
    pub team: String,
    pub business_name: String,
    pub business_type: String,
    pub products: String,
    pub need_electricity: bool,
    pub need_table: bool,
    pub need_chair: bool,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub notes: String,
    pub timestamp: String,
    pub status: RegistrationStatus,
}

impl BazaarEntry {
    pub fn from_row(row: &[String]) -> Self {
        BazaarEntry {
            name: cell(row, 0),
            phone: cell(row, 1),
            team: cell(row, 2),
            business_name: cell(row, 3),
            business_type: cell(row, 4),
            products: cell(row, 5),
            need_electricity: cell(row, 6) == "true",
            need_table: cell(row, 7) == "true",
            need_chair: cell(row, 8) == "true",
            special_requests: cell(row, 9),
            notes: cell(row, 10),
            timestamp: cell_or_now(row, 11),
            status: RegistrationStatus::from_cell(&cell(row, 12)),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.phone.clone(),
            self.team.clone(),
            self.business_name.clone(),
            self.business_type.clone(),
            self.products.clone(),
            self.need_electricity.to_string(),
            self.need_table.to_string(),
            self.need_chair.to_string(),
            self.special_requests.clone(),
            self.notes.clone(),
            self.timestamp.clone(),
            self.status.as_str().to_string(),
        ]
    }
}

/// Participant list filter; `None` or `"all"` leaves a field unconstrained
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantFilter {
    /// Case-insensitive substring over name, team and competition
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

fn constrained(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        None | Some("") | Some("all") => None,
        Some(v) => Some(v),
    }
}

impl ParticipantFilter {
    pub fn matches(&self, participant: &Participant) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = participant.name.to_lowercase().contains(&term)
                || participant.team.to_lowercase().contains(&term)
                || participant.competition.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(category) = constrained(&self.category) {
            if participant.category != category {
                return false;
            }
        }
        if let Some(status) = constrained(&self.status) {
            if participant.status.as_str() != status {
                return false;
            }
        }
        if let Some(team) = constrained(&self.team) {
            if participant.team != team {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, participants: &'a [Participant]) -> Vec<&'a Participant> {
        participants.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Headline counts shown above the participant list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantStats {
    pub total: usize,
    pub confirmed: usize,
    pub pending: usize,
    pub children: usize,
    pub mothers: usize,
    pub fathers: usize,
}

impl ParticipantStats {
    pub fn summarize(participants: &[Participant]) -> Self {
        let mut stats = ParticipantStats {
            total: participants.len(),
            ..Default::default()
        };
        for p in participants {
            match p.status {
                RegistrationStatus::Confirmed => stats.confirmed += 1,
                RegistrationStatus::Pending => stats.pending += 1,
            }
            if p.category.contains("Anak") {
                stats.children += 1;
            } else if p.category == "Ibu-ibu" {
                stats.mothers += 1;
            } else if p.category == "Bapak-bapak" {
                stats.fathers += 1;
            }
        }
        stats
    }
}

/// Bazaar list filter, read from the `q`, `status`, `type` and `team` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BazaarFilter {
    /// Case-insensitive substring over name, business name, team and products
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub business_type: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl BazaarFilter {
    pub fn matches(&self, entry: &BazaarEntry) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [&entry.name, &entry.business_name, &entry.team, &entry.products]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(status) = constrained(&self.status) {
            if entry.status.as_str() != status {
                return false;
            }
        }
        if let Some(business_type) = constrained(&self.business_type) {
            if entry.business_type != business_type {
                return false;
            }
        }
        if let Some(team) = constrained(&self.team) {
            if entry.team != team {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, entries: &'a [BazaarEntry]) -> Vec<&'a BazaarEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BazaarStats {
    pub total: usize,
    pub confirmed: usize,
    pub pending: usize,
    pub need_electricity: usize,
}

impl BazaarStats {
    pub fn summarize(entries: &[BazaarEntry]) -> Self {
        let mut stats = BazaarStats {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry.status {
                RegistrationStatus::Confirmed => stats.confirmed += 1,
                RegistrationStatus::Pending => stats.pending += 1,
            }
            if entry.need_electricity {
                stats.need_electricity += 1;
            }
        }
        stats
    }
}
