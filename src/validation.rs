use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^08[0-9]{8,11}$").unwrap();
}

/// Field name to message, for every field that failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    fn require_phone(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.add("phone", "WhatsApp number is required");
        } else if !PHONE_REGEX.is_match(value) {
            self.add("phone", "Invalid WhatsApp number format (example: 08123456789)");
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Result entry as submitted by the admin form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSubmission {
    #[serde(default)]
    pub competition: String,
    #[serde(default)]
    pub team: String,
    pub position: Option<i64>,
    pub points: Option<i64>,
    #[serde(default)]
    pub notes: String,
}

/// A result entry that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidResult {
    pub competition: String,
    pub team: String,
    pub position: i64,
    pub points: i64,
    pub notes: String,
}

impl ResultSubmission {
    /// Competition, team and a positive position are required; points must be present
    pub fn validate(self) -> Result<ValidResult, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("competition", &self.competition, "Competition is required");
        errors.require("team", &self.team, "Team is required");
        match self.position {
            None => errors.add("position", "Position is required"),
            Some(p) if p < 1 => errors.add("position", "Position must be 1 or greater"),
            Some(_) => {}
        }
        if self.points.is_none() {
            errors.add("points", "Points are required");
        }
        errors.into_result(ValidResult {
            competition: self.competition,
            team: self.team,
            position: self.position.unwrap_or_default(),
            points: self.points.unwrap_or_default(),
            notes: self.notes,
        })
    }
}

/// Competition registration form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub competition: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
}

impl RegistrationSubmission {
    pub fn validate(self) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.require_phone(&self.phone);
        errors.require("team", &self.team, "Team is required");
        errors.require("category", &self.category, "Category is required");
        errors.require("competition", &self.competition, "Competition is required");
        errors.into_result(self)
    }
}

/// Bazaar stand registration form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BazaarSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub products: String,
    #[serde(default)]
    pub need_electricity: bool,
    #[serde(default)]
    pub need_table: bool,
    #[serde(default)]
    pub need_chair: bool,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub notes: String,
}

impl BazaarSubmission {
    pub fn validate(self) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Stand owner name is required");
        errors.require_phone(&self.phone);
        errors.require("team", &self.team, "Team is required");
        errors.require("businessName", &self.business_name, "Business name is required");
        errors.require("businessType", &self.business_type, "Business type is required");
        errors.require("products", &self.products, "Product description is required");
        errors.into_result(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_requires_all_fields() {
        let errors = ResultSubmission::default().validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.get("points").is_some());

        let errors = ResultSubmission {
            competition: "Gaple".into(),
            team: "Cendana (Pattimura)".into(),
            position: Some(0),
            points: Some(0),
            notes: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("position"), Some("Position must be 1 or greater"));
    }

    #[test]
    fn result_allows_zero_points_and_unplaced_positions() {
        let valid = ResultSubmission {
            competition: "Gaple".into(),
            team: "Cendana (Pattimura)".into(),
            position: Some(4),
            points: Some(0),
            notes: "unplaced".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.position, 4);
        assert_eq!(valid.points, 0);
    }

    #[test]
    fn phone_numbers() {
        let base = RegistrationSubmission {
            name: "Ahmad".into(),
            phone: "08123456789".into(),
            team: "Boulevard (Soedirman)".into(),
            competition: "Tenis Meja".into(),
            category: "bapak".into(),
            notes: String::new(),
        };
        assert!(base.clone().validate().is_ok());

        for bad in ["8123456789", "0812345", "08123456789012345", "0812-3456-789"] {
            let errors = RegistrationSubmission {
                phone: bad.into(),
                ..base.clone()
            }
            .validate()
            .unwrap_err();
            assert!(errors.get("phone").unwrap().starts_with("Invalid"), "{}", bad);
        }

        let errors = RegistrationSubmission {
            phone: "  ".into(),
            ..base
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("phone"), Some("WhatsApp number is required"));
    }

    #[test]
    fn bazaar_reports_every_missing_field() {
        let errors = BazaarSubmission::default().validate().unwrap_err();
        let fields: Vec<&str> = ["name", "phone", "team", "businessName", "businessType", "products"]
            .into_iter()
            .filter(|f| errors.get(f).is_some())
            .collect();
        assert_eq!(fields.len(), 6);
        assert!(errors.to_string().contains("products: "));
    }
}
