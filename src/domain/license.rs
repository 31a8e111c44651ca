// User and license records as served by the license server, plus their table rows
use super::error::FetchError;
use super::metric::NOT_AVAILABLE;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub register_date: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    #[serde(default)]
    pub action_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSession {
    /// Session start, epoch seconds
    #[serde(default)]
    pub entrada: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub register_date: Option<String>,
    #[serde(default)]
    pub serial_code: Option<String>,
    #[serde(default)]
    pub serial_code_encrypted: Option<String>,
    #[serde(default)]
    pub action_logs: Vec<ActionLog>,
    #[serde(default)]
    pub sessions: Vec<LicenseSession>,
}

impl LicenseRecord {
    pub fn last_action(&self) -> Option<&str> {
        self.action_logs.last()?.action_name.as_deref()
    }

    /// Start of the most recent session
    pub fn last_session(&self) -> Option<DateTime<Utc>> {
        let latest = self.sessions.iter().filter_map(|s| s.entrada).max()?;
        DateTime::from_timestamp_millis(latest.checked_mul(1000)?)
    }
}

/// User creation form as submitted by the dashboard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub register_date: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Validated creation payload, serialized as the license server expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub register_date: DateTime<Utc>,
    pub enabled: bool,
}

impl NewUserForm {
    pub fn validate(self) -> Result<NewUser, FetchError> {
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let register_date = self.register_date.filter(|d| !d.trim().is_empty());

        let (Some(email), Some(register_date)) = (email, register_date) else {
            return Err(FetchError::validation("email and registerDate are required"));
        };

        let register_date = parse_timestamp(&register_date).ok_or_else(|| {
            FetchError::validation(format!("registerDate is not a valid date: {}", register_date))
        })?;

        Ok(NewUser {
            email,
            register_date,
            enabled: self.enabled.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub register_date: String,
    pub ip: String,
    pub enabled: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: or_na(user.email.clone()),
            register_date: format_timestamp(user.register_date.as_deref()),
            ip: or_na(user.ip.clone()),
            enabled: match user.enabled {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => NOT_AVAILABLE.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRow {
    pub id: i64,
    pub ip: String,
    pub register_date: String,
    pub serial_code: String,
    pub serial_code_encrypted: String,
    pub last_action: String,
    pub last_session: String,
}

impl WorkspaceRow {
    /// Records without an id are numbered by their position in the listing
    pub fn from_record(index: usize, record: &LicenseRecord) -> Self {
        Self {
            id: record.id.unwrap_or(index as i64),
            ip: or_na(record.ip.clone()),
            register_date: format_timestamp(record.register_date.as_deref()),
            serial_code: or_na(record.serial_code.clone()),
            serial_code_encrypted: or_na(record.serial_code_encrypted.clone()),
            last_action: or_na(record.last_action().map(str::to_string)),
            last_session: record
                .last_session()
                .map(|t| t.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }

    pub fn from_records(records: &[LicenseRecord]) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| Self::from_record(i, r))
            .collect()
    }
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Parse an ISO-8601 timestamp; bare dates and naive times are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_timestamp(raw)
            .map(|t| t.format(DISPLAY_FORMAT).to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => NOT_AVAILABLE.to_string(),
    }
}
