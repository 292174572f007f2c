/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the REST backend and the UI layer. The backend owns every entity;
/// the client only ever holds read copies.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A registered student
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Student {
    /// Backend row ID (not used for addressing)
    #[serde(default)]
    pub id: Option<i64>,
    /// Externally assigned unique ID (e.g., "STU2024001")
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Attendance status as reported by the backend
///
/// Shown and exported exactly as sent; [`StatusKind`] is for matching only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AttendanceStatus(String);

/// Known status values, compared case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Present,
    Absent,
    Late,
    Other,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> StatusKind {
        match self.0.to_ascii_lowercase().as_str() {
            "present" => StatusKind::Present,
            "absent" => StatusKind::Absent,
            "late" => StatusKind::Late,
            _ => StatusKind::Other,
        }
    }
}

impl From<&str> for AttendanceStatus {
    fn from(raw: &str) -> Self {
        AttendanceStatus(raw.to_string())
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One attendance entry, created by the backend on a successful mark
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    /// Recognition confidence in [0, 1]; the list endpoint may omit it
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// Aggregate counters for today, derived server-side
///
/// Replaced wholesale on every fetch, never merged field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub total_students: u32,
    pub present: u32,
    pub absent: u32,
}

/// Minimal student reference returned by mark/register calls
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentRef {
    pub student_id: String,
    pub name: String,
}

/// Successful mark-attendance response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkOutcome {
    pub student: StudentRef,
    /// Absent when the student was already marked today
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Format a [0, 1] confidence as a one-decimal percentage ("87.0%")
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Render a timestamp in the operator's local time zone
pub fn local_date_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render only the local time of day (table cells)
pub fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Accept RFC 3339 or offset-less ISO-8601 (treated as UTC)
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))
}
