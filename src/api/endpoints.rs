/// Logical endpoint names and their URLs
///
/// Callers never build URLs by hand; they name the resource and the
/// resolver produces the absolute URL under `<base>/api`.

use chrono::NaiveDate;

/// Every REST resource the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /students`
    Students,
    /// `DELETE /students/{student_id}`
    Student(String),
    /// `POST /students/register`
    RegisterStudent,
    /// `GET /attendance`, optionally filtered to one calendar date
    Attendance(Option<NaiveDate>),
    /// `POST /attendance/mark`
    MarkAttendance,
    /// `GET /attendance/stats`
    AttendanceStats,
    /// `GET /health`
    Health,
}

const API_PREFIX: &str = "/api";

/// Resolve a logical endpoint against the configured base URL
pub fn resolve(base_url: &str, endpoint: &Endpoint) -> String {
    let base = base_url.trim_end_matches('/');
    let path = match endpoint {
        Endpoint::Students => "/students".to_string(),
        Endpoint::Student(student_id) => {
            format!("/students/{}", urlencoding::encode(student_id))
        }
        Endpoint::RegisterStudent => "/students/register".to_string(),
        Endpoint::Attendance(None) => "/attendance".to_string(),
        Endpoint::Attendance(Some(date)) => {
            format!("/attendance?date={}", date.format("%Y-%m-%d"))
        }
        Endpoint::MarkAttendance => "/attendance/mark".to_string(),
        Endpoint::AttendanceStats => "/attendance/stats".to_string(),
        Endpoint::Health => "/health".to_string(),
    };
    format!("{}{}{}", base, API_PREFIX, path)
}
