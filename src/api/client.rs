use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use super::endpoints::{resolve, Endpoint};
use super::error::ApiError;
use crate::state::data::{AttendanceRecord, MarkOutcome, StatsSnapshot, Student};

/// Body of `POST /students/register`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub student_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// JPEG data URL of the captured photo
    pub image: String,
}

/// Body of `POST /attendance/mark`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkRequest {
    pub image: String,
    pub class_name: String,
}

/// The REST collaborator, as seen by the view model.
///
/// Implemented over HTTP by [`HttpBackend`]; tests script it in memory.
pub trait Backend: Clone + Send + Sync + 'static {
    fn students(&self) -> impl Future<Output = Result<Vec<Student>, ApiError>> + Send;

    /// Returns the backend's confirmation message
    fn register_student(
        &self,
        request: RegisterRequest,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn delete_student(
        &self,
        student_id: String,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Attendance in server order, optionally for a single date
    fn attendance(
        &self,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<AttendanceRecord>, ApiError>> + Send;

    fn mark_attendance(
        &self,
        request: MarkRequest,
    ) -> impl Future<Output = Result<MarkOutcome, ApiError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<StatsSnapshot, ApiError>> + Send;

    fn health(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// reqwest-backed implementation of [`Backend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        resolve(&self.base_url, endpoint)
    }
}

impl Backend for HttpBackend {
    async fn students(&self) -> Result<Vec<Student>, ApiError> {
        let response = self.client.get(self.url(&Endpoint::Students)).send().await?;
        read_json(response).await
    }

    async fn register_student(&self, request: RegisterRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url(&Endpoint::RegisterStudent))
            .json(&request)
            .send()
            .await?;
        let body: MessageBody = read_json(response).await?;
        Ok(body.message.unwrap_or_else(|| "Student registered successfully".to_string()))
    }

    async fn delete_student(&self, student_id: String) -> Result<String, ApiError> {
        let response = self
            .client
            .delete(self.url(&Endpoint::Student(student_id)))
            .send()
            .await?;
        let body: MessageBody = read_json(response).await?;
        Ok(body.message.unwrap_or_else(|| "Student deleted successfully".to_string()))
    }

    async fn attendance(&self, date: Option<NaiveDate>) -> Result<Vec<AttendanceRecord>, ApiError> {
        let response = self
            .client
            .get(self.url(&Endpoint::Attendance(date)))
            .send()
            .await?;
        read_json(response).await
    }

    async fn mark_attendance(&self, request: MarkRequest) -> Result<MarkOutcome, ApiError> {
        let response = self
            .client
            .post(self.url(&Endpoint::MarkAttendance))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        let response = self
            .client
            .get(self.url(&Endpoint::AttendanceStats))
            .send()
            .await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.url(&Endpoint::Health)).send().await?;
        let _: serde_json::Value = read_json(response).await?;
        Ok(())
    }
}

/// Decode a success body, or turn an error status into [`ApiError::Server`]
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Transport(format!("malformed response body: {}", e)))
    } else {
        Err(ApiError::Server {
            status: status.as_u16(),
            message: error_field(&body),
        })
    }
}

/// The `error` field of a failure body, if the body carries one
pub(crate) fn error_field(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
}
