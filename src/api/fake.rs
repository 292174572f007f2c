//! Scripted in-memory backend for unit tests

use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::client::{Backend, MarkRequest, RegisterRequest};
use super::error::ApiError;
use crate::state::data::{
    AttendanceRecord, AttendanceStatus, MarkOutcome, StatsSnapshot, Student, StudentRef,
};

struct Script {
    students: Result<Vec<Student>, ApiError>,
    attendance: Result<Vec<AttendanceRecord>, ApiError>,
    register: Result<String, ApiError>,
    mark: Result<MarkOutcome, ApiError>,
    delete: Result<String, ApiError>,
    stats: Result<StatsSnapshot, ApiError>,
    calls: HashMap<&'static str, usize>,
    last_register: Option<RegisterRequest>,
    last_mark: Option<MarkRequest>,
    last_attendance_date: Option<Option<NaiveDate>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            students: Ok(Vec::new()),
            attendance: Ok(Vec::new()),
            register: Ok("Student registered successfully".into()),
            mark: Ok(MarkOutcome {
                student: StudentRef { student_id: "STU1".into(), name: "Alice".into() },
                confidence: Some(0.87),
                message: Some("Attendance marked successfully".into()),
            }),
            delete: Ok("Student deleted successfully".into()),
            stats: Ok(StatsSnapshot::default()),
            calls: HashMap::new(),
            last_register: None,
            last_mark: None,
            last_attendance_date: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    script: Arc<Mutex<Script>>,
}

impl FakeBackend {
    fn edit(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }

    pub fn set_students(&self, result: Result<Vec<Student>, ApiError>) {
        self.edit(|s| s.students = result);
    }

    pub fn set_attendance(&self, result: Result<Vec<AttendanceRecord>, ApiError>) {
        self.edit(|s| s.attendance = result);
    }

    pub fn set_register(&self, result: Result<String, ApiError>) {
        self.edit(|s| s.register = result);
    }

    pub fn set_mark(&self, result: Result<MarkOutcome, ApiError>) {
        self.edit(|s| s.mark = result);
    }

    pub fn set_delete(&self, result: Result<String, ApiError>) {
        self.edit(|s| s.delete = result);
    }

    pub fn set_stats(&self, result: Result<StatsSnapshot, ApiError>) {
        self.edit(|s| s.stats = result);
    }

    pub fn calls(&self, name: &str) -> usize {
        self.script.lock().unwrap().calls.get(name).copied().unwrap_or(0)
    }

    pub fn last_register(&self) -> Option<RegisterRequest> {
        self.script.lock().unwrap().last_register.clone()
    }

    pub fn last_mark(&self) -> Option<MarkRequest> {
        self.script.lock().unwrap().last_mark.clone()
    }

    pub fn last_attendance_date(&self) -> Option<Option<NaiveDate>> {
        self.script.lock().unwrap().last_attendance_date
    }

    fn record_call(&self, name: &'static str) -> std::sync::MutexGuard<'_, Script> {
        let mut script = self.script.lock().unwrap();
        *script.calls.entry(name).or_insert(0) += 1;
        script
    }
}

impl Backend for FakeBackend {
    async fn students(&self) -> Result<Vec<Student>, ApiError> {
        self.record_call("students").students.clone()
    }

    async fn register_student(&self, request: RegisterRequest) -> Result<String, ApiError> {
        let mut script = self.record_call("register");
        script.last_register = Some(request);
        script.register.clone()
    }

    async fn delete_student(&self, _student_id: String) -> Result<String, ApiError> {
        self.record_call("delete").delete.clone()
    }

    async fn attendance(&self, date: Option<NaiveDate>) -> Result<Vec<AttendanceRecord>, ApiError> {
        let mut script = self.record_call("attendance");
        script.last_attendance_date = Some(date);
        script.attendance.clone()
    }

    async fn mark_attendance(&self, request: MarkRequest) -> Result<MarkOutcome, ApiError> {
        let mut script = self.record_call("mark");
        script.last_mark = Some(request);
        script.mark.clone()
    }

    async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.record_call("stats").stats.clone()
    }

    async fn health(&self) -> Result<(), ApiError> {
        self.record_call("health");
        Ok(())
    }
}

pub fn record(id: i64, student_id: &str, name: &str) -> AttendanceRecord {
    AttendanceRecord {
        id,
        student_id: student_id.into(),
        student_name: name.into(),
        timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
        status: AttendanceStatus::from("Present"),
        confidence: Some(0.87),
        class_name: None,
    }
}

pub fn student(student_id: &str, name: &str) -> Student {
    Student {
        id: None,
        student_id: student_id.into(),
        name: name.into(),
        email: None,
        created_at: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
    }
}
