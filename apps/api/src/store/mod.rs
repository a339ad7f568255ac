//! Per-user reads the analytics engine consumes, and the append-only
//! reminder sink.
//!
//! Reads never fail with a bare error: each returns a `ReadOutcome` so a
//! missing table or column degrades to "unavailable" instead of a 500.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ApplicationRecord, GoalRecord, InterviewSessionRecord, ResumeRecord, RoleRecord,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod reminders;
pub mod snapshot;

pub use postgres::PgRecordStore;
pub use reminders::{persist_action_reminders, PgReminderSink, ReminderReport, ReminderSink};
pub use snapshot::load_snapshot;

/// PostgreSQL SQLSTATE codes that mean "this deployment lacks the schema".
const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";

#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Ok(T),
    /// The backing table or column does not exist.
    SchemaMissing,
    Failure(String),
}

impl<T> ReadOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ReadOutcome::Ok(_))
    }

    pub fn as_ok(&self) -> Option<&T> {
        match self {
            ReadOutcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Ok(value) => ReadOutcome::Ok(f(value)),
            ReadOutcome::SchemaMissing => ReadOutcome::SchemaMissing,
            ReadOutcome::Failure(reason) => ReadOutcome::Failure(reason),
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            ReadOutcome::Failure(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T: Default + Clone> ReadOutcome<T> {
    /// The value, or the empty default when the source was not readable.
    pub fn or_empty(&self) -> T {
        self.as_ok().cloned().unwrap_or_default()
    }
}

impl<T> From<Result<T, sqlx::Error>> for ReadOutcome<T> {
    fn from(result: Result<T, sqlx::Error>) -> Self {
        match result {
            Ok(value) => ReadOutcome::Ok(value),
            Err(e) if is_missing_schema(&e) => ReadOutcome::SchemaMissing,
            Err(e) => ReadOutcome::Failure(e.to_string()),
        }
    }
}

/// Classifies by SQLSTATE, not by message text.
pub fn is_missing_schema(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(UNDEFINED_TABLE) | Some(UNDEFINED_COLUMN)
        ),
        _ => false,
    }
}

/// Per-user reads. Implementations must report a missing table or column as
/// `ReadOutcome::SchemaMissing`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn applications(&self, user_id: Uuid) -> ReadOutcome<Vec<ApplicationRecord>>;
    async fn resumes(&self, user_id: Uuid) -> ReadOutcome<Vec<ResumeRecord>>;
    async fn roles(&self, user_id: Uuid) -> ReadOutcome<Vec<RoleRecord>>;
    async fn goals(&self, user_id: Uuid) -> ReadOutcome<Vec<GoalRecord>>;
    async fn interview_sessions(&self, user_id: Uuid) -> ReadOutcome<Vec<InterviewSessionRecord>>;
    async fn unread_notifications(&self, user_id: Uuid) -> ReadOutcome<u32>;
    async fn open_anomalies(&self, user_id: Uuid) -> ReadOutcome<u32>;
}
