//! In-memory `RecordStore` and `ReminderSink` for tests.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ApplicationRecord, GoalRecord, InterviewSessionRecord, ResumeRecord, RoleRecord,
};
use crate::store::reminders::NewReminder;
use crate::store::{ReadOutcome, RecordStore, ReminderSink};

#[derive(Debug, Clone)]
pub struct InMemoryStore {
    pub applications: ReadOutcome<Vec<ApplicationRecord>>,
    pub resumes: ReadOutcome<Vec<ResumeRecord>>,
    pub roles: ReadOutcome<Vec<RoleRecord>>,
    pub goals: ReadOutcome<Vec<GoalRecord>>,
    pub sessions: ReadOutcome<Vec<InterviewSessionRecord>>,
    pub notifications_unread: ReadOutcome<u32>,
    pub anomalies_open: ReadOutcome<u32>,
    /// Each read sleeps this long before answering.
    pub read_delay: Option<Duration>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            applications: ReadOutcome::Ok(Vec::new()),
            resumes: ReadOutcome::Ok(Vec::new()),
            roles: ReadOutcome::Ok(Vec::new()),
            goals: ReadOutcome::Ok(Vec::new()),
            sessions: ReadOutcome::Ok(Vec::new()),
            notifications_unread: ReadOutcome::Ok(0),
            anomalies_open: ReadOutcome::Ok(0),
            read_delay: None,
        }
    }
}

impl InMemoryStore {
    async fn read<T: Clone>(&self, outcome: &ReadOutcome<T>) -> ReadOutcome<T> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        outcome.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn applications(&self, _user_id: Uuid) -> ReadOutcome<Vec<ApplicationRecord>> {
        self.read(&self.applications).await
    }

    async fn resumes(&self, _user_id: Uuid) -> ReadOutcome<Vec<ResumeRecord>> {
        self.read(&self.resumes).await
    }

    async fn roles(&self, _user_id: Uuid) -> ReadOutcome<Vec<RoleRecord>> {
        self.read(&self.roles).await
    }

    async fn goals(&self, _user_id: Uuid) -> ReadOutcome<Vec<GoalRecord>> {
        self.read(&self.goals).await
    }

    async fn interview_sessions(&self, _user_id: Uuid) -> ReadOutcome<Vec<InterviewSessionRecord>> {
        self.read(&self.sessions).await
    }

    async fn unread_notifications(&self, _user_id: Uuid) -> ReadOutcome<u32> {
        self.read(&self.notifications_unread).await
    }

    async fn open_anomalies(&self, _user_id: Uuid) -> ReadOutcome<u32> {
        self.read(&self.anomalies_open).await
    }
}

/// Keeps every reminder it accepts; refuses writes once `capacity` is reached.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub written: Mutex<Vec<NewReminder>>,
    pub capacity: Option<usize>,
}

impl RecordingSink {
    pub fn failing_after(capacity: usize) -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            capacity: Some(capacity),
        }
    }

    pub fn written(&self) -> Vec<NewReminder> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderSink for RecordingSink {
    async fn append(&self, reminder: NewReminder) -> Result<()> {
        let mut written = self.written.lock().unwrap();
        if self.capacity.is_some_and(|cap| written.len() >= cap) {
            bail!("notifications table is read-only");
        }
        written.push(reminder);
        Ok(())
    }
}
