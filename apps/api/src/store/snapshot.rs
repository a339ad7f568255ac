//! Parallel snapshot loading. All reads for a user are issued together and
//! joined before any score is computed.

use tracing::info;
use uuid::Uuid;

use crate::analytics::composite::PipelineSnapshot;
use crate::analytics::signals::{SignalInputs, SignalSource};
use crate::errors::AppError;
use crate::models::{
    ApplicationRecord, GoalRecord, InterviewSessionRecord, ResumeRecord, RoleRecord,
};
use crate::store::{ReadOutcome, RecordStore};

#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub applications: ReadOutcome<Vec<ApplicationRecord>>,
    pub resumes: ReadOutcome<Vec<ResumeRecord>>,
    pub roles: ReadOutcome<Vec<RoleRecord>>,
    pub goals: ReadOutcome<Vec<GoalRecord>>,
    pub sessions: ReadOutcome<Vec<InterviewSessionRecord>>,
    pub notifications_unread: ReadOutcome<u32>,
    pub anomalies_open: ReadOutcome<u32>,
}

impl LoadedSnapshot {
    /// Record lists for the composite scorers; unreadable sources are empty.
    pub fn pipeline(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            applications: self.applications.or_empty(),
            resumes: self.resumes.or_empty(),
            roles: self.roles.or_empty(),
            goals: self.goals.or_empty(),
            sessions: self.sessions.or_empty(),
        }
    }

    pub fn signal_inputs(&self) -> SignalInputs {
        SignalInputs {
            applications: self.applications.clone(),
            roles: self.roles.clone(),
            resumes: self.resumes.clone(),
            goals: self.goals.clone(),
            notifications_unread: self.notifications_unread.clone(),
            anomalies_open: self.anomalies_open.clone(),
        }
    }

    /// Which of `sources` could not be read. Failures never get this far, so
    /// these are the sources whose schema is missing.
    pub fn unavailable_among(&self, sources: &[SignalSource]) -> Vec<SignalSource> {
        sources
            .iter()
            .copied()
            .filter(|&source| !self.is_readable(source))
            .collect()
    }

    fn is_readable(&self, source: SignalSource) -> bool {
        match source {
            SignalSource::Applications => self.applications.is_ok(),
            SignalSource::Roles => self.roles.is_ok(),
            SignalSource::Resumes => self.resumes.is_ok(),
            SignalSource::Goals => self.goals.is_ok(),
            SignalSource::InterviewSessions => self.sessions.is_ok(),
            SignalSource::Notifications => self.notifications_unread.is_ok(),
            SignalSource::Anomalies => self.anomalies_open.is_ok(),
        }
    }

    fn first_failure(&self) -> Option<(&'static str, &str)> {
        [
            ("applications", self.applications.failure()),
            ("resumes", self.resumes.failure()),
            ("roles", self.roles.failure()),
            ("goals", self.goals.failure()),
            ("interview_sessions", self.sessions.failure()),
            ("notifications", self.notifications_unread.failure()),
            ("anomalies", self.anomalies_open.failure()),
        ]
        .into_iter()
        .find_map(|(resource, failure)| failure.map(|reason| (resource, reason)))
    }
}

/// Fans out every per-user read, then fans in.
///
/// Missing schema is kept as `SchemaMissing` for the caller to degrade; any
/// other read failure fails the whole load. Dropping the returned future
/// abandons reads still in flight.
pub async fn load_snapshot(store: &dyn RecordStore, user_id: Uuid) -> Result<LoadedSnapshot, AppError> {
    let (applications, resumes, roles, goals, sessions, notifications_unread, anomalies_open) = tokio::join!(
        store.applications(user_id),
        store.resumes(user_id),
        store.roles(user_id),
        store.goals(user_id),
        store.interview_sessions(user_id),
        store.unread_notifications(user_id),
        store.open_anomalies(user_id),
    );

    let snapshot = LoadedSnapshot {
        applications,
        resumes,
        roles,
        goals,
        sessions,
        notifications_unread,
        anomalies_open,
    };

    if let Some((resource, reason)) = snapshot.first_failure() {
        return Err(AppError::Store(format!("{resource}: {reason}")));
    }

    info!(
        "Loaded snapshot for user {user_id}: {} applications",
        snapshot.applications.as_ok().map_or(0, Vec::len)
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[tokio::test]
    async fn test_missing_schema_degrades() {
        let store = InMemoryStore {
            roles: ReadOutcome::SchemaMissing,
            sessions: ReadOutcome::SchemaMissing,
            ..InMemoryStore::default()
        };
        let snapshot = load_snapshot(&store, Uuid::new_v4()).await.unwrap();
        let pipeline = snapshot.pipeline();
        assert!(pipeline.roles.is_empty());
        assert!(pipeline.sessions.is_empty());
        assert_eq!(snapshot.signal_inputs().roles, ReadOutcome::SchemaMissing);
        assert_eq!(
            snapshot.unavailable_among(&[
                SignalSource::Applications,
                SignalSource::Roles,
                SignalSource::InterviewSessions,
            ]),
            vec![SignalSource::Roles, SignalSource::InterviewSessions]
        );
    }

    #[tokio::test]
    async fn test_read_failure_fails_the_load() {
        let store = InMemoryStore {
            goals: ReadOutcome::Failure("connection reset".to_string()),
            ..InMemoryStore::default()
        };
        let err = load_snapshot(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(ref msg) if msg.contains("goals")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_are_issued_concurrently() {
        let store = InMemoryStore {
            read_delay: Some(std::time::Duration::from_millis(50)),
            ..InMemoryStore::default()
        };
        let started = tokio::time::Instant::now();
        load_snapshot(&store, Uuid::new_v4()).await.unwrap();
        // seven sequential reads would take 350ms
        assert!(started.elapsed() < std::time::Duration::from_millis(100));
    }
}
