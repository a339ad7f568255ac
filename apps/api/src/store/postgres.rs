use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::application::ApplicationRow;
use crate::models::resume::ResumeRow;
use crate::models::role::RoleRow;
use crate::models::{
    ApplicationRecord, GoalRecord, InterviewSessionRecord, ResumeRecord, RoleRecord,
};
use crate::store::{ReadOutcome, RecordStore};

/// `RecordStore` backed by the PostgreSQL pipeline tables.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn logged<T>(resource: &str, user_id: Uuid, outcome: ReadOutcome<T>) -> ReadOutcome<T> {
    match &outcome {
        ReadOutcome::SchemaMissing => {
            warn!("{resource} schema missing; treating as unavailable for user {user_id}")
        }
        ReadOutcome::Failure(reason) => warn!("{resource} read failed for user {user_id}: {reason}"),
        ReadOutcome::Ok(_) => {}
    }
    outcome
}

fn count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn applications(&self, user_id: Uuid) -> ReadOutcome<Vec<ApplicationRecord>> {
        let rows: ReadOutcome<Vec<ApplicationRow>> = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, company, position, status, applied_date, created_at,
                   follow_up_date, next_action_at, match_score::float8 AS match_score
            FROM applications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .into();

        logged("applications", user_id, rows).map(|rows| {
            rows.into_iter()
                .filter_map(|row| {
                    let (id, status) = (row.id, row.status.clone());
                    let record = row.into_record();
                    if record.is_none() {
                        warn!("Dropping application {id} with unknown status '{status}'");
                    }
                    record
                })
                .collect()
        })
    }

    async fn resumes(&self, user_id: Uuid) -> ReadOutcome<Vec<ResumeRecord>> {
        let rows: ReadOutcome<Vec<ResumeRow>> = sqlx::query_as::<_, ResumeRow>(
            "SELECT id, ats_score::float8 AS ats_score, status \
             FROM resumes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .into();

        logged("resumes", user_id, rows).map(|rows| rows.into_iter().map(ResumeRecord::from).collect())
    }

    async fn roles(&self, user_id: Uuid) -> ReadOutcome<Vec<RoleRecord>> {
        let rows: ReadOutcome<Vec<RoleRow>> =
            sqlx::query_as::<_, RoleRow>("SELECT id, parsed FROM roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .into();

        logged("roles", user_id, rows).map(|rows| rows.into_iter().map(RoleRecord::from).collect())
    }

    async fn goals(&self, user_id: Uuid) -> ReadOutcome<Vec<GoalRecord>> {
        let rows: ReadOutcome<Vec<GoalRecord>> = sqlx::query_as::<_, GoalRecord>(
            "SELECT id, completed, target_date FROM goals WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .into();

        logged("goals", user_id, rows)
    }

    async fn interview_sessions(&self, user_id: Uuid) -> ReadOutcome<Vec<InterviewSessionRecord>> {
        let rows: ReadOutcome<Vec<InterviewSessionRecord>> = sqlx::query_as::<_, InterviewSessionRecord>(
            "SELECT id, score::float8 AS score, created_at \
             FROM interview_sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .into();

        logged("interview_sessions", user_id, rows)
    }

    async fn unread_notifications(&self, user_id: Uuid) -> ReadOutcome<u32> {
        let total: ReadOutcome<i64> = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .into();

        logged("notifications", user_id, total).map(count)
    }

    async fn open_anomalies(&self, user_id: Uuid) -> ReadOutcome<u32> {
        let total: ReadOutcome<i64> = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM anomalies WHERE user_id = $1 AND status = 'open'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .into();

        logged("anomalies", user_id, total).map(count)
    }
}
