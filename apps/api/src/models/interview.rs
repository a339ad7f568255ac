use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One mock-interview practice session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSessionRecord {
    pub id: Uuid,
    /// 0-100
    pub score: f64,
    pub created_at: DateTime<Utc>,
}
