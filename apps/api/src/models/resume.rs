use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: Uuid,
    /// 0-100
    pub ats_score: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub ats_score: Option<f64>,
    pub status: String,
}

impl From<ResumeRow> for ResumeRecord {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            ats_score: row.ats_score.map(|s| s.clamp(0.0, 100.0)),
            status: row.status,
        }
    }
}
