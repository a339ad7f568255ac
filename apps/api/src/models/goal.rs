use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GoalRecord {
    pub id: Uuid,
    pub completed: bool,
    pub target_date: Option<NaiveDate>,
}
