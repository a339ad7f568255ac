//! Reminder side effects for execution packages.
//!
//! Writes are append-only and best-effort: a failed insert is logged and
//! counted, never retried, and never fails the request that triggered it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analytics::execution::FeatureExecutionPackage;
use crate::models::application::start_of_day;

/// Only the leading actions of a package become reminders.
pub const MAX_REMINDERS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub user_id: Uuid,
    pub feature_id: String,
    pub title: String,
    pub body: String,
    pub href: String,
    pub due_at: NaiveDate,
}

#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn append(&self, reminder: NewReminder) -> Result<()>;
}

#[derive(Clone)]
pub struct PgReminderSink {
    pool: PgPool,
}

impl PgReminderSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderSink for PgReminderSink {
    async fn append(&self, reminder: NewReminder) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, href, source, due_at, created_at)
            VALUES ($1, $2, 'reminder', $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(reminder.user_id)
        .bind(&reminder.title)
        .bind(&reminder.body)
        .bind(&reminder.href)
        .bind(&reminder.feature_id)
        .bind(start_of_day(reminder.due_at))
        .execute(&self.pool)
        .await
        .with_context(|| format!("inserting reminder for feature '{}'", reminder.feature_id))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderReport {
    pub requested: u32,
    pub persisted: u32,
    pub failed: u32,
}

/// Appends one reminder per leading action of `package`.
pub async fn persist_action_reminders(
    sink: &dyn ReminderSink,
    user_id: Uuid,
    package: &FeatureExecutionPackage,
) -> ReminderReport {
    let mut report = ReminderReport::default();

    for action in package.actions.iter().take(MAX_REMINDERS) {
        report.requested += 1;
        let reminder = NewReminder {
            user_id,
            feature_id: package.feature_id.clone(),
            title: action.title.clone(),
            body: action.detail.clone(),
            href: action.module_href.clone(),
            due_at: action.due_at,
        };
        match sink.append(reminder).await {
            Ok(()) => report.persisted += 1,
            Err(e) => {
                warn!("Reminder '{}' not persisted for user {user_id}: {e:#}", action.id);
                report.failed += 1;
            }
        }
    }

    info!(
        "Reminders for feature '{}': {}/{} persisted",
        package.feature_id, report.persisted, report.requested
    );
    report
}
