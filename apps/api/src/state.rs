use std::sync::Arc;

use crate::analytics::clock::Clock;
use crate::config::Config;
use crate::store::{RecordStore, ReminderSink};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Per-user pipeline reads. Default: PgRecordStore.
    pub store: Arc<dyn RecordStore>,
    /// Append-only reminder writes. Default: PgReminderSink.
    pub reminders: Arc<dyn ReminderSink>,
    /// Every score is computed against this clock.
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}
