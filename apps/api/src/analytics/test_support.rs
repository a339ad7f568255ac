//! Builders shared by the analytics unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{ApplicationRecord, ApplicationStatus};

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// An application with no scheduled touch. `created_at` is 08:00 on the
/// applied date, or 2026-03-02 08:00 when there is none.
pub fn application(status: ApplicationStatus, applied: Option<NaiveDate>) -> ApplicationRecord {
    let created_at = applied
        .map(|d| d.and_hms_opt(8, 0, 0).unwrap().and_utc())
        .unwrap_or_else(|| at(2026, 3, 2, 8));
    ApplicationRecord {
        id: Uuid::new_v4(),
        company: "Northwind".to_string(),
        position: "Backend Engineer".to_string(),
        status,
        applied_date: applied,
        created_at,
        follow_up_date: None,
        next_action_at: None,
        match_score: None,
    }
}
