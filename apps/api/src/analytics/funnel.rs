use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analytics::math::{percent, round_to};
use crate::models::{ApplicationRecord, ApplicationStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelMetrics {
    pub total_applications: usize,
    /// Screening, interview or offer, as a share of all applications (0-100).
    pub response_rate: f64,
    pub interview_rate: f64,
    pub offer_rate: f64,
    /// One decimal place.
    pub avg_applications_per_week: f64,
}

/// Derives funnel conversion rates and the average weekly pace.
///
/// Each rate is an independent share of all applications, so they need not be
/// ordered; the projector corrects that. Weekly pace divides by the number of
/// whole Monday-anchored weeks between the earliest application and `today`,
/// with a floor of one week.
pub fn derive_funnel_metrics(applications: &[ApplicationRecord], today: NaiveDate) -> FunnelMetrics {
    let total = applications.len();
    if total == 0 {
        return FunnelMetrics::default();
    }

    let responded = applications
        .iter()
        .filter(|a| a.status.is_responded())
        .count();
    let interviews = count_status(applications, ApplicationStatus::Interview);
    let offers = count_status(applications, ApplicationStatus::Offer);

    FunnelMetrics {
        total_applications: total,
        response_rate: percent(responded, total),
        interview_rate: percent(interviews, total),
        offer_rate: percent(offers, total),
        avg_applications_per_week: weekly_pace(applications, today),
    }
}

fn count_status(applications: &[ApplicationRecord], status: ApplicationStatus) -> usize {
    applications.iter().filter(|a| a.status == status).count()
}

fn weekly_pace(applications: &[ApplicationRecord], today: NaiveDate) -> f64 {
    let Some(earliest) = applications.iter().map(|a| a.effective_date()).min() else {
        return 0.0;
    };
    let elapsed_weeks = (week_start(today) - week_start(earliest)).num_days() / 7;
    round_to(applications.len() as f64 / elapsed_weeks.max(1) as f64, 1)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
