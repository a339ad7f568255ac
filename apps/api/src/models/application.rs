use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "applied" => Some(Self::Applied),
            "screening" => Some(Self::Screening),
            "interview" => Some(Self::Interview),
            "offer" => Some(Self::Offer),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }

    /// Still waiting on a decision: applied, screening or interview.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Applied | Self::Screening | Self::Interview)
    }

    /// The employer answered positively at some stage.
    pub fn is_responded(self) -> bool {
        matches!(self, Self::Screening | Self::Interview | Self::Offer)
    }
}

/// A tracked job application as seen by the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub applied_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub follow_up_date: Option<NaiveDate>,
    pub next_action_at: Option<DateTime<Utc>>,
    /// 0-100
    pub match_score: Option<f64>,
}

impl ApplicationRecord {
    /// `applied_date`, else `created_at`, as a calendar date.
    pub fn effective_date(&self) -> NaiveDate {
        self.applied_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    /// `applied_date` at UTC midnight, else `created_at`.
    pub fn effective_instant(&self) -> DateTime<Utc> {
        self.applied_date
            .map(start_of_day)
            .unwrap_or(self.created_at)
    }

    /// The next scheduled touch: `next_action_at`, else `follow_up_date` at UTC midnight.
    pub fn action_anchor(&self) -> Option<DateTime<Utc>> {
        self.next_action_at
            .or_else(|| self.follow_up_date.map(start_of_day))
    }

    pub fn has_action_date(&self) -> bool {
        self.next_action_at.is_some() || self.follow_up_date.is_some()
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub status: String,
    pub applied_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub follow_up_date: Option<NaiveDate>,
    pub next_action_at: Option<DateTime<Utc>>,
    pub match_score: Option<f64>,
}

impl ApplicationRow {
    /// Returns `None` when the stored status is not one the funnel understands.
    pub fn into_record(self) -> Option<ApplicationRecord> {
        let status = ApplicationStatus::parse(&self.status)?;
        Some(ApplicationRecord {
            id: self.id,
            company: self.company,
            position: self.position,
            status,
            applied_date: self.applied_date,
            created_at: self.created_at,
            follow_up_date: self.follow_up_date,
            next_action_at: self.next_action_at,
            match_score: self.match_score.map(|s| s.clamp(0.0, 100.0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(applied: Option<NaiveDate>) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            status: ApplicationStatus::Applied,
            applied_date: applied,
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).unwrap(),
            follow_up_date: None,
            next_action_at: None,
            match_score: None,
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            ApplicationStatus::parse(" Interview "),
            Some(ApplicationStatus::Interview)
        );
        assert_eq!(ApplicationStatus::parse("ghosted"), None);
    }

    #[test]
    fn test_active_and_responded_sets() {
        use ApplicationStatus::*;
        let active: Vec<_> = [Applied, Screening, Interview, Offer, Rejected, Withdrawn]
            .into_iter()
            .filter(|s| s.is_active())
            .collect();
        assert_eq!(active, vec![Applied, Screening, Interview]);
        assert!(Offer.is_responded());
        assert!(!Applied.is_responded());
    }

    #[test]
    fn test_effective_date_prefers_applied_date() {
        let applied = NaiveDate::from_ymd_opt(2026, 2, 20);
        assert_eq!(record(applied).effective_date(), applied.unwrap());
        assert_eq!(
            record(None).effective_date(),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_action_anchor_prefers_next_action() {
        let mut app = record(None);
        app.follow_up_date = NaiveDate::from_ymd_opt(2026, 3, 10);
        assert_eq!(
            app.action_anchor(),
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap())
        );
        let next = Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap();
        app.next_action_at = Some(next);
        assert_eq!(app.action_anchor(), Some(next));
    }

    #[test]
    fn test_row_with_unknown_status_is_dropped() {
        let row = ApplicationRow {
            id: Uuid::new_v4(),
            company: "Acme".to_string(),
            position: "SRE".to_string(),
            status: "archived".to_string(),
            applied_date: None,
            created_at: Utc::now(),
            follow_up_date: None,
            next_action_at: None,
            match_score: Some(140.0),
        };
        assert!(row.into_record().is_none());
    }
}
