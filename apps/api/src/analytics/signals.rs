//! Cross-entity counts for the feature-catalog runtime, plus the momentum
//! score that feeds lane and value scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::composite::is_stale;
use crate::analytics::math::{mean, round_to, score};
use crate::models::{ApplicationRecord, ApplicationStatus, GoalRecord, ResumeRecord, RoleRecord};
use crate::store::ReadOutcome;

/// Days after its anchor that an open application needs a follow-up.
pub const FOLLOWUP_DUE_AFTER_DAYS: i64 = 2;
const ATS_TARGET: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Applications,
    Roles,
    Resumes,
    Goals,
    InterviewSessions,
    Notifications,
    Anomalies,
}

/// Per-source reads, as returned by the record store.
#[derive(Debug, Clone)]
pub struct SignalInputs {
    pub applications: ReadOutcome<Vec<ApplicationRecord>>,
    pub roles: ReadOutcome<Vec<RoleRecord>>,
    pub resumes: ReadOutcome<Vec<ResumeRecord>>,
    pub goals: ReadOutcome<Vec<GoalRecord>>,
    pub notifications_unread: ReadOutcome<u32>,
    pub anomalies_open: ReadOutcome<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSignals {
    pub total: usize,
    pub open: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
    pub stale: usize,
    pub followup_due: usize,
    pub avg_match: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSignals {
    pub total: usize,
    pub parsed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSignals {
    pub total: usize,
    pub avg_ats: f64,
    pub below_80: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSignals {
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSignals {
    pub applications: ApplicationSignals,
    pub roles: RoleSignals,
    pub resumes: ResumeSignals,
    pub goals: GoalSignals,
    pub notifications_unread: u32,
    pub anomalies_open: u32,
    pub momentum_score: u32,
    /// Sources that could not be read; their counts are zero.
    pub unavailable: Vec<SignalSource>,
}

impl RuntimeSignals {
    /// Stale applications as a share of open ones (0 when nothing is open).
    pub fn stale_ratio(&self) -> f64 {
        self.applications.stale as f64 / self.applications.open.max(1) as f64
    }

    pub fn parse_coverage(&self) -> f64 {
        100.0 * self.roles.parsed as f64 / self.roles.total.max(1) as f64
    }

    pub fn goal_completion(&self) -> f64 {
        100.0 * self.goals.completed as f64 / self.goals.total.max(1) as f64
    }
}

/// Folds the per-source reads into one snapshot.
///
/// A source that is missing or failed counts as empty and is listed in
/// `unavailable`; this function never fails.
pub fn aggregate_runtime_signals(inputs: &SignalInputs, now: DateTime<Utc>) -> RuntimeSignals {
    let mut unavailable = Vec::new();
    let mut read = |source: SignalSource, available: bool| {
        if !available {
            unavailable.push(source);
        }
    };

    read(SignalSource::Applications, inputs.applications.is_ok());
    read(SignalSource::Roles, inputs.roles.is_ok());
    read(SignalSource::Resumes, inputs.resumes.is_ok());
    read(SignalSource::Goals, inputs.goals.is_ok());
    read(SignalSource::Notifications, inputs.notifications_unread.is_ok());
    read(SignalSource::Anomalies, inputs.anomalies_open.is_ok());

    let applications = application_signals(
        inputs.applications.as_ok().map_or(&[][..], Vec::as_slice),
        now,
    );

    let roles = inputs.roles.as_ok().map_or(&[][..], Vec::as_slice);
    let roles = RoleSignals {
        total: roles.len(),
        parsed: roles.iter().filter(|r| r.parsed.is_parsed()).count(),
    };

    let resumes = inputs.resumes.as_ok().map_or(&[][..], Vec::as_slice);
    let scored: Vec<f64> = resumes.iter().filter_map(|r| r.ats_score).collect();
    let resumes = ResumeSignals {
        total: resumes.len(),
        avg_ats: round_to(mean(scored.iter().copied()).unwrap_or(0.0), 1),
        below_80: scored.iter().filter(|&&s| s < ATS_TARGET).count(),
    };

    let goals = inputs.goals.as_ok().map_or(&[][..], Vec::as_slice);
    let goals = GoalSignals {
        total: goals.len(),
        completed: goals.iter().filter(|g| g.completed).count(),
    };

    let notifications_unread = inputs.notifications_unread.as_ok().copied().unwrap_or(0);
    let anomalies_open = inputs.anomalies_open.as_ok().copied().unwrap_or(0);

    let momentum_score = momentum_score(&applications, resumes.avg_ats, roles.total);

    RuntimeSignals {
        applications,
        roles,
        resumes,
        goals,
        notifications_unread,
        anomalies_open,
        momentum_score,
        unavailable,
    }
}

fn application_signals(applications: &[ApplicationRecord], now: DateTime<Utc>) -> ApplicationSignals {
    let open: Vec<&ApplicationRecord> = applications.iter().filter(|a| a.status.is_active()).collect();
    let count = |status: ApplicationStatus| applications.iter().filter(|a| a.status == status).count();

    let followup_due = open
        .iter()
        .filter(|a| {
            let anchor = a.action_anchor().unwrap_or_else(|| a.effective_instant());
            (now - anchor).num_days() >= FOLLOWUP_DUE_AFTER_DAYS
        })
        .count();

    ApplicationSignals {
        total: applications.len(),
        open: open.len(),
        interviews: count(ApplicationStatus::Interview),
        offers: count(ApplicationStatus::Offer),
        rejected: count(ApplicationStatus::Rejected),
        stale: open.iter().filter(|a| is_stale(a, now)).count(),
        followup_due,
        avg_match: round_to(
            mean(applications.iter().filter_map(|a| a.match_score)).unwrap_or(0.0),
            1,
        ),
    }
}

pub fn momentum_score(apps: &ApplicationSignals, avg_ats: f64, roles_total: usize) -> u32 {
    score(
        46.0 + 0.8 * apps.open as f64 + 4.0 * apps.interviews as f64 + 8.0 * apps.offers as f64
            - 1.8 * apps.rejected as f64
            - 3.6 * apps.stale as f64
            + 0.22 * avg_ats
            + 0.35 * roles_total as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{application, at};
    use crate::models::role::RoleParse;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        at(2026, 3, 18, 14)
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn resume(ats: Option<f64>) -> ResumeRecord {
        ResumeRecord {
            id: Uuid::new_v4(),
            ats_score: ats,
            status: "active".to_string(),
        }
    }

    fn role(parsed: bool) -> RoleRecord {
        RoleRecord {
            id: Uuid::new_v4(),
            parsed: if parsed {
                RoleParse::Parsed(Default::default())
            } else {
                RoleParse::Unparsed
            },
        }
    }

    fn sample_applications() -> Vec<ApplicationRecord> {
        use ApplicationStatus::*;
        let mut apps = Vec::new();
        // two stale
        apps.push(application(Applied, date(2026, 2, 26)));
        apps.push(application(Applied, date(2026, 2, 20)));
        // scheduled in the future
        for status in [Applied, Applied, Applied, Applied, Screening, Screening, Interview, Interview] {
            let mut app = application(status, date(2026, 3, 12));
            app.follow_up_date = date(2026, 3, 25);
            apps.push(app);
        }
        apps.push(application(Offer, date(2026, 2, 1)));
        for _ in 0..3 {
            apps.push(application(Rejected, date(2026, 2, 1)));
        }
        apps
    }

    fn inputs() -> SignalInputs {
        SignalInputs {
            applications: ReadOutcome::Ok(sample_applications()),
            roles: ReadOutcome::Ok(vec![role(true), role(true), role(true), role(false)]),
            resumes: ReadOutcome::Ok(vec![resume(Some(70.0)), resume(Some(80.0)), resume(None)]),
            goals: ReadOutcome::Ok(vec![GoalRecord {
                id: Uuid::new_v4(),
                completed: true,
                target_date: None,
            }]),
            notifications_unread: ReadOutcome::Ok(3),
            anomalies_open: ReadOutcome::Ok(1),
        }
    }

    #[test]
    fn test_application_counts() {
        let signals = aggregate_runtime_signals(&inputs(), now());
        let apps = signals.applications;
        assert_eq!(apps.total, 14);
        assert_eq!(apps.open, 10);
        assert_eq!(apps.interviews, 2);
        assert_eq!(apps.offers, 1);
        assert_eq!(apps.rejected, 3);
        assert_eq!(apps.stale, 2);
        assert_eq!(apps.followup_due, 2);
        assert_eq!(apps.avg_match, 0.0);
        assert!(signals.unavailable.is_empty());
    }

    #[test]
    fn test_other_sources() {
        let signals = aggregate_runtime_signals(&inputs(), now());
        assert_eq!(signals.roles, RoleSignals { total: 4, parsed: 3 });
        assert_eq!(signals.resumes.total, 3);
        assert_eq!(signals.resumes.avg_ats, 75.0);
        assert_eq!(signals.resumes.below_80, 1);
        assert_eq!(signals.goals, GoalSignals { total: 1, completed: 1 });
        assert_eq!(signals.notifications_unread, 3);
        assert_eq!(signals.anomalies_open, 1);
    }

    #[test]
    fn test_momentum_score() {
        // 46 + 8 + 8 + 8 - 5.4 - 7.2 + 16.5 + 1.4 = 75.3
        let signals = aggregate_runtime_signals(&inputs(), now());
        assert_eq!(signals.momentum_score, 75);
    }

    #[test]
    fn test_momentum_bounded() {
        let heavy = ApplicationSignals {
            open: 400,
            offers: 50,
            ..Default::default()
        };
        assert_eq!(momentum_score(&heavy, 99.0, 100), 100);
        let bleak = ApplicationSignals {
            rejected: 300,
            stale: 40,
            ..Default::default()
        };
        assert_eq!(momentum_score(&bleak, 0.0, 0), 0);
    }

    #[test]
    fn test_followup_due_uses_action_anchor() {
        let mut overdue = application(ApplicationStatus::Screening, date(2026, 3, 17));
        overdue.next_action_at = Some(at(2026, 3, 15, 9));
        let mut recent = application(ApplicationStatus::Screening, date(2026, 2, 1));
        recent.next_action_at = Some(at(2026, 3, 17, 9));

        let signals = aggregate_runtime_signals(
            &SignalInputs {
                applications: ReadOutcome::Ok(vec![overdue, recent]),
                ..inputs()
            },
            now(),
        );
        assert_eq!(signals.applications.followup_due, 1);
        assert_eq!(signals.applications.stale, 0);
    }

    #[test]
    fn test_missing_sources_degrade_to_zero() {
        let signals = aggregate_runtime_signals(
            &SignalInputs {
                roles: ReadOutcome::SchemaMissing,
                anomalies_open: ReadOutcome::SchemaMissing,
                notifications_unread: ReadOutcome::Failure("connection reset".to_string()),
                ..inputs()
            },
            now(),
        );
        assert_eq!(signals.roles, RoleSignals::default());
        assert_eq!(signals.anomalies_open, 0);
        assert_eq!(signals.notifications_unread, 0);
        assert_eq!(
            signals.unavailable,
            vec![
                SignalSource::Roles,
                SignalSource::Notifications,
                SignalSource::Anomalies
            ]
        );
        // 75.3 minus the 1.4 roles contribution
        assert_eq!(signals.momentum_score, 74);
    }

    #[test]
    fn test_everything_missing_is_a_valid_snapshot() {
        let signals = aggregate_runtime_signals(
            &SignalInputs {
                applications: ReadOutcome::SchemaMissing,
                roles: ReadOutcome::SchemaMissing,
                resumes: ReadOutcome::SchemaMissing,
                goals: ReadOutcome::SchemaMissing,
                notifications_unread: ReadOutcome::SchemaMissing,
                anomalies_open: ReadOutcome::SchemaMissing,
            },
            now(),
        );
        assert_eq!(signals.momentum_score, 46);
        assert_eq!(signals.unavailable.len(), 6);
        assert_eq!(signals.stale_ratio(), 0.0);
        assert_eq!(signals.parse_coverage(), 0.0);
    }
}
