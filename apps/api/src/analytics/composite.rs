//! Composite operational scores over a point-in-time pipeline snapshot.
//!
//! Every score is clamped to 0-100 and is a pure function of the snapshot,
//! the risk profile, the weight preset and `now`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::funnel::{derive_funnel_metrics, FunnelMetrics};
use crate::analytics::math::{mean, percent, score};
use crate::models::application::start_of_day;
use crate::models::{
    ApplicationRecord, GoalRecord, InterviewSessionRecord, ResumeRecord, RoleRecord,
};

/// Age after which an active application with no scheduled touch is stale.
pub const STALE_AFTER_DAYS: i64 = 14;
/// Window for velocity and practice scores.
pub const RECENT_WINDOW_DAYS: i64 = 30;
/// Stand-in average when no match or ATS scores exist yet.
pub const DEFAULT_QUALITY: f64 = 70.0;
/// Recent applications that earn a full velocity score.
const VELOCITY_FULL_AT: usize = 20;

/// Everything the scorers read for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub applications: Vec<ApplicationRecord>,
    pub resumes: Vec<ResumeRecord>,
    pub roles: Vec<RoleRecord>,
    pub goals: Vec<GoalRecord>,
    pub sessions: Vec<InterviewSessionRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    /// 0-100; 50 is neutral.
    pub risk_tolerance: f64,
    pub active_pods: u32,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            risk_tolerance: 50.0,
            active_pods: 0,
        }
    }
}

/// Which dashboard is asking. Presets differ only in the execution-score terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPreset {
    #[default]
    PipelineControl,
    ProgramOffice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionWeights {
    pub sla: f64,
    pub quality: f64,
    pub efficiency: f64,
    pub goal_completion: f64,
}

impl WeightPreset {
    pub fn weights(self) -> ExecutionWeights {
        match self {
            WeightPreset::PipelineControl => ExecutionWeights {
                sla: 0.45,
                quality: 0.35,
                efficiency: 0.2,
                goal_completion: 0.0,
            },
            WeightPreset::ProgramOffice => ExecutionWeights {
                sla: 0.35,
                quality: 0.3,
                efficiency: 0.2,
                goal_completion: 0.15,
            },
        }
    }
}

/// Raw counts behind the SLA and risk scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineHealth {
    pub active: usize,
    /// Active, and the next touch was due before today.
    pub overdue: usize,
    /// Active, nothing scheduled, and older than 14 days.
    pub stale: usize,
    /// Active with nothing scheduled.
    pub no_action: usize,
    pub recent_applications: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScoreSet {
    pub preset: WeightPreset,
    pub execution_score: u32,
    pub sla_compliance: u32,
    pub quality_index: u32,
    pub pipeline_efficiency: u32,
    pub velocity_score: u32,
    pub risk_score: u32,
    /// Mean interview-practice score over the last 30 days.
    pub practice_score: u32,
    pub health: PipelineHealth,
}

pub fn pipeline_health(applications: &[ApplicationRecord], now: DateTime<Utc>) -> PipelineHealth {
    let start_of_today = start_of_day(now.date_naive());
    let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    let mut health = PipelineHealth::default();
    for app in applications {
        if app.effective_instant() > recent_cutoff {
            health.recent_applications += 1;
        }
        if !app.status.is_active() {
            continue;
        }
        health.active += 1;
        match app.action_anchor() {
            Some(anchor) => {
                if anchor < start_of_today {
                    health.overdue += 1;
                }
            }
            None => {
                health.no_action += 1;
                if is_stale(app, now) {
                    health.stale += 1;
                }
            }
        }
    }
    health
}

/// Active, nothing scheduled, and at least 14 days since it was applied for.
pub fn is_stale(app: &ApplicationRecord, now: DateTime<Utc>) -> bool {
    app.status.is_active()
        && !app.has_action_date()
        && (now - app.effective_instant()).num_days() >= STALE_AFTER_DAYS
}

pub fn compute_composite_scores(
    snapshot: &PipelineSnapshot,
    risk: &RiskProfile,
    preset: WeightPreset,
    now: DateTime<Utc>,
) -> CompositeScoreSet {
    let health = pipeline_health(&snapshot.applications, now);
    let funnel = derive_funnel_metrics(&snapshot.applications, now.date_naive());

    let avg_match = mean(snapshot.applications.iter().filter_map(|a| a.match_score))
        .unwrap_or(DEFAULT_QUALITY);
    let avg_ats = mean(snapshot.resumes.iter().filter_map(|r| r.ats_score)).unwrap_or(DEFAULT_QUALITY);

    let quality_index = score((avg_match + avg_ats) / 2.0);
    let sla_compliance = score(percent(
        health.active.saturating_sub(health.overdue + health.stale),
        health.active.max(1),
    ));
    let pipeline_efficiency = score(funnel_average(&funnel));

    let completed_goals = snapshot.goals.iter().filter(|g| g.completed).count();
    let goal_completion = percent(completed_goals, snapshot.goals.len().max(1));

    let w = preset.weights();
    let execution_score = score(
        w.sla * sla_compliance as f64
            + w.quality * quality_index as f64
            + w.efficiency * pipeline_efficiency as f64
            + w.goal_completion * goal_completion,
    );

    let recent = health.recent_applications;
    let velocity_score = score(percent(recent, recent.max(VELOCITY_FULL_AT)));

    let risk_score = compute_risk(snapshot, &health, &funnel, avg_ats, risk);

    let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let practice_score = mean(
        snapshot
            .sessions
            .iter()
            .filter(|s| s.created_at > recent_cutoff)
            .map(|s| s.score),
    )
    .map(score)
    .unwrap_or(0);

    CompositeScoreSet {
        preset,
        execution_score,
        sla_compliance,
        quality_index,
        pipeline_efficiency,
        velocity_score,
        risk_score,
        practice_score,
        health,
    }
}

fn funnel_average(funnel: &FunnelMetrics) -> f64 {
    (funnel.response_rate + funnel.interview_rate + funnel.offer_rate) / 3.0
}

fn compute_risk(
    snapshot: &PipelineSnapshot,
    health: &PipelineHealth,
    funnel: &FunnelMetrics,
    avg_ats: f64,
    risk: &RiskProfile,
) -> u32 {
    let parsed_roles = snapshot.roles.iter().filter(|r| r.parsed.is_parsed()).count();
    let parsing_coverage = percent(parsed_roles, snapshot.roles.len().max(1));

    let follow_through =
        (100.0 - 10.0 * health.overdue as f64 - 8.0 * health.no_action as f64).max(0.0);
    let pod_coverage = (15.0 * risk.active_pods as f64).clamp(0.0, 100.0);
    let tolerance_penalty = ((50.0 - risk.risk_tolerance) * 0.5).clamp(-20.0, 25.0);

    let protection = 0.35 * avg_ats
        + 0.2 * funnel.response_rate
        + 0.15 * parsing_coverage
        + 0.2 * follow_through
        + 0.1 * pod_coverage;

    score(100.0 - protection + tolerance_penalty)
}
