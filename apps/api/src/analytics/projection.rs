//! Expected funnel counts over a horizon, and the standard scenario bank.

use serde::{Deserialize, Serialize};

use crate::analytics::funnel::FunnelMetrics;
use crate::analytics::math::round_half_up;
use crate::errors::AppError;

/// Longest horizon accepted at the API boundary.
pub const MAX_HORIZON_WEEKS: u32 = 52;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParams {
    pub applications_per_week: f64,
    pub weeks: u32,
    pub response_rate: f64,
    pub interview_rate: f64,
    pub offer_rate: f64,
    #[serde(default)]
    pub quality_lift_pct: f64,
}

impl ProjectionParams {
    /// Boundary check. `project_scenario` assumes params that passed this.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.weeks == 0 || self.weeks > MAX_HORIZON_WEEKS {
            return Err(AppError::Validation(format!(
                "weeks must be between 1 and {MAX_HORIZON_WEEKS}"
            )));
        }
        if !self.applications_per_week.is_finite() || self.applications_per_week < 0.0 {
            return Err(AppError::Validation(
                "applicationsPerWeek must be a non-negative number".to_string(),
            ));
        }
        for (name, rate) in [
            ("responseRate", self.response_rate),
            ("interviewRate", self.interview_rate),
            ("offerRate", self.offer_rate),
        ] {
            if !(0.0..=100.0).contains(&rate) {
                return Err(AppError::Validation(format!(
                    "{name} must be between 0 and 100"
                )));
            }
        }
        if !self.quality_lift_pct.is_finite() || self.quality_lift_pct < 0.0 {
            return Err(AppError::Validation(
                "qualityLiftPct must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expected counts at each stage. Always
/// `expected_offers ≤ expected_interviews ≤ expected_responses ≤ total_applications`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub weeks: u32,
    pub total_applications: u32,
    pub expected_responses: u32,
    pub expected_interviews: u32,
    pub expected_offers: u32,
}

/// Projects expected funnel counts.
///
/// Quality lift scales each conversion rate (capped at 100%), never volume.
/// Stage rates are independent shares of the total, so the raw counts are
/// clamped to keep the funnel monotonic.
pub fn project_scenario(params: &ProjectionParams) -> ProjectionResult {
    debug_assert!(params.weeks >= 1, "weeks must be validated before projection");

    let total = round_half_up(params.applications_per_week * params.weeks as f64).max(0.0);
    let lift = 1.0 + params.quality_lift_pct / 100.0;
    let stage = |rate: f64| {
        let effective = (rate * lift).clamp(0.0, 100.0);
        round_half_up(total * effective / 100.0) as u32
    };

    let total_applications = total as u32;
    let expected_responses = stage(params.response_rate).min(total_applications);
    let expected_interviews = stage(params.interview_rate).min(expected_responses);
    let expected_offers = stage(params.offer_rate).min(expected_interviews);

    ProjectionResult {
        weeks: params.weeks,
        total_applications,
        expected_responses,
        expected_interviews,
        expected_offers,
    }
}

/// Weekly application target suggested to the user: current pace plus two,
/// never below five.
pub fn recommended_weekly_target(avg_applications_per_week: f64) -> u32 {
    let target = round_half_up(avg_applications_per_week.max(0.0) + 2.0);
    (target as u32).max(5)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefinition {
    pub id: String,
    pub label: String,
    pub applications_per_week: u32,
    pub quality_lift_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioForecast {
    pub scenario: ScenarioDefinition,
    /// Ascending by horizon.
    pub projections: Vec<ProjectionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioBank {
    pub recommended_weekly_target: u32,
    pub scenarios: Vec<ScenarioForecast>,
}

/// (id, label, volume offset from the weekly target, quality lift %)
const SCENARIO_TEMPLATES: &[(&str, &str, i32, f64)] = &[
    ("conservative", "Conservative", -2, 2.0),
    ("balanced", "Balanced", 0, 6.0),
    ("aggressive", "Aggressive", 3, 10.0),
];

pub fn standard_scenarios(weekly_target: u32) -> Vec<ScenarioDefinition> {
    SCENARIO_TEMPLATES
        .iter()
        .map(|&(id, label, offset, lift)| ScenarioDefinition {
            id: id.to_string(),
            label: label.to_string(),
            applications_per_week: (weekly_target as i32 + offset).max(0) as u32,
            quality_lift_pct: lift,
        })
        .collect()
}

/// Projects every standard scenario at every horizon, using the observed
/// funnel rates. Horizons are sorted and deduplicated.
pub fn build_scenario_bank(metrics: &FunnelMetrics, horizons: &[u32]) -> ScenarioBank {
    let mut horizons = horizons.to_vec();
    horizons.sort_unstable();
    horizons.dedup();

    let recommended = recommended_weekly_target(metrics.avg_applications_per_week);
    let scenarios = standard_scenarios(recommended)
        .into_iter()
        .map(|scenario| {
            let projections = horizons
                .iter()
                .map(|&weeks| {
                    project_scenario(&ProjectionParams {
                        applications_per_week: scenario.applications_per_week as f64,
                        weeks,
                        response_rate: metrics.response_rate,
                        interview_rate: metrics.interview_rate,
                        offer_rate: metrics.offer_rate,
                        quality_lift_pct: scenario.quality_lift_pct,
                    })
                })
                .collect();
            ScenarioForecast {
                scenario,
                projections,
            }
        })
        .collect();

    ScenarioBank {
        recommended_weekly_target: recommended,
        scenarios,
    }
}
