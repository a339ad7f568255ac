use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::analytics::composite::{
    compute_composite_scores, CompositeScoreSet, RiskProfile, WeightPreset,
};
use crate::analytics::execution::{build_execution_package, FeatureExecutionPackage};
use crate::analytics::funnel::{derive_funnel_metrics, FunnelMetrics};
use crate::analytics::projection::{
    build_scenario_bank, project_scenario, ProjectionParams, ProjectionResult, ScenarioBank,
};
use crate::analytics::signals::{aggregate_runtime_signals, RuntimeSignals, SignalSource};
use crate::config::parse_horizons;
use crate::errors::AppError;
use crate::models::{FeatureDefinition, FeatureRollout};
use crate::state::AppState;
use crate::store::{load_snapshot, persist_action_reminders, ReminderReport};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Sources the funnel and forecast read.
const FUNNEL_SOURCES: &[SignalSource] = &[SignalSource::Applications];

/// Sources the composite scores read.
const SCORE_SOURCES: &[SignalSource] = &[
    SignalSource::Applications,
    SignalSource::Resumes,
    SignalSource::Roles,
    SignalSource::Goals,
    SignalSource::InterviewSessions,
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelResponse {
    #[serde(flatten)]
    pub metrics: FunnelMetrics,
    /// Sources whose schema is missing; their data counted as empty.
    pub unavailable: Vec<SignalSource>,
}

/// GET /api/v1/pipeline/funnel
pub async fn handle_funnel(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FunnelResponse>, AppError> {
    let snapshot = load_snapshot(state.store.as_ref(), params.user_id).await?;
    let metrics = derive_funnel_metrics(&snapshot.applications.or_empty(), state.clock.today());
    Ok(Json(FunnelResponse {
        metrics,
        unavailable: snapshot.unavailable_among(FUNNEL_SOURCES),
    }))
}

/// POST /api/v1/pipeline/projection
pub async fn handle_projection(
    Json(params): Json<ProjectionParams>,
) -> Result<Json<ProjectionResult>, AppError> {
    params.validate()?;
    Ok(Json(project_scenario(&params)))
}

#[derive(Deserialize)]
pub struct ForecastQuery {
    pub user_id: Uuid,
    /// Comma-separated weeks, e.g. `4,8,12`. Falls back to the configured horizons.
    pub horizons: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub funnel: FunnelMetrics,
    #[serde(flatten)]
    pub bank: ScenarioBank,
    pub unavailable: Vec<SignalSource>,
}

/// GET /api/v1/pipeline/forecast
pub async fn handle_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    let horizons = match params.horizons.as_deref() {
        Some(raw) => parse_horizons(raw).map_err(|e| AppError::Validation(format!("horizons: {e:#}")))?,
        None => state.config.forecast_horizons.clone(),
    };

    let snapshot = load_snapshot(state.store.as_ref(), params.user_id).await?;
    let funnel = derive_funnel_metrics(&snapshot.applications.or_empty(), state.clock.today());
    let bank = build_scenario_bank(&funnel, &horizons);
    debug!(
        "Forecast for user {}: target {}/week over {:?}",
        params.user_id, bank.recommended_weekly_target, horizons
    );

    Ok(Json(ForecastResponse {
        funnel,
        bank,
        unavailable: snapshot.unavailable_among(FUNNEL_SOURCES),
    }))
}

#[derive(Deserialize)]
pub struct ScoresQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub preset: WeightPreset,
    pub risk_tolerance: Option<f64>,
    pub active_pods: Option<u32>,
}

impl ScoresQuery {
    fn risk_profile(&self, state: &AppState) -> Result<RiskProfile, AppError> {
        let risk_tolerance = self
            .risk_tolerance
            .unwrap_or(state.config.default_risk_tolerance);
        if !(0.0..=100.0).contains(&risk_tolerance) {
            return Err(AppError::Validation(
                "risk_tolerance must be between 0 and 100".to_string(),
            ));
        }
        Ok(RiskProfile {
            risk_tolerance,
            active_pods: self.active_pods.unwrap_or(state.config.default_active_pods),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresResponse {
    #[serde(flatten)]
    pub scores: CompositeScoreSet,
    pub unavailable: Vec<SignalSource>,
}

/// GET /api/v1/pipeline/scores
pub async fn handle_scores(
    State(state): State<AppState>,
    Query(params): Query<ScoresQuery>,
) -> Result<Json<ScoresResponse>, AppError> {
    let risk = params.risk_profile(&state)?;
    let snapshot = load_snapshot(state.store.as_ref(), params.user_id).await?;
    let scores = compute_composite_scores(&snapshot.pipeline(), &risk, params.preset, state.clock.now());
    Ok(Json(ScoresResponse {
        scores,
        unavailable: snapshot.unavailable_among(SCORE_SOURCES),
    }))
}

/// GET /api/v1/runtime/signals
pub async fn handle_runtime_signals(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<RuntimeSignals>, AppError> {
    let snapshot = load_snapshot(state.store.as_ref(), params.user_id).await?;
    let signals = aggregate_runtime_signals(&snapshot.signal_inputs(), state.clock.now());
    Ok(Json(signals))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPackageRequest {
    pub user_id: Uuid,
    pub feature: FeatureDefinition,
    #[serde(default)]
    pub rollout: FeatureRollout,
    pub focus: Option<String>,
    pub notes: Option<String>,
    /// Persist the leading actions as reminders.
    #[serde(default)]
    pub create_reminders: bool,
}

impl ExecutionPackageRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.feature.id.trim().is_empty() {
            return Err(AppError::Validation("feature.id must not be empty".to_string()));
        }
        if self.feature.title.trim().is_empty() {
            return Err(AppError::Validation(
                "feature.title must not be empty".to_string(),
            ));
        }
        if self.rollout.priority > 100 {
            return Err(AppError::Validation(
                "rollout.priority must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPackageResponse {
    #[serde(flatten)]
    pub package: FeatureExecutionPackage,
    /// Present only when reminders were requested and enabled.
    pub reminders: Option<ReminderReport>,
}

/// POST /api/v1/features/execution-package
pub async fn handle_execution_package(
    State(state): State<AppState>,
    Json(req): Json<ExecutionPackageRequest>,
) -> Result<Json<ExecutionPackageResponse>, AppError> {
    req.validate()?;

    let snapshot = load_snapshot(state.store.as_ref(), req.user_id).await?;
    let signals = aggregate_runtime_signals(&snapshot.signal_inputs(), state.clock.now());
    let package = build_execution_package(
        &req.feature,
        &req.rollout,
        &signals,
        req.focus.as_deref(),
        req.notes.as_deref(),
        state.clock.today(),
    );

    let reminders = if req.create_reminders && state.config.reminders_enabled {
        Some(persist_action_reminders(state.reminders.as_ref(), req.user_id, &package).await)
    } else {
        None
    };

    Ok(Json(ExecutionPackageResponse { package, reminders }))
}
