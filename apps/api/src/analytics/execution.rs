//! Execution package for one catalog feature, scored against current runtime signals.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analytics::lanes::{classify_lane, lane_signal_score, Lane};
use crate::analytics::math::{bounded, score};
use crate::analytics::signals::RuntimeSignals;
use crate::models::{FeatureDefinition, FeatureRollout};

const MAX_KPI_TARGETS: usize = 4;
const FALLBACK_KPI: &str = "Momentum score";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiUnit {
    Percent,
    Hours,
}

impl KpiUnit {
    fn suffix(self) -> &'static str {
        match self {
            KpiUnit::Percent => "%",
            KpiUnit::Hours => "h",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiTarget {
    pub name: String,
    /// Formatted with unit suffix, e.g. "64%".
    pub current: String,
    pub target: String,
    pub current_value: u32,
    pub target_value: u32,
    pub unit: KpiUnit,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionAction {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub module_href: String,
    pub priority: ActionPriority,
    pub due_at: NaiveDate,
    pub owner: String,
    pub kpi: String,
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub label: String,
    pub detail: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureExecutionPackage {
    pub feature_id: String,
    pub lane: Lane,
    pub focus: String,
    pub lane_score: u32,
    pub value_score: u32,
    pub risk_level: RiskLevel,
    pub kpi_targets: Vec<KpiTarget>,
    pub actions: Vec<ExecutionAction>,
    pub evidence: Vec<EvidenceItem>,
}

/// Blend of lane fit, overall momentum and rollout priority.
pub fn value_score(lane_score: u32, momentum_score: u32, priority: u32) -> u32 {
    score(0.58 * lane_score as f64 + 0.28 * momentum_score as f64 + 0.14 * priority as f64)
}

pub fn risk_level(value_score: u32, signals: &RuntimeSignals) -> RiskLevel {
    let stale_ratio = signals.stale_ratio();
    if value_score < 48 || stale_ratio >= 0.35 || signals.anomalies_open >= 2 {
        RiskLevel::High
    } else if value_score < 72 || stale_ratio >= 0.2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn build_execution_package(
    feature: &FeatureDefinition,
    rollout: &FeatureRollout,
    signals: &RuntimeSignals,
    focus: Option<&str>,
    notes: Option<&str>,
    today: NaiveDate,
) -> FeatureExecutionPackage {
    let lane = classify_lane(feature);
    let lane_score = lane_signal_score(lane, signals);
    let value_score = value_score(lane_score, signals.momentum_score, rollout.priority.min(100));
    let risk_level = risk_level(value_score, signals);

    let focus = focus
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| lane.default_focus())
        .to_string();

    let kpi_targets = feature
        .kpis
        .iter()
        .take(MAX_KPI_TARGETS)
        .map(|name| kpi_target(name, value_score, signals))
        .collect();

    let ctx = ActionContext {
        feature,
        rollout,
        lane,
        focus: &focus,
        notes: notes.filter(|n| !n.trim().is_empty()),
        today,
    };
    let actions = ACTION_TEMPLATES
        .iter()
        .enumerate()
        .map(|(index, template)| ctx.action(index, template))
        .collect();

    FeatureExecutionPackage {
        feature_id: feature.id.clone(),
        lane,
        focus,
        lane_score,
        value_score,
        risk_level,
        kpi_targets,
        actions,
        evidence: evidence(signals),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KPI targets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KpiBasis {
    ResumeAverage,
    PipelineMomentum,
    InterviewConversion,
    AnomalyExposure,
    Momentum,
}

/// Checked in order; the first whole-word match in the KPI name decides.
const KPI_BASIS_SOURCES: &[(KpiBasis, &str)] = &[
    (KpiBasis::ResumeAverage, r"(?i)\b(ats|resumes?)\b"),
    (
        KpiBasis::PipelineMomentum,
        r"(?i)\b(pipeline|follow\w*|applications?|responses?|conversions?|velocity)\b",
    ),
    (KpiBasis::InterviewConversion, r"(?i)\binterview\w*\b"),
    (
        KpiBasis::AnomalyExposure,
        r"(?i)\b(security|risks?|compliance|anomal\w*)\b",
    ),
];

static KPI_BASIS_RULES: Lazy<Vec<(KpiBasis, Regex)>> = Lazy::new(|| {
    KPI_BASIS_SOURCES
        .iter()
        .map(|&(basis, pattern)| (basis, Regex::new(pattern).expect("kpi basis pattern is valid")))
        .collect()
});

static HOURS_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(time|sla|latency|hours?|turnaround|duration)\b").expect("unit pattern is valid")
});

fn kpi_basis(name: &str) -> KpiBasis {
    KPI_BASIS_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(name))
        .map(|&(basis, _)| basis)
        .unwrap_or(KpiBasis::Momentum)
}

fn kpi_unit(name: &str) -> KpiUnit {
    if HOURS_UNIT.is_match(name) {
        KpiUnit::Hours
    } else {
        KpiUnit::Percent
    }
}

fn kpi_current(basis: KpiBasis, signals: &RuntimeSignals) -> u32 {
    let momentum = signals.momentum_score as f64;
    match basis {
        KpiBasis::ResumeAverage => score(signals.resumes.avg_ats),
        KpiBasis::PipelineMomentum => score(momentum * (1.0 - 0.5 * signals.stale_ratio().min(1.0))),
        KpiBasis::InterviewConversion => score(
            30.0 + 10.0 * signals.applications.interviews as f64
                + 15.0 * signals.applications.offers as f64,
        ),
        KpiBasis::AnomalyExposure => score(100.0 - 20.0 * signals.anomalies_open as f64),
        KpiBasis::Momentum => signals.momentum_score,
    }
}

fn kpi_target(name: &str, value_score: u32, signals: &RuntimeSignals) -> KpiTarget {
    let unit = kpi_unit(name);
    let current_value = kpi_current(kpi_basis(name), signals);
    let target_value = bounded(value_score as f64 + 8.0, 45, 98);
    let trend = match target_value.cmp(&current_value) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Stable,
    };
    KpiTarget {
        name: name.to_string(),
        current: format!("{current_value}{}", unit.suffix()),
        target: format!("{target_value}{}", unit.suffix()),
        current_value,
        target_value,
        unit,
        trend,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Action plan
// ────────────────────────────────────────────────────────────────────────────

struct ActionTemplate {
    slug: &'static str,
    owner: &'static str,
    checklist: &'static [&'static str],
}

const ACTION_TEMPLATES: [ActionTemplate; 5] = [
    ActionTemplate {
        slug: "baseline",
        owner: "you",
        checklist: &[
            "Record today's value for the KPI",
            "Note the last 7 days of related activity",
            "Write down the result that would count as a win",
        ],
    },
    ActionTemplate {
        slug: "first-slice",
        owner: "you",
        checklist: &[
            "Pick the smallest usable slice",
            "Turn it on for one live search",
            "Confirm it shows up where you work every day",
            "Log anything that got in the way",
        ],
    },
    ActionTemplate {
        slug: "kpi-check",
        owner: "you",
        checklist: &[
            "Compare the KPI against the baseline",
            "Flag any metric that moved the wrong way",
            "Decide to keep, adjust or drop the slice",
        ],
    },
    ActionTemplate {
        slug: "scale",
        owner: "you",
        checklist: &[
            "Add the feature to your daily routine",
            "Apply it across every open application",
            "Remove the manual step it replaces",
        ],
    },
    ActionTemplate {
        slug: "weekly-review",
        owner: "you + accountability partner",
        checklist: &[
            "Review the KPI trend for the week",
            "Share one win and one blocker",
            "Set next week's target",
            "Schedule the next review",
        ],
    },
];

struct ActionContext<'a> {
    feature: &'a FeatureDefinition,
    rollout: &'a FeatureRollout,
    lane: Lane,
    focus: &'a str,
    notes: Option<&'a str>,
    today: NaiveDate,
}

impl ActionContext<'_> {
    fn kpi_for(&self, index: usize) -> String {
        if self.feature.kpis.is_empty() {
            FALLBACK_KPI.to_string()
        } else {
            self.feature.kpis[index % self.feature.kpis.len()].clone()
        }
    }

    fn action(&self, index: usize, template: &ActionTemplate) -> ExecutionAction {
        let title = &self.feature.title;
        let kpi = self.kpi_for(index);
        let (action_title, detail) = match index {
            0 => (
                format!("Baseline {title}"),
                format!(
                    "Capture where {kpi} stands before changing anything in the {} lane. Focus: {}.",
                    self.lane, self.focus
                ),
            ),
            1 => (
                format!("Ship the first slice of {title}"),
                format!(
                    "Roll out the smallest useful part while the feature is {}.",
                    self.rollout.stage.as_str()
                ),
            ),
            2 => (
                format!("KPI check: {kpi}"),
                format!("Compare {kpi} against the baseline and decide whether the slice stays."),
            ),
            3 => (
                format!("Scale {title} into the daily workflow"),
                format!("Make {title} part of every working session, not an occasional extra."),
            ),
            _ => (
                format!("Weekly review: {title}"),
                format!("Review {kpi} with your accountability partner and reset the target."),
            ),
        };

        let mut checklist: Vec<String> = template.checklist.iter().map(|s| s.to_string()).collect();
        if let Some(notes) = self.notes {
            checklist.push(notes.to_string());
        }

        let priority = match index {
            0 | 1 => ActionPriority::High,
            2 | 3 => ActionPriority::Medium,
            _ => ActionPriority::Low,
        };

        ExecutionAction {
            id: format!("{}-{}", self.feature.id, template.slug),
            title: action_title,
            detail,
            module_href: self.feature.default_href.clone(),
            priority,
            due_at: self.today + Duration::days(index as i64),
            owner: template.owner.to_string(),
            kpi,
            checklist,
        }
    }
}

fn evidence(signals: &RuntimeSignals) -> Vec<EvidenceItem> {
    let apps = &signals.applications;
    vec![
        EvidenceItem {
            label: "Applications".to_string(),
            detail: format!(
                "{} tracked, {} open, {} stale, {} due for follow-up",
                apps.total, apps.open, apps.stale, apps.followup_due
            ),
            href: "/applications".to_string(),
        },
        EvidenceItem {
            label: "Resumes".to_string(),
            detail: format!(
                "{} resumes, average ATS {:.1}, {} below 80",
                signals.resumes.total, signals.resumes.avg_ats, signals.resumes.below_80
            ),
            href: "/resumes".to_string(),
        },
        EvidenceItem {
            label: "Roles".to_string(),
            detail: format!(
                "{} of {} saved roles parsed",
                signals.roles.parsed, signals.roles.total
            ),
            href: "/roles".to_string(),
        },
        EvidenceItem {
            label: "Goals".to_string(),
            detail: format!(
                "{} of {} goals completed",
                signals.goals.completed, signals.goals.total
            ),
            href: "/goals".to_string(),
        },
    ]
}
