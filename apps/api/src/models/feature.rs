use serde::{Deserialize, Serialize};

/// An improvement initiative from the feature catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub kpis: Vec<String>,
    pub default_href: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutStage {
    #[default]
    Planned,
    Pilot,
    Live,
}

impl RolloutStage {
    pub fn as_str(self) -> &'static str {
        match self {
            RolloutStage::Planned => "planned",
            RolloutStage::Pilot => "pilot",
            RolloutStage::Live => "live",
        }
    }
}

/// Where a feature sits in the rollout plan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeatureRollout {
    /// 0-100; larger values are rejected at the boundary.
    pub priority: u32,
    #[serde(default)]
    pub stage: RolloutStage,
}
