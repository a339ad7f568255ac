//! Routes a catalog feature to one of nine rule-matched lanes, or the `Ai`
//! fallback. Each lane has its own signal-scoring formula.
//!
//! The rule table is ordered: the first pattern matching
//! `id + title + summary` wins, and anything unmatched lands in `Ai`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analytics::math::bounded;
use crate::analytics::signals::RuntimeSignals;
use crate::models::FeatureDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Security,
    Resume,
    Interview,
    Networking,
    Collaboration,
    Integration,
    Analytics,
    Growth,
    Pipeline,
    Ai,
}

impl Lane {
    #[cfg(test)]
    pub const ALL: [Lane; 10] = [
        Lane::Security,
        Lane::Resume,
        Lane::Interview,
        Lane::Networking,
        Lane::Collaboration,
        Lane::Integration,
        Lane::Analytics,
        Lane::Growth,
        Lane::Pipeline,
        Lane::Ai,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Lane::Security => "security",
            Lane::Resume => "resume",
            Lane::Interview => "interview",
            Lane::Networking => "networking",
            Lane::Collaboration => "collaboration",
            Lane::Integration => "integration",
            Lane::Analytics => "analytics",
            Lane::Growth => "growth",
            Lane::Pipeline => "pipeline",
            Lane::Ai => "ai",
        }
    }

    /// Focus used when the caller does not name one.
    pub fn default_focus(self) -> &'static str {
        match self {
            Lane::Security => "Close open anomalies and keep account access clean",
            Lane::Resume => "Lift ATS scores on the resumes in active use",
            Lane::Interview => "Convert screenings into interviews and offers",
            Lane::Networking => "Turn due follow-ups into warm conversations",
            Lane::Collaboration => "Keep goals and shared work moving with your pod",
            Lane::Integration => "Get every saved role parsed and synced",
            Lane::Analytics => "Make weekly pipeline numbers visible and trusted",
            Lane::Growth => "Finish the goals that unlock the next role",
            Lane::Pipeline => "Clear stale applications and keep weekly volume steady",
            Lane::Ai => "Use generated guidance where it saves the most time",
        }
    }

    /// (floor, ceiling) for this lane's signal score.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Lane::Security => (20, 98),
            Lane::Resume => (22, 97),
            Lane::Interview => (20, 97),
            Lane::Networking => (18, 96),
            Lane::Collaboration => (20, 96),
            Lane::Integration => (22, 97),
            Lane::Analytics => (24, 98),
            Lane::Growth => (20, 97),
            Lane::Pipeline => (18, 98),
            Lane::Ai => (25, 96),
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct LaneRule {
    pub lane: Lane,
    pub pattern: Regex,
}

/// Priority order matters: security beats resume beats interview, and so on.
const RULE_SOURCES: &[(Lane, &str)] = &[
    (
        Lane::Security,
        r"(?i)\b(security|secure|auth\w*|privacy|compliance|anomal\w*|audit|mfa|2fa|encrypt\w*)\b",
    ),
    (
        Lane::Resume,
        r"(?i)\b(resumes?|cv|ats|cover[\s-]?letters?|portfolio)\b",
    ),
    (
        Lane::Interview,
        r"(?i)\b(interview\w*|mock|practice|star method|offer negotiation)\b",
    ),
    (
        Lane::Networking,
        r"(?i)\b(network\w*|referrals?|linkedin|outreach|contacts?|recruiters?)\b",
    ),
    (
        Lane::Collaboration,
        r"(?i)\b(collab\w*|pods?|team\w*|mentors?|shared|share)\b",
    ),
    (
        Lane::Integration,
        r"(?i)\b(integrat\w*|sync\w*|import\w*|export\w*|calendar|gmail|webhooks?|api)\b",
    ),
    (
        Lane::Analytics,
        r"(?i)\b(analytic\w*|dashboards?|metrics?|insights?|reports?|forecast\w*|funnel)\b",
    ),
    (
        Lane::Growth,
        r"(?i)\b(growth|goals?|skills?|learning|career|upskill\w*)\b",
    ),
    (
        Lane::Pipeline,
        r"(?i)\b(pipeline|applications?|follow[\s-]?ups?|tracker|jobs?|kanban)\b",
    ),
];

pub static LANE_RULES: Lazy<Vec<LaneRule>> = Lazy::new(|| {
    RULE_SOURCES
        .iter()
        .map(|&(lane, pattern)| LaneRule {
            lane,
            pattern: Regex::new(pattern).expect("lane rule pattern is valid"),
        })
        .collect()
});

pub fn classify_text(text: &str) -> Lane {
    LANE_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.lane)
        .unwrap_or(Lane::Ai)
}

pub fn classify_lane(feature: &FeatureDefinition) -> Lane {
    classify_text(&format!(
        "{} {} {}",
        feature.id, feature.title, feature.summary
    ))
}

/// How favourable current signals are for work in `lane`, within the lane's bounds.
pub fn lane_signal_score(lane: Lane, signals: &RuntimeSignals) -> u32 {
    let apps = &signals.applications;
    let momentum = signals.momentum_score as f64;
    let raw = match lane {
        Lane::Security => 82.0 - 12.0 * signals.anomalies_open as f64,
        Lane::Resume => {
            30.0 + 0.6 * signals.resumes.avg_ats - 4.0 * signals.resumes.below_80 as f64
                + 2.0 * signals.resumes.total as f64
        }
        Lane::Interview => {
            38.0 + 9.0 * apps.interviews as f64 + 14.0 * apps.offers as f64
                - 1.5 * apps.rejected as f64
        }
        Lane::Networking => {
            44.0 + 1.2 * apps.open as f64 - 3.0 * apps.followup_due as f64 - 2.0 * apps.stale as f64
        }
        Lane::Collaboration => {
            50.0 + 2.0 * signals.goals.completed as f64 + 0.5 * signals.goals.total as f64
                - 1.5 * signals.notifications_unread as f64
        }
        Lane::Integration => 36.0 + 0.4 * signals.parse_coverage() + 0.6 * signals.roles.total as f64,
        Lane::Analytics => 30.0 + 0.5 * momentum + 0.4 * apps.total as f64,
        Lane::Growth => 35.0 + 0.45 * signals.goal_completion() + 0.25 * momentum,
        Lane::Pipeline => 10.0 + 0.85 * momentum - 2.5 * apps.stale as f64,
        Lane::Ai => 42.0 + 0.3 * momentum + 0.15 * signals.resumes.avg_ats,
    };
    let (floor, ceiling) = lane.bounds();
    bounded(raw, floor, ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::signals::{ApplicationSignals, ResumeSignals};

    fn feature(id: &str, title: &str, summary: &str) -> FeatureDefinition {
        FeatureDefinition {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            kpis: vec![],
            default_href: "/dashboard".to_string(),
        }
    }

    #[test]
    fn test_rule_table_order() {
        let lanes: Vec<Lane> = LANE_RULES.iter().map(|r| r.lane).collect();
        assert_eq!(lanes, Lane::ALL[..9].to_vec());
    }

    #[test]
    fn test_each_lane_reachable() {
        let cases = [
            ("mfa-guard", "Two-step sign in", "", Lane::Security),
            ("ats-tuner", "ATS keyword tuner", "", Lane::Resume),
            ("mock-loop", "Mock interview loop", "", Lane::Interview),
            ("warm-intros", "Referral finder", "", Lane::Networking),
            ("pod-room", "Accountability pods", "", Lane::Collaboration),
            ("cal-sync", "Calendar sync", "", Lane::Integration),
            ("weekly-board", "Weekly dashboard", "", Lane::Analytics),
            ("skill-map", "Skill gap map", "", Lane::Growth),
            ("kanban", "Application kanban", "", Lane::Pipeline),
            ("copilot", "Drafting copilot", "writes prose for you", Lane::Ai),
        ];
        for (id, title, summary, expected) in cases {
            assert_eq!(
                classify_lane(&feature(id, title, summary)),
                expected,
                "{id}: {title}"
            );
        }
    }

    #[test]
    fn test_first_match_wins() {
        // mentions both resume and security terms
        let f = feature("resume-vault", "Resume vault", "Encrypted storage with audit trail");
        assert_eq!(classify_lane(&f), Lane::Security);

        // interview + pipeline terms
        let f = feature("prep", "Interview prep tracker", "Moves applications forward");
        assert_eq!(classify_lane(&f), Lane::Interview);
    }

    #[test]
    fn test_word_boundaries() {
        // "stats" must not match the resume lane's "ats"
        assert_eq!(classify_text("stats"), Lane::Ai);
        assert_eq!(classify_text("Authentication hardening"), Lane::Security);
    }

    #[test]
    fn test_security_formula() {
        let mut signals = RuntimeSignals::default();
        assert_eq!(lane_signal_score(Lane::Security, &signals), 82);
        signals.anomalies_open = 2;
        assert_eq!(lane_signal_score(Lane::Security, &signals), 58);
        signals.anomalies_open = 10;
        assert_eq!(lane_signal_score(Lane::Security, &signals), 20);
    }

    #[test]
    fn test_scores_respect_lane_bounds() {
        let empty = RuntimeSignals::default();
        let busy = RuntimeSignals {
            applications: ApplicationSignals {
                total: 900,
                open: 400,
                interviews: 60,
                offers: 20,
                ..Default::default()
            },
            resumes: ResumeSignals {
                total: 30,
                avg_ats: 99.0,
                below_80: 0,
            },
            momentum_score: 100,
            ..Default::default()
        };
        let grim = RuntimeSignals {
            applications: ApplicationSignals {
                open: 10,
                rejected: 200,
                stale: 80,
                followup_due: 90,
                ..Default::default()
            },
            notifications_unread: 500,
            anomalies_open: 40,
            ..Default::default()
        };
        for lane in Lane::ALL {
            let (floor, ceiling) = lane.bounds();
            assert!((18..=25).contains(&floor));
            assert!((96..=98).contains(&ceiling));
            for signals in [&empty, &busy, &grim] {
                let score = lane_signal_score(lane, signals);
                assert!(score >= floor && score <= ceiling, "{lane}: {score}");
            }
        }
    }
}
