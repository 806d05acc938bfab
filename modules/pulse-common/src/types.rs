use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PulseError;
use crate::lifecycle::Lifecycle;

/// Threshold level at or above which a problem is flagged as a crisis.
pub const CRISIS_THRESHOLD: f64 = 80.0;

// --- Identity ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(Uuid);

impl ProblemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProblemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProblemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProblemId {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| PulseError::Validation(format!("invalid problem id '{s}': {e}")))
    }
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum Category {
    Social,
    Environmental,
    Health,
    Education,
    Technology,
    Economy,
}

labelled_enum!(Category {
    Social => "Social",
    Environmental => "Environmental",
    Health => "Health",
    Education => "Education",
    Technology => "Technology",
    Economy => "Economy",
});

impl Category {
    /// Position in the fixed category order; drives the radar sector.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

labelled_enum!(Severity {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum Credibility {
    Verified,
    #[serde(rename = "Partially Verified")]
    PartiallyVerified,
    Unverified,
}

labelled_enum!(Credibility {
    Verified => "Verified",
    PartiallyVerified => "Partially Verified",
    Unverified => "Unverified",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum StakeholderKind {
    Government,
    #[serde(rename = "NGO")]
    Ngo,
    Startup,
    Expert,
}

labelled_enum!(StakeholderKind {
    Government => "Government",
    Ngo => "NGO",
    Startup => "Startup",
    Expert => "Expert",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Image,
    Document,
    Video,
}

labelled_enum!(EvidenceKind {
    Image => "image",
    Document => "document",
    Video => "video",
});

// --- Record parts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stakeholder {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StakeholderKind,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<String>,
    /// Free text, e.g. "4.2 hours".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
}

impl Stakeholder {
    pub fn new(name: impl Into<String>, kind: StakeholderKind, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            role: role.into(),
            acknowledged_at: None,
            response_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub url: String,
    pub contributor: String,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: String,
    pub event: String,
    pub status: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: String,
    pub trust: f64,
    pub outrage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyInfo {
    pub exists: bool,
    pub description: String,
    pub gap: String,
    /// 0-100 legal risk.
    pub violation_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub task: String,
    pub completed: bool,
    pub suggested_authority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user: String,
    pub content: String,
    pub timestamp: String,
}

// --- Problem ---

/// A reported problem and everything attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    pub summary: String,
    pub category: Category,
    pub location: String,
    pub severity: Severity,
    pub lifecycle: Lifecycle,
    pub credibility: Credibility,
    pub credibility_score: f64,
    pub root_cause: String,
    pub who_is_affected: String,
    pub why_it_matters: String,
    pub impact_score: f64,
    #[serde(default)]
    pub trend: Vec<f64>,
    pub affected_population: String,
    /// Popularity counter.
    pub upvotes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub solution_ideas: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// ISO-8601 date or datetime.
    pub timestamp: String,
    #[serde(default)]
    pub stakeholders: Vec<Stakeholder>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub sentiment_shift: Vec<SentimentPoint>,
    /// 0-100 urgency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_info: Option<PolicyInfo>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub action_checklist: Vec<ActionItem>,
}

impl Problem {
    /// Urgency with a missing threshold read as 0.
    pub fn urgency(&self) -> f64 {
        self.threshold_level.unwrap_or(0.0)
    }

    pub fn is_crisis(&self) -> bool {
        self.urgency() >= CRISIS_THRESHOLD
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse an RFC 3339 datetime or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// --- Solutions ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolutionEvaluation {
    /// Score 0-100.
    pub feasibility: f64,
    /// Score 0-100, where 100 is highly affordable.
    pub cost: f64,
    pub time_to_implement: String,
    /// Score 0-100.
    pub social_impact: f64,
    /// Weighted average of the scores, 0-100.
    pub overall_score: f64,
}

// --- Users ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub points: u32,
    pub badges: Vec<String>,
    pub contributions: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_category_order_and_index() {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec!["Social", "Environmental", "Health", "Education", "Technology", "Economy"]
        );
        assert_eq!(Category::Health.index(), 2);
        assert_eq!(Category::Economy.index(), 5);
    }

    #[test]
    fn test_severity_is_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_credibility_wire_label() {
        let json = serde_json::to_string(&Credibility::PartiallyVerified).unwrap();
        assert_eq!(json, "\"Partially Verified\"");
        let parsed: Credibility = serde_json::from_str("\"partially verified\"").unwrap();
        assert_eq!(parsed, Credibility::PartiallyVerified);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "Sports".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("unknown Category 'Sports'"));
    }

    #[test]
    fn test_stakeholder_wire_shape() {
        let json = r#"{"name":"Water Board","type":"government","role":"Regulator"}"#;
        let s: Stakeholder = serde_json::from_str(json).unwrap();
        assert_eq!(s.kind, StakeholderKind::Government);
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["type"], "Government");
        assert!(back.get("acknowledgedAt").is_none());
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let date = parse_timestamp("2025-06-01").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 6, 1));

        let full = parse_timestamp("2025-06-01T12:30:00+02:00").unwrap();
        assert_eq!(full.to_rfc3339(), "2025-06-01T10:30:00+00:00");

        assert!(parse_timestamp("last tuesday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    fn with_threshold(threshold: Option<f64>) -> Problem {
        let mut json = serde_json::json!({
            "id": ProblemId::new(),
            "title": "Heatwave shelters full",
            "summary": "Cooling centres are turning people away.",
            "category": "Health",
            "location": "Phoenix",
            "severity": "High",
            "lifecycle": "Escalating",
            "credibility": "Verified",
            "credibilityScore": 90,
            "rootCause": "Too few centres",
            "whoIsAffected": "Elderly residents",
            "whyItMatters": "Heatstroke",
            "impactScore": 70,
            "affectedPopulation": "12,000",
            "upvotes": 3,
            "timestamp": "2025-07-01"
        });
        if let Some(t) = threshold {
            json["thresholdLevel"] = serde_json::json!(t);
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_crisis_flag_starts_at_threshold() {
        let cases = [(None, false), (Some(79.9), false), (Some(80.0), true), (Some(95.0), true)];
        for (threshold, crisis) in cases {
            assert_eq!(with_threshold(threshold).is_crisis(), crisis, "{threshold:?}");
        }
    }

    #[test]
    fn test_evaluation_schema_describes_scores() {
        let schema = serde_json::to_value(schemars::schema_for!(SolutionEvaluation)).unwrap();
        let props = &schema["properties"];
        for field in ["feasibility", "cost", "socialImpact", "overallScore"] {
            let description = props[field]["description"].as_str().unwrap_or_default();
            assert!(description.contains("0-100"), "{field}: {description:?}");
        }
        assert!(props["overallScore"]["description"]
            .as_str()
            .is_some_and(|d| d.starts_with("Weighted average")));
    }

    #[test]
    fn test_problem_id_round_trip_through_text() {
        let id = ProblemId::new();
        let parsed: ProblemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("p1".parse::<ProblemId>().is_err());
    }
}
