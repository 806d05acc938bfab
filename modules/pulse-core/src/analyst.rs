//! AI-assisted problem simplification and solution evaluation.
//!
//! Every call goes through the same boundary: prompt → structured output →
//! serde → [`validate`](ProblemSimplification::validate). Anything that goes
//! wrong on the way is logged and degraded to an empty result; callers never
//! see an error from the public operations.

use ai_client::{extract, truncate_to_char_boundary, StructuredAgent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pulse_common::{
    Category, Credibility, Problem, PulseError, Severity, SolutionEvaluation, Stakeholder,
    StakeholderKind,
};

/// Descriptions shorter than this are never sent to the model.
pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// Upper bound on user text forwarded in a prompt.
const MAX_INPUT_BYTES: usize = 8_000;

const MAX_STAKEHOLDERS: usize = 3;

const SYSTEM_PROMPT: &str = "You help a community platform turn raw reports of local and \
global problems into clear, structured records. Scores are numbers from 0 to 100. \
Answer only with JSON matching the requested schema.";

const SIMPLIFY_INSTRUCTION: &str = "Analyze and simplify this problem description into a \
structured format. Include a credibility analysis and suggest 3 stakeholders who should act";

pub const FALLBACK_SOLUTIONS: [&str; 3] = [
    "Community awareness",
    "Local policy change",
    "Tech innovation",
];

// =============================================================================
// Wire shapes (what the model is asked to return)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSimplification {
    pub title: String,
    pub summary: String,
    pub category: Category,
    pub severity: Severity,
    /// Verified, Partially Verified, or Unverified
    pub credibility: Credibility,
    /// Confidence in the credibility label, 0-100
    pub credibility_score: f64,
    pub root_cause: String,
    pub who_is_affected: String,
    pub why_it_matters: String,
    pub affected_population: String,
    pub tags: Vec<String>,
    /// Up to three parties who should act
    pub stakeholders: Vec<SuggestedStakeholder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestedStakeholder {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StakeholderKind,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SolutionIdeas {
    pub solutions: Vec<String>,
}

// =============================================================================
// ProblemDraft
// =============================================================================

/// Partial problem produced by the model. `Default` is the empty draft,
/// meaning "no analysis available".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDraft {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub credibility: Option<Credibility>,
    pub credibility_score: Option<f64>,
    pub root_cause: Option<String>,
    pub who_is_affected: Option<String>,
    pub why_it_matters: Option<String>,
    pub affected_population: Option<String>,
    pub tags: Vec<String>,
    pub stakeholders: Vec<Stakeholder>,
}

impl ProblemDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Validation
// =============================================================================

fn required_text(value: String, field: &str) -> Result<String, PulseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PulseError::Validation(format!("{field} is empty")));
    }
    Ok(trimmed.to_string())
}

/// Finite scores are clamped into [0, 100]; NaN and infinities are rejected.
fn score(value: f64, field: &str) -> Result<f64, PulseError> {
    if !value.is_finite() {
        return Err(PulseError::Validation(format!("{field} is not a finite number")));
    }
    Ok(value.clamp(0.0, 100.0))
}

impl ProblemSimplification {
    pub fn validate(self) -> Result<ProblemDraft, PulseError> {
        let tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let stakeholders = self
            .stakeholders
            .into_iter()
            .filter(|s| !s.name.trim().is_empty())
            .take(MAX_STAKEHOLDERS)
            .map(|s| Stakeholder::new(s.name.trim(), s.kind, s.role.trim()))
            .collect();

        Ok(ProblemDraft {
            title: Some(required_text(self.title, "title")?),
            summary: Some(required_text(self.summary, "summary")?),
            category: Some(self.category),
            severity: Some(self.severity),
            credibility: Some(self.credibility),
            credibility_score: Some(score(self.credibility_score, "credibilityScore")?),
            root_cause: Some(self.root_cause.trim().to_string()),
            who_is_affected: Some(self.who_is_affected.trim().to_string()),
            why_it_matters: Some(self.why_it_matters.trim().to_string()),
            affected_population: Some(self.affected_population.trim().to_string()),
            tags,
            stakeholders,
        })
    }
}

fn validate_evaluation(raw: SolutionEvaluation) -> Result<SolutionEvaluation, PulseError> {
    let time_to_implement = match raw.time_to_implement.trim() {
        "" => "Unknown".to_string(),
        text => text.to_string(),
    };
    Ok(SolutionEvaluation {
        feasibility: score(raw.feasibility, "feasibility")?,
        cost: score(raw.cost, "cost")?,
        time_to_implement,
        social_impact: score(raw.social_impact, "socialImpact")?,
        overall_score: score(raw.overall_score, "overallScore")?,
    })
}

fn validate_ideas(raw: SolutionIdeas) -> Result<Vec<String>, PulseError> {
    let ideas: Vec<String> = raw
        .solutions
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if ideas.is_empty() {
        return Err(PulseError::Validation("no solutions returned".to_string()));
    }
    Ok(ideas)
}

// =============================================================================
// Prompts
// =============================================================================

/// User prompt for a new report: the chosen category and date give the model
/// context the free text may lack.
pub fn build_report_prompt(category: Category, date: &str, description: &str) -> String {
    format!("Category: {category}. Date: {date}. Description: {description}")
}

fn bounded(text: &str) -> &str {
    truncate_to_char_boundary(text, MAX_INPUT_BYTES)
}

// =============================================================================
// ProblemAnalyst
// =============================================================================

pub struct ProblemAnalyst<A> {
    agent: A,
}

impl<A: StructuredAgent> ProblemAnalyst<A> {
    pub fn new(agent: A) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Turn raw text into a draft. Empty draft on short input or any failure.
    pub async fn simplify_problem(&self, raw_text: &str) -> ProblemDraft {
        if raw_text.chars().count() < MIN_DESCRIPTION_CHARS {
            debug!(chars = raw_text.chars().count(), "Description too short, not analysed");
            return ProblemDraft::default();
        }

        match self.try_simplify_problem(raw_text).await {
            Ok(draft) => {
                info!(
                    provider = self.agent.provider(),
                    category = ?draft.category,
                    severity = ?draft.severity,
                    "Problem simplified"
                );
                draft
            }
            Err(e) => {
                warn!(provider = self.agent.provider(), error = %e, "Problem simplification failed, no analysis available");
                ProblemDraft::default()
            }
        }
    }

    pub async fn try_simplify_problem(&self, raw_text: &str) -> Result<ProblemDraft, PulseError> {
        let user = format!("{SIMPLIFY_INSTRUCTION}: {}", bounded(raw_text));
        let wire: ProblemSimplification = extract(&self.agent, SYSTEM_PROMPT, user).await?;
        wire.validate()
    }

    /// Score a proposed solution. `None` means no analysis is available.
    pub async fn evaluate_solution(&self, problem: &Problem, description: &str) -> Option<SolutionEvaluation> {
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            debug!(problem_id = %problem.id, "Solution too short, not evaluated");
            return None;
        }

        match self.try_evaluate_solution(problem, description).await {
            Ok(evaluation) => {
                info!(
                    problem_id = %problem.id,
                    overall = evaluation.overall_score,
                    "Solution evaluated"
                );
                Some(evaluation)
            }
            Err(e) => {
                warn!(problem_id = %problem.id, error = %e, "Solution evaluation failed, no analysis available");
                None
            }
        }
    }

    pub async fn try_evaluate_solution(
        &self,
        problem: &Problem,
        description: &str,
    ) -> Result<SolutionEvaluation, PulseError> {
        let user = format!(
            "Evaluate this solution for the given problem. Score feasibility, cost (100 is highly \
             affordable), social impact and an overall weighted score from 0 to 100, and estimate \
             the time to implement.\nProblem: {}\nSolution: {}",
            problem.title,
            bounded(description)
        );
        let wire: SolutionEvaluation = extract(&self.agent, SYSTEM_PROMPT, user).await?;
        validate_evaluation(wire)
    }

    /// Three solution ideas for the detail view; a fixed generic list on failure.
    pub async fn generate_solutions(&self, problem: &Problem) -> Vec<String> {
        let user = format!("Suggest 3 innovative solutions for: {}", problem.title);
        let result = match extract::<SolutionIdeas, _>(&self.agent, SYSTEM_PROMPT, user).await {
            Ok(raw) => validate_ideas(raw),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(ideas) => ideas,
            Err(e) => {
                warn!(problem_id = %problem.id, error = %e, "Solution generation failed, using fallback ideas");
                FALLBACK_SOLUTIONS.iter().map(|s| s.to_string()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::StructuredOutput;
    use serde_json::json;

    fn wire() -> serde_json::Value {
        json!({
            "title": "  Toxic runoff in Mill Creek ",
            "summary": "Factory discharge is killing fish downstream.",
            "category": "environmental",
            "severity": "High",
            "credibility": "Partially Verified",
            "credibilityScore": 130.0,
            "rootCause": "Unpermitted discharge",
            "whoIsAffected": "Anglers and riverside homes",
            "whyItMatters": "Drinking water intake is downstream",
            "affectedPopulation": "12,000 residents",
            "tags": ["water", " ", "pollution"],
            "stakeholders": [
                {"name": "State EPA", "type": "Government", "role": "Enforce permits"},
                {"name": "", "type": "NGO", "role": "ignored"},
                {"name": "River Keepers", "type": "ngo", "role": "Monitoring"},
                {"name": "Dr. Osei", "type": "Expert", "role": "Toxicology"},
                {"name": "CleanFlow", "type": "Startup", "role": "Filtration"}
            ]
        })
    }

    #[test]
    fn test_validate_normalises_draft() {
        let raw: ProblemSimplification = serde_json::from_value(wire()).unwrap();
        let draft = raw.validate().unwrap();

        assert_eq!(draft.title.as_deref(), Some("Toxic runoff in Mill Creek"));
        assert_eq!(draft.category, Some(Category::Environmental));
        assert_eq!(draft.credibility, Some(Credibility::PartiallyVerified));
        assert_eq!(draft.credibility_score, Some(100.0));
        assert_eq!(draft.tags, vec!["water", "pollution"]);
        assert_eq!(draft.stakeholders.len(), 3);
        assert_eq!(draft.stakeholders[1].kind, StakeholderKind::Ngo);
        assert!(!draft.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut value = wire();
        value["title"] = json!("   ");
        let raw: ProblemSimplification = serde_json::from_value(value).unwrap();
        assert!(matches!(raw.validate(), Err(PulseError::Validation(_))));
    }

    #[test]
    fn test_unknown_category_fails_deserialization() {
        let mut value = wire();
        value["category"] = json!("Sports");
        assert!(serde_json::from_value::<ProblemSimplification>(value).is_err());
    }

    #[test]
    fn test_evaluation_validation() {
        let raw = SolutionEvaluation {
            feasibility: 88.0,
            cost: -3.0,
            time_to_implement: " ".to_string(),
            social_impact: 70.0,
            overall_score: 79.5,
        };
        let evaluation = validate_evaluation(raw).unwrap();
        assert_eq!(evaluation.cost, 0.0);
        assert_eq!(evaluation.time_to_implement, "Unknown");

        let bad = SolutionEvaluation {
            feasibility: f64::NAN,
            cost: 1.0,
            time_to_implement: "2 months".to_string(),
            social_impact: 1.0,
            overall_score: 1.0,
        };
        assert!(validate_evaluation(bad).is_err());
    }

    #[test]
    fn test_schema_declares_every_field_required() {
        let schema = ProblemSimplification::gemini_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in [
            "title",
            "summary",
            "category",
            "severity",
            "credibility",
            "credibilityScore",
            "rootCause",
            "whoIsAffected",
            "whyItMatters",
            "affectedPopulation",
            "tags",
            "stakeholders",
        ] {
            assert!(required.contains(&field), "{field} not required");
        }
        assert_eq!(schema["properties"]["category"]["type"], "STRING");
        assert_eq!(schema["properties"]["category"]["enum"][1], "Environmental");
        assert_eq!(schema["properties"]["credibility"]["enum"][1], "Partially Verified");
    }

    #[test]
    fn test_report_prompt() {
        assert_eq!(
            build_report_prompt(Category::Health, "2025-03-04", "No clean water at the clinic"),
            "Category: Health. Date: 2025-03-04. Description: No clean water at the clinic"
        );
    }
}
