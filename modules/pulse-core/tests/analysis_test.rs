//! AI request pipeline against a scripted agent: prompt shape, validation at
//! the boundary, and degradation when the service misbehaves.

use serde_json::json;

use pulse_common::{Category, Credibility, Severity, StakeholderKind};
use pulse_core::analyst::{build_report_prompt, FALLBACK_SOLUTIONS};
use pulse_core::testing::{problem, MockAgent};
use pulse_core::ProblemAnalyst;

const REPORT: &str = "The footbridge over the canal has rotten planks and children cross it daily";

fn simplification() -> serde_json::Value {
    json!({
        "title": "Rotten footbridge over the canal",
        "summary": "Children cross a footbridge with failing planks every day.",
        "category": "Social",
        "severity": "high",
        "credibility": "Unverified",
        "credibilityScore": 42,
        "rootCause": "No maintenance budget",
        "whoIsAffected": "School children",
        "whyItMatters": "A fall into the canal could be fatal",
        "affectedPopulation": "300 pupils",
        "tags": ["infrastructure", "safety"],
        "stakeholders": [
            {"name": "City Works", "type": "Government", "role": "Repair"},
            {"name": "Parents Council", "type": "NGO", "role": "Advocacy"},
            {"name": "Bridge Lab", "type": "Startup", "role": "Sensors"}
        ]
    })
}

#[tokio::test]
async fn failing_service_yields_empty_draft() {
    let analyst = ProblemAnalyst::new(MockAgent::failing());
    let draft = analyst.simplify_problem(REPORT).await;
    assert!(draft.is_empty());
    assert_eq!(analyst.agent().call_count(), 1);
}

#[tokio::test]
async fn error_status_and_garbage_yield_empty_draft() {
    let analyst = ProblemAnalyst::new(
        MockAgent::new()
            .on_status(500)
            .on_raw("I'm sorry, I can't help with that.")
            .on_raw(""),
    );
    for _ in 0..3 {
        assert!(analyst.simplify_problem(REPORT).await.is_empty());
    }
}

#[tokio::test]
async fn invalid_enum_value_yields_empty_draft() {
    let mut body = simplification();
    body["severity"] = json!("Apocalyptic");
    let analyst = ProblemAnalyst::new(MockAgent::new().on_json(body));
    assert!(analyst.simplify_problem(REPORT).await.is_empty());
}

#[tokio::test]
async fn valid_reply_becomes_a_draft() {
    let fenced = format!("```json\n{}\n```", simplification());
    let analyst = ProblemAnalyst::new(MockAgent::new().on_raw(fenced));

    let draft = analyst.simplify_problem(REPORT).await;
    assert_eq!(draft.title.as_deref(), Some("Rotten footbridge over the canal"));
    assert_eq!(draft.category, Some(Category::Social));
    assert_eq!(draft.severity, Some(Severity::High));
    assert_eq!(draft.credibility, Some(Credibility::Unverified));
    assert_eq!(draft.credibility_score, Some(42.0));
    assert_eq!(draft.stakeholders.len(), 3);
    assert_eq!(draft.stakeholders[1].kind, StakeholderKind::Ngo);

    let requests = analyst.agent().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].schema_name, "ProblemSimplification");
    assert!(requests[0].user.starts_with("Analyze and simplify this problem description"));
    assert!(requests[0].user.ends_with(REPORT));
}

#[tokio::test]
async fn short_input_is_not_sent() {
    let analyst = ProblemAnalyst::new(MockAgent::new().on_json(simplification()));
    assert!(analyst.simplify_problem("too short").await.is_empty());
    assert_eq!(analyst.agent().call_count(), 0);
}

#[tokio::test]
async fn report_prompt_carries_category_and_date() {
    let analyst = ProblemAnalyst::new(MockAgent::new().on_json(simplification()));
    let prompt = build_report_prompt(Category::Education, "2025-02-14", REPORT);
    analyst.simplify_problem(&prompt).await;

    let requests = analyst.agent().requests();
    assert!(requests[0].user.contains("Category: Education. Date: 2025-02-14. Description: The footbridge"));
}

#[tokio::test]
async fn evaluation_success_and_failure() {
    let target = problem("Rotten footbridge", Category::Social, Severity::High).build();
    let analyst = ProblemAnalyst::new(
        MockAgent::new()
            .on_json(json!({
                "feasibility": 80,
                "cost": 140,
                "timeToImplement": "3 months",
                "socialImpact": 75,
                "overallScore": 77.5
            }))
            .on_network_error("timed out"),
    );
    let plan = "Replace the planks with recycled composite boards";

    let evaluation = analyst
        .evaluate_solution(&target, plan)
        .await
        .expect("first reply is valid");
    assert_eq!(evaluation.cost, 100.0);
    assert_eq!(evaluation.time_to_implement, "3 months");

    let requests = analyst.agent().requests();
    assert!(requests[0].user.contains("Problem: Rotten footbridge"));
    assert!(requests[0].user.contains(&format!("Solution: {plan}")));

    assert!(analyst.evaluate_solution(&target, plan).await.is_none());
}

#[tokio::test]
async fn solutions_fall_back_on_failure() {
    let target = problem("Rotten footbridge", Category::Social, Severity::High).build();
    let analyst = ProblemAnalyst::new(
        MockAgent::new()
            .on_json(json!({"solutions": ["Volunteer repair day", " ", "Crowdfund new planks"]}))
            .on_json(json!({"solutions": []})),
    );

    assert_eq!(
        analyst.generate_solutions(&target).await,
        vec!["Volunteer repair day", "Crowdfund new planks"]
    );
    assert_eq!(analyst.generate_solutions(&target).await, FALLBACK_SOLUTIONS.to_vec());
    // Script exhausted: network error.
    assert_eq!(analyst.generate_solutions(&target).await, FALLBACK_SOLUTIONS.to_vec());
    assert!(analyst.agent().requests()[0].user.starts_with("Suggest 3 innovative solutions for: Rotten footbridge"));
}
