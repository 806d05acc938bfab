// Test doubles and record builders.
//
// - MockAgent (StructuredAgent): scripted replies, records every request
// - ProblemBuilder: a fully-populated Problem with overridable fields

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use ai_client::{AiError, StructuredAgent, StructuredRequest};
use async_trait::async_trait;

use pulse_common::{Category, Credibility, Lifecycle, Problem, ProblemId, Severity};

// ---------------------------------------------------------------------------
// MockAgent
// ---------------------------------------------------------------------------

enum Reply {
    Body(String),
    Network(String),
    Status(u16),
}

/// Replies are consumed in order. An empty script answers with a network error.
pub struct MockAgent {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<StructuredRequest>>,
    delay: Option<Duration>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Always fails like an unreachable host.
    pub fn failing() -> Self {
        Self::new().on_network_error("connection refused")
    }

    pub fn on_json(self, value: serde_json::Value) -> Self {
        self.on_raw(value.to_string())
    }

    pub fn on_raw(self, body: impl Into<String>) -> Self {
        self.push(Reply::Body(body.into()))
    }

    pub fn on_network_error(self, message: impl Into<String>) -> Self {
        self.push(Reply::Network(message.into()))
    }

    pub fn on_status(self, status: u16) -> Self {
        self.push(Reply::Status(status))
    }

    /// Sleep before answering, so a call can be observed in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StructuredAgent for MockAgent {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn structured(&self, request: StructuredRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Network(message)) => Err(AiError::Network(message)),
            Some(Reply::Status(status)) => Err(AiError::Api {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(AiError::Network("no scripted reply".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProblemBuilder
// ---------------------------------------------------------------------------

pub struct ProblemBuilder {
    problem: Problem,
}

/// Start a problem with sensible defaults for everything but the three
/// fields most tests care about.
pub fn problem(title: &str, category: Category, severity: Severity) -> ProblemBuilder {
    ProblemBuilder {
        problem: Problem {
            id: ProblemId::new(),
            title: title.to_string(),
            summary: format!("Summary of {title}"),
            category,
            location: "Test City".to_string(),
            severity,
            lifecycle: Lifecycle::Emerging,
            credibility: Credibility::Unverified,
            credibility_score: 50.0,
            root_cause: "Unknown".to_string(),
            who_is_affected: "Residents".to_string(),
            why_it_matters: "It matters".to_string(),
            impact_score: 50.0,
            trend: vec![10.0, 20.0, 30.0],
            affected_population: "1,000 people".to_string(),
            upvotes: 0,
            comments: Vec::new(),
            solution_ideas: Vec::new(),
            tags: Vec::new(),
            timestamp: "2025-01-01".to_string(),
            stakeholders: Vec::new(),
            evidence: Vec::new(),
            sentiment_shift: Vec::new(),
            threshold_level: None,
            policy_info: None,
            timeline: Vec::new(),
            action_checklist: Vec::new(),
        },
    }
}

impl ProblemBuilder {
    pub fn summary(mut self, summary: &str) -> Self {
        self.problem.summary = summary.to_string();
        self
    }

    pub fn impact(mut self, impact: f64) -> Self {
        self.problem.impact_score = impact;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.problem.threshold_level = Some(threshold);
        self
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.problem.timestamp = timestamp.to_string();
        self
    }

    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.problem.lifecycle = lifecycle;
        self
    }

    pub fn upvotes(mut self, upvotes: u32) -> Self {
        self.problem.upvotes = upvotes;
        self
    }

    pub fn build(self) -> Problem {
        self.problem
    }
}
