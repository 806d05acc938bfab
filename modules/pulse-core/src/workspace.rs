//! The submit view as a state machine: compose a report (or a solution to an
//! existing problem), run the AI analysis, publish into the store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use ai_client::StructuredAgent;
use pulse_common::{
    Category, Credibility, Lifecycle, Problem, ProblemId, PulseError, Severity,
    SolutionEvaluation, TimelineEntry,
};

use crate::analyst::{build_report_prompt, ProblemAnalyst, ProblemDraft, MIN_DESCRIPTION_CHARS};
use crate::attachments::{AttachmentId, AttachmentSet, PreviewRegistry};
use crate::store::ProblemStore;

pub const DEFAULT_LOCATION: &str = "Global Detection";
const DEFAULT_IMPACT: f64 = 50.0;
const DEFAULT_THRESHOLD: f64 = 30.0;
const DEFAULT_TREND: [f64; 4] = [20.0, 40.0, 60.0, 80.0];
const DEFAULT_CREDIBILITY_SCORE: f64 = 50.0;
const REPORTED_EVENT: &str = "Problem Reported via Pulse Node";

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Description needs at least {min} characters, got {actual}")]
    DescriptionTooShort { min: usize, actual: usize },

    #[error("An analysis is already running for this submission")]
    AnalysisInFlight,

    #[error("Nothing has been analysed yet")]
    NothingToPublish,

    #[error("Submission was abandoned before the analysis returned")]
    Abandoned,

    #[error(transparent)]
    Store(#[from] PulseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceMode {
    Report,
    Solve { source: ProblemId, title: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Analysis {
    #[default]
    None,
    Draft(ProblemDraft),
    /// `Evaluation(None)` means the evaluation ran but produced nothing.
    Evaluation(Option<SolutionEvaluation>),
}

// =============================================================================
// BusyFlag
// =============================================================================

/// At most one analysis per workspace. The guard clears the flag on drop,
/// including when the analysing future is cancelled.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// SubmissionWorkspace
// =============================================================================

struct Form {
    description: String,
    category: Category,
    date: String,
    attachments: AttachmentSet,
    analysis: Analysis,
}

pub struct SubmissionWorkspace {
    source: Option<Problem>,
    contributor: String,
    form: Mutex<Form>,
    busy: BusyFlag,
    epoch: AtomicU64,
}

impl SubmissionWorkspace {
    /// A new report.
    pub fn report(registry: PreviewRegistry) -> Self {
        Self::build(None, registry)
    }

    /// A solution for `source`. The category starts at the source's category.
    pub fn solve(source: &Problem, registry: PreviewRegistry) -> Self {
        Self::build(Some(source.clone()), registry)
    }

    /// Workspace for the submit route. An unknown source falls back to a report.
    pub fn open(store: &ProblemStore, source: Option<ProblemId>, registry: PreviewRegistry) -> Self {
        match source.map(|id| (id, store.get(id))) {
            Some((_, Some(problem))) => Self::solve(problem, registry),
            Some((id, None)) => {
                debug!(problem_id = %id, "Solution source not found, opening a report");
                Self::report(registry)
            }
            None => Self::report(registry),
        }
    }

    fn build(source: Option<Problem>, registry: PreviewRegistry) -> Self {
        let category = source
            .as_ref()
            .map(|p| p.category)
            .unwrap_or(Category::ALL[0]);

        Self {
            source,
            contributor: "anonymous".to_string(),
            form: Mutex::new(Form {
                description: String::new(),
                category,
                date: Utc::now().format("%Y-%m-%d").to_string(),
                attachments: AttachmentSet::new(registry),
                analysis: Analysis::None,
            }),
            busy: BusyFlag::default(),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        self.contributor = contributor.into();
        self
    }

    fn form(&self) -> MutexGuard<'_, Form> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> WorkspaceMode {
        match &self.source {
            Some(p) => WorkspaceMode::Solve {
                source: p.id,
                title: p.title.clone(),
            },
            None => WorkspaceMode::Report,
        }
    }

    // --- Form fields ---

    pub fn set_description(&self, text: impl Into<String>) {
        self.form().description = text.into();
    }

    pub fn description(&self) -> String {
        self.form().description.clone()
    }

    pub fn set_category(&self, category: Category) {
        self.form().category = category;
    }

    pub fn category(&self) -> Category {
        self.form().category
    }

    pub fn set_date(&self, date: impl Into<String>) {
        self.form().date = date.into();
    }

    pub fn date(&self) -> String {
        self.form().date.clone()
    }

    pub fn attach(&self, name: &str, mime: &str, bytes: Vec<u8>) -> Result<AttachmentId, WorkspaceError> {
        Ok(self.form().attachments.stage(name, mime, bytes)?)
    }

    pub fn detach(&self, id: AttachmentId) -> bool {
        self.form().attachments.remove(id)
    }

    pub fn attachment_count(&self) -> usize {
        self.form().attachments.len()
    }

    pub fn analysis(&self) -> Analysis {
        self.form().analysis.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn can_analyze(&self) -> bool {
        !self.is_busy() && self.form().description.chars().count() >= MIN_DESCRIPTION_CHARS
    }

    // --- Analysis ---

    /// Run the analysis for the current form contents and keep the result.
    ///
    /// The form is snapshotted before the call; edits made while the call is
    /// in flight apply to the next analysis.
    pub async fn analyze<A: StructuredAgent>(
        &self,
        analyst: &ProblemAnalyst<A>,
    ) -> Result<Analysis, WorkspaceError> {
        let (description, category, date) = {
            let form = self.form();
            (form.description.clone(), form.category, form.date.clone())
        };

        let actual = description.chars().count();
        if actual < MIN_DESCRIPTION_CHARS {
            return Err(WorkspaceError::DescriptionTooShort {
                min: MIN_DESCRIPTION_CHARS,
                actual,
            });
        }

        let _guard = self.busy.try_acquire().ok_or(WorkspaceError::AnalysisInFlight)?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let analysis = match &self.source {
            None => {
                let prompt = build_report_prompt(category, &date, &description);
                Analysis::Draft(analyst.simplify_problem(&prompt).await)
            }
            Some(source) => Analysis::Evaluation(analyst.evaluate_solution(source, &description).await),
        };

        if self.epoch.load(Ordering::SeqCst) != epoch {
            warn!("Analysis returned after the submission was abandoned, discarding");
            return Err(WorkspaceError::Abandoned);
        }

        self.form().analysis = analysis.clone();
        Ok(analysis)
    }

    /// Leave the submission: any in-flight result is discarded and every
    /// staged preview is released.
    pub fn abandon(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut form = self.form();
        form.attachments.clear();
        form.analysis = Analysis::None;
        debug!("Submission abandoned");
    }

    // --- Publish ---

    /// Write the submission into the store and reset the workspace.
    /// Returns the id of the new or updated problem.
    pub fn publish(&self, store: &mut ProblemStore) -> Result<ProblemId, WorkspaceError> {
        let mut form = self.form();

        let id = match &self.source {
            None => {
                let draft = match &form.analysis {
                    Analysis::Draft(draft) if !draft.is_empty() => draft.clone(),
                    _ => return Err(WorkspaceError::NothingToPublish),
                };
                let problem = self.build_problem(&form, draft);
                let id = problem.id;
                store.add_record(problem);
                id
            }
            Some(source) => {
                let text = form.description.trim().to_string();
                let actual = text.chars().count();
                if actual < MIN_DESCRIPTION_CHARS {
                    return Err(WorkspaceError::DescriptionTooShort {
                        min: MIN_DESCRIPTION_CHARS,
                        actual,
                    });
                }
                store.attach_solution(source.id, &text)?.id
            }
        };

        info!(problem_id = %id, mode = ?self.mode(), "Submission published");
        form.attachments.clear();
        form.analysis = Analysis::None;
        form.description.clear();
        Ok(id)
    }

    fn build_problem(&self, form: &Form, draft: ProblemDraft) -> Problem {
        Problem {
            id: ProblemId::new(),
            title: draft.title.unwrap_or_default(),
            summary: draft.summary.unwrap_or_default(),
            category: form.category,
            location: DEFAULT_LOCATION.to_string(),
            severity: draft.severity.unwrap_or(Severity::Medium),
            lifecycle: Lifecycle::Emerging,
            credibility: draft.credibility.unwrap_or(Credibility::Unverified),
            credibility_score: draft.credibility_score.unwrap_or(DEFAULT_CREDIBILITY_SCORE),
            root_cause: draft.root_cause.unwrap_or_default(),
            who_is_affected: draft.who_is_affected.unwrap_or_default(),
            why_it_matters: draft.why_it_matters.unwrap_or_default(),
            impact_score: DEFAULT_IMPACT,
            trend: DEFAULT_TREND.to_vec(),
            affected_population: draft.affected_population.unwrap_or_default(),
            upvotes: 0,
            comments: Vec::new(),
            solution_ideas: Vec::new(),
            tags: draft.tags,
            timestamp: Utc::now().to_rfc3339(),
            stakeholders: draft.stakeholders,
            evidence: form.attachments.to_evidence(&self.contributor),
            sentiment_shift: Vec::new(),
            threshold_level: Some(DEFAULT_THRESHOLD),
            policy_info: None,
            timeline: vec![TimelineEntry {
                date: form.date.clone(),
                event: REPORTED_EVENT.to_string(),
                status: Lifecycle::Emerging,
            }],
            action_checklist: Vec::new(),
        }
    }
}
