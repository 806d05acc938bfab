use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use pulse_common::{Problem, ProblemId, PulseError, TimelineEntry};

use crate::seed::seed_problems;

/// Popularity boost granted when a solution is attached.
pub const SOLUTION_UPVOTE_BOOST: u32 = 50;

/// Store shared between tasks. Writers take the lock for the duration of a
/// single mutation.
pub type SharedStore = Arc<RwLock<ProblemStore>>;

/// The in-memory problem collection, most recent first.
///
/// Only two mutations change what a problem *is*: [`ProblemStore::add_record`]
/// and [`ProblemStore::attach_solution`]. Nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemStore {
    records: Vec<Problem>,
}

impl ProblemStore {
    pub fn new(records: Vec<Problem>) -> Self {
        Self { records }
    }

    /// Store holding the startup seed list.
    pub fn seeded() -> Self {
        Self::new(seed_problems())
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn records(&self) -> &[Problem] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ProblemId) -> Option<&Problem> {
        self.records.iter().find(|p| p.id == id)
    }

    /// Put a new problem at the front.
    pub fn add_record(&mut self, problem: Problem) {
        info!(problem_id = %problem.id, category = %problem.category, "Problem added");
        self.records.insert(0, problem);
    }

    /// Attach a proposed solution: the text goes first in the idea list, the
    /// problem moves to Stabilizing and gains [`SOLUTION_UPVOTE_BOOST`] upvotes.
    ///
    /// An unknown id leaves the store untouched and returns `NotFound`.
    pub fn attach_solution(&mut self, id: ProblemId, text: &str) -> Result<&Problem, PulseError> {
        let Some(problem) = self.records.iter_mut().find(|p| p.id == id) else {
            debug!(problem_id = %id, "Solution for unknown problem ignored");
            return Err(PulseError::NotFound(id.to_string()));
        };

        let previous = problem.lifecycle;
        problem.lifecycle = previous.on_solution();
        problem.solution_ideas.insert(0, text.to_string());
        problem.upvotes = problem.upvotes.saturating_add(SOLUTION_UPVOTE_BOOST);
        // Audit entry, beyond the three required updates.
        problem.timeline.push(TimelineEntry {
            date: Utc::now().format("%Y-%m-%d").to_string(),
            event: "Solution proposed".to_string(),
            status: problem.lifecycle,
        });

        info!(
            problem_id = %id,
            from = %previous,
            upvotes = problem.upvotes,
            "Solution attached"
        );

        Ok(problem)
    }

    /// Single upvote from the detail view.
    pub fn upvote(&mut self, id: ProblemId) -> Result<u32, PulseError> {
        let problem = self
            .records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PulseError::NotFound(id.to_string()))?;
        problem.upvotes = problem.upvotes.saturating_add(1);
        Ok(problem.upvotes)
    }
}
