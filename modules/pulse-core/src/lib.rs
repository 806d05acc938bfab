pub mod analyst;
pub mod attachments;
pub mod feed;
pub mod radar;
pub mod routes;
pub mod seed;
pub mod store;
pub mod trend;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analyst::{ProblemAnalyst, ProblemDraft};
pub use feed::{CategoryFilter, FeedQuery, SortMode};
pub use radar::RadarPoint;
pub use routes::{DetailView, Route};
pub use store::{ProblemStore, SharedStore};
pub use workspace::{SubmissionWorkspace, WorkspaceError, WorkspaceMode};
