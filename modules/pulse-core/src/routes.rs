use std::fmt;

use tracing::debug;

use pulse_common::{Problem, ProblemId};

use crate::store::ProblemStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Dashboard,
    ProblemDetail(ProblemId),
    /// With a source the submission proposes a solution to that problem.
    Submit { source: Option<ProblemId> },
    Profile,
}

impl Route {
    /// Map a location to a view. Unknown paths and malformed ids fall back
    /// to the landing page.
    pub fn resolve(location: &str) -> Route {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Some(Route::Landing),
            ["dashboard"] => Some(Route::Dashboard),
            ["profile"] => Some(Route::Profile),
            ["problem", id] => id.parse().ok().map(Route::ProblemDetail),
            ["submit"] => submit_route(query),
            _ => None,
        };

        route.unwrap_or_else(|| {
            debug!(location, "Unknown route, redirecting to landing");
            Route::Landing
        })
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ProblemDetail(id) => format!("/problem/{id}"),
            Route::Submit { source: None } => "/submit".to_string(),
            Route::Submit { source: Some(id) } => format!("/submit?source={id}"),
            Route::Profile => "/profile".to_string(),
        }
    }
}

fn submit_route(query: Option<&str>) -> Option<Route> {
    let source = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "source")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty());

    match source {
        None => Some(Route::Submit { source: None }),
        Some(raw) => raw
            .parse()
            .ok()
            .map(|id| Route::Submit { source: Some(id) }),
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What the detail page shows for an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailView<'a> {
    Found(&'a Problem),
    NotFound(ProblemId),
}

impl<'a> DetailView<'a> {
    pub fn load(store: &'a ProblemStore, id: ProblemId) -> Self {
        match store.get(id) {
            Some(problem) => DetailView::Found(problem),
            None => DetailView::NotFound(id),
        }
    }
}
