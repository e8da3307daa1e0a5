//! Hand-off of finished route outcomes to a later rendering step.
//!
//! The store is owned by the caller and passed to whatever renders; the
//! pipeline itself keeps no global state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::error::RouteError;
use crate::route::RouteReport;

/// What a route request produced. "Nothing stored" is a separate state
/// (`None` from the store), so an error is never shown as an empty route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportOutcome {
    Ready { report: Arc<RouteReport> },
    Failed {
        waypoint_index: Option<usize>,
        message: String,
    },
}

impl ReportOutcome {
    pub fn report(&self) -> Option<&RouteReport> {
        match self {
            Self::Ready { report } => Some(report),
            Self::Failed { .. } => None,
        }
    }
}

impl From<Result<RouteReport, RouteError>> for ReportOutcome {
    fn from(result: Result<RouteReport, RouteError>) -> Self {
        match result {
            Ok(report) => Self::Ready {
                report: Arc::new(report),
            },
            Err(e) => Self::Failed {
                waypoint_index: e.waypoint_index(),
                message: e.user_message(),
            },
        }
    }
}

pub trait ReportStore: Send + Sync {
    fn put(&self, session: &str, outcome: ReportOutcome);

    fn get(&self, session: &str) -> Option<ReportOutcome>;

    /// Remove and return the outcome for `session`.
    fn take(&self, session: &str) -> Option<ReportOutcome>;
}

#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    outcomes: RwLock<HashMap<String, ReportOutcome>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for InMemoryReportStore {
    fn put(&self, session: &str, outcome: ReportOutcome) {
        self.outcomes.write().insert(session.to_string(), outcome);
    }

    fn get(&self, session: &str) -> Option<ReportOutcome> {
        self.outcomes.read().get(session).cloned()
    }

    fn take(&self, session: &str) -> Option<ReportOutcome> {
        self.outcomes.write().remove(session)
    }
}
