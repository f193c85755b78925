//! Job status lifecycle.
//!
//! ```text
//! scored ──► resume_generated ──► applied ──► interviewing ──► accepted | rejected | no_response
//!    └─────► ineligible
//! any non-terminal ──► pass
//! ```
//!
//! The graph is advisory. `transition` accepts any member of the enumeration
//! regardless of the current state; the pipeline that drives transitions is trusted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid status '{0}'. Must be one of: {}", JobStatus::valid_list())]
pub struct InvalidStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum JobStatus {
    Scored,
    ResumeGenerated,
    Ineligible,
    Applied,
    Interviewing,
    NoResponse,
    Accepted,
    Rejected,
    Pass,
}

impl JobStatus {
    pub const ALL: [JobStatus; 9] = [
        JobStatus::Scored,
        JobStatus::ResumeGenerated,
        JobStatus::Ineligible,
        JobStatus::Applied,
        JobStatus::Interviewing,
        JobStatus::NoResponse,
        JobStatus::Accepted,
        JobStatus::Rejected,
        JobStatus::Pass,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scored => "scored",
            JobStatus::ResumeGenerated => "resume_generated",
            JobStatus::Ineligible => "ineligible",
            JobStatus::Applied => "applied",
            JobStatus::Interviewing => "interviewing",
            JobStatus::NoResponse => "no_response",
            JobStatus::Accepted => "accepted",
            JobStatus::Rejected => "rejected",
            JobStatus::Pass => "pass",
        }
    }

    /// Terminal from the dashboard's point of view. Nothing blocks leaving them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Accepted
                | JobStatus::Rejected
                | JobStatus::NoResponse
                | JobStatus::Ineligible
                | JobStatus::Pass
        )
    }

    /// Whether a generated resume is expected to exist in this state.
    pub fn expects_artifact(self) -> bool {
        matches!(
            self,
            JobStatus::ResumeGenerated
                | JobStatus::Applied
                | JobStatus::Interviewing
                | JobStatus::Accepted
                | JobStatus::Rejected
                | JobStatus::NoResponse
        )
    }

    /// Successor states in the advisory lifecycle graph.
    pub fn allowed_next(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Scored => &[
                JobStatus::ResumeGenerated,
                JobStatus::Ineligible,
                JobStatus::Pass,
            ],
            JobStatus::ResumeGenerated => &[JobStatus::Applied, JobStatus::Pass],
            JobStatus::Applied => &[JobStatus::Interviewing, JobStatus::Pass],
            JobStatus::Interviewing => &[
                JobStatus::Accepted,
                JobStatus::Rejected,
                JobStatus::NoResponse,
                JobStatus::Pass,
            ],
            JobStatus::Accepted
            | JobStatus::Rejected
            | JobStatus::NoResponse
            | JobStatus::Ineligible
            | JobStatus::Pass => &[],
        }
    }

    pub fn follows_graph(self, next: JobStatus) -> bool {
        self == next || self.allowed_next().contains(&next)
    }

    fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}
