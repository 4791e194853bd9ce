//! Payload shapes for the submit-for-grading boundary, plus the
//! at-most-one-in-flight rule.
//!
//! Transport and encoding belong to the grading collaborator; the core only
//! defines the request/response shapes and the supersession rule: issuing a
//! new submission invalidates every earlier one, so a stale response is
//! dropped instead of overwriting the verdict for the latest snapshot.
//! Supersession is not time-based; there are no timeouts.

use crate::board::snapshot::{Snapshot, VectorCoords};
use crate::checks::Check;
use crate::grader::Verdict;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Grading request payload: the submitted configuration plus the check
/// specification to evaluate it against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub vectors: IndexMap<String, VectorCoords>,
    pub points: IndexMap<String, [f64; 2]>,
    pub checks: Vec<Check>,
}

impl CheckRequest {
    pub fn new(state: Snapshot, checks: Vec<Check>) -> Self {
        Self {
            vectors: state.vectors,
            points: state.points,
            checks,
        }
    }

    /// The submitted configuration, for grading against `checks`.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            vectors: self.vectors.clone(),
            points: self.points.clone(),
        }
    }
}

/// Grading response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub result: Verdict,
}

/// Token identifying one submission; see [`SubmissionTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionToken(u64);

/// Enforces the at-most-one-outstanding-submission rule. `begin` issues a
/// token for a new submission and supersedes all earlier ones; `accept`
/// tells whether a response belongs to the latest submission and should be
/// applied.
#[derive(Debug, Clone, Default)]
pub struct SubmissionTracker {
    latest: u64,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> SubmissionToken {
        self.latest += 1;
        SubmissionToken(self.latest)
    }

    pub fn accept(&self, token: SubmissionToken) -> bool {
        token.0 == self.latest
    }
}
