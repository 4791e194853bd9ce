//! Grading engine: evaluates a check specification against a learner's
//! snapshot, producing a verdict and an explanatory message.
//!
//! Semantics:
//! - the verdict is a conjunction over every check; nothing short-circuits
//!   across vectors,
//! - a failed `presence` check suppresses the remaining checks of that
//!   vector only (they are recorded as skipped),
//! - the message is the first failing check's message,
//! - a missing or malformed expected value is reported as a failing check,
//!   never a panic.
//!
//! Default tolerances, in one place: [`DEFAULT_ANGLE_TOLERANCE`] (degrees)
//! for `angle` and `segment_angle`; [`DEFAULT_TOLERANCE`] (board units) for
//! every other numeric or coordinate check (`tail`, `tip`, `tail_x`,
//! `tail_y`, `tip_x`, `tip_y`, `coords`, `segment_coords`, `length`,
//! `points_on_line`, `point_coords`).

pub mod messages;

#[cfg(test)]
mod tests_grader;

use crate::board::snapshot::{Snapshot, VectorCoords};
use crate::checks::{Check, CheckKind};
use crate::geometry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Default absolute tolerance for coordinate, length and line-distance
/// checks, in board units.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Default absolute tolerance for angle checks, in degrees.
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 2.0;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Test passed";

/// Boolean correctness result plus explanatory message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub msg: String,
}

/// Outcome of one check from the specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub element: String,
    pub check: CheckKind,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheckStatus {
    Passed,
    Failed(String),
    /// Not evaluated because the element's presence check failed.
    Skipped,
}

/// Aggregate verdict plus the per-check outcomes it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub verdict: Verdict,
    pub outcomes: Vec<CheckOutcome>,
}

/// A vector as the grading engine sees it: submitted coordinates plus the
/// recomputed raw length and direction. The authored `length_factor` and
/// `base_angle` are display concerns and do not apply here; the submitted
/// snapshot carries only tail and tip.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedVector {
    pub name: String,
    pub tail: [f64; 2],
    pub tip: [f64; 2],
    pub length: f64,
    pub angle: f64,
}

impl GradedVector {
    pub fn new(name: impl Into<String>, coords: VectorCoords) -> Self {
        Self {
            name: name.into(),
            tail: coords.tail,
            tip: coords.tip,
            length: geometry::distance(coords.tail, coords.tip),
            angle: geometry::angle_of(coords.tail, coords.tip, 0.0),
        }
    }

    /// The same segment with tip and tail swapped, for the undirected
    /// segment checks.
    pub fn opposite(&self) -> Self {
        Self::new(
            self.name.clone(),
            VectorCoords {
                tail: self.tip,
                tip: self.tail,
            },
        )
    }
}

/// Evaluates check specifications against snapshots.
#[derive(Debug, Clone)]
pub struct Grader {
    success_message: String,
}

impl Default for Grader {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_MESSAGE)
    }
}

impl Grader {
    pub fn new(success_message: impl Into<String>) -> Self {
        Self {
            success_message: success_message.into(),
        }
    }

    /// Evaluate `checks` against `snapshot` and reduce to the verdict.
    pub fn grade(&self, snapshot: &Snapshot, checks: &[Check]) -> Verdict {
        self.grade_detailed(snapshot, checks).verdict
    }

    /// Evaluate `checks` against `snapshot`, keeping every per-check outcome
    /// alongside the aggregate verdict.
    pub fn grade_detailed(&self, snapshot: &Snapshot, checks: &[Check]) -> GradeReport {
        let vectors: IndexMap<&str, GradedVector> = snapshot
            .vectors
            .iter()
            .map(|(name, coords)| (name.as_str(), GradedVector::new(name.clone(), *coords)))
            .collect();

        let mut missing: HashSet<&str> = HashSet::new();
        let mut outcomes = Vec::with_capacity(checks.len());
        let mut first_failure: Option<String> = None;

        for check in checks {
            let status = if check.check == CheckKind::Presence {
                match vectors.get(check.element.as_str()) {
                    Some(_) => CheckStatus::Passed,
                    None => {
                        missing.insert(check.element.as_str());
                        let template = check
                            .errmsg
                            .as_deref()
                            .unwrap_or("You need to use the {name} vector.");
                        CheckStatus::Failed(messages::vector_message(
                            template,
                            &check.element,
                            None,
                        ))
                    }
                }
            } else if check.check.targets_point() {
                run_point_check(check, &snapshot.points)
            } else if missing.contains(check.element.as_str()) {
                CheckStatus::Skipped
            } else {
                run_vector_check(check, &vectors)
            };

            if let CheckStatus::Failed(msg) = &status {
                if first_failure.is_none() {
                    first_failure = Some(msg.clone());
                }
            }
            outcomes.push(CheckOutcome {
                element: check.element.clone(),
                check: check.check,
                status,
            });
        }

        let verdict = match first_failure {
            None => Verdict {
                correct: true,
                msg: self.success_message.clone(),
            },
            Some(msg) => Verdict {
                correct: false,
                msg,
            },
        };
        debug!(correct = verdict.correct, checks = outcomes.len(), "graded snapshot");
        GradeReport { verdict, outcomes }
    }
}

fn resolve_tolerance(check: &Check) -> f64 {
    check.tolerance.unwrap_or(match check.check {
        CheckKind::Angle | CheckKind::SegmentAngle => DEFAULT_ANGLE_TOLERANCE,
        _ => DEFAULT_TOLERANCE,
    })
}

fn run_vector_check(check: &Check, vectors: &IndexMap<&str, GradedVector>) -> CheckStatus {
    let Some(vector) = vectors.get(check.element.as_str()) else {
        // A property check whose vector is absent from the snapshot fails
        // like a presence check would; it never crashes grading.
        let template = check
            .errmsg
            .as_deref()
            .unwrap_or("You need to use the {name} vector.");
        return CheckStatus::Failed(messages::vector_message(template, &check.element, None));
    };

    let result = match check.check {
        CheckKind::Tail => check_endpoint(check, vector, Endpoint::Tail),
        CheckKind::Tip => check_endpoint(check, vector, Endpoint::Tip),
        CheckKind::TailX => check_coordinate(
            check,
            vector,
            vector.tail[0],
            "Vector {name} does not start at correct point.",
        ),
        CheckKind::TailY => check_coordinate(
            check,
            vector,
            vector.tail[1],
            "Vector {name} does not start at correct point.",
        ),
        CheckKind::TipX => check_coordinate(
            check,
            vector,
            vector.tip[0],
            "Vector {name} does not end at correct point.",
        ),
        CheckKind::TipY => check_coordinate(
            check,
            vector,
            vector.tip[1],
            "Vector {name} does not end at correct point.",
        ),
        CheckKind::Coords => check_coords(check, vector),
        CheckKind::Length => check_length(check, vector),
        CheckKind::Angle => check_angle(check, vector),
        CheckKind::SegmentAngle => check_segment_angle(check, vector),
        CheckKind::SegmentCoords => check_segment_coords(check, vector),
        CheckKind::PointsOnLine => check_points_on_line(check, vector),
        // Handled by the caller; listed so the match stays exhaustive.
        CheckKind::Presence | CheckKind::PointCoords => Ok(()),
    };

    match result {
        Ok(()) => CheckStatus::Passed,
        Err(msg) => CheckStatus::Failed(msg),
    }
}

fn run_point_check(check: &Check, points: &IndexMap<String, [f64; 2]>) -> CheckStatus {
    let Some(&coords) = points.get(&check.element) else {
        let template = check
            .errmsg
            .as_deref()
            .unwrap_or("You need to use the {name} point.");
        return CheckStatus::Failed(messages::point_message(template, &check.element, None));
    };
    let expected = match expected_pair(check) {
        Ok(expected) => expected,
        Err(msg) => return CheckStatus::Failed(msg),
    };
    if geometry::distance(expected, coords) > resolve_tolerance(check) {
        let template = check
            .errmsg
            .as_deref()
            .unwrap_or("Point {name} is not at the correct location.");
        return CheckStatus::Failed(messages::point_message(template, &check.element, Some(coords)));
    }
    CheckStatus::Passed
}

// =============================================================================
// Individual check functions
// =============================================================================

enum Endpoint {
    Tail,
    Tip,
}

fn fail(check: &Check, vector: &GradedVector, default_template: &str) -> String {
    let template = check.errmsg.as_deref().unwrap_or(default_template);
    messages::vector_message(template, &vector.name, Some(vector))
}

fn check_endpoint(check: &Check, vector: &GradedVector, endpoint: Endpoint) -> Result<(), String> {
    let expected = expected_pair(check)?;
    let (actual, template) = match endpoint {
        Endpoint::Tail => (vector.tail, "Vector {name} does not start at correct point."),
        Endpoint::Tip => (vector.tip, "Vector {name} does not end at correct point."),
    };
    if geometry::distance(expected, actual) > resolve_tolerance(check) {
        return Err(fail(check, vector, template));
    }
    Ok(())
}

fn check_coordinate(
    check: &Check,
    vector: &GradedVector,
    actual: f64,
    default_template: &str,
) -> Result<(), String> {
    let expected = expected_number(check)?;
    if (expected - actual).abs() > resolve_tolerance(check) {
        return Err(fail(check, vector, default_template));
    }
    Ok(())
}

fn check_coords(check: &Check, vector: &GradedVector) -> Result<(), String> {
    let expected = expected_coord_pairs(check)?;
    if !coords_within_tolerance(vector, &expected, resolve_tolerance(check)) {
        return Err(fail(check, vector, "Vector {name} coordinates are not correct."));
    }
    Ok(())
}

fn check_segment_coords(check: &Check, vector: &GradedVector) -> Result<(), String> {
    // Segments are undirected, so either orientation may match.
    let expected = expected_coord_pairs(check)?;
    let tolerance = resolve_tolerance(check);
    if !(coords_within_tolerance(vector, &expected, tolerance)
        || coords_within_tolerance(&vector.opposite(), &expected, tolerance))
    {
        return Err(fail(check, vector, "Segment {name} coordinates are not correct."));
    }
    Ok(())
}

fn check_length(check: &Check, vector: &GradedVector) -> Result<(), String> {
    let expected = expected_number(check)?;
    if (vector.length - expected).abs() > resolve_tolerance(check) {
        return Err(fail(
            check,
            vector,
            "The length of {name} is incorrect. Your length: {length:.1f}",
        ));
    }
    Ok(())
}

fn check_angle(check: &Check, vector: &GradedVector) -> Result<(), String> {
    let expected = expected_number(check)?.to_radians();
    if !angle_within_tolerance(vector, expected, resolve_tolerance(check)) {
        return Err(fail(
            check,
            vector,
            "The angle of {name} is incorrect. Your angle: {angle:.1f}",
        ));
    }
    Ok(())
}

fn check_segment_angle(check: &Check, vector: &GradedVector) -> Result<(), String> {
    // Undirected: compare against the expected direction and its opposite.
    let expected = expected_number(check)?.to_radians();
    let tolerance = resolve_tolerance(check);
    if !(angle_within_tolerance(vector, expected, tolerance)
        || angle_within_tolerance(&vector.opposite(), expected, tolerance))
    {
        return Err(fail(
            check,
            vector,
            "The angle of {name} is incorrect. Your angle: {angle:.1f}",
        ));
    }
    Ok(())
}

fn check_points_on_line(check: &Check, vector: &GradedVector) -> Result<(), String> {
    let points = expected_point_list(check)?;
    let tolerance = resolve_tolerance(check);
    for point in points {
        if geometry::distance_point_to_line(vector.tail, vector.tip, point) > tolerance {
            return Err(fail(
                check,
                vector,
                "The line {name} does not pass through the correct points.",
            ));
        }
    }
    Ok(())
}

/// Angular separation between the vector and the unit vector at
/// `expected_rad`, via the projection. A degenerate vector yields NaN,
/// which fails the comparison cleanly.
fn angle_within_tolerance(vector: &GradedVector, expected_rad: f64, tolerance: f64) -> bool {
    let dx = vector.tip[0] - vector.tail[0];
    let dy = vector.tip[1] - vector.tail[1];
    let dot = dx * expected_rad.cos() + dy * expected_rad.sin();
    let separation = (dot / vector.length).clamp(-1.0, 1.0).acos().to_degrees();
    separation.abs() <= tolerance
}

fn coords_within_tolerance(
    vector: &GradedVector,
    expected: &[[CoordSpec; 2]; 2],
    tolerance: f64,
) -> bool {
    let endpoints = [(expected[0], vector.tail), (expected[1], vector.tip)];
    endpoints.iter().all(|(spec, actual)| {
        let dx = spec[0].delta(actual[0]);
        let dy = spec[1].delta(actual[1]);
        (dx * dx + dy * dy).sqrt() <= tolerance
    })
}

// =============================================================================
// Expected-value extraction
// =============================================================================

/// One coordinate component of a declared position; the `"_"` wildcard
/// accepts any value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CoordSpec {
    Value(f64),
    Any,
}

impl CoordSpec {
    fn delta(self, actual: f64) -> f64 {
        match self {
            Self::Value(expected) => expected - actual,
            Self::Any => 0.0,
        }
    }
}

fn coord_spec(value: &Value) -> Option<CoordSpec> {
    match value {
        Value::String(s) if s == "_" => Some(CoordSpec::Any),
        _ => value.as_f64().map(CoordSpec::Value),
    }
}

fn config_error(check: &Check) -> String {
    format!(
        "The '{}' check for '{}' cannot be evaluated: its expected value is missing or malformed.",
        check.check, check.element
    )
}

fn expected_number(check: &Check) -> Result<f64, String> {
    check
        .expected
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| config_error(check))
}

fn value_as_pair(value: &Value) -> Option<[f64; 2]> {
    let arr = value.as_array()?;
    if arr.len() != 2 {
        return None;
    }
    Some([arr[0].as_f64()?, arr[1].as_f64()?])
}

fn expected_pair(check: &Check) -> Result<[f64; 2], String> {
    check
        .expected
        .as_ref()
        .and_then(value_as_pair)
        .ok_or_else(|| config_error(check))
}

fn expected_coord_pairs(check: &Check) -> Result<[[CoordSpec; 2]; 2], String> {
    let parse_endpoint = |value: &Value| -> Option<[CoordSpec; 2]> {
        let arr = value.as_array()?;
        if arr.len() != 2 {
            return None;
        }
        Some([coord_spec(&arr[0])?, coord_spec(&arr[1])?])
    };
    check
        .expected
        .as_ref()
        .and_then(|value| {
            let arr = value.as_array()?;
            if arr.len() != 2 {
                return None;
            }
            Some([parse_endpoint(&arr[0])?, parse_endpoint(&arr[1])?])
        })
        .ok_or_else(|| config_error(check))
}

fn expected_point_list(check: &Check) -> Result<Vec<[f64; 2]>, String> {
    check
        .expected
        .as_ref()
        .and_then(|value| {
            value
                .as_array()?
                .iter()
                .map(value_as_pair)
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| config_error(check))
}
