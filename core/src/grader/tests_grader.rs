//! Tests for the grading engine: tolerance handling, failure independence
//! and message selection.

use crate::board::snapshot::{Snapshot, VectorCoords};
use crate::checks::{build_checks, build_point_checks, Check, CheckKind};
use crate::grader::{CheckStatus, Grader, DEFAULT_SUCCESS_MESSAGE};

fn snapshot_with(vectors: &[(&str, [f64; 2], [f64; 2])]) -> Snapshot {
    let mut state = Snapshot::new();
    for (name, tail, tip) in vectors {
        state.vectors.insert(
            name.to_string(),
            VectorCoords {
                tail: *tail,
                tip: *tip,
            },
        );
    }
    state
}

fn checks_from(json: &str) -> Vec<Check> {
    build_checks(&serde_json::from_str(json).expect("valid expected result"))
}

#[test]
fn test_concrete_length_scenario() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v1": {"length": 5, "length_tolerance": 0.1}}"#);

    // tail [0,0], tip [3,4] → length exactly 5.00
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.0])]), &checks);
    assert!(verdict.correct);
    assert_eq!(verdict.msg, DEFAULT_SUCCESS_MESSAGE);

    // tip [3,4.5] → length ≈ 5.41, outside the 0.1 tolerance
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.5])]), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "The length of v1 is incorrect. Your length: 5.4");
}

#[test]
fn test_custom_failure_message_wins() {
    let grader = Grader::default();
    let checks = checks_from(
        r#"{"v1": {"length": 5, "length_tolerance": 0.1, "length_errmsg": "Vector {name} is too long."}}"#,
    );
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.5])]), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "Vector v1 is too long.");
}

#[test]
fn test_tolerance_boundary_is_inclusive() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v1": {"length": 10, "length_tolerance": 0.5}}"#);

    for (length, expected_pass) in [(9.5, true), (10.5, true), (9.49, false), (10.51, false)] {
        let verdict = grader.grade(
            &snapshot_with(&[("v1", [0.0, 0.0], [length, 0.0])]),
            &checks,
        );
        assert_eq!(
            verdict.correct, expected_pass,
            "length {} should {}",
            length,
            if expected_pass { "pass" } else { "fail" }
        );
    }
}

#[test]
fn test_angle_check_with_default_tolerance() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v1": {"angle": 53.13}}"#);

    // atan2(4, 3) ≈ 53.13°, well within the 2-degree default
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.0])]), &checks);
    assert!(verdict.correct);

    // Pointing along +x is 53° off
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [5.0, 0.0])]), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "The angle of v1 is incorrect. Your angle: 0.0");
}

#[test]
fn test_degenerate_vector_fails_angle_check_without_panicking() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v1": {"angle": 45}}"#);
    let verdict = grader.grade(&snapshot_with(&[("v1", [2.0, 2.0], [2.0, 2.0])]), &checks);
    assert!(!verdict.correct);
}

#[test]
fn test_segment_angle_accepts_opposite_orientation() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"s1": {"segment_angle": 90}}"#);

    // Drawn downward: 270° as a vector, but valid as an undirected segment
    let verdict = grader.grade(&snapshot_with(&[("s1", [0.0, 3.0], [0.0, 0.0])]), &checks);
    assert!(verdict.correct);

    let directed = checks_from(r#"{"s1": {"angle": 90}}"#);
    let verdict = grader.grade(&snapshot_with(&[("s1", [0.0, 3.0], [0.0, 0.0])]), &directed);
    assert!(!verdict.correct);
}

#[test]
fn test_segment_coords_accepts_swapped_endpoints() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"s1": {"segment_coords": [[0, 0], [2, 2]]}}"#);
    let verdict = grader.grade(&snapshot_with(&[("s1", [2.0, 2.0], [0.0, 0.0])]), &checks);
    assert!(verdict.correct);

    let directed = checks_from(r#"{"s1": {"coords": [[0, 0], [2, 2]]}}"#);
    let verdict = grader.grade(&snapshot_with(&[("s1", [2.0, 2.0], [0.0, 0.0])]), &directed);
    assert!(!verdict.correct);
}

#[test]
fn test_coords_wildcard_component_accepts_any_value() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v1": {"coords": [[0, 0], ["_", 4]]}}"#);

    for tip_x in [-20.0, 0.0, 35.5] {
        let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [tip_x, 4.0])]), &checks);
        assert!(verdict.correct, "tip x {} should be accepted", tip_x);
    }

    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [1.0, 9.0])]), &checks);
    assert!(!verdict.correct);
}

#[test]
fn test_endpoint_and_component_checks() {
    let grader = Grader::default();
    let checks = checks_from(
        r#"{"v1": {"tail": [0, 0], "tip": [3, 4], "tail_x": 0, "tip_y": 4}}"#,
    );
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.2, 0.1], [3.4, 3.8])]), &checks);
    assert!(verdict.correct);

    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 6.0])]), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "Vector v1 does not end at correct point.");
}

#[test]
fn test_points_on_line_uses_perpendicular_distance() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"l1": {"points_on_line": [[5, 5], [-3, -3]]}}"#);

    // The line through [0,0] and [1,1] passes through both points
    let verdict = grader.grade(&snapshot_with(&[("l1", [0.0, 0.0], [1.0, 1.0])]), &checks);
    assert!(verdict.correct);

    let verdict = grader.grade(&snapshot_with(&[("l1", [0.0, 0.0], [1.0, 0.0])]), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "The line l1 does not pass through the correct points.");
}

#[test]
fn test_presence_failure_uses_custom_message() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v9": {"presence_errmsg": "Draw the {name} vector first."}}"#);
    let verdict = grader.grade(&Snapshot::new(), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "Draw the v9 vector first.");
}

#[test]
fn test_failing_vector_does_not_abort_grading_of_the_rest() {
    let grader = Grader::default();
    // B is declared first and missing; A is present and correct.
    let checks = checks_from(
        r#"{
            "b": {"length": 2},
            "a": {"length": 5, "angle": 53.13}
        }"#,
    );
    let report = grader.grade_detailed(&snapshot_with(&[("a", [0.0, 0.0], [3.0, 4.0])]), &checks);

    assert!(!report.verdict.correct);
    assert_eq!(report.verdict.msg, "You need to use the b vector.");

    // b's property check was suppressed, a's checks were still evaluated
    assert_eq!(report.outcomes[0].status, CheckStatus::Failed("You need to use the b vector.".to_string()));
    assert_eq!(report.outcomes[1].status, CheckStatus::Skipped);
    assert_eq!(report.outcomes[2].status, CheckStatus::Passed);
    assert_eq!(report.outcomes[3].status, CheckStatus::Passed);
    assert_eq!(report.outcomes[4].status, CheckStatus::Passed);
}

#[test]
fn test_first_failure_message_with_conjunctive_verdict() {
    let grader = Grader::default();
    let checks = checks_from(
        r#"{
            "a": {"length": 99, "length_errmsg": "first"},
            "b": {"angle": 90, "angle_errmsg": "second"}
        }"#,
    );
    let snapshot = snapshot_with(&[
        ("a", [0.0, 0.0], [3.0, 4.0]),
        ("b", [0.0, 0.0], [1.0, 0.0]),
    ]);
    let report = grader.grade_detailed(&snapshot, &checks);
    assert!(!report.verdict.correct);
    assert_eq!(report.verdict.msg, "first");
    // The second failure was still evaluated and recorded
    assert_eq!(report.outcomes[3].status, CheckStatus::Failed("second".to_string()));
}

#[test]
fn test_malformed_expected_value_is_a_failing_check() {
    let grader = Grader::default();
    let checks = checks_from(r#"{"v1": {"length": "five"}}"#);
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.0])]), &checks);
    assert!(!verdict.correct);
    assert!(verdict.msg.contains("cannot be evaluated"), "got: {}", verdict.msg);

    // Tolerance of the wrong type degrades to the default instead of failing
    let checks = checks_from(r#"{"v1": {"length": 5, "length_tolerance": "tight"}}"#);
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.0])]), &checks);
    assert!(verdict.correct);
}

#[test]
fn test_property_check_for_absent_vector_fails_cleanly() {
    let grader = Grader::default();
    // A hand-built specification without a presence check
    let checks = vec![Check {
        element: "ghost".to_string(),
        check: CheckKind::Length,
        expected: Some(serde_json::json!(5)),
        tolerance: None,
        errmsg: None,
    }];
    let verdict = grader.grade(&Snapshot::new(), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "You need to use the ghost vector.");
}

#[test]
fn test_point_coords_check() {
    let grader = Grader::default();
    let positions = serde_json::from_str(
        r#"{"p0": {"coords": [2, 3], "tolerance": 0.5}}"#,
    )
    .unwrap();
    let checks = build_point_checks(&positions);

    let mut snapshot = Snapshot::new();
    snapshot.points.insert("p0".to_string(), [2.2, 3.1]);
    assert!(grader.grade(&snapshot, &checks).correct);

    snapshot.points.insert("p0".to_string(), [4.0, 3.0]);
    let verdict = grader.grade(&snapshot, &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "Point p0 is not at the correct location.");

    // Missing point is a failing check, not a crash
    let verdict = grader.grade(&Snapshot::new(), &checks);
    assert!(!verdict.correct);
    assert_eq!(verdict.msg, "You need to use the p0 point.");
}

#[test]
fn test_custom_success_message() {
    let grader = Grader::new("Great work!");
    let checks = checks_from(r#"{"v1": {"length": 5}}"#);
    let verdict = grader.grade(&snapshot_with(&[("v1", [0.0, 0.0], [3.0, 4.0])]), &checks);
    assert!(verdict.correct);
    assert_eq!(verdict.msg, "Great work!");
}
