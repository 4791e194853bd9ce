//! Expansion of an author's expected-result declaration into the ordered
//! check specification consumed by the grading engine.
//!
//! The expansion is deterministic: vector names are visited in declaration
//! order and properties in the fixed order of [`VECTOR_PROPERTIES`], so
//! identical input always yields identical output. Ordering matters for the
//! user-facing message sequencing (first failure wins), not for the verdict.

pub mod types;


pub use types::{Check, CheckKind, ExpectedPositions, ExpectedResult, VectorExpectation};

use serde_json::Value;

/// Checkable vector properties, in the exact order checks are emitted for
/// each vector.
pub const VECTOR_PROPERTIES: [(&str, CheckKind); 12] = [
    ("tail", CheckKind::Tail),
    ("tail_x", CheckKind::TailX),
    ("tail_y", CheckKind::TailY),
    ("tip", CheckKind::Tip),
    ("tip_x", CheckKind::TipX),
    ("tip_y", CheckKind::TipY),
    ("coords", CheckKind::Coords),
    ("length", CheckKind::Length),
    ("angle", CheckKind::Angle),
    ("segment_angle", CheckKind::SegmentAngle),
    ("segment_coords", CheckKind::SegmentCoords),
    ("points_on_line", CheckKind::PointsOnLine),
];

fn string_entry(entry: &VectorExpectation, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Expand `expected` into the ordered check list: one `presence` check per
/// declared vector, then one check per declared property, each carrying the
/// declared tolerance and custom message.
pub fn build_checks(expected: &ExpectedResult) -> Vec<Check> {
    let mut checks = Vec::new();
    for (name, entry) in expected {
        let mut presence = Check::new(name.clone(), CheckKind::Presence);
        presence.errmsg = string_entry(entry, "presence_errmsg");
        checks.push(presence);

        for (property, kind) in VECTOR_PROPERTIES {
            let Some(value) = entry.get(property) else {
                continue;
            };
            checks.push(Check {
                element: name.clone(),
                check: kind,
                expected: Some(value.clone()),
                tolerance: entry
                    .get(&format!("{property}_tolerance"))
                    .and_then(Value::as_f64),
                errmsg: string_entry(entry, &format!("{property}_errmsg")),
            });
        }
    }
    checks
}

/// Re-key a vector's expectation entry after a successful rename, keeping
/// its declaration position. Returns false (and changes nothing) when
/// `old_name` has no entry or `new_name` already has one; callers must have
/// renamed the board vector first, so a collision here is a configuration
/// error on their side.
pub fn rename_expectation(expected: &mut ExpectedResult, old_name: &str, new_name: &str) -> bool {
    if old_name == new_name {
        return true;
    }
    if expected.contains_key(new_name) {
        return false;
    }
    let Some(index) = expected.get_index_of(old_name) else {
        return false;
    };
    let Some((_, entry)) = expected.shift_remove_index(index) else {
        return false;
    };
    expected.insert(new_name.to_string(), entry);
    let last = expected.len() - 1;
    expected.move_index(last, index);
    true
}

/// Expand expected point positions into `point_coords` checks, in
/// declaration order.
pub fn build_point_checks(expected: &ExpectedPositions) -> Vec<Check> {
    expected
        .iter()
        .map(|(name, entry)| Check {
            element: name.clone(),
            check: CheckKind::PointCoords,
            expected: entry.get("coords").cloned(),
            tolerance: entry.get("tolerance").and_then(Value::as_f64),
            errmsg: string_entry(entry, "errmsg"),
        })
        .collect()
}
