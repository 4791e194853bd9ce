use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author-declared correctness criteria, keyed by vector name in declaration
/// order. Each entry is a flat mapping of property keys to declared values:
/// an expected value under the property name (e.g. `"length": 5`), an
/// optional `<property>_tolerance`, an optional `<property>_errmsg`, plus
/// `presence_errmsg`. Values stay loosely typed so a malformed declaration
/// surfaces as a failing check at evaluation time instead of a parse error.
pub type ExpectedResult = IndexMap<String, VectorExpectation>;

pub type VectorExpectation = IndexMap<String, Value>;

/// Expected point positions, keyed by point name. Entries use the keys
/// `coords`, `tolerance` and `errmsg`.
pub type ExpectedPositions = IndexMap<String, VectorExpectation>;

/// One atomic, independently evaluated grading predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Presence,
    Tail,
    TailX,
    TailY,
    Tip,
    TipX,
    TipY,
    Coords,
    Length,
    Angle,
    SegmentAngle,
    SegmentCoords,
    PointsOnLine,
    PointCoords,
}

impl CheckKind {
    /// Whether the check targets an entry of the points mapping rather than
    /// the vectors mapping.
    pub fn targets_point(&self) -> bool {
        matches!(self, Self::PointCoords)
    }

    /// The property key this kind is declared under.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Tail => "tail",
            Self::TailX => "tail_x",
            Self::TailY => "tail_y",
            Self::Tip => "tip",
            Self::TipX => "tip_x",
            Self::TipY => "tip_y",
            Self::Coords => "coords",
            Self::Length => "length",
            Self::Angle => "angle",
            Self::SegmentAngle => "segment_angle",
            Self::SegmentCoords => "segment_coords",
            Self::PointsOnLine => "points_on_line",
            Self::PointCoords => "point_coords",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A single entry of the check specification sent to the grading engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Name of the vector (or point, for point checks) under test.
    pub element: String,
    pub check: CheckKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Custom failure message; may reference the placeholders documented in
    /// [`crate::grader`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
}

impl Check {
    pub fn new(element: impl Into<String>, check: CheckKind) -> Self {
        Self {
            element: element.into(),
            check,
            expected: None,
            tolerance: None,
            errmsg: None,
        }
    }
}
