//! 2D geometry utilities for the drawing board and the grading engine.
//!
//! Pure functions over `[f64; 2]` board coordinates. Every function is
//! total: degenerate inputs (zero-length vectors, vertical lines) produce
//! the conventional value instead of panicking, so downstream comparisons
//! fail cleanly rather than crash.

/// Tolerance for floating-point degeneracy tests
pub const EPSILON: f64 = 1e-6;

// =============================================================================
// Point Operations
// =============================================================================

/// Compute squared distance between two 2D points.
#[inline]
pub fn distance_squared(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    let dx = p2[0] - p1[0];
    let dy = p2[1] - p1[1];
    dx * dx + dy * dy
}

/// Compute Euclidean distance between two 2D points.
#[inline]
pub fn distance(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    distance_squared(p1, p2).sqrt()
}

// =============================================================================
// Vector Construction & Derived Quantities
// =============================================================================

/// Compute the tip of a vector placed at `tail` with the given `length`
/// and direction `angle_deg` (degrees, counter-clockwise from +x).
/// A zero length yields `tip == tail`.
#[inline]
pub fn vector_from_polar(tail: [f64; 2], length: f64, angle_deg: f64) -> [f64; 2] {
    let radians = angle_deg.to_radians();
    [
        tail[0] + radians.cos() * length,
        tail[1] + radians.sin() * length,
    ]
}

/// Direction of the vector tail→tip in degrees, measured against
/// `base_angle_deg` and normalized into `[0, 360)`.
///
/// `atan2(0, 0)` is conventionally `0`, so for `tail == tip` this returns
/// the normalization of `-base_angle_deg`; comparisons against angles of
/// degenerate vectors get a stable (failing) value rather than an error.
#[inline]
pub fn angle_of(tail: [f64; 2], tip: [f64; 2], base_angle_deg: f64) -> f64 {
    let raw = (tip[1] - tail[1]).atan2(tip[0] - tail[0]).to_degrees();
    normalize_deg_360(raw - base_angle_deg)
}

/// Display length of a vector: `factor` times the Euclidean tail→tip distance.
#[inline]
pub fn length_of(tail: [f64; 2], tip: [f64; 2], factor: f64) -> f64 {
    factor * distance(tail, tip)
}

/// Slope of the line through tail and tip. Vertical lines yield an infinity
/// and `tail == tip` yields NaN, matching IEEE division.
#[inline]
pub fn slope(tail: [f64; 2], tip: [f64; 2]) -> f64 {
    (tip[1] - tail[1]) / (tip[0] - tail[0])
}

/// Normalize an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_deg_360(deg: f64) -> f64 {
    let mut normalized = deg % 360.0;
    if normalized < 0.0 {
        normalized += 360.0;
    }
    normalized
}

// =============================================================================
// Line Operations
// =============================================================================

/// Compute perpendicular distance from `point` to the infinite line through
/// `line_start` and `line_end`. Falls back to point distance when the line
/// is degenerate.
pub fn distance_point_to_line(line_start: [f64; 2], line_end: [f64; 2], point: [f64; 2]) -> f64 {
    let dx = line_end[0] - line_start[0];
    let dy = line_end[1] - line_start[1];
    let len = (dx * dx + dy * dy).sqrt();

    if len < EPSILON {
        return distance(line_start, point);
    }

    let px = point[0] - line_start[0];
    let py = point[1] - line_start[1];
    ((px * dy - py * dx) / len).abs()
}

// =============================================================================
// Tests
// =============================================================================
