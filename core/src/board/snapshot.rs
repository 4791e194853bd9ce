//! Snapshots of the visible board configuration.
//!
//! A snapshot records the live coordinates of every rendered element and
//! nothing else; authored settings are not part of it. Capture order follows
//! the settings declaration order, so serializing the same configuration
//! always produces the same bytes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Live coordinates of one rendered vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorCoords {
    pub tail: [f64; 2],
    pub tip: [f64; 2],
}

/// The full visible configuration at one instant. Two snapshots are equal
/// iff their key sets and values are equal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub vectors: IndexMap<String, VectorCoords>,
    pub points: IndexMap<String, [f64; 2]>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty() && self.points.is_empty()
    }
}
