use crate::board::snapshot::VectorCoords;
use crate::geometry;
use serde::{Deserialize, Serialize};

/// What a named directed element renders as and how it may be manipulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorKind {
    #[default]
    Vector,
    Arrow,
    Segment,
    Line,
}

impl VectorKind {
    /// Segments and lines may be dragged by the tail; vectors and arrows
    /// keep the tail pinned outside an active gesture.
    pub fn tail_draggable(&self) -> bool {
        matches!(self, Self::Segment | Self::Line)
    }
}

/// Rendering attributes of a vector. Carried for authoring persistence
/// round-trips; the core never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorStyle {
    pub point_size: f64,
    pub point_color: String,
    pub width: f64,
    pub color: String,
    pub label: Option<String>,
    pub label_color: String,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            point_size: 1.0,
            point_color: "red".to_string(),
            width: 4.0,
            color: "blue".to_string(),
            label: None,
            label_color: "black".to_string(),
        }
    }
}

/// Rendering attributes of a point, carried but not interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointStyle {
    pub size: f64,
    pub with_label: bool,
    pub color: String,
    pub show_info_box: bool,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            size: 1.0,
            with_label: false,
            color: "pink".to_string(),
            show_info_box: false,
        }
    }
}

/// Authored configuration of one vector. `name` is its identity and must be
/// unique among non-deleted elements of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    pub name: String,
    /// Accessibility text describing the element.
    pub description: String,
    #[serde(rename = "type")]
    pub kind: VectorKind,
    /// Explicit initial placement; wins over the polar defaults below.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<[[f64; 2]; 2]>,
    pub tail: [f64; 2],
    pub length: f64,
    /// Initial direction in degrees, used when `coords` is absent.
    pub angle: f64,
    /// Whether the element is placed at board init or left for the learner.
    pub render: bool,
    pub length_factor: f64,
    pub length_units: String,
    /// Subtracted from the measured direction for display purposes.
    pub base_angle: f64,
    pub style: VectorStyle,
    /// Soft-delete marker; a deleted vector keeps its settings record but is
    /// excluded from rendering, snapshots, grading, and persistence.
    #[serde(skip_serializing_if = "is_false")]
    pub deleted: bool,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            kind: VectorKind::Vector,
            coords: None,
            tail: [0.0, 0.0],
            length: 5.0,
            angle: 30.0,
            render: false,
            length_factor: 1.0,
            length_units: String::new(),
            base_angle: 0.0,
            style: VectorStyle::default(),
            deleted: false,
        }
    }
}

impl VectorSettings {
    /// Initial placement: explicit `coords` if set, otherwise the tip is
    /// derived from `tail`, `length` and `angle`.
    pub fn default_coords(&self) -> VectorCoords {
        match self.coords {
            Some([tail, tip]) => VectorCoords { tail, tip },
            None => VectorCoords {
                tail: self.tail,
                tip: geometry::vector_from_polar(self.tail, self.length, self.angle),
            },
        }
    }
}

/// Authored configuration of one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointSettings {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<[f64; 2]>,
    /// Fixed points cannot be dragged by the learner.
    pub fixed: bool,
    pub render: bool,
    pub style: PointStyle,
}

impl Default for PointSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            coords: None,
            fixed: true,
            render: true,
            style: PointStyle::default(),
        }
    }
}

impl PointSettings {
    pub fn default_coords(&self) -> [f64; 2] {
        self.coords.unwrap_or([0.0, 0.0])
    }
}

/// Notification emitted by a board mutation, for downstream projections
/// (menu sync, re-render) owned by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum BoardEvent {
    VectorCreated { idx: usize },
    VectorMoved { idx: usize },
    VectorRemoved { idx: usize },
    PointCreated { idx: usize },
    PointMoved { idx: usize },
    PointRemoved { idx: usize },
}

/// Display-only derived quantities of a rendered vector. `slope` is only
/// meaningful for line-kind elements and is never graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorProperties {
    pub name: String,
    /// Label shown at the tip; falls back to the vector name.
    pub label: String,
    pub length: f64,
    pub angle: f64,
    pub slope: f64,
    pub length_units: String,
}

fn is_false(value: &bool) -> bool {
    !value
}
