//! Board state: authored element settings plus the rendered configuration.
//!
//! The board owns two authored lists (vectors, points) and the live
//! coordinates of whatever is currently rendered. All mutation funnels
//! through the upsert/remove/rename operations here, which enforce the
//! name-uniqueness invariants; there is no ad hoc field assignment from
//! the outside.

pub mod history;
pub mod snapshot;
pub mod types;


pub use history::History;
pub use snapshot::{Snapshot, VectorCoords};
pub use types::{
    BoardEvent, PointSettings, PointStyle, VectorKind, VectorProperties, VectorSettings,
    VectorStyle,
};

use crate::geometry;
use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;

/// Errors raised at the authoring/edit boundary. The prior valid state is
/// always retained when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("an element named '{0}' already exists")]
    DuplicateName(String),

    #[error("no vector at index {0}")]
    UnknownVector(usize),

    #[error("no point at index {0}")]
    UnknownPoint(usize),

    #[error("vector '{0}' has been deleted")]
    DeletedVector(String),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, Clone)]
pub struct Board {
    vectors: Vec<VectorSettings>,
    points: Vec<PointSettings>,
    rendered_vectors: IndexMap<String, VectorCoords>,
    rendered_points: IndexMap<String, [f64; 2]>,
}

impl Board {
    /// Build a board from authored settings and render every element marked
    /// `render` at its default placement. Names share one namespace across
    /// vectors and points; a duplicate among non-deleted elements is a
    /// configuration error.
    pub fn new(vectors: Vec<VectorSettings>, points: Vec<PointSettings>) -> BoardResult<Self> {
        let mut seen = HashSet::new();
        let names = vectors
            .iter()
            .filter(|v| !v.deleted)
            .map(|v| &v.name)
            .chain(points.iter().map(|p| &p.name));
        for name in names {
            if !seen.insert(name.clone()) {
                return Err(BoardError::DuplicateName(name.clone()));
            }
        }

        let mut board = Self {
            vectors,
            points,
            rendered_vectors: IndexMap::new(),
            rendered_points: IndexMap::new(),
        };
        board.render_defaults();
        Ok(board)
    }

    fn render_defaults(&mut self) {
        for idx in 0..self.points.len() {
            if self.points[idx].render {
                let coords = self.points[idx].default_coords();
                self.place_point(idx, coords);
            }
        }
        for idx in 0..self.vectors.len() {
            if self.vectors[idx].render && !self.vectors[idx].deleted {
                let coords = self.vectors[idx].default_coords();
                self.place_vector(idx, coords);
            }
        }
    }

    // Internal render-or-move; callers have validated `idx`.
    fn place_vector(&mut self, idx: usize, coords: VectorCoords) -> BoardEvent {
        let name = &self.vectors[idx].name;
        if let Some(existing) = self.rendered_vectors.get_mut(name) {
            *existing = coords;
            BoardEvent::VectorMoved { idx }
        } else {
            self.rendered_vectors.insert(name.clone(), coords);
            BoardEvent::VectorCreated { idx }
        }
    }

    fn place_point(&mut self, idx: usize, coords: [f64; 2]) -> BoardEvent {
        let name = &self.points[idx].name;
        if let Some(existing) = self.rendered_points.get_mut(name) {
            *existing = coords;
            BoardEvent::PointMoved { idx }
        } else {
            self.rendered_points.insert(name.clone(), coords);
            BoardEvent::PointCreated { idx }
        }
    }

    // =========================================================================
    // Entity operations
    // =========================================================================

    /// Render-or-move: place the vector at `coords`, or at its authored
    /// default placement when `coords` is `None`. Idempotent on an already
    /// rendered vector apart from the coordinate update.
    pub fn upsert_vector(
        &mut self,
        idx: usize,
        coords: Option<VectorCoords>,
    ) -> BoardResult<BoardEvent> {
        let settings = self.vectors.get(idx).ok_or(BoardError::UnknownVector(idx))?;
        if settings.deleted {
            return Err(BoardError::DeletedVector(settings.name.clone()));
        }
        let coords = match coords {
            Some(c) => c,
            None => settings.default_coords(),
        };
        Ok(self.place_vector(idx, coords))
    }

    /// Render-or-move for points; see [`Board::upsert_vector`].
    pub fn upsert_point(&mut self, idx: usize, coords: Option<[f64; 2]>) -> BoardResult<BoardEvent> {
        let settings = self.points.get(idx).ok_or(BoardError::UnknownPoint(idx))?;
        let coords = match coords {
            Some(c) => c,
            None => settings.default_coords(),
        };
        Ok(self.place_point(idx, coords))
    }

    /// Remove the rendered vector, if present. The vector record carries its
    /// own endpoints, so this is a single detach with nothing dependent left
    /// behind. The settings record is untouched.
    pub fn remove_vector(&mut self, idx: usize) -> BoardResult<Option<BoardEvent>> {
        let name = self
            .vectors
            .get(idx)
            .ok_or(BoardError::UnknownVector(idx))?
            .name
            .clone();
        Ok(self
            .rendered_vectors
            .shift_remove(&name)
            .map(|_| BoardEvent::VectorRemoved { idx }))
    }

    /// Remove the rendered point, if present.
    pub fn remove_point(&mut self, idx: usize) -> BoardResult<Option<BoardEvent>> {
        let name = self
            .points
            .get(idx)
            .ok_or(BoardError::UnknownPoint(idx))?
            .name
            .clone();
        Ok(self
            .rendered_points
            .shift_remove(&name)
            .map(|_| BoardEvent::PointRemoved { idx }))
    }

    /// Rename a vector. Rejected when another non-deleted element already
    /// uses `new_name`; on rejection nothing changes, including the rendered
    /// record. Expected-result mappings are owned by the caller and must be
    /// re-keyed only after this succeeds.
    pub fn rename_vector(&mut self, idx: usize, new_name: &str) -> BoardResult<()> {
        let old_name = self
            .vectors
            .get(idx)
            .ok_or(BoardError::UnknownVector(idx))?
            .name
            .clone();
        if old_name == new_name {
            return Ok(());
        }
        let vector_clash = self
            .vectors
            .iter()
            .enumerate()
            .any(|(i, v)| i != idx && !v.deleted && v.name == new_name);
        let point_clash = self.points.iter().any(|p| p.name == new_name);
        if vector_clash || point_clash {
            return Err(BoardError::DuplicateName(new_name.to_string()));
        }

        self.vectors[idx].name = new_name.to_string();
        if let Some(coords) = self.rendered_vectors.shift_remove(&old_name) {
            self.rendered_vectors.insert(new_name.to_string(), coords);
        }
        info!(from = %old_name, to = %new_name, "vector renamed");
        Ok(())
    }

    /// Soft-delete a vector: the settings record survives for the session,
    /// but the element disappears from rendering, snapshots, grading and
    /// persistence. Terminal within a session.
    pub fn delete_vector(&mut self, idx: usize) -> BoardResult<Option<BoardEvent>> {
        let settings = self
            .vectors
            .get_mut(idx)
            .ok_or(BoardError::UnknownVector(idx))?;
        settings.deleted = true;
        let name = settings.name.clone();
        info!(name = %name, "vector deleted");
        Ok(self
            .rendered_vectors
            .shift_remove(&name)
            .map(|_| BoardEvent::VectorRemoved { idx }))
    }

    /// Drop all rendered state and re-render the authored defaults. The only
    /// operation that fully destroys placed elements.
    pub fn reset(&mut self) {
        info!("board reset");
        self.rendered_vectors.clear();
        self.rendered_points.clear();
        self.render_defaults();
    }

    // =========================================================================
    // Snapshot capture / restore
    // =========================================================================

    /// Record the live coordinates of every rendered element, in settings
    /// declaration order. Elements not (yet) rendered are omitted.
    pub fn capture(&self) -> Snapshot {
        let mut state = Snapshot::new();
        for settings in self.vectors.iter().filter(|v| !v.deleted) {
            if let Some(coords) = self.rendered_vectors.get(&settings.name) {
                state.vectors.insert(settings.name.clone(), *coords);
            }
        }
        for settings in &self.points {
            if let Some(coords) = self.rendered_points.get(&settings.name) {
                state.points.insert(settings.name.clone(), *coords);
            }
        }
        state
    }

    /// Full reconciliation against `state`: every authored element present in
    /// the snapshot is upserted at the recorded coordinates, every absent one
    /// is removed. `restore(capture())` leaves the board observably unchanged.
    pub fn restore(&mut self, state: &Snapshot) {
        for idx in 0..self.vectors.len() {
            if self.vectors[idx].deleted {
                continue;
            }
            let name = self.vectors[idx].name.clone();
            match state.vectors.get(&name) {
                Some(coords) => {
                    self.place_vector(idx, *coords);
                }
                None => {
                    self.rendered_vectors.shift_remove(&name);
                }
            }
        }
        for idx in 0..self.points.len() {
            let name = self.points[idx].name.clone();
            match state.points.get(&name) {
                Some(coords) => {
                    self.place_point(idx, *coords);
                }
                None => {
                    self.rendered_points.shift_remove(&name);
                }
            }
        }
    }

    // =========================================================================
    // Lookups & derived quantities
    // =========================================================================

    pub fn vector_settings(&self) -> &[VectorSettings] {
        &self.vectors
    }

    pub fn point_settings(&self) -> &[PointSettings] {
        &self.points
    }

    /// Linear lookup by name over the non-deleted authored vectors; the
    /// authored list is small and this is not a hot path.
    pub fn settings_by_name(&self, name: &str) -> Option<&VectorSettings> {
        self.vectors.iter().find(|v| !v.deleted && v.name == name)
    }

    pub fn vector_index(&self, name: &str) -> Option<usize> {
        self.vectors
            .iter()
            .position(|v| !v.deleted && v.name == name)
    }

    pub fn point_index(&self, name: &str) -> Option<usize> {
        self.points.iter().position(|p| p.name == name)
    }

    /// Live coordinates of a rendered vector.
    pub fn vector_coords(&self, name: &str) -> Option<VectorCoords> {
        self.rendered_vectors.get(name).copied()
    }

    /// Live coordinates of a rendered point.
    pub fn point_coords(&self, name: &str) -> Option<[f64; 2]> {
        self.rendered_points.get(name).copied()
    }

    /// Display-only derived quantities of a rendered vector. Length honors
    /// the authored `length_factor`, the angle is measured against
    /// `base_angle`; `slope` is only meaningful for line-kind elements and
    /// never enters grading.
    pub fn vector_properties(&self, name: &str) -> Option<VectorProperties> {
        let settings = self.settings_by_name(name)?;
        let coords = self.rendered_vectors.get(name)?;
        Some(VectorProperties {
            name: settings.name.clone(),
            label: settings
                .style
                .label
                .clone()
                .unwrap_or_else(|| settings.name.clone()),
            length: geometry::length_of(coords.tail, coords.tip, settings.length_factor),
            angle: geometry::angle_of(coords.tail, coords.tip, settings.base_angle),
            slope: geometry::slope(coords.tail, coords.tip),
            length_units: settings.length_units.clone(),
        })
    }

    // =========================================================================
    // Authoring persistence
    // =========================================================================

    /// Vector settings with live coordinates folded in and soft-deleted
    /// records filtered out, ready for the field-storage collaborator.
    pub fn export_vectors(&self) -> Vec<VectorSettings> {
        self.vectors
            .iter()
            .filter(|v| !v.deleted)
            .map(|v| {
                let mut out = v.clone();
                if let Some(coords) = self.rendered_vectors.get(&v.name) {
                    out.coords = Some([coords.tail, coords.tip]);
                }
                out
            })
            .collect()
    }

    /// Point settings with live coordinates folded in.
    pub fn export_points(&self) -> Vec<PointSettings> {
        self.points
            .iter()
            .map(|p| {
                let mut out = p.clone();
                if let Some(coords) = self.rendered_points.get(&p.name) {
                    out.coords = Some(*coords);
                }
                out
            })
            .collect()
    }
}
