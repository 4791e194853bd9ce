//! Pointer-gesture state machine.
//!
//! Translates raw pointer events (already in board coordinates) into board
//! mutations. Hit testing and menu rendering belong to the rendering
//! collaborator: it supplies a [`HitTarget`] with each pointer-down and
//! mirrors the pending element selection via [`Controller::select_element`].
//!
//! History is pushed exactly once per gesture, on pointer-down, so history
//! growth is bounded by discrete user actions regardless of how many move
//! events a drag produces.

#[cfg(test)]
mod tests_controller;

use crate::board::{Board, BoardEvent, BoardResult, History, VectorCoords};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Vector,
    Point,
}

/// Reference to an authored element awaiting placement, standing in for the
/// out-of-scope element menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub idx: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragAnchor {
    Tail,
    Tip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A new vector is being drawn; the tip tracks the pointer.
    Drawing { idx: usize },
    /// An existing vector's endpoint is being dragged.
    Dragging { idx: usize, anchor: DragAnchor },
}

/// Hit-test result for a pointer-down, supplied by the rendering
/// collaborator; the core does no picking. `None` stands for empty,
/// creatable board space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target")]
pub enum HitTarget {
    /// An anchor point of a rendered vector.
    VectorAnchor { name: String, anchor: DragAnchor },
    /// Some other existing object; neither draggable nor creatable space.
    Obstructed,
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    pending: Option<ElementRef>,
    state: DragState,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the menu selection: the element the next pointer-down on
    /// creatable space will place.
    pub fn select_element(&mut self, selected: Option<ElementRef>) {
        self.pending = selected;
    }

    pub fn pending_selection(&self) -> Option<ElementRef> {
        self.pending
    }

    pub fn drag_state(&self) -> DragState {
        self.state
    }

    /// Start a gesture. Pushes history once, then either begins dragging the
    /// hit anchor or places the pending element at `coords`.
    pub fn pointer_down(
        &mut self,
        board: &mut Board,
        history: &mut History,
        coords: [f64; 2],
        hit: Option<HitTarget>,
    ) -> BoardResult<Vec<BoardEvent>> {
        history.push(board.capture());

        match hit {
            Some(HitTarget::VectorAnchor { name, anchor }) => {
                let Some(idx) = board.vector_index(&name) else {
                    // Stale hit on an element the board no longer knows.
                    return Ok(Vec::new());
                };
                if anchor == DragAnchor::Tail && !board.vector_settings()[idx].kind.tail_draggable()
                {
                    // A pinned tail does not drag, but a new element may be
                    // created on top of it.
                    return self.begin_create(board, coords);
                }
                debug!(name = %name, ?anchor, "drag started");
                self.state = DragState::Dragging { idx, anchor };
                Ok(Vec::new())
            }
            Some(HitTarget::Obstructed) => Ok(Vec::new()),
            None => self.begin_create(board, coords),
        }
    }

    fn begin_create(&mut self, board: &mut Board, coords: [f64; 2]) -> BoardResult<Vec<BoardEvent>> {
        let Some(selected) = self.pending else {
            return Ok(Vec::new());
        };
        match selected.kind {
            ElementKind::Vector => {
                let event = board.upsert_vector(
                    selected.idx,
                    Some(VectorCoords {
                        tail: coords,
                        tip: coords,
                    }),
                )?;
                self.state = DragState::Drawing { idx: selected.idx };
                self.pending = None;
                Ok(vec![event])
            }
            ElementKind::Point => {
                let event = board.upsert_point(selected.idx, Some(coords))?;
                self.pending = None;
                Ok(vec![event])
            }
        }
    }

    /// Continue a gesture: while drawing, the tip tracks the pointer; while
    /// dragging, the grabbed endpoint follows it. A no-op when idle.
    pub fn pointer_move(
        &mut self,
        board: &mut Board,
        coords: [f64; 2],
    ) -> BoardResult<Option<BoardEvent>> {
        let (idx, anchor) = match self.state {
            DragState::Idle => return Ok(None),
            DragState::Drawing { idx } => (idx, DragAnchor::Tip),
            DragState::Dragging { idx, anchor } => (idx, anchor),
        };
        let Some(settings) = board.vector_settings().get(idx) else {
            return Ok(None);
        };
        let mut current = board
            .vector_coords(&settings.name)
            .unwrap_or(VectorCoords {
                tail: coords,
                tip: coords,
            });
        match anchor {
            DragAnchor::Tail => current.tail = coords,
            DragAnchor::Tip => current.tip = coords,
        }
        board.upsert_vector(idx, Some(current)).map(Some)
    }

    /// End the gesture. Returning to [`DragState::Idle`] restores the tail
    /// pin of vector- and arrow-kind elements (see [`Controller::tail_pinned`]).
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Whether the named vector's tail is currently pinned. Segments and
    /// lines never pin; vectors and arrows pin except while they are the
    /// active gesture target.
    pub fn tail_pinned(&self, board: &Board, name: &str) -> bool {
        let Some(settings) = board.settings_by_name(name) else {
            return false;
        };
        if settings.kind.tail_draggable() {
            return false;
        }
        match self.state {
            DragState::Drawing { idx } | DragState::Dragging { idx, .. } => {
                board.vector_index(name) != Some(idx)
            }
            DragState::Idle => true,
        }
    }
}
