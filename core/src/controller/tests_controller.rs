//! Tests for the pointer-gesture state machine.

use crate::board::types::{VectorKind, VectorSettings};
use crate::board::{Board, History, VectorCoords};
use crate::controller::{Controller, DragAnchor, DragState, ElementKind, ElementRef, HitTarget};

fn board_with_kinds() -> Board {
    let vectors = vec![
        VectorSettings {
            name: "arrow".to_string(),
            kind: VectorKind::Arrow,
            render: true,
            coords: Some([[0.0, 0.0], [2.0, 0.0]]),
            ..VectorSettings::default()
        },
        VectorSettings {
            name: "seg".to_string(),
            kind: VectorKind::Segment,
            render: true,
            coords: Some([[0.0, 2.0], [2.0, 2.0]]),
            ..VectorSettings::default()
        },
        VectorSettings {
            name: "pending".to_string(),
            ..VectorSettings::default()
        },
    ];
    Board::new(vectors, Vec::new()).expect("valid settings")
}

fn anchor_hit(name: &str, anchor: DragAnchor) -> Option<HitTarget> {
    Some(HitTarget::VectorAnchor {
        name: name.to_string(),
        anchor,
    })
}

#[test]
fn test_draw_gesture_creates_zero_length_vector_then_tracks_tip() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    controller.select_element(Some(ElementRef {
        kind: ElementKind::Vector,
        idx: 2,
    }));
    controller
        .pointer_down(&mut board, &mut history, [1.0, 1.0], None)
        .unwrap();

    assert_eq!(controller.drag_state(), DragState::Drawing { idx: 2 });
    assert_eq!(
        board.vector_coords("pending"),
        Some(VectorCoords {
            tail: [1.0, 1.0],
            tip: [1.0, 1.0],
        })
    );
    // Selection is consumed by the gesture
    assert_eq!(controller.pending_selection(), None);

    controller.pointer_move(&mut board, [4.0, 5.0]).unwrap();
    assert_eq!(
        board.vector_coords("pending"),
        Some(VectorCoords {
            tail: [1.0, 1.0],
            tip: [4.0, 5.0],
        })
    );

    controller.pointer_up();
    assert_eq!(controller.drag_state(), DragState::Idle);
}

#[test]
fn test_history_pushed_once_per_gesture() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    controller.select_element(Some(ElementRef {
        kind: ElementKind::Vector,
        idx: 2,
    }));
    controller
        .pointer_down(&mut board, &mut history, [1.0, 1.0], None)
        .unwrap();
    for step in 0..10 {
        controller
            .pointer_move(&mut board, [step as f64, 2.0])
            .unwrap();
    }
    controller.pointer_up();

    // One entry for the whole gesture regardless of drag granularity; undo
    // returns to the pre-gesture board.
    let target = history.undo(board.capture()).expect("undo available");
    board.restore(&target);
    assert!(board.vector_coords("pending").is_none());
    assert!(!history.can_undo());
}

#[test]
fn test_tip_drag_moves_only_the_tip() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    controller
        .pointer_down(
            &mut board,
            &mut history,
            [2.0, 0.0],
            anchor_hit("arrow", DragAnchor::Tip),
        )
        .unwrap();
    assert_eq!(
        controller.drag_state(),
        DragState::Dragging {
            idx: 0,
            anchor: DragAnchor::Tip
        }
    );

    controller.pointer_move(&mut board, [3.0, 3.0]).unwrap();
    assert_eq!(
        board.vector_coords("arrow"),
        Some(VectorCoords {
            tail: [0.0, 0.0],
            tip: [3.0, 3.0],
        })
    );
}

#[test]
fn test_segment_tail_drags_but_arrow_tail_does_not() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    controller
        .pointer_down(
            &mut board,
            &mut history,
            [0.0, 2.0],
            anchor_hit("seg", DragAnchor::Tail),
        )
        .unwrap();
    assert_eq!(
        controller.drag_state(),
        DragState::Dragging {
            idx: 1,
            anchor: DragAnchor::Tail
        }
    );
    controller.pointer_move(&mut board, [-1.0, 2.0]).unwrap();
    assert_eq!(
        board.vector_coords("seg").map(|c| c.tail),
        Some([-1.0, 2.0])
    );
    controller.pointer_up();

    // An arrow tail is pinned: pointer-down there starts no drag
    controller
        .pointer_down(
            &mut board,
            &mut history,
            [0.0, 0.0],
            anchor_hit("arrow", DragAnchor::Tail),
        )
        .unwrap();
    assert_eq!(controller.drag_state(), DragState::Idle);
}

#[test]
fn test_pinned_tail_is_creatable_space() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    controller.select_element(Some(ElementRef {
        kind: ElementKind::Vector,
        idx: 2,
    }));
    // Pointer-down on the arrow's pinned tail creates the pending vector
    let events = controller
        .pointer_down(
            &mut board,
            &mut history,
            [0.0, 0.0],
            anchor_hit("arrow", DragAnchor::Tail),
        )
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(controller.drag_state(), DragState::Drawing { idx: 2 });
    assert!(board.vector_coords("pending").is_some());
}

#[test]
fn test_tail_pin_restored_on_release() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    assert!(controller.tail_pinned(&board, "arrow"));
    assert!(!controller.tail_pinned(&board, "seg"));

    controller
        .pointer_down(
            &mut board,
            &mut history,
            [2.0, 0.0],
            anchor_hit("arrow", DragAnchor::Tip),
        )
        .unwrap();
    // The pin is lifted for the duration of the gesture
    assert!(!controller.tail_pinned(&board, "arrow"));

    controller.pointer_up();
    assert!(controller.tail_pinned(&board, "arrow"));
}

#[test]
fn test_pointer_down_without_selection_on_open_space_does_nothing() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    let before = board.capture();
    let events = controller
        .pointer_down(&mut board, &mut history, [5.0, 5.0], None)
        .unwrap();
    assert!(events.is_empty());
    assert_eq!(controller.drag_state(), DragState::Idle);
    assert_eq!(board.capture(), before);
}

#[test]
fn test_obstructed_hit_neither_creates_nor_drags() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    controller.select_element(Some(ElementRef {
        kind: ElementKind::Vector,
        idx: 2,
    }));
    let events = controller
        .pointer_down(
            &mut board,
            &mut history,
            [1.0, 0.0],
            Some(HitTarget::Obstructed),
        )
        .unwrap();
    assert!(events.is_empty());
    assert_eq!(controller.drag_state(), DragState::Idle);
    // Selection survives for the next gesture
    assert!(controller.pending_selection().is_some());
}

#[test]
fn test_stale_hit_on_unknown_vector_is_ignored() {
    let mut board = board_with_kinds();
    let mut history = History::new();
    let mut controller = Controller::new();

    let events = controller
        .pointer_down(
            &mut board,
            &mut history,
            [0.0, 0.0],
            anchor_hit("gone", DragAnchor::Tip),
        )
        .unwrap();
    assert!(events.is_empty());
    assert_eq!(controller.drag_state(), DragState::Idle);
}
