use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use vecdraw_core::board::{Board, History, PointSettings, Snapshot, VectorSettings};
use vecdraw_core::checks::{build_checks, Check, ExpectedResult};
use vecdraw_core::controller::{Controller, DragState, ElementRef, HitTarget};
use vecdraw_core::grader::Grader;
use vecdraw_core::submit::{CheckRequest, CheckResponse, SubmissionTracker};

/// Format an error as a JSON message for the frontend
fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": code,
            "message": message,
            "severity": severity
        })
    )
}

/// Authored exercise served to every session.
#[derive(Debug, Clone, Deserialize)]
struct Exercise {
    #[serde(default)]
    vectors: Vec<VectorSettings>,
    #[serde(default)]
    points: Vec<PointSettings>,
    #[serde(default)]
    expected_result: ExpectedResult,
    #[serde(default = "default_success_message")]
    success_message: String,
}

fn default_success_message() -> String {
    "Test passed".to_string()
}

// Application State
struct AppState {
    exercise: Exercise,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let shared_state = Arc::new(AppState {
        exercise: load_exercise(),
    });

    // build our application with a route
    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Exercise configuration comes from the JSON file named on the command
/// line; without one, a small built-in sample is served.
fn load_exercise() -> Exercise {
    if let Some(path) = std::env::args().nth(1) {
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(exercise) => {
                    info!("loaded exercise from {}", path);
                    return exercise;
                }
                Err(e) => warn!("failed to parse exercise {}: {}", path, e),
            },
            Err(e) => warn!("failed to read exercise {}: {}", path, e),
        }
    }
    sample_exercise()
}

fn sample_exercise() -> Exercise {
    serde_json::from_value(json!({
        "vectors": [
            {
                "name": "force",
                "description": "Force applied to the cart",
                "type": "arrow"
            }
        ],
        "expected_result": {
            "force": {
                "presence_errmsg": "Draw the {name} vector.",
                "tail": [0, 0],
                "length": 5,
                "length_tolerance": 0.5,
                "angle": 90
            }
        },
        "success_message": "Correct!"
    }))
    .expect("built-in sample exercise is valid")
}

async fn root() -> &'static str {
    "Hello from vecdraw backend!"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

// Per-session state; the board is owned by this connection alone.
struct Session {
    board: Board,
    history: History,
    controller: Controller,
    tracker: SubmissionTracker,
    grader: Grader,
    checks: Vec<Check>,
}

#[derive(Deserialize)]
struct PointerCmd {
    x: f64,
    y: f64,
    #[serde(default)]
    hit: Option<HitTarget>,
}

fn state_update(board: &Board) -> String {
    let snapshot: Snapshot = board.capture();
    format!(
        "STATE_UPDATE:{}",
        serde_json::to_string(&snapshot).unwrap_or("{}".to_string())
    )
}

/// Properties panel update for the vector under the active gesture, if any.
fn props_update(session: &Session) -> Option<String> {
    let idx = match session.controller.drag_state() {
        DragState::Drawing { idx } | DragState::Dragging { idx, .. } => idx,
        DragState::Idle => return None,
    };
    let name = &session.board.vector_settings().get(idx)?.name;
    let props = session.board.vector_properties(name)?;
    Some(format!(
        "PROPS_UPDATE:{}",
        serde_json::to_string(&props).unwrap_or("{}".to_string())
    ))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("client connected");

    let board = match Board::new(
        state.exercise.vectors.clone(),
        state.exercise.points.clone(),
    ) {
        Ok(board) => board,
        Err(e) => {
            warn!("exercise configuration rejected: {}", e);
            let _ = socket
                .send(Message::Text(format_error(
                    "BAD_EXERCISE",
                    &e.to_string(),
                    "error",
                )))
                .await;
            return;
        }
    };

    let mut session = Session {
        board,
        history: History::new(),
        controller: Controller::new(),
        tracker: SubmissionTracker::new(),
        grader: Grader::new(state.exercise.success_message.clone()),
        checks: build_checks(&state.exercise.expected_result),
    };

    // Send the initial configuration
    if socket
        .send(Message::Text(state_update(&session.board)))
        .await
        .is_err()
    {
        return;
    }

    while let Some(msg) = socket.recv().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        if let Message::Text(text) = msg {
            if let Some(json_str) = text.strip_prefix("SELECT_ELEMENT:") {
                if json_str == "CLEAR" {
                    session.controller.select_element(None);
                } else if let Ok(selected) = serde_json::from_str::<ElementRef>(json_str) {
                    session.controller.select_element(Some(selected));
                } else {
                    warn!("failed to parse selection command: {}", json_str);
                    let _ = socket
                        .send(Message::Text(format_error(
                            "BAD_SELECTION",
                            "selection payload is malformed",
                            "warning",
                        )))
                        .await;
                }
            } else if let Some(json_str) = text.strip_prefix("POINTER_DOWN:") {
                let Ok(cmd) = serde_json::from_str::<PointerCmd>(json_str) else {
                    warn!("failed to parse pointer command: {}", json_str);
                    let _ = socket
                        .send(Message::Text(format_error(
                            "BAD_POINTER",
                            "pointer payload is malformed",
                            "warning",
                        )))
                        .await;
                    continue;
                };
                match session.controller.pointer_down(
                    &mut session.board,
                    &mut session.history,
                    [cmd.x, cmd.y],
                    cmd.hit,
                ) {
                    Ok(events) => {
                        if !events.is_empty()
                            && socket
                                .send(Message::Text(state_update(&session.board)))
                                .await
                                .is_err()
                        {
                            return;
                        }
                        if let Some(props) = props_update(&session) {
                            if socket.send(Message::Text(props)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("pointer-down rejected: {}", e);
                        let _ = socket
                            .send(Message::Text(format_error(
                                "BAD_GESTURE",
                                &e.to_string(),
                                "warning",
                            )))
                            .await;
                    }
                }
            } else if let Some(json_str) = text.strip_prefix("POINTER_MOVE:") {
                let Ok(cmd) = serde_json::from_str::<PointerCmd>(json_str) else {
                    warn!("failed to parse pointer command: {}", json_str);
                    continue;
                };
                match session
                    .controller
                    .pointer_move(&mut session.board, [cmd.x, cmd.y])
                {
                    Ok(Some(_)) => {
                        if socket
                            .send(Message::Text(state_update(&session.board)))
                            .await
                            .is_err()
                        {
                            return;
                        }
                        if let Some(props) = props_update(&session) {
                            if socket.send(Message::Text(props)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("pointer-move rejected: {}", e),
                }
            } else if text == "POINTER_UP" {
                session.controller.pointer_up();
                if socket
                    .send(Message::Text(state_update(&session.board)))
                    .await
                    .is_err()
                {
                    return;
                }
            } else if text == "UNDO" {
                let current = session.board.capture();
                if let Some(target) = session.history.undo(current) {
                    session.board.restore(&target);
                }
                if socket
                    .send(Message::Text(state_update(&session.board)))
                    .await
                    .is_err()
                {
                    return;
                }
            } else if text == "REDO" {
                let current = session.board.capture();
                if let Some(target) = session.history.redo(current) {
                    session.board.restore(&target);
                }
                if socket
                    .send(Message::Text(state_update(&session.board)))
                    .await
                    .is_err()
                {
                    return;
                }
            } else if let Some(json_str) = text.strip_prefix("LOAD_STATE:") {
                // Re-initialize from a previously saved snapshot.
                match serde_json::from_str::<Snapshot>(json_str) {
                    Ok(saved) => {
                        session.board.restore(&saved);
                        if socket
                            .send(Message::Text(state_update(&session.board)))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!("failed to parse saved state: {}", e);
                        let _ = socket
                            .send(Message::Text(format_error(
                                "BAD_STATE",
                                "saved state payload is malformed",
                                "warning",
                            )))
                            .await;
                    }
                }
            } else if text == "RESET" {
                session.history.push(session.board.capture());
                session.board.reset();
                if socket
                    .send(Message::Text(state_update(&session.board)))
                    .await
                    .is_err()
                {
                    return;
                }
            } else if text == "CHECK" {
                // At most one submission outstanding: a newer CHECK
                // supersedes this one and its response would be dropped.
                let token = session.tracker.begin();
                let request =
                    CheckRequest::new(session.board.capture(), session.checks.clone());
                let verdict = session.grader.grade(&request.snapshot(), &request.checks);
                info!(correct = verdict.correct, "graded submission");
                if session.tracker.accept(token) {
                    let response = CheckResponse { result: verdict };
                    let reply = format!(
                        "RESULT_UPDATE:{}",
                        serde_json::to_string(&response).unwrap_or("{}".to_string())
                    );
                    if socket.send(Message::Text(reply)).await.is_err() {
                        return;
                    }
                }
            } else {
                warn!("unknown command: {}", text);
                let _ = socket
                    .send(Message::Text(format_error(
                        "UNKNOWN_COMMAND",
                        "command not recognized",
                        "warning",
                    )))
                    .await;
            }
        }
    }
}
