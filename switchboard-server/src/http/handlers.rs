//! Room management surface. Every handler receives the caller's verified
//! participant id from the identity layer; capacity and rate rejections are
//! structured responses, not connection-level failures.

use crate::http::AppState;
use crate::room::{CreateRoomError, RoomHandle};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use serde::Serialize;
use switchboard_core::{JoinOutcome, ParticipantId, RoomId};

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn error(status: StatusCode, message: &'static str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentityBody {
    participant_id: ParticipantId,
}

pub async fn me(Extension(participant): Extension<ParticipantId>) -> Response {
    Json(IdentityBody {
        participant_id: participant,
    })
    .into_response()
}

pub async fn relay_credentials(
    State(state): State<AppState>,
    Extension(participant): Extension<ParticipantId>,
) -> Response {
    Json(state.relay_credentials.issue(&participant)).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBody {
    room_id: RoomId,
}

pub async fn create_room(
    State(state): State<AppState>,
    Extension(participant): Extension<ParticipantId>,
) -> Response {
    match state.lifecycle.create_room(participant) {
        Ok(room_id) => Json(CreatedBody { room_id }).into_response(),
        Err(CreateRoomError::RateLimited) => error(
            StatusCode::TOO_MANY_REQUESTS,
            "room creation limit exceeded",
        ),
    }
}

#[derive(Serialize)]
struct JoinBody {
    status: &'static str,
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Extension(participant): Extension<ParticipantId>,
) -> Response {
    let Some(handle) = resolve(&state, &room_id) else {
        return error(StatusCode::NOT_FOUND, "room not found");
    };

    match handle.room().join(participant) {
        JoinOutcome::Joined => Json(JoinBody { status: "joined" }).into_response(),
        JoinOutcome::AlreadyJoined => Json(JoinBody {
            status: "alreadyJoined",
        })
        .into_response(),
        JoinOutcome::Full => error(StatusCode::CONFLICT, "room full"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExistsBody {
    room_id: RoomId,
    exists: bool,
}

pub async fn room_exists(State(state): State<AppState>, Path(room_id): Path<String>) -> Response {
    match resolve(&state, &room_id) {
        Some(handle) => Json(ExistsBody {
            room_id: handle.room().id(),
            exists: true,
        })
        .into_response(),
        None => error(StatusCode::NOT_FOUND, "room not found"),
    }
}

fn resolve(state: &AppState, room_id: &str) -> Option<RoomHandle> {
    room_id
        .parse::<RoomId>()
        .ok()
        .and_then(|id| state.registry.get(&id))
}
