use crate::http::AppState;
use crate::room::{RoomHandle, SessionCommand};
use crate::signaling::{ConnectionHandle, OutboundFrame};
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::Extension;
use futures::{SinkExt, StreamExt};
use switchboard_core::{ClientMessage, CloseCode, ParticipantId, RoomId};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Single entry point for inbound connections. The room id comes from the
/// path and the participant id from the identity layer; resolution failures
/// close with a code that tells the client whether a retry can help. No
/// authorization happens here, that is the room session's job.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    participant: Option<Extension<ParticipantId>>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let participant = participant.map(|Extension(p)| p);
    ws.on_upgrade(move |socket| route_connection(socket, room_id, participant, state))
}

async fn route_connection(
    socket: WebSocket,
    room_id: String,
    participant: Option<ParticipantId>,
    state: AppState,
) {
    let Some(participant) = participant else {
        error!("upgrade reached the router without a verified participant id");
        close_now(socket, CloseCode::ServerError).await;
        return;
    };

    // An unparseable id cannot name a registered room, so both cases are the
    // same routing failure from the client's point of view.
    let handle = room_id
        .parse::<RoomId>()
        .ok()
        .and_then(|id| state.registry.get(&id));
    let Some(handle) = handle else {
        info!(room = %room_id, "rejecting connection to unknown room");
        close_now(socket, CloseCode::RoomNotFound).await;
        return;
    };

    drive_connection(socket, handle, participant).await;
}

async fn close_now(mut socket: WebSocket, code: CloseCode) {
    let frame = CloseFrame {
        code: code.code(),
        reason: code.reason().into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

async fn drive_connection(socket: WebSocket, handle: RoomHandle, participant: ParticipantId) {
    let room_id = handle.room().id();
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

    let conn = ConnectionHandle::new(participant.clone(), outbound_tx);
    let connection_id = conn.id();
    info!(room = %room_id, %participant, "new connection");

    if handle.send(SessionCommand::Connect(conn)).await.is_err() {
        // The session drained away between lookup and registration.
        let frame = CloseFrame {
            code: CloseCode::RoomEnded.code(),
            reason: CloseCode::RoomEnded.reason().into(),
        };
        let _ = sender.send(Message::Close(Some(frame))).await;
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            match frame {
                OutboundFrame::Message(msg) => match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!(room = %room_id, "failed to serialize outbound message: {e}"),
                },
                OutboundFrame::Close(code) => {
                    let frame = CloseFrame {
                        code: code.code(),
                        reason: code.reason().into(),
                    };
                    let _ = sender.send(Message::Close(Some(frame))).await;
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let handle = handle.clone();
        let participant = participant.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match ClientMessage::decode(text.as_str()) {
                        Ok(message) => {
                            let cmd = SessionCommand::Inbound {
                                participant: participant.clone(),
                                connection: connection_id,
                                message,
                            };
                            if handle.send(cmd).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(room = %room_id, %participant, "dropped undecodable frame: {e}");
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Always reported, whichever pump ended first; the session ignores it if
    // this connection is no longer the one on record.
    let _ = handle
        .send(SessionCommand::Disconnect {
            participant: participant.clone(),
            connection: connection_id,
        })
        .await;

    info!(room = %room_id, %participant, "connection closed");
}
