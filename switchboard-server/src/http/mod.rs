mod handlers;

pub use handlers::*;

use crate::identity::{self, AnonymousIdentity};
use crate::relay_credentials::RelayCredentialIssuer;
use crate::room::{RoomLifecycle, RoomRegistry};
use crate::signaling::ws_handler;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub lifecycle: Arc<RoomLifecycle>,
    pub identity: Arc<AnonymousIdentity>,
    pub relay_credentials: Arc<RelayCredentialIssuer>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/id/me", get(handlers::me))
        .route("/api/relay-credentials", get(handlers::relay_credentials))
        .route("/api/room/create", post(handlers::create_room))
        .route("/api/room/{room_id}/join", post(handlers::join_room))
        .route("/api/room/{room_id}/exists", get(handlers::room_exists))
        .route("/ws/{room_id}", get(ws_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity::attach_participant_id,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
