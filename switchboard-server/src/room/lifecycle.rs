use crate::room::registry::RoomRegistry;
use crate::room::session_command::SessionCommand;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use switchboard_core::{ParticipantId, RoomId};
use thiserror::Error;
use tracing::{info, warn};

/// Fixed-window cap on room creation. Coarse abuse protection, not fairness;
/// the window is global, not per caller.
pub const CREATES_PER_MINUTE: u32 = 100;

pub const WINDOW_RESET_INTERVAL: Duration = Duration::from_secs(60);
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateRoomError {
    #[error("room creation rate limit exceeded")]
    RateLimited,
}

/// Creates and destroys rooms. The sole writer of the registry, which pairs
/// every room's lifetime with its session's.
pub struct RoomLifecycle {
    registry: Arc<RoomRegistry>,
    created_in_window: AtomicU32,
}

impl RoomLifecycle {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            created_in_window: AtomicU32::new(0),
        }
    }

    pub fn create_room(&self, created_by: ParticipantId) -> Result<RoomId, CreateRoomError> {
        if self.created_in_window.fetch_add(1, Ordering::Relaxed) >= CREATES_PER_MINUTE {
            warn!(participant = %created_by, "room creation rejected (limit exceeded)");
            return Err(CreateRoomError::RateLimited);
        }

        let handle = self.registry.register(created_by.clone());
        let id = handle.room().id();
        info!(room = %id, participant = %created_by, "created room");
        Ok(id)
    }

    /// Idempotent; deleting an unknown id is a no-op.
    pub async fn delete_room(&self, id: &RoomId) {
        if let Some(handle) = self.registry.remove(id) {
            info!(room = %id, "deleting room");
            let _ = handle.send(SessionCommand::Shutdown).await;
        }
    }

    /// One sweep pass: delete every room that has been empty past the
    /// staleness threshold. Staleness is re-verified during removal, so a
    /// room that just gained a member survives the pass.
    pub async fn sweep_stale(&self) {
        for id in self.registry.room_ids() {
            if let Some(handle) = self.registry.remove_if_stale(&id) {
                info!(room = %id, "deleting stale room");
                let _ = handle.send(SessionCommand::Shutdown).await;
            }
        }
    }

    pub fn reset_window(&self) {
        self.created_in_window.store(0, Ordering::Relaxed);
    }

    /// Spawn the periodic window reset and staleness sweep.
    pub fn spawn_background_tasks(self: &Arc<Self>) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(WINDOW_RESET_INTERVAL);
            tick.tick().await;
            loop {
                tick.tick().await;
                service.reset_window();
            }
        });

        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            tick.tick().await;
            loop {
                tick.tick().await;
                service.sweep_stale().await;
            }
        });
    }
}
