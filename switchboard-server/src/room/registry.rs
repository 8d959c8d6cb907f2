use crate::room::room::Room;
use crate::room::session::RoomSession;
use crate::room::session_command::SessionCommand;
use dashmap::DashMap;
use std::sync::Arc;
use switchboard_core::{ParticipantId, RoomId};
use tokio::sync::mpsc;
use tracing::info;

const COMMAND_BUFFER: usize = 256;

/// A registered room: the membership entity plus the mailbox of its session.
#[derive(Clone)]
pub struct RoomHandle {
    room: Arc<Room>,
    commands: mpsc::Sender<SessionCommand>,
}

impl RoomHandle {
    pub fn room(&self) -> &Arc<Room> {
        &self.room
    }

    /// Enqueue a command for the room's session. Fails only once the session
    /// task has fully drained and exited.
    pub async fn send(
        &self,
        command: SessionCommand,
    ) -> Result<(), mpsc::error::SendError<SessionCommand>> {
        self.commands.send(command).await
    }
}

/// The only cross-room shared structure: room id to (Room, session) pair.
/// Lookup is concurrent; creation and destruction go through the lifecycle
/// service alone, which keeps the pair's lifetimes coupled.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Construct a (Room, session) pair, wire the membership event channel
    /// between them, spawn the session task, and publish the handle.
    pub(crate) fn register(&self, created_by: ParticipantId) -> RoomHandle {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let room = Arc::new(Room::new(created_by, event_tx.clone()));
        let session = RoomSession::new(Arc::clone(&room), command_rx, event_rx, event_tx);
        tokio::spawn(session.run());

        let handle = RoomHandle {
            room: Arc::clone(&room),
            commands: command_tx,
        };
        self.rooms.insert(room.id(), handle.clone());
        info!(room = %room.id(), "registered room");
        handle
    }

    pub(crate) fn remove(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms.remove(id).map(|(_, handle)| handle)
    }

    /// Remove only if the room is still stale, re-checked under the shard
    /// lock so the check and the unregistration are atomic with respect to
    /// this map.
    pub(crate) fn remove_if_stale(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms
            .remove_if(id, |_, handle| handle.room().is_stale())
            .map(|(_, handle)| handle)
    }

    pub fn get(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
