use crate::room::session_command::SessionEvent;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use switchboard_core::{JoinOutcome, ParticipantId, RoomId};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

pub const ROOM_CAPACITY: usize = 6;

/// A room with no members for this long is eligible for the staleness sweep.
pub const STALE_AFTER: Duration = Duration::from_secs(10 * 60);

/// The membership side of a room: a bounded participant set with join/leave
/// serialized through one lock. Membership changes are announced on the event
/// channel wired in at construction, inside the same locked step, so the room
/// session observes them in mutation order.
pub struct Room {
    id: RoomId,
    created_by: ParticipantId,
    state: Mutex<RoomState>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

struct RoomState {
    participants: HashSet<ParticipantId>,
    empty_since: Instant,
}

impl Room {
    /// Rooms are only constructed by the registry, paired with their session.
    pub(crate) fn new(created_by: ParticipantId, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            id: RoomId::new(),
            created_by,
            state: Mutex::new(RoomState {
                participants: HashSet::new(),
                empty_since: Instant::now(),
            }),
            events,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Informational only; confers no privilege.
    pub fn created_by(&self) -> &ParticipantId {
        &self.created_by
    }

    pub fn join(&self, participant: ParticipantId) -> JoinOutcome {
        let mut state = self.lock();
        if state.participants.contains(&participant) {
            info!(room = %self.id, %participant, "join rejected (already joined)");
            return JoinOutcome::AlreadyJoined;
        }
        if state.participants.len() >= ROOM_CAPACITY {
            info!(room = %self.id, %participant, "join rejected (room full)");
            return JoinOutcome::Full;
        }
        state.participants.insert(participant.clone());
        info!(room = %self.id, %participant, "participant joined");
        let _ = self.events.send(SessionEvent::MemberAdded(participant));
        JoinOutcome::Joined
    }

    pub fn leave(&self, participant: &ParticipantId) {
        let mut state = self.lock();
        if state.participants.remove(participant) {
            if state.participants.is_empty() {
                state.empty_since = Instant::now();
            }
            info!(room = %self.id, %participant, "participant removed");
            let _ = self
                .events
                .send(SessionEvent::MemberRemoved(participant.clone()));
        }
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.lock().participants.contains(participant)
    }

    pub fn participants(&self) -> HashSet<ParticipantId> {
        self.lock().participants.clone()
    }

    /// Advisory: callers re-check before acting on it.
    pub fn is_stale(&self) -> bool {
        let state = self.lock();
        state.participants.is_empty() && state.empty_since.elapsed() >= STALE_AFTER
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
