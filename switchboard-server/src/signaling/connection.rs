use std::sync::atomic::{AtomicU64, Ordering};
use switchboard_core::{CloseCode, ParticipantId, ServerMessage};
use tokio::sync::mpsc;
use tracing::debug;

/// Process-unique id telling successive sockets for the same participant
/// apart, so a disconnect from a superseded socket is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Frames queued for a connection's send pump.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Message(ServerMessage),
    /// Sends an application close frame and terminates the pump.
    Close(CloseCode),
}

/// The room session's view of one live socket: the authenticated participant
/// behind it, its version stamp, and an unbounded outbound queue. Sends never
/// block the session; a failed send means the pump is already gone and is
/// deliberately swallowed.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    participant: ParticipantId,
    id: ConnectionId,
    version: u64,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
}

impl ConnectionHandle {
    pub fn new(participant: ParticipantId, outbound: mpsc::UnboundedSender<OutboundFrame>) -> Self {
        Self {
            participant,
            id: ConnectionId::next(),
            version: 0,
            outbound,
        }
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Stamp assigned by the session at accept time, strictly increasing per
    /// acceptance within one room.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }

    pub fn send(&self, message: ServerMessage) {
        if self.outbound.send(OutboundFrame::Message(message)).is_err() {
            debug!(participant = %self.participant, "dropped frame for a closed connection");
        }
    }

    pub fn close(&self, code: CloseCode) {
        let _ = self.outbound.send(OutboundFrame::Close(code));
    }
}
