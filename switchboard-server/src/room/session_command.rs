use crate::signaling::{ConnectionHandle, ConnectionId};
use switchboard_core::{ClientMessage, ParticipantId};

/// Commands entering a room session from the connection layer.
#[derive(Debug)]
pub enum SessionCommand {
    /// A routed upgrade finished and the connection wants to register.
    Connect(ConnectionHandle),

    /// The socket behind a connection closed or failed.
    Disconnect {
        participant: ParticipantId,
        connection: ConnectionId,
    },

    /// A decoded frame from a registered connection.
    Inbound {
        participant: ParticipantId,
        connection: ConnectionId,
        message: ClientMessage,
    },

    /// Tear the session down; all connections are force-closed.
    Shutdown,
}

/// Events entering a room session from its room and its own timers.
#[derive(Debug)]
pub enum SessionEvent {
    MemberAdded(ParticipantId),
    MemberRemoved(ParticipantId),

    /// The reconnect grace period for a disconnected participant ran out.
    RemovalElapsed(ParticipantId),
}
