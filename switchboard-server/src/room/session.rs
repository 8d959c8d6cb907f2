use crate::room::room::Room;
use crate::room::session_command::{SessionCommand, SessionEvent};
use crate::signaling::{ConnectionHandle, ConnectionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use switchboard_core::{ClientMessage, CloseCode, ParticipantId, ServerMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long a participant may stay without a live connection before they are
/// removed from the room.
pub const RECONNECT_GRACE: Duration = Duration::from_secs(30);

/// The authoritative relay and presence tracker for one room. All traffic for
/// the room funnels through this task, which is what guarantees presence
/// broadcasts and relayed signals go out in the order their triggering events
/// were accepted. Connections feed the command mailbox; the room entity and
/// the session's own timers feed the event channel.
pub struct RoomSession {
    room: Arc<Room>,
    connections: HashMap<ParticipantId, ConnectionHandle>,
    pending_removals: HashMap<ParticipantId, JoinHandle<()>>,
    command_rx: mpsc::Receiver<SessionCommand>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    next_version: u64,
    closed: bool,
}

impl RoomSession {
    pub(crate) fn new(
        room: Arc<Room>,
        command_rx: mpsc::Receiver<SessionCommand>,
        event_rx: mpsc::UnboundedReceiver<SessionEvent>,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            room,
            connections: HashMap::new(),
            pending_removals: HashMap::new(),
            command_rx,
            event_rx,
            event_tx,
            next_version: 0,
            closed: false,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.room.id(), "room session started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c),
                        // Registry entry and every connection are gone.
                        None => break,
                    }
                }

                evt = self.event_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_event(e),
                        None => break,
                    }
                }
            }
        }

        self.shutdown();
        info!(room = %self.room.id(), "room session finished");
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Connect(conn) => self.handle_connect(conn),
            SessionCommand::Disconnect {
                participant,
                connection,
            } => self.handle_disconnect(&participant, connection),
            SessionCommand::Inbound {
                participant,
                connection,
                message,
            } => self.handle_inbound(&participant, connection, message),
            SessionCommand::Shutdown => self.shutdown(),
        }
    }

    fn handle_event(&mut self, evt: SessionEvent) {
        if self.closed {
            return;
        }
        match evt {
            SessionEvent::MemberAdded(participant) => {
                // Covers membership granted before the connection arrives: if
                // no socket shows up within the grace period, the seat is
                // released again.
                if !self.connections.contains_key(&participant) {
                    self.schedule_removal(participant);
                }
                self.broadcast_presence();
            }

            SessionEvent::MemberRemoved(participant) => {
                if let Some(conn) = self.connections.remove(&participant) {
                    conn.close(CloseCode::Unauthorized);
                }
                if let Some(timer) = self.pending_removals.remove(&participant) {
                    timer.abort();
                }
                self.broadcast_presence();
            }

            SessionEvent::RemovalElapsed(participant) => {
                self.pending_removals.remove(&participant);
                // A cancelled timer can still fire during the cancel race, so
                // presence is re-checked before acting.
                let live = self
                    .connections
                    .get(&participant)
                    .is_some_and(ConnectionHandle::is_open);
                if !live {
                    info!(room = %self.room.id(), %participant, "reconnect grace expired");
                    self.room.leave(&participant);
                }
            }
        }
    }

    fn handle_connect(&mut self, mut conn: ConnectionHandle) {
        let participant = conn.participant().clone();

        if !self.room.contains(&participant) {
            info!(room = %self.room.id(), %participant, "connection rejected (not a member)");
            conn.close(CloseCode::Unauthorized);
            return;
        }
        if self.closed {
            info!(room = %self.room.id(), %participant, "connection rejected (room ended)");
            conn.close(CloseCode::RoomEnded);
            return;
        }

        self.next_version += 1;
        conn.set_version(self.next_version);
        info!(
            room = %self.room.id(),
            %participant,
            version = conn.version(),
            "connection accepted"
        );

        if let Some(timer) = self.pending_removals.remove(&participant) {
            timer.abort();
            info!(room = %self.room.id(), %participant, "cancelled removal timer");
        }

        if let Some(old) = self.connections.insert(participant, conn) {
            old.close(CloseCode::DuplicateSession);
        }

        self.broadcast_presence();
    }

    fn handle_disconnect(&mut self, participant: &ParticipantId, connection: ConnectionId) {
        if self.closed {
            return;
        }
        // Only the connection on record counts; a close from a socket that
        // was already superseded is a no-op.
        let on_record = self
            .connections
            .get(participant)
            .is_some_and(|c| c.id() == connection);
        if !on_record {
            return;
        }

        self.connections.remove(participant);
        info!(room = %self.room.id(), %participant, "connection lost");
        self.schedule_removal(participant.clone());
        self.broadcast_presence();
    }

    fn handle_inbound(
        &mut self,
        participant: &ParticipantId,
        connection: ConnectionId,
        message: ClientMessage,
    ) {
        // Membership can change between any two frames; re-validate each one.
        let Some(conn) = self.connections.get(participant) else {
            return;
        };
        if conn.id() != connection {
            return;
        }
        if !self.room.contains(participant) {
            info!(room = %self.room.id(), %participant, "message rejected (not a member)");
            conn.close(CloseCode::Unauthorized);
            return;
        }

        match message {
            ClientMessage::Signal { to, from, payload } => self.relay_signal(conn, to, from, payload),
            ClientMessage::RequestInfo => conn.send(self.presence_snapshot()),
            ClientMessage::Unknown { kind } => {
                warn!(room = %self.room.id(), %participant, kind, "dropped message with unrecognized kind");
            }
        }
    }

    fn relay_signal(
        &self,
        sender: &ConnectionHandle,
        to: ParticipantId,
        from: ParticipantId,
        payload: String,
    ) {
        // Presence is eventually consistent; a recipient without a live
        // connection is a silent drop, not an error.
        let Some(recipient) = self.connections.get(&to) else {
            debug!(room = %self.room.id(), %to, "dropped signal (recipient has no connection)");
            return;
        };

        if from != *sender.participant() || to != *recipient.participant() {
            info!(room = %self.room.id(), "discarded signal (sender/recipient id mismatch)");
            sender.close(CloseCode::Unauthorized);
            return;
        }

        recipient.send(ServerMessage::Signal {
            to,
            from,
            payload,
            version: sender.version(),
        });
    }

    /// Snapshot over current room membership, not the connection map: a
    /// member in their grace period shows up as present but disconnected.
    fn presence_snapshot(&self) -> ServerMessage {
        let connected = self
            .room
            .participants()
            .into_iter()
            .map(|p| {
                let live = self
                    .connections
                    .get(&p)
                    .is_some_and(ConnectionHandle::is_open);
                (p, live)
            })
            .collect();
        ServerMessage::Info { connected }
    }

    fn broadcast_presence(&self) {
        let snapshot = self.presence_snapshot();
        for conn in self.connections.values() {
            conn.send(snapshot.clone());
        }
    }

    fn schedule_removal(&mut self, participant: ParticipantId) {
        info!(room = %self.room.id(), %participant, "scheduled removal timer");
        let events = self.event_tx.clone();
        let subject = participant.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(RECONNECT_GRACE).await;
            let _ = events.send(SessionEvent::RemovalElapsed(subject));
        });
        if let Some(old) = self.pending_removals.insert(participant, timer) {
            old.abort();
        }
    }

    /// Idempotent; safe to reach both from a shutdown command and from the
    /// mailboxes draining.
    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        info!(room = %self.room.id(), "closing room session");
        self.closed = true;
        for (_, conn) in self.connections.drain() {
            conn.close(CloseCode::RoomEnded);
        }
        for (_, timer) in self.pending_removals.drain() {
            timer.abort();
        }
    }
}
