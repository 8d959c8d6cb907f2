use std::collections::BTreeMap;
use std::time::Duration;
use switchboard_core::{ClientMessage, CloseCode, ParticipantId, ServerMessage};
use switchboard_server::room::{RoomHandle, SessionCommand};
use switchboard_server::signaling::{ConnectionHandle, ConnectionId, OutboundFrame};
use tokio::sync::mpsc;

/// Drives a room session the way the socket pumps do, capturing every
/// outbound frame for assertions. Dropping the client closes its outbound
/// queue, which the session observes as a dead connection.
pub struct FakeClient {
    pub participant: ParticipantId,
    pub connection: ConnectionId,
    rx: mpsc::UnboundedReceiver<OutboundFrame>,
}

impl FakeClient {
    pub async fn connect(handle: &RoomHandle, participant: ParticipantId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = ConnectionHandle::new(participant.clone(), tx);
        let connection = conn.id();
        handle
            .send(SessionCommand::Connect(conn))
            .await
            .expect("session gone");
        Self {
            participant,
            connection,
            rx,
        }
    }

    pub async fn send(&self, handle: &RoomHandle, message: ClientMessage) {
        handle
            .send(SessionCommand::Inbound {
                participant: self.participant.clone(),
                connection: self.connection,
                message,
            })
            .await
            .expect("session gone");
    }

    pub async fn signal(&self, handle: &RoomHandle, to: &ParticipantId, payload: &str) {
        self.send(
            handle,
            ClientMessage::Signal {
                to: to.clone(),
                from: self.participant.clone(),
                payload: payload.to_string(),
            },
        )
        .await;
    }

    pub async fn disconnect(&self, handle: &RoomHandle) {
        handle
            .send(SessionCommand::Disconnect {
                participant: self.participant.clone(),
                connection: self.connection,
            })
            .await
            .expect("session gone");
    }

    pub async fn next_frame(&mut self) -> OutboundFrame {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("outbound queue closed without a frame")
    }

    /// Next frame must be a presence snapshot.
    pub async fn expect_info(&mut self) -> BTreeMap<ParticipantId, bool> {
        match self.next_frame().await {
            OutboundFrame::Message(ServerMessage::Info { connected }) => connected,
            other => panic!("expected an info frame, got {other:?}"),
        }
    }

    /// Next frame must be a relayed signal.
    pub async fn expect_signal(&mut self) -> (ParticipantId, ParticipantId, String, u64) {
        match self.next_frame().await {
            OutboundFrame::Message(ServerMessage::Signal {
                to,
                from,
                payload,
                version,
            }) => (to, from, payload, version),
            other => panic!("expected a signal frame, got {other:?}"),
        }
    }

    /// Drain queued messages until the close frame arrives.
    pub async fn expect_close(&mut self, code: CloseCode) {
        loop {
            match self.next_frame().await {
                OutboundFrame::Close(actual) => {
                    assert_eq!(actual, code);
                    return;
                }
                OutboundFrame::Message(_) => {}
            }
        }
    }

    /// Nothing may be queued for this client right now.
    pub fn assert_silent(&mut self) {
        if let Ok(frame) = self.rx.try_recv() {
            panic!("expected silence, got {frame:?}");
        }
    }

    /// Throw away whatever has been delivered so far.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}
