use crate::utils::init_tracing;
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use switchboard_core::{CloseCode, ParticipantId, RoomId};
use switchboard_server::http::AppState;
use switchboard_server::room::{RoomLifecycle, RoomRegistry};
use switchboard_server::{AnonymousIdentity, RelayCredentialIssuer, build_router};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

pub async fn start_server() -> TestServer {
    init_tracing();

    let identity = Arc::new(AnonymousIdentity::new("ws-test-identity-secret", false).unwrap());
    let relay_credentials = Arc::new(RelayCredentialIssuer::new("ws-test-relay-secret").unwrap());
    let registry = Arc::new(RoomRegistry::new());
    let lifecycle = Arc::new(RoomLifecycle::new(Arc::clone(&registry)));
    let state = AppState {
        registry,
        lifecycle,
        identity,
        relay_credentials,
    };

    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, state }
}

impl TestServer {
    /// A signed-in caller: fresh identity plus its cookie header value.
    pub fn signed_identity(&self) -> (ParticipantId, String) {
        let (id, token) = self.state.identity.mint();
        (id, format!("participant_id={token}"))
    }

    pub async fn connect(&self, room: &RoomId, cookie: &str) -> WsStream {
        self.connect_raw(&room.to_string(), cookie).await
    }

    pub async fn connect_raw(&self, room: &str, cookie: &str) -> WsStream {
        let url = format!("ws://{}/ws/{room}", self.addr);
        let mut request = url.into_client_request().unwrap();
        request
            .headers_mut()
            .insert("Cookie", HeaderValue::from_str(cookie).unwrap());
        let (stream, _) = connect_async(request).await.expect("upgrade failed");
        stream
    }
}

pub async fn next_json(stream: &mut WsStream) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("transport error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("frame is not valid JSON");
        }
    }
}

/// Read until the info snapshot matches, tolerating stale broadcasts queued
/// ahead of it.
pub async fn await_info<F>(stream: &mut WsStream, matches: F) -> serde_json::Value
where
    F: Fn(&serde_json::Value) -> bool,
{
    for _ in 0..16 {
        let frame = next_json(stream).await;
        if frame["kind"] == "info" && matches(&frame["connected"]) {
            return frame;
        }
    }
    panic!("no matching info frame arrived");
}

pub async fn expect_close(stream: &mut WsStream, expected: CloseCode) {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for the close frame")
            .expect("stream ended without a close frame")
            .expect("transport error");
        match msg {
            Message::Close(Some(frame)) => {
                assert_eq!(u16::from(frame.code), expected.code());
                assert_eq!(frame.reason.as_str(), expected.reason());
                return;
            }
            Message::Close(None) => panic!("closed without an application code"),
            _ => {}
        }
    }
}
