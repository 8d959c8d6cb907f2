pub mod config;
pub mod http;
pub mod identity;
pub mod relay_credentials;
pub mod room;
pub mod signaling;

pub use config::Config;
pub use http::{AppState, build_router};
pub use identity::AnonymousIdentity;
pub use relay_credentials::RelayCredentialIssuer;
pub use room::{
    Room, RoomHandle, RoomLifecycle, RoomRegistry, RoomSession, SessionCommand, SessionEvent,
};
pub use signaling::{ConnectionHandle, ConnectionId, OutboundFrame};
