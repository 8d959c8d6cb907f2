use crate::model::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A frame sent by the server. Tagged by `kind` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum ServerMessage {
    /// Presence snapshot: every current room member, flagged true iff they
    /// hold an open connection at snapshot time.
    #[serde(rename = "info")]
    Info {
        connected: BTreeMap<ParticipantId, bool>,
    },
    /// A relayed signaling envelope. `version` is assigned by the server at
    /// relay time from the sender's connection stamp.
    #[serde(rename = "signal")]
    Signal {
        to: ParticipantId,
        from: ParticipantId,
        payload: String,
        version: u64,
    },
}

/// A frame received from a client, decoded by explicit `kind` dispatch so an
/// unrecognized tag is its own variant rather than a decode failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Signal {
        to: ParticipantId,
        from: ParticipantId,
        payload: String,
    },
    RequestInfo,
    Unknown {
        kind: String,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has no string \"kind\" tag")]
    MissingKind,
    #[error("malformed {kind:?} message: {source}")]
    Fields {
        kind: String,
        source: serde_json::Error,
    },
}

/// Fields of an inbound signal. Clients may echo a `version`; it is parsed
/// here and discarded, the server always stamps its own.
#[derive(Deserialize)]
struct SignalFields {
    to: ParticipantId,
    from: ParticipantId,
    payload: String,
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<u64>,
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let Some(kind) = value.get("kind").and_then(|k| k.as_str()) else {
            return Err(DecodeError::MissingKind);
        };
        match kind {
            "signal" => {
                let kind = kind.to_string();
                let fields: SignalFields = serde_json::from_value(value)
                    .map_err(|source| DecodeError::Fields { kind, source })?;
                Ok(ClientMessage::Signal {
                    to: fields.to,
                    from: fields.from,
                    payload: fields.payload,
                })
            }
            "requestInfo" => Ok(ClientMessage::RequestInfo),
            other => Ok(ClientMessage::Unknown {
                kind: other.to_string(),
            }),
        }
    }
}
