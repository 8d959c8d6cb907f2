use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

const PREFIX: &str = "usr-";

/// Opaque identifier for a participant, minted by the identity service and
/// carried by clients across reconnects. Shaped `usr-<uuid>`.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ParticipantId(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a valid participant id")]
pub struct ParseParticipantIdError;

impl ParticipantId {
    pub fn generate() -> Self {
        Self(format!("{PREFIX}{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ParticipantId {
    type Err = ParseParticipantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = s.strip_prefix(PREFIX).ok_or(ParseParticipantIdError)?;
        Uuid::parse_str(uuid).map_err(|_| ParseParticipantIdError)?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
