//! Short-lived credentials for the external media relay, computed in the
//! shared-secret scheme the relay expects: the username carries the expiry
//! and the password is an HMAC-SHA1 over it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use switchboard_core::ParticipantId;
use thiserror::Error;

pub const CREDENTIAL_TTL: Duration = Duration::from_secs(2 * 60 * 60);

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("relay credential secret is empty")]
    EmptySecret,
    #[error("failed to initialize HMAC: {0}")]
    Hmac(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayCredentials {
    pub username: String,
    pub password: String,
}

/// Stateless issuer; the only state is the shared secret, validated once at
/// startup.
pub struct RelayCredentialIssuer {
    mac: HmacSha1,
}

impl RelayCredentialIssuer {
    pub fn new(secret: &str) -> Result<Self, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::EmptySecret);
        }
        let mac = HmacSha1::new_from_slice(secret.as_bytes())
            .map_err(|e| CredentialError::Hmac(e.to_string()))?;
        Ok(Self { mac })
    }

    pub fn issue(&self, participant: &ParticipantId) -> RelayCredentials {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.issue_at(participant, now + CREDENTIAL_TTL.as_secs())
    }

    fn issue_at(&self, participant: &ParticipantId, expiry_epoch_secs: u64) -> RelayCredentials {
        let username = format!("{expiry_epoch_secs}:{participant}");
        let mut mac = self.mac.clone();
        mac.update(username.as_bytes());
        let password = BASE64.encode(mac.finalize().into_bytes());
        RelayCredentials { username, password }
    }
}
