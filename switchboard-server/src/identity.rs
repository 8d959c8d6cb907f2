//! Anonymous identity: a stable participant id persisted client-side as a
//! tamper-evident signed cookie, verified on every request.

use crate::http::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use switchboard_core::ParticipantId;
use thiserror::Error;
use tracing::info;

pub const COOKIE_NAME: &str = "participant_id";

const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity signing secret is empty")]
    EmptySecret,
    #[error("failed to initialize HMAC: {0}")]
    Hmac(String),
}

/// Mints and verifies signed participant ids. The cookie value is
/// `<id>:<base64 tag>` where the tag is HMAC-SHA256 over the id.
pub struct AnonymousIdentity {
    mac: HmacSha256,
    secure_cookies: bool,
}

impl AnonymousIdentity {
    /// Fails at construction when the secret is unusable; a missing signing
    /// secret is a startup error, never a runtime path.
    pub fn new(secret: &str, secure_cookies: bool) -> Result<Self, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| IdentityError::Hmac(e.to_string()))?;
        Ok(Self {
            mac,
            secure_cookies,
        })
    }

    /// Verify a presented cookie value, returning the embedded id only when
    /// its shape and signature both hold.
    pub fn verify(&self, token: &str) -> Option<ParticipantId> {
        let (id, tag) = token.split_once(':')?;
        let id: ParticipantId = id.parse().ok()?;
        let tag = BASE64.decode(tag).ok()?;

        let mut mac = self.mac.clone();
        mac.update(id.as_str().as_bytes());
        mac.verify_slice(&tag).ok()?;
        Some(id)
    }

    /// Mint a fresh id and its signed cookie value.
    pub fn mint(&self) -> (ParticipantId, String) {
        let id = ParticipantId::generate();
        let token = format!("{id}:{}", self.sign(id.as_str()));
        (id, token)
    }

    pub fn cookie_header(&self, token: &str) -> String {
        let mut cookie = format!(
            "{COOKIE_NAME}={token}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Lax"
        );
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn sign(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

/// Layer applied to every route: resolves the caller's participant id from
/// the signed cookie, minting a fresh one when it is absent or fails
/// verification, and injects it into request extensions for the handlers and
/// the connection router. The id is never re-derived downstream.
pub async fn attach_participant_id(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| find_cookie(h, COOKIE_NAME))
        .and_then(|token| state.identity.verify(token));

    let (participant, fresh_cookie) = match presented {
        Some(id) => (id, None),
        None => {
            let (id, token) = state.identity.mint();
            info!(participant = %id, "minted fresh participant id");
            let cookie = state.identity.cookie_header(&token);
            (id, Some(cookie))
        }
    };

    req.extensions_mut().insert(participant);
    let mut response = next.run(req).await;

    if let Some(cookie) = fresh_cookie
        && let Ok(value) = HeaderValue::from_str(&cookie)
    {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(n, _)| *n == name)
        .map(|(_, value)| value)
}
