//! HMAC-signed bearer tokens.
//!
//! Format: `v1.<payload_b64>.<sig_b64>` with URL-safe unpadded base64, JSON
//! claims `{ sub, exp }` and an HMAC-SHA256 signature over the encoded
//! payload. Verification is deterministic given (token, clock, secret) and
//! has no side effects.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use seminar_shared::time::Clock;

use crate::domain::UserId;

/// Claims embedded in a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User identifier
    pub sub: String,
    /// Expiry as Unix seconds
    pub exp: u64,
}

/// Verification failures. All of them are terminal for the connection at
/// the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token is missing a user identifier")]
    MissingSubject,
}

/// Validates bearer tokens against a server-held secret.
pub struct TokenVerifier {
    secret: String,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    /// Verify a token and extract the embedded user identifier.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 || parts[0] != "v1" {
            return Err(TokenError::Malformed);
        }

        let payload_b64 = parts[1];
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let provided_sig = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| TokenError::Malformed)?;

        let expected_sig = sign(payload_b64.as_bytes(), self.secret.as_bytes());
        if !constant_time_eq(&expected_sig, &provided_sig) {
            return Err(TokenError::BadSignature);
        }

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        let now_secs = (self.clock.now_millis() / 1000).max(0) as u64;
        if claims.exp <= now_secs {
            return Err(TokenError::Expired);
        }

        UserId::new(claims.sub).map_err(|_| TokenError::MissingSubject)
    }
}

/// Mint a token for the given user, expiring at `exp` (Unix seconds).
///
/// Used by the demo fixtures and by tests; a real deployment issues tokens
/// from the identity service that shares the secret.
pub fn issue_token(user_id: &str, secret: &str, exp: u64) -> String {
    let claims = TokenClaims {
        sub: user_id.to_string(),
        exp,
    };
    let payload = serde_json::to_vec(&claims).expect("token claims serialize to JSON");
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let sig_b64 = URL_SAFE_NO_PAD.encode(sign(payload_b64.as_bytes(), secret.as_bytes()));
    format!("v1.{payload_b64}.{sig_b64}")
}

fn sign(payload_b64: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("hmac key");
    mac.update(payload_b64);
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    diff == 0
}
