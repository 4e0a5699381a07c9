//! Display-only decoding of session token claims.
//!
//! The payload segment of a three-part token is base64url JSON. It is read
//! without signature verification; the result is a projection for UI use and
//! never an authorization input.

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Who the current token says the user is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
}

/// Decode identity claims from a token. `None` for anything that is not a
/// three-part token with a JSON payload carrying a non-empty `sub`.
#[must_use]
pub fn decode_identity(token: &str) -> Option<Identity> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    if claims.sub.trim().is_empty() {
        return None;
    }
    Some(Identity { id: claims.sub, email: claims.email, name: claims.name })
}

/// Build an unsigned three-part token around `claims`. Used by tests and
/// local tooling; the backend never accepts these.
#[must_use]
pub fn encode_unsigned(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.unsigned")
}
