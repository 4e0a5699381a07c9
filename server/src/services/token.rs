//! Signed session tokens and random secrets.
//!
//! DESIGN
//! ======
//! Member and admin tokens are both HS256 JWTs signed with `JWT_SECRET`, but
//! their claim sets are disjoint: member tokens carry `email`, admin tokens
//! carry `role = "admin"`. Each verifier requires its own shape, so a member
//! token never passes as an admin token or the other way round. The OAuth
//! `state` parameter is a third, short-lived shape so the provider callback
//! can check it without server-side storage.

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;

use std::fmt::Write;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::config::Config;

pub const ADMIN_ROLE: &str = "admin";
const ADMIN_SUBJECT: &str = "admin";
const OAUTH_STATE_PURPOSE: &str = "oauth_state";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("invalid or expired token")]
    Invalid,
}

/// Claims of a member session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl MemberClaims {
    /// The user id in `sub`, if it is a UUID.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Claims of an admin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims of the provider round-trip `state` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub nonce: String,
    pub purpose: String,
    pub exp: i64,
}

/// Signing keys plus lifetimes for both token kinds.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    member_ttl: Duration,
    admin_ttl: Duration,
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &str, member_ttl: Duration, admin_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            member_ttl,
            admin_ttl,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::hours(config.jwt_expiration_hours),
            Duration::minutes(config.admin_token_minutes),
        )
    }

    #[must_use]
    pub fn member_ttl(&self) -> Duration {
        self.member_ttl
    }

    /// Issue a member token for a user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Sign`] if encoding fails.
    pub fn issue_member(&self, user_id: Uuid, email: &str, name: &str) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = MemberClaims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            name: name.to_owned(),
            iat: now.unix_timestamp(),
            exp: (now + self.member_ttl).unix_timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a member token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for bad signatures, expired tokens,
    /// admin tokens, and tokens without a `sub`.
    pub fn verify_member(&self, token: &str) -> Result<MemberClaims, TokenError> {
        let claims: MemberClaims = self.decode(token)?;
        if claims.sub.trim().is_empty() {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    /// Issue a short-lived admin token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Sign`] if encoding fails.
    pub fn issue_admin(&self) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_owned(),
            role: ADMIN_ROLE.to_owned(),
            iat: now.unix_timestamp(),
            exp: (now + self.admin_ttl).unix_timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for bad signatures, expired tokens, and
    /// tokens without the admin role.
    pub fn verify_admin(&self, token: &str) -> Result<AdminClaims, TokenError> {
        let claims: AdminClaims = self.decode(token)?;
        if claims.role != ADMIN_ROLE {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    /// Issue a signed `state` value for the provider redirect, valid for
    /// `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Sign`] if encoding fails.
    pub fn issue_oauth_state(&self, ttl: Duration) -> Result<String, TokenError> {
        let claims = OAuthStateClaims {
            nonce: generate_token(),
            purpose: OAUTH_STATE_PURPOSE.to_owned(),
            exp: (OffsetDateTime::now_utc() + ttl).unix_timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a `state` value issued by [`TokenKeys::issue_oauth_state`].
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for forged, expired, or foreign tokens.
    pub fn verify_oauth_state(&self, state: &str) -> Result<OAuthStateClaims, TokenError> {
        let claims: OAuthStateClaims = self.decode(state)?;
        if claims.purpose != OAUTH_STATE_PURPOSE {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

/// Compare a login attempt against the configured admin password. Always
/// false when no password is configured.
#[must_use]
pub fn verify_admin_password(configured: Option<&str>, candidate: &str) -> bool {
    let Some(configured) = configured else {
        return false;
    };
    let expected = Sha256::digest(configured.as_bytes());
    let actual = Sha256::digest(candidate.as_bytes());
    expected
        .iter()
        .zip(actual.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
