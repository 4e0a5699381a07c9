//! Cross-window message channel.
//!
//! DESIGN
//! ======
//! Models `window.postMessage` between a popup and its opener as a typed
//! channel. A [`MessagePort`] is the popup's handle on its opener; posting
//! requires an explicit target [`Origin`] (there is no wildcard form) and is
//! dropped unless the target matches the opener's real origin. The receiving
//! side sees raw [`MessageEvent`]s and must pass them through an
//! [`OriginGate`] before trusting their contents.

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

// =============================================================================
// ORIGIN
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OriginError {
    #[error("invalid origin `{0}`")]
    Invalid(String),
    #[error("unsupported origin scheme `{0}`")]
    Scheme(String),
}

/// Scheme + host + port tuple that scopes trust and storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: u16,
}

impl Origin {
    /// Parse an origin (or any URL, whose origin is taken).
    ///
    /// # Errors
    ///
    /// Returns [`OriginError`] for unparsable input, non-http(s) schemes,
    /// or URLs without a host. `"*"` is rejected.
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let url = Url::parse(raw.trim()).map_err(|_| OriginError::Invalid(raw.to_owned()))?;
        Self::of(&url)
    }

    /// Origin of an already-parsed URL.
    ///
    /// # Errors
    ///
    /// Returns [`OriginError`] for non-http(s) schemes or host-less URLs.
    pub fn of(url: &Url) -> Result<Self, OriginError> {
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(OriginError::Scheme(scheme.to_owned()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| OriginError::Invalid(url.to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| OriginError::Invalid(url.to_string()))?;
        Ok(Self { scheme: scheme.to_owned(), host: host.to_ascii_lowercase(), port })
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    fn default_port(&self) -> u16 {
        if self.scheme == "https" { 443 } else { 80 }
    }

    /// Filesystem-safe directory name for origin-partitioned storage.
    #[must_use]
    pub fn storage_scope(&self) -> String {
        let host: String = self
            .host
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        format!("{}_{}_{}", self.scheme, host, self.port)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == self.default_port() {
            write!(f, "{}://{}", self.scheme, self.host)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl FromStr for Origin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Messages the session layer understands. Anything else is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthMessage {
    /// Result of a popup login; `None` when the provider returned no token.
    Oauth { token: Option<String> },
}

impl AuthMessage {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Oauth { token } => serde_json::json!({ "type": "oauth", "token": token }),
        }
    }
}

/// A delivered message as the receiving window sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageEvent {
    /// Serialized origin of the sending window.
    pub origin: String,
    pub data: Value,
}

/// Allow-list check applied to every inbound [`MessageEvent`].
#[derive(Clone, Debug)]
pub struct OriginGate {
    allowed: Origin,
}

impl OriginGate {
    #[must_use]
    pub fn new(allowed: Origin) -> Self {
        Self { allowed }
    }

    #[must_use]
    pub fn allowed(&self) -> &Origin {
        &self.allowed
    }

    /// Decode the event if it comes from the allowed origin and has a known
    /// shape.
    #[must_use]
    pub fn accept(&self, event: &MessageEvent) -> Option<AuthMessage> {
        match Origin::parse(&event.origin) {
            Ok(origin) if origin == self.allowed => {}
            _ => {
                debug!(origin = %event.origin, "dropping message from unexpected origin");
                return None;
            }
        }
        match serde_json::from_value::<AuthMessage>(event.data.clone()) {
            Ok(message) => Some(message),
            Err(_) => {
                debug!(origin = %event.origin, "dropping message with unknown shape");
                None
            }
        }
    }
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Create the receiving side of a window (`inbox`) and the handle other
/// windows use to post to it (`port`).
#[must_use]
pub fn message_channel(window_origin: Origin) -> (MessagePort, MessageInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MessagePort { origin: window_origin, tx }, MessageInbox { rx })
}

/// A window handle that can be posted to, typically `window.opener`.
#[derive(Clone, Debug)]
pub struct MessagePort {
    origin: Origin,
    tx: mpsc::UnboundedSender<MessageEvent>,
}

impl MessagePort {
    /// Origin of the window behind this port.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Post `data` from a window at `sender`. Delivered only when
    /// `target_origin` equals the receiving window's origin. Returns whether
    /// the message was queued.
    pub fn post_message(&self, data: Value, target_origin: &Origin, sender: &Origin) -> bool {
        if *target_origin != self.origin {
            debug!(target = %target_origin, actual = %self.origin, "postMessage target mismatch; not delivered");
            return false;
        }
        self.tx
            .send(MessageEvent { origin: sender.to_string(), data })
            .is_ok()
    }
}

/// Receiving end of a window's message queue.
#[derive(Debug)]
pub struct MessageInbox {
    rx: mpsc::UnboundedReceiver<MessageEvent>,
}

impl MessageInbox {
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<MessageEvent> {
        self.rx.try_recv().ok()
    }

    /// Discard everything queued so far. Returns the number dropped.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
