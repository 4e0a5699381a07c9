//! Opener side of the popup login.
//!
//! DESIGN
//! ======
//! Two channels are involved and they have distinct jobs. The token travels
//! over the message port (see [`crate::callback`]); this module only opens
//! the popup and watches whether it is still open. Polling the closed flag is
//! the liveness signal that lets a waiting caller stop when the user gives
//! up, and the poll ticker is dropped as soon as closure is observed.

#[cfg(test)]
#[path = "handshake_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};
use url::Url;

use crate::api::{self, ApiClient, ApiError};
use crate::window::{PopupWindow, WindowFeatures, WindowHost};

/// Window name used for the provider popup.
pub const WINDOW_NAME: &str = "google_oauth";
/// Fixed popup size.
pub const POPUP_FEATURES: WindowFeatures = WindowFeatures { width: 600, height: 700 };
/// How often the opener checks whether the popup was closed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("login start failed: {0}")]
    LoginStart(#[source] ApiError),
    #[error("backend returned an unusable authorization url `{0}`")]
    InvalidAuthUrl(String),
    #[error("popup window could not be opened")]
    PopupBlocked,
}

/// Starts popup logins against one backend and window host.
pub struct PopupHandshake {
    api: ApiClient,
    host: Arc<dyn WindowHost>,
    poll_interval: Duration,
}

impl PopupHandshake {
    #[must_use]
    pub fn new(api: ApiClient, host: Arc<dyn WindowHost>) -> Self {
        Self { api, host, poll_interval: DEFAULT_POLL_INTERVAL }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Fetch the provider authorization URL from the backend.
    ///
    /// # Errors
    ///
    /// [`HandshakeError::LoginStart`] on transport failure or a non-2xx
    /// response, [`HandshakeError::InvalidAuthUrl`] when the returned URL is
    /// not an absolute http(s) URL.
    pub async fn request_auth_url(&self) -> Result<Url, HandshakeError> {
        let start = api::auth::start_login(&self.api).await.map_err(|e| {
            warn!(error = %e, "login start request failed");
            HandshakeError::LoginStart(e)
        })?;
        let url = Url::parse(&start.auth_url).map_err(|_| HandshakeError::InvalidAuthUrl(start.auth_url.clone()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(HandshakeError::InvalidAuthUrl(start.auth_url));
        }
        Ok(url)
    }

    /// Request the authorization URL and open the popup on it.
    ///
    /// # Errors
    ///
    /// Everything [`Self::request_auth_url`] returns, plus
    /// [`HandshakeError::PopupBlocked`] when the host refuses to open a
    /// window.
    pub async fn initiate(&self) -> Result<PendingLogin, HandshakeError> {
        let auth_url = self.request_auth_url().await?;
        let Some(window) = self.host.open(&auth_url, WINDOW_NAME, POPUP_FEATURES) else {
            warn!(url = %auth_url, "popup blocked");
            return Err(HandshakeError::PopupBlocked);
        };
        info!(host = auth_url.host_str().unwrap_or_default(), "login popup opened");
        Ok(PendingLogin { window, auth_url, poll_interval: self.poll_interval })
    }
}

/// An open login popup.
pub struct PendingLogin {
    window: Box<dyn PopupWindow>,
    auth_url: Url,
    poll_interval: Duration,
}

impl PendingLogin {
    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.window.is_closed()
    }

    pub fn close(&self) {
        self.window.close();
    }

    /// Resolve once the popup is observed closed.
    pub async fn closed(&self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.window.is_closed() {
                return;
            }
        }
    }
}

impl std::fmt::Debug for PendingLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLogin")
            .field("auth_url", &self.auth_url.as_str())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
