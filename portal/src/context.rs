//! Tab-wide session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`SessionContext`] exists per application window. It owns the member
//! token, the inbox that popup callbacks post into, and the published
//! [`SessionState`] that views subscribe to.
//!
//! STATE MACHINE
//! =============
//! ```text
//! Unauthenticated --login()--> Authenticating{attempt}
//! Authenticating  --oauth{token}--> Authenticated{identity}
//! Authenticating  --oauth{null} | popup closed | timeout--> Unauthenticated
//! Authenticated   --logout()--> Unauthenticated
//! ```
//! `login()` is single-flight: a second call while a popup is outstanding
//! fails with [`SessionError::LoginInProgress`]. `oauth` messages are only
//! applied while authenticating; a late or stray message is ignored.
//!
//! TRUST
//! =====
//! Identity is decoded from the token without verifying its signature and is
//! used for display and routing only. The backend validates the token on
//! every request.

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use models::User;
use reqwest::{RequestBuilder, Response};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{self, ApiClient, ApiError, Credentials};
use crate::handshake::{DEFAULT_POLL_INTERVAL, HandshakeError, PendingLogin, PopupHandshake};
use crate::message::{AuthMessage, MessageEvent, MessageInbox, MessagePort, Origin, OriginGate, message_channel};
use crate::store::{MEMBER_TOKEN_KEY, TokenCell, TokenStore};
use crate::token::{Identity, decode_identity};
use crate::window::WindowHost;

// =============================================================================
// TYPES
// =============================================================================

/// Settings for one [`SessionContext`].
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Backend base URL.
    pub api_base: Url,
    /// Origin of the application window; the only origin whose messages are
    /// trusted.
    pub allowed_origin: Origin,
    pub poll_interval: Duration,
    /// Give up on a popup login after this long. `None` waits until the popup
    /// is closed.
    pub login_timeout: Option<Duration>,
}

impl SessionConfig {
    #[must_use]
    pub fn new(api_base: Url, allowed_origin: Origin) -> Self {
        Self { api_base, allowed_origin, poll_interval: DEFAULT_POLL_INTERVAL, login_timeout: None }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn with_login_timeout(mut self, login_timeout: Duration) -> Self {
        self.login_timeout = Some(login_timeout);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating { attempt: u64 },
    Authenticated { identity: Identity },
}

impl SessionState {
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity } => Some(identity),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// How a completed `login()` ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Identity),
    /// The popup reported no token, or a token that does not decode.
    Rejected,
    /// The popup closed without reporting anything.
    Abandoned,
    /// The configured login timeout elapsed; the popup was closed.
    TimedOut,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a login is already in progress")]
    LoginInProgress,
    #[error("already signed in")]
    AlreadyAuthenticated,
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

struct Inner {
    state: SessionState,
    token: Option<String>,
    next_attempt: u64,
}

/// Unwinds a `login()` that ends early, including when its future is dropped:
/// closes the popup it opened and returns the attempt to unauthenticated.
struct AttemptGuard<'a> {
    ctx: &'a SessionContext,
    attempt: u64,
    pending: Option<PendingLogin>,
    armed: bool,
}

impl AttemptGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(pending) = self.pending.as_ref().filter(|p| !p.is_closed()) {
            debug!(attempt = self.attempt, "login cancelled; closing popup");
            pending.close();
        }
        self.ctx.end_attempt(self.attempt);
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

pub struct SessionContext {
    api: ApiClient,
    token: Arc<TokenCell>,
    handshake: PopupHandshake,
    gate: OriginGate,
    port: MessagePort,
    inbox: tokio::sync::Mutex<MessageInbox>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SessionState>,
    login_timeout: Option<Duration>,
}

impl SessionContext {
    /// Build a context and restore any session already in `store`.
    #[must_use]
    pub fn new(config: SessionConfig, store: Arc<dyn TokenStore>, host: Arc<dyn WindowHost>) -> Self {
        let api = ApiClient::new(config.api_base);
        let handshake = PopupHandshake::new(api.clone(), host).with_poll_interval(config.poll_interval);
        let (port, inbox) = message_channel(config.allowed_origin.clone());
        let (state_tx, _rx) = watch::channel(SessionState::Unauthenticated);
        let ctx = Self {
            api,
            token: Arc::new(TokenCell::new(store, MEMBER_TOKEN_KEY)),
            handshake,
            gate: OriginGate::new(config.allowed_origin),
            port,
            inbox: tokio::sync::Mutex::new(inbox),
            inner: Mutex::new(Inner { state: SessionState::Unauthenticated, token: None, next_attempt: 1 }),
            state_tx,
            login_timeout: config.login_timeout,
        };
        ctx.restore();
        ctx
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Handle popups use as their opener.
    #[must_use]
    pub fn port(&self) -> &MessagePort {
        &self.port
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.lock().state.identity().cloned()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Receive every change to the stored token made through this context's
    /// cell. Writes by a [`crate::CallbackPage`] built on its own cell reach
    /// the context only through [`Self::restore`].
    #[must_use]
    pub fn subscribe_token(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    /// The member token cell, for a callback page running in this window.
    #[must_use]
    pub fn token_cell(&self) -> Arc<TokenCell> {
        Arc::clone(&self.token)
    }

    /// Credentials for the current token, or anonymous.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.lock().token.clone().map_or(Credentials::Anonymous, Credentials::Bearer)
    }

    /// Re-read the token store. A token that does not decode is removed.
    /// Leaves an in-progress login alone.
    pub fn restore(&self) -> Option<Identity> {
        let mut inner = self.lock();
        if matches!(inner.state, SessionState::Authenticating { .. }) {
            return None;
        }
        let Some(token) = self.token.load() else {
            inner.token = None;
            self.set_state(&mut inner, SessionState::Unauthenticated);
            return None;
        };
        match decode_identity(&token) {
            Some(identity) => {
                debug!(user = %identity.id, "restored session from storage");
                inner.token = Some(token);
                self.set_state(&mut inner, SessionState::Authenticated { identity: identity.clone() });
                Some(identity)
            }
            None => {
                warn!("stored token is not decodable; clearing it");
                self.token.clear();
                inner.token = None;
                self.set_state(&mut inner, SessionState::Unauthenticated);
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // LOGIN
    // -------------------------------------------------------------------------

    /// Run a popup login to completion.
    ///
    /// # Errors
    ///
    /// [`SessionError::LoginInProgress`] or
    /// [`SessionError::AlreadyAuthenticated`] when not signed out, and
    /// [`SessionError::Handshake`] when the popup could not be started. The
    /// context is left unauthenticated in every error case.
    pub async fn login(&self) -> Result<LoginOutcome, SessionError> {
        let attempt = self.begin_attempt()?;
        let mut guard = AttemptGuard { ctx: self, attempt, pending: None, armed: true };
        let mut inbox = self.inbox.lock().await;
        let stale = inbox.drain();
        if stale > 0 {
            debug!(stale, "discarded messages queued before login");
        }

        let pending = guard.pending.insert(self.handshake.initiate().await?);

        let wait = self.await_popup(&mut inbox, pending, attempt);
        let outcome = match self.login_timeout {
            None => wait.await,
            Some(limit) => {
                if let Ok(outcome) = tokio::time::timeout(limit, wait).await {
                    outcome
                } else {
                    warn!(attempt, timeout = ?limit, "login timed out; closing popup");
                    pending.close();
                    self.end_attempt(attempt);
                    LoginOutcome::TimedOut
                }
            }
        };
        guard.disarm();
        info!(attempt, outcome = outcome_label(&outcome), "login finished");
        Ok(outcome)
    }

    fn begin_attempt(&self) -> Result<u64, SessionError> {
        let mut inner = self.lock();
        match &inner.state {
            SessionState::Authenticating { .. } => return Err(SessionError::LoginInProgress),
            SessionState::Authenticated { .. } => return Err(SessionError::AlreadyAuthenticated),
            SessionState::Unauthenticated => {}
        }
        let attempt = inner.next_attempt;
        inner.next_attempt += 1;
        self.set_state(&mut inner, SessionState::Authenticating { attempt });
        Ok(attempt)
    }

    /// Drop back to unauthenticated if `attempt` is still the one running.
    fn end_attempt(&self, attempt: u64) {
        let mut inner = self.lock();
        if inner.state == (SessionState::Authenticating { attempt }) {
            self.set_state(&mut inner, SessionState::Unauthenticated);
        }
    }

    async fn await_popup(&self, inbox: &mut MessageInbox, pending: &PendingLogin, attempt: u64) -> LoginOutcome {
        let closed = pending.closed();
        tokio::pin!(closed);
        loop {
            tokio::select! {
                biased;
                event = inbox.recv() => match event {
                    Some(event) => {
                        if let Some(outcome) = self.apply(&event, Some(attempt)) {
                            return outcome;
                        }
                    }
                    None => {
                        (&mut closed).await;
                        return self.abandon(attempt);
                    }
                },
                () = &mut closed => {
                    // The callback posts before it closes; pick up anything
                    // that raced the last poll.
                    while let Some(event) = inbox.try_recv() {
                        if let Some(outcome) = self.apply(&event, Some(attempt)) {
                            return outcome;
                        }
                    }
                    return self.abandon(attempt);
                }
            }
        }
    }

    fn abandon(&self, attempt: u64) -> LoginOutcome {
        let mut inner = self.lock();
        if let SessionState::Authenticated { identity } = &inner.state {
            return LoginOutcome::Authenticated(identity.clone());
        }
        if inner.state == (SessionState::Authenticating { attempt }) {
            debug!(attempt, "popup closed without a result");
            self.set_state(&mut inner, SessionState::Unauthenticated);
        }
        LoginOutcome::Abandoned
    }

    /// Deliver a message event from another window. Returns whether it
    /// changed the session.
    pub fn handle_message(&self, event: &MessageEvent) -> bool {
        self.apply(event, None).is_some()
    }

    /// Apply an `oauth` message if it passes the origin gate and a login is
    /// running (`attempt`, when given, must match). `None` means ignored.
    fn apply(&self, event: &MessageEvent, attempt: Option<u64>) -> Option<LoginOutcome> {
        let AuthMessage::Oauth { token } = self.gate.accept(event)?;
        let mut inner = self.lock();
        let SessionState::Authenticating { attempt: current } = inner.state else {
            debug!("ignoring oauth message outside of a login");
            return None;
        };
        if attempt.is_some_and(|expected| expected != current) {
            return None;
        }

        let Some((token, identity)) = token.and_then(|t| decode_identity(&t).map(|identity| (t, identity))) else {
            info!(attempt = current, "login rejected: no usable token");
            self.set_state(&mut inner, SessionState::Unauthenticated);
            return Some(LoginOutcome::Rejected);
        };
        if let Err(e) = self.token.save(&token) {
            warn!(error = %e, "token could not be persisted; session will not survive restart");
        }
        inner.token = Some(token);
        self.set_state(&mut inner, SessionState::Authenticated { identity: identity.clone() });
        Some(LoginOutcome::Authenticated(identity))
    }

    // -------------------------------------------------------------------------
    // LOGOUT / REFRESH
    // -------------------------------------------------------------------------

    /// Sign out. The backend is told on a best-effort basis; the local session
    /// is cleared whatever it answers.
    pub async fn logout(&self) {
        let credentials = self.credentials();
        if !credentials.is_anonymous() {
            if let Err(e) = api::auth::logout(&self.api, &credentials).await {
                warn!(error = %e, "backend logout failed; clearing local session anyway");
            }
        }
        self.clear_session();
        info!("signed out");
    }

    fn clear_session(&self) {
        let mut inner = self.lock();
        self.token.clear();
        inner.token = None;
        self.set_state(&mut inner, SessionState::Unauthenticated);
    }

    /// Ask the backend who the token belongs to. A 401 ends the session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Api`] for transport failures and non-401 errors; the
    /// session is kept in that case.
    pub async fn refresh_user(&self) -> Result<Option<User>, SessionError> {
        let credentials = self.credentials();
        if credentials.is_anonymous() {
            return Ok(None);
        }
        match api::auth::fetch_me(&self.api, &credentials).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unauthorized() => {
                info!("backend rejected stored token; signing out");
                self.clear_session();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    // -------------------------------------------------------------------------
    // AUTHORIZED REQUESTS
    // -------------------------------------------------------------------------

    /// Attach the bearer token when one is held; otherwise return the request
    /// unchanged.
    #[must_use]
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        self.credentials().apply(request)
    }

    /// Send `request` with the session's credentials. The response is returned
    /// whatever its status; access control is the backend's call.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`] on transport failure.
    pub async fn fetch_with_auth(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        Ok(self.authorize(request).send().await?)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, inner: &mut Inner, state: SessionState) {
        if inner.state != state {
            inner.state = state.clone();
            self.state_tx.send_replace(state);
        }
    }
}

fn outcome_label(outcome: &LoginOutcome) -> &'static str {
    match outcome {
        LoginOutcome::Authenticated(_) => "authenticated",
        LoginOutcome::Rejected => "rejected",
        LoginOutcome::Abandoned => "abandoned",
        LoginOutcome::TimedOut => "timed_out",
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("api", &self.api.base().as_str())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
