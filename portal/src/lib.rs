//! Member portal and admin client for the clubhouse backend.
//!
//! ARCHITECTURE
//! ============
//! The session subsystem is split into three collaborators:
//!
//! - [`store`]: durable bearer-token storage scoped to an origin, with a
//!   change-broadcasting [`store::TokenCell`] wrapper.
//! - [`handshake`] + [`callback`]: the popup login flow. The opener asks the
//!   backend for a provider URL and opens a window; the window's callback page
//!   reads the token from the URL fragment and posts it back over a
//!   [`message`] port.
//! - [`context`]: the per-tab session state machine that consumes those
//!   messages, decodes identity for display, and authorizes outbound requests.
//!
//! Window and storage concerns are traits ([`window::WindowHost`],
//! [`store::TokenStore`]) so the same flow runs against a browser binding, a
//! terminal, or in-memory fakes.
//!
//! TRUST
//! =====
//! Token claims decoded here are for display only. The backend verifies the
//! signature on every request and is the sole authorization authority.

pub mod admin;
pub mod api;
pub mod callback;
pub mod context;
pub mod guard;
pub mod handshake;
pub mod message;
pub mod store;
pub mod token;
pub mod window;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use admin::{AdminError, AdminSession};
pub use api::{ApiClient, ApiError, Credentials};
pub use callback::{CallbackOutcome, CallbackPage};
pub use context::{LoginOutcome, SessionConfig, SessionContext, SessionError, SessionState};
pub use guard::{RouteDecision, protected_route};
pub use handshake::{HandshakeError, PendingLogin, PopupHandshake};
pub use message::{AuthMessage, MessageEvent, MessageInbox, MessagePort, Origin, OriginGate};
pub use store::{FileTokenStore, MemoryTokenStore, TokenCell, TokenStore};
pub use token::Identity;
pub use window::{CallbackWindow, PopupWindow, WindowFeatures, WindowHost};
