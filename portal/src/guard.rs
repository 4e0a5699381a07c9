//! Gated views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected pages should apply identical unauthenticated redirect behavior.
//! This is presentation policy only; the backend authorizes every request
//! regardless of what the client decides to render.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use crate::context::{SessionContext, SessionState};
use crate::token::Identity;

/// Public route unauthenticated visitors are sent to.
pub const LANDING_ROUTE: &str = "/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the protected view for this identity.
    Granted(Identity),
    /// Navigate away instead.
    Redirect(&'static str),
}

/// Decide whether a protected view may render for the current session.
#[must_use]
pub fn protected_route(ctx: &SessionContext) -> RouteDecision {
    decide(&ctx.state())
}

/// Redirect unless the state carries an identity. A login still in progress
/// counts as signed out.
#[must_use]
pub fn decide(state: &SessionState) -> RouteDecision {
    match state.identity() {
        Some(identity) => RouteDecision::Granted(identity.clone()),
        None => RouteDecision::Redirect(LANDING_ROUTE),
    }
}

/// Whether a view should navigate to [`LANDING_ROUTE`].
#[must_use]
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    matches!(decide(state), RouteDecision::Redirect(_))
}
