//! The page the provider redirects the popup to.
//!
//! The token arrives in the URL fragment as `access_token=<token>`. Fragments
//! are never sent to servers, so the token does not show up in access logs;
//! query parameters are ignored.
//!
//! With an opener, the page posts `{type: "oauth", token}` to the configured
//! origin and closes itself shortly after. Without one (the user landed here
//! directly), it writes the token straight to storage and goes to `/`. A
//! missing token follows the same branches with `null`, so a waiting opener
//! fails fast instead of hanging.

#[cfg(test)]
#[path = "callback_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;
use url::form_urlencoded;

use crate::message::{AuthMessage, MessagePort, Origin};
use crate::store::{MEMBER_TOKEN_KEY, TokenCell, TokenStore};
use crate::window::CallbackWindow;

/// Fragment parameter carrying the token.
pub const TOKEN_PARAM: &str = "access_token";
/// Route the page sends the user to when it has no opener.
pub const HOME_ROUTE: &str = "/";
/// Default wait between posting and closing.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(250);
const MAX_CLOSE_DELAY: Duration = Duration::from_secs(1);

/// What the page did on load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Posted to the opener. `delivered` is false when the opener is gone or
    /// lives on a different origin.
    Posted { delivered: bool, had_token: bool },
    /// No opener; the token was written to storage.
    Stored,
    /// No opener and no token; storage was cleared.
    Cleared,
}

/// Token from the URL fragment, if any. Query parameters are not consulted.
#[must_use]
pub fn fragment_token(url: &Url) -> Option<String> {
    let fragment = url.fragment()?;
    form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.trim().to_owned())
        .filter(|token| !token.is_empty())
}

pub struct CallbackPage {
    token: Arc<TokenCell>,
    allowed_origin: Origin,
    close_delay: Duration,
}

impl CallbackPage {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, allowed_origin: Origin) -> Self {
        Self::with_token_cell(Arc::new(TokenCell::new(store, MEMBER_TOKEN_KEY)), allowed_origin)
    }

    /// Build a page that writes through `token`, so subscribers of that cell
    /// (such as [`crate::SessionContext::subscribe_token`]) see a direct
    /// no-opener sign-in.
    #[must_use]
    pub fn with_token_cell(token: Arc<TokenCell>, allowed_origin: Origin) -> Self {
        Self { token, allowed_origin, close_delay: DEFAULT_CLOSE_DELAY }
    }

    /// Override the post-then-close delay. Capped at one second.
    #[must_use]
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay.min(MAX_CLOSE_DELAY);
        self
    }

    #[must_use]
    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// Run the page for the URL it was loaded at.
    pub async fn load(&self, url: &Url, opener: Option<&MessagePort>, window: &dyn CallbackWindow) -> CallbackOutcome {
        let token = fragment_token(url);
        if url.query_pairs().any(|(key, _)| key == TOKEN_PARAM) {
            debug!("ignoring token passed as query parameter");
        }

        match opener {
            Some(opener) => {
                let had_token = token.is_some();
                let message = AuthMessage::Oauth { token };
                let delivered = match Origin::of(url) {
                    Ok(sender) => opener.post_message(message.to_value(), &self.allowed_origin, &sender),
                    Err(e) => {
                        warn!(error = %e, "callback page has no usable origin; not posting");
                        false
                    }
                };
                info!(delivered, had_token, "callback posted result to opener");
                tokio::time::sleep(self.close_delay).await;
                window.close();
                CallbackOutcome::Posted { delivered, had_token }
            }
            None => {
                let outcome = match token {
                    Some(token) => match self.token.save(&token) {
                        Ok(()) => CallbackOutcome::Stored,
                        Err(e) => {
                            warn!(error = %e, "failed to persist token from callback");
                            self.token.clear();
                            CallbackOutcome::Cleared
                        }
                    },
                    None => {
                        self.token.clear();
                        CallbackOutcome::Cleared
                    }
                };
                window.redirect(HOME_ROUTE);
                outcome
            }
        }
    }
}

impl std::fmt::Debug for CallbackPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackPage")
            .field("allowed_origin", &self.allowed_origin)
            .field("close_delay", &self.close_delay)
            .finish_non_exhaustive()
    }
}
