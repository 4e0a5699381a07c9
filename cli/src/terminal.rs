//! Window bindings for a terminal session.
//!
//! A terminal cannot open a browser popup, so "opening" prints the provider
//! URL and "the popup" is the user's trip through their browser. The popup
//! counts as closed once the pasted redirect has been handled or the user
//! gives up with an empty line.

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use portal::{CallbackWindow, PopupWindow, WindowFeatures, WindowHost};
use url::Url;

/// Opens "popups" by printing their URL to a writer (stderr by default).
pub struct TerminalHost {
    closed: Arc<AtomicBool>,
    out: Box<dyn Fn(&str) + Send + Sync>,
}

impl TerminalHost {
    #[must_use]
    pub fn new() -> Self {
        Self::with_output(|line| {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        })
    }

    pub fn with_output(out: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self { closed: Arc::new(AtomicBool::new(true)), out: Box::new(out) }
    }

    /// Handle for the callback side of the current popup.
    #[must_use]
    pub fn callback_window(&self) -> TerminalWindow {
        TerminalWindow { closed: Arc::clone(&self.closed) }
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHost for TerminalHost {
    fn open(&self, url: &Url, _name: &str, _features: WindowFeatures) -> Option<Box<dyn PopupWindow>> {
        self.closed.store(false, Ordering::SeqCst);
        (self.out)("Open this URL in your browser and sign in:");
        (self.out)(&format!("  {url}"));
        (self.out)("Then paste the address your browser lands on (empty line to cancel):");
        Some(Box::new(TerminalPopup { closed: Arc::clone(&self.closed) }))
    }
}

/// The opener's view of the terminal popup.
pub struct TerminalPopup {
    closed: Arc<AtomicBool>,
}

impl PopupWindow for TerminalPopup {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// The callback page's view of the terminal popup.
#[derive(Clone)]
pub struct TerminalWindow {
    closed: Arc<AtomicBool>,
}

impl TerminalWindow {
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl CallbackWindow for TerminalWindow {
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn redirect(&self, path: &str) {
        tracing::debug!(%path, "callback redirect");
        self.closed.store(true, Ordering::SeqCst);
    }
}
