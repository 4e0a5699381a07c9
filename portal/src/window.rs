//! Window abstractions the login flow runs against.
//!
//! A browser binding implements these over `window.open`, `window.closed`,
//! `window.close()` and `location`; the CLI implements them over a terminal.

use url::Url;

/// Size of an opened popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowFeatures {
    pub width: u32,
    pub height: u32,
}

impl WindowFeatures {
    /// `window.open` feature string, e.g. `"width=600,height=700"`.
    #[must_use]
    pub fn to_feature_string(self) -> String {
        format!("width={},height={}", self.width, self.height)
    }
}

/// Something that can open secondary windows.
pub trait WindowHost: Send + Sync {
    /// Open `url` in a new window. `None` when the host refused (popup
    /// blocker, no display, ...).
    fn open(&self, url: &Url, name: &str, features: WindowFeatures) -> Option<Box<dyn PopupWindow>>;
}

/// The opener's view of a popup it created.
pub trait PopupWindow: Send + Sync {
    fn is_closed(&self) -> bool;
    fn close(&self);
}

/// A callback page's view of its own window.
pub trait CallbackWindow: Send + Sync {
    fn close(&self);
    /// Navigate this window to an application path.
    fn redirect(&self, path: &str);
}
