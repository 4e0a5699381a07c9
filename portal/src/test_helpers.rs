//! Fakes shared by the session tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use url::Url;

use crate::token::encode_unsigned;
use crate::window::{CallbackWindow, PopupWindow, WindowFeatures, WindowHost};

pub const APP_ORIGIN: &str = "http://localhost:3000";

pub fn member_token(sub: &str, email: &str, name: &str) -> String {
    encode_unsigned(&serde_json::json!({ "sub": sub, "email": email, "name": name, "exp": 4_102_444_800_u64 }))
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// A base URL nothing listens on.
pub fn dead_backend() -> Url {
    Url::parse("http://127.0.0.1:9").unwrap()
}

// =============================================================================
// WINDOWS
// =============================================================================

#[derive(Clone, Default)]
pub struct FakePopup {
    closed: Arc<AtomicBool>,
    close_calls: Arc<AtomicUsize>,
}

impl FakePopup {
    /// Simulate the user closing the window.
    pub fn user_closes(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl PopupWindow for FakePopup {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

type OnOpen = Box<dyn FnMut(&Url, &FakePopup) + Send>;

#[derive(Default)]
pub struct FakeHost {
    blocked: bool,
    popup: FakePopup,
    opened: Mutex<Vec<(String, String, WindowFeatures)>>,
    on_open: Mutex<Option<OnOpen>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn blocked() -> Arc<Self> {
        Arc::new(Self { blocked: true, ..Self::default() })
    }

    /// Run `f` synchronously every time a popup opens.
    pub fn on_open(&self, f: impl FnMut(&Url, &FakePopup) + Send + 'static) {
        *self.on_open.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(f));
    }

    pub fn popup(&self) -> FakePopup {
        self.popup.clone()
    }

    pub fn opened(&self) -> Vec<(String, String, WindowFeatures)> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl WindowHost for FakeHost {
    fn open(&self, url: &Url, name: &str, features: WindowFeatures) -> Option<Box<dyn PopupWindow>> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), name.to_owned(), features));
        if self.blocked {
            return None;
        }
        if let Some(f) = self.on_open.lock().unwrap_or_else(PoisonError::into_inner).as_mut() {
            f(url, &self.popup);
        }
        Some(Box::new(self.popup.clone()))
    }
}

#[derive(Default)]
pub struct FakeCallbackWindow {
    closed: AtomicBool,
    redirects: Mutex<Vec<String>>,
}

impl FakeCallbackWindow {
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CallbackWindow for FakeCallbackWindow {
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn redirect(&self, path: &str) {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
