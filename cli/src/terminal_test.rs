use super::*;
use std::sync::Mutex;

fn captured() -> (TerminalHost, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let host = TerminalHost::with_output(move |line| sink.lock().unwrap().push(line.to_owned()));
    (host, lines)
}

fn features() -> WindowFeatures {
    WindowFeatures { width: 600, height: 700 }
}

#[test]
fn open_prints_url_and_returns_open_popup() {
    let (host, lines) = captured();
    let url = Url::parse("https://accounts.google.com/o/oauth2/auth?state=abc").unwrap();

    let popup = host.open(&url, "google_oauth", features()).unwrap();

    assert!(!popup.is_closed());
    assert!(lines.lock().unwrap().iter().any(|l| l.contains("state=abc")));
}

#[test]
fn callback_close_closes_opener_view() {
    let (host, _) = captured();
    let url = Url::parse("https://example.com/").unwrap();
    let popup = host.open(&url, "google_oauth", features()).unwrap();
    let window = host.callback_window();

    CallbackWindow::close(&window);

    assert!(popup.is_closed());
    assert!(window.is_closed());
}

#[test]
fn redirect_marks_window_closed() {
    let (host, _) = captured();
    let url = Url::parse("https://example.com/").unwrap();
    let _popup = host.open(&url, "google_oauth", features()).unwrap();
    let window = host.callback_window();
    assert!(!window.is_closed());
    window.redirect("/");
    assert!(window.is_closed());
}

#[test]
fn reopening_resets_closed_flag() {
    let (host, _) = captured();
    let url = Url::parse("https://example.com/").unwrap();
    let first = host.open(&url, "google_oauth", features()).unwrap();
    first.close();
    assert!(first.is_closed());

    let second = host.open(&url, "google_oauth", features()).unwrap();
    assert!(!second.is_closed());
}
