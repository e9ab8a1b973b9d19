//! Test utilities for the connection flow
//!
//! Hand-rolled stubs for the two seams the wizard depends on: the window
//! system and the remote connection client.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use url::Url;

use crate::client::{AuthorizationUrl, ConnectionClient, ExchangeRequest};
use crate::window::{Bounds, PopupWindow, WindowSystem};
use crosspost_core::prelude::*;
use crosspost_core::{Origin, PlatformConnection, PlatformId};

/// The host page origin used throughout the tests.
pub fn host_origin() -> Origin {
    Origin::new("https://app.crosspost.app")
}

/// Creates a plausible stored connection for `platform`.
pub fn stub_connection(platform: PlatformId) -> PlatformConnection {
    PlatformConnection {
        id: format!("conn_{platform}"),
        platform,
        account_name: "Acme Social".to_string(),
        scopes: vec!["publish".to_string()],
        connected_at: Utc::now(),
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Window system stub
// ─────────────────────────────────────────────────────────────────────────

/// A window system whose popup can be "closed by the user" from the test.
pub struct StubWindowSystem {
    parent: Bounds,
    blocked: bool,
    closed: Arc<AtomicBool>,
    effective_closes: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
    last_bounds: Arc<Mutex<Option<Bounds>>>,
    last_url: Arc<Mutex<Option<Url>>>,
}

impl StubWindowSystem {
    /// Popups open successfully and stay open until closed.
    pub fn new() -> Self {
        Self {
            parent: Bounds::new(100, 100, 1920, 1080),
            blocked: false,
            closed: Arc::new(AtomicBool::new(false)),
            effective_closes: Arc::new(AtomicUsize::new(0)),
            opened: Arc::new(AtomicUsize::new(0)),
            last_bounds: Arc::new(Mutex::new(None)),
            last_url: Arc::new(Mutex::new(None)),
        }
    }

    /// Every open attempt is refused, as a popup blocker would.
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::new()
        }
    }

    /// Flag shared with the currently open popup; storing `true` simulates
    /// the user closing the window.
    pub fn close_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    /// Number of closes that actually closed a window (re-closing an
    /// already-closed window does not count).
    pub fn close_count(&self) -> Arc<AtomicUsize> {
        self.effective_closes.clone()
    }

    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn last_bounds(&self) -> Option<Bounds> {
        *self.last_bounds.lock().unwrap()
    }

    pub fn last_url(&self) -> Option<Url> {
        self.last_url.lock().unwrap().clone()
    }
}

impl Default for StubWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSystem for StubWindowSystem {
    fn parent_bounds(&self) -> Bounds {
        self.parent
    }

    fn open(&self, url: &Url, bounds: Bounds) -> Result<Box<dyn PopupWindow>> {
        if self.blocked {
            return Err(Error::PopupBlocked);
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_bounds.lock().unwrap() = Some(bounds);
        *self.last_url.lock().unwrap() = Some(url.clone());
        // A fresh attempt starts with an open window.
        self.closed.store(false, Ordering::SeqCst);
        Ok(Box::new(StubWindow {
            closed: self.closed.clone(),
            effective_closes: self.effective_closes.clone(),
        }))
    }
}

#[derive(Debug)]
struct StubWindow {
    closed: Arc<AtomicBool>,
    effective_closes: Arc<AtomicUsize>,
}

impl PopupWindow for StubWindow {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.effective_closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for StubWindow {
    fn drop(&mut self) {
        self.close();
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Connection client stub
// ─────────────────────────────────────────────────────────────────────────

/// A scriptable `ConnectionClient`.
///
/// Succeeds by default; either call can be scripted to fail once. Clones
/// share state, so a handle kept outside the wizard observes its calls.
#[derive(Clone)]
pub struct StubClient {
    inner: Arc<StubClientInner>,
}

struct StubClientInner {
    auth_url: Url,
    state: Mutex<String>,
    url_error: Mutex<Option<Error>>,
    exchange_error: Mutex<Option<Error>>,
    exchange_requests: Mutex<Vec<ExchangeRequest>>,
    url_calls: AtomicUsize,
}

impl StubClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StubClientInner {
                auth_url: Url::parse("https://provider.example/oauth/authorize").unwrap(),
                state: Mutex::new("xyz".to_string()),
                url_error: Mutex::new(None),
                exchange_error: Mutex::new(None),
                exchange_requests: Mutex::new(Vec::new()),
                url_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Override the anti-forgery state issued with the authorization URL.
    pub fn with_state(self, state: impl Into<String>) -> Self {
        *self.inner.state.lock().unwrap() = state.into();
        self
    }

    /// The next `authorization_url` call fails with `err`.
    pub fn fail_authorization_url(self, err: Error) -> Self {
        *self.inner.url_error.lock().unwrap() = Some(err);
        self
    }

    /// The next `exchange_code` call fails with `err`.
    pub fn fail_exchange(self, err: Error) -> Self {
        *self.inner.exchange_error.lock().unwrap() = Some(err);
        self
    }

    /// Exchange requests seen so far, in order.
    pub fn exchange_requests(&self) -> Vec<ExchangeRequest> {
        self.inner.exchange_requests.lock().unwrap().clone()
    }

    pub fn url_calls(&self) -> usize {
        self.inner.url_calls.load(Ordering::SeqCst)
    }
}

impl Default for StubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionClient for StubClient {
    async fn authorization_url(&self, _platform: PlatformId) -> Result<AuthorizationUrl> {
        self.inner.url_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.inner.url_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(AuthorizationUrl {
            auth_url: self.inner.auth_url.clone(),
            state: self.inner.state.lock().unwrap().clone(),
        })
    }

    async fn exchange_code(&self, request: ExchangeRequest) -> Result<PlatformConnection> {
        let platform = request.platform;
        self.inner.exchange_requests.lock().unwrap().push(request);
        if let Some(err) = self.inner.exchange_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(stub_connection(platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_client_defaults_succeed() {
        let client = StubClient::new();
        let issued = client.authorization_url(PlatformId::LinkedIn).await.unwrap();
        assert_eq!(issued.state, "xyz");

        let conn = client
            .exchange_code(ExchangeRequest {
                platform: PlatformId::LinkedIn,
                code: "abc".to_string(),
                state: "xyz".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(conn.platform, PlatformId::LinkedIn);
        assert_eq!(client.url_calls(), 1);
        assert_eq!(client.exchange_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failures_are_one_shot() {
        let client = StubClient::new().fail_exchange(Error::invalid_grant("expired"));

        let err = client
            .exchange_code(ExchangeRequest {
                platform: PlatformId::Twitter,
                code: "abc".to_string(),
                state: "xyz".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGrant { .. }));

        // Second call succeeds again.
        assert!(client
            .exchange_code(ExchangeRequest {
                platform: PlatformId::Twitter,
                code: "abc".to_string(),
                state: "xyz".to_string(),
            })
            .await
            .is_ok());
    }

    #[test]
    fn test_blocked_window_system_refuses_open() {
        let windows = StubWindowSystem::blocked();
        let url = Url::parse("https://provider.example/authorize").unwrap();
        let err = windows
            .open(&url, Bounds::new(0, 0, 600, 700))
            .unwrap_err();
        assert!(matches!(err, Error::PopupBlocked));
        assert_eq!(windows.opened_count(), 0);
    }
}
