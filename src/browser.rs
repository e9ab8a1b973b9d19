//! Loopback redirect driver
//!
//! Terminal-mode stand-in for a browser popup: the consent screen opens in
//! the system browser, and a one-shot loopback HTTP listener catches the
//! provider redirect and republishes it as a completion message with the
//! loopback origin. The redirect URI (fixed loopback port) is registered
//! with the backend's OAuth configuration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tiny_http::{Header, Response, Server};
use url::{form_urlencoded, Url};

use crosspost_connect::{Bounds, MessageBus, PopupWindow, WindowSystem};
use crosspost_core::prelude::*;
use crosspost_core::{CompletionMessage, InboundMessage, Origin};

/// Loopback port registered in the backend's OAuth redirect allow-list.
pub const DEFAULT_CALLBACK_PORT: u16 = 8777;

const LANDING_HTML: &str =
    "<html><body><p>Authorization received. You can close this tab and return to the terminal.</p></body></html>";

/// Window system backed by the system browser plus a loopback listener.
pub struct LoopbackBrowser {
    port: u16,
    bus: MessageBus,
}

impl LoopbackBrowser {
    pub fn new(bus: MessageBus, port: u16) -> Self {
        Self { port, bus }
    }

    /// Origin the redirect catcher publishes under; the controller's
    /// expected origin must be exactly this.
    pub fn origin(&self) -> Origin {
        Origin::new(format!("http://127.0.0.1:{}", self.port))
    }
}

impl WindowSystem for LoopbackBrowser {
    fn parent_bounds(&self) -> Bounds {
        // No parent window exists in terminal mode; the browser places the
        // tab itself. A fixed virtual desktop keeps centering well-defined.
        Bounds::new(0, 0, 1280, 800)
    }

    fn open(&self, url: &Url, _bounds: Bounds) -> Result<Box<dyn PopupWindow>> {
        // Bind before opening the browser so the redirect cannot race us.
        let server = Server::http(("127.0.0.1", self.port))
            .map_err(|e| Error::network(format!("failed to bind callback listener: {e}")))?;

        webbrowser::open(url.as_str()).map_err(|_| Error::PopupBlocked)?;
        info!(%url, port = self.port, "opened system browser for authorization");

        let stop = Arc::new(AtomicBool::new(false));
        let bus = self.bus.clone();
        let origin = self.origin();
        let stop_flag = stop.clone();
        std::thread::spawn(move || serve_redirect(server, bus, origin, stop_flag));

        Ok(Box::new(BrowserTab { stop }))
    }
}

/// Serve until the provider redirect arrives or the tab is torn down.
fn serve_redirect(server: Server, bus: MessageBus, origin: Origin, stop: Arc<AtomicBool>) {
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        match server.recv_timeout(Duration::from_millis(250)) {
            Ok(Some(request)) => {
                let message = parse_redirect(request.url());
                let response = Response::from_string(LANDING_HTML).with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
                        .expect("static header is valid"),
                );
                let _ = request.respond(response);

                // Favicon probes and other stray requests are ignored.
                if let Some(message) = message {
                    bus.publish(InboundMessage::new(origin, message));
                    return;
                }
            }
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "callback listener failed");
                return;
            }
        }
    }
}

/// Translate the provider redirect query into a completion message.
fn parse_redirect(raw_url: &str) -> Option<CompletionMessage> {
    let (_, query) = raw_url.split_once('?')?;
    let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    if let Some(error) = params.get("error") {
        return Some(CompletionMessage::Failure {
            error: error.clone(),
        });
    }

    let code = params.get("code").filter(|c| !c.is_empty())?;
    let state = params.get("state")?;
    Some(CompletionMessage::Success {
        code: code.clone(),
        state: state.clone(),
    })
}

/// Handle to the opened browser tab.
///
/// A tab's close button cannot be observed from out of process, so
/// `is_closed` never reports true; the controller's abandonment timeout
/// covers a user who walks away. Closing stops the redirect listener.
#[derive(Debug)]
struct BrowserTab {
    stop: Arc<AtomicBool>,
}

impl PopupWindow for BrowserTab {
    fn is_closed(&self) -> bool {
        false
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for BrowserTab {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redirect_success() {
        let msg = parse_redirect("/callback?code=abc&state=xyz").unwrap();
        assert_eq!(
            msg,
            CompletionMessage::Success {
                code: "abc".to_string(),
                state: "xyz".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_redirect_provider_error() {
        let msg = parse_redirect("/callback?error=access_denied").unwrap();
        assert_eq!(
            msg,
            CompletionMessage::Failure {
                error: "access_denied".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_redirect_ignores_stray_requests() {
        assert!(parse_redirect("/favicon.ico").is_none());
        assert!(parse_redirect("/callback?code=&state=xyz").is_none());
        assert!(parse_redirect("/callback?code=abc").is_none());
    }

    #[test]
    fn test_parse_redirect_decodes_percent_encoding() {
        let msg = parse_redirect("/callback?error=user%20denied%20access").unwrap();
        assert_eq!(
            msg,
            CompletionMessage::Failure {
                error: "user denied access".to_string(),
            }
        );
    }
}
