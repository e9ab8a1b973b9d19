//! OAuth popup controller
//!
//! Owns the child window used for a third-party consent screen and surfaces
//! its outcome. Each attempt races three sources and resolves exactly once:
//! a trusted completion message, a closed-poll detecting manual close, and
//! a bounded abandonment timeout. Whichever fires first is authoritative;
//! the others are disarmed by the same teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use url::Url;

use crate::bus::MessageBus;
use crate::config::ConnectSettings;
use crate::window::{PopupGeometry, WindowSystem};
use crosspost_core::message::CompletionMessage;
use crosspost_core::prelude::*;
use crosspost_core::Origin;

/// Code/state pair extracted from a trusted `OAUTH_SUCCESS` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGrant {
    pub code: String,
    pub state: String,
}

/// Manages exactly one popup window at a time.
///
/// Concurrency contract: fail-fast. A second [`begin_authorization`] while
/// one is outstanding returns [`Error::AlreadyInProgress`]; the first
/// attempt is never silently replaced.
///
/// [`begin_authorization`]: PopupController::begin_authorization
pub struct PopupController<W: WindowSystem> {
    windows: W,
    bus: MessageBus,
    expected_origin: Origin,
    geometry: PopupGeometry,
    poll_interval: Duration,
    authorize_timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

impl<W: WindowSystem> PopupController<W> {
    pub fn new(windows: W, bus: MessageBus, expected_origin: Origin) -> Self {
        Self::with_settings(windows, bus, expected_origin, &ConnectSettings::default())
    }

    pub fn with_settings(
        windows: W,
        bus: MessageBus,
        expected_origin: Origin,
        settings: &ConnectSettings,
    ) -> Self {
        Self {
            windows,
            bus,
            expected_origin,
            geometry: settings.popup_geometry(),
            poll_interval: settings.poll_interval(),
            authorize_timeout: settings.authorize_timeout(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an authorization attempt is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one authorization attempt against a backend-issued URL.
    ///
    /// Opens the popup centered on the parent's bounds as they are right
    /// now, then waits for the first of: a trusted completion message, the
    /// user closing the window, or the abandonment timeout. Messages from
    /// any other origin are discarded and never resolve the attempt.
    ///
    /// Cancellation-safe: dropping the returned future closes the window
    /// (via the [`PopupWindow`](crate::window::PopupWindow) drop contract),
    /// drops the message subscription, and releases the in-flight slot.
    pub async fn begin_authorization(&self, url: &Url) -> Result<AuthorizationGrant> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let bounds = self.geometry.centered_on(self.windows.parent_bounds());
        debug!(%url, ?bounds, "opening authorization popup");
        let mut window = self.windows.open(url, bounds)?;

        // Subscribed for this attempt only; dropped on every exit path.
        let mut subscription = self.bus.subscribe();

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadline = tokio::time::sleep(self.authorize_timeout);
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                inbound = subscription.recv() => match inbound {
                    Some(msg) if msg.origin == self.expected_origin => match msg.message {
                        CompletionMessage::Success { code, state } => {
                            debug!("popup reported success");
                            break Ok(AuthorizationGrant { code, state });
                        }
                        CompletionMessage::Failure { error } => {
                            debug!(%error, "popup reported provider error");
                            break Err(Error::provider(error));
                        }
                    },
                    Some(msg) => {
                        warn!(origin = %msg.origin, "discarding message from untrusted origin");
                    }
                    None => break Err(Error::ChannelClosed),
                },
                _ = poll.tick() => {
                    if window.is_closed() {
                        debug!("popup closed by user before completing");
                        break Err(Error::UserCancelled);
                    }
                }
                _ = &mut deadline => {
                    warn!(timeout = ?self.authorize_timeout, "authorization abandoned, timing out");
                    break Err(Error::AuthorizationTimeout);
                }
            }
        };

        // Idempotent teardown: the window may already be gone, and a second
        // delivery of the completion message has no subscription to land on.
        window.close();
        subscription.close();
        outcome
    }
}

/// RAII slot for the single outstanding attempt.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyInProgress);
        }
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
