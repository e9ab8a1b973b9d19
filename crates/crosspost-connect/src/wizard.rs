//! Connection wizard state machine
//!
//! Three ordered steps with guarded transitions:
//! `SelectPlatform -> Authorize -> Complete`, plus the single backward edge
//! `Authorize -> SelectPlatform`. State is transient per dialog session and
//! mutated only by the methods here.

use crate::client::{ConnectionClient, ExchangeRequest};
use crate::popup::PopupController;
use crate::window::WindowSystem;
use crosspost_core::prelude::*;
use crosspost_core::{PlatformConnection, PlatformId};

/// Current step of the connection wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    SelectPlatform,
    Authorize,
    /// Terminal: the connection exists; only `close()` remains.
    Complete,
}

/// The connection dialog's state machine.
///
/// Owns one dialog session's worth of state. The popup window itself is
/// owned by the [`PopupController`]; the wizard never reaches into it
/// beyond driving an attempt.
pub struct ConnectionWizard<C: ConnectionClient, W: WindowSystem> {
    client: C,
    popup: PopupController<W>,
    /// Seed platform the dialog was opened with, if any; `close()` resets
    /// back to it.
    initial_platform: Option<PlatformId>,
    step: WizardStep,
    selected: Option<PlatformId>,
    is_connecting: bool,
    last_error: Option<Error>,
    connection: Option<PlatformConnection>,
}

impl<C: ConnectionClient, W: WindowSystem> ConnectionWizard<C, W> {
    /// A fresh dialog starting at platform selection.
    pub fn new(client: C, popup: PopupController<W>) -> Self {
        Self {
            client,
            popup,
            initial_platform: None,
            step: WizardStep::SelectPlatform,
            selected: None,
            is_connecting: false,
            last_error: None,
            connection: None,
        }
    }

    /// A dialog pre-seeded with a platform, opening directly in Authorize.
    pub fn with_platform(client: C, popup: PopupController<W>, platform: PlatformId) -> Self {
        let mut wizard = Self::new(client, popup);
        wizard.initial_platform = Some(platform);
        wizard.selected = Some(platform);
        wizard.step = WizardStep::Authorize;
        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_platform(&self) -> Option<PlatformId> {
        self.selected
    }

    /// Busy flag guarding duplicate submissions while an attempt runs.
    pub fn is_connecting(&self) -> bool {
        self.is_connecting
    }

    /// The error surfaced next to the Authorize action, if any.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// The stored connection, once the wizard reaches `Complete`.
    pub fn connection(&self) -> Option<&PlatformConnection> {
        self.connection.as_ref()
    }

    /// `SelectPlatform --select(platform)--> Authorize`.
    ///
    /// Ignored outside the selection step; re-selection after `back()` is
    /// idempotent and leaves the wizard in an equivalent Authorize state.
    pub fn select(&mut self, platform: PlatformId) {
        if self.step != WizardStep::SelectPlatform {
            warn!(%platform, step = ?self.step, "ignoring select outside SelectPlatform");
            return;
        }
        self.selected = Some(platform);
        self.last_error = None;
        self.step = WizardStep::Authorize;
    }

    /// `Authorize --back()--> SelectPlatform`.
    ///
    /// Preserves the selected platform and clears the surfaced error. A
    /// no-op in any other step.
    pub fn back(&mut self) {
        if self.step != WizardStep::Authorize {
            return;
        }
        self.last_error = None;
        self.step = WizardStep::SelectPlatform;
    }

    /// Run one authorization attempt: fetch the authorization URL, drive
    /// the popup, exchange the code.
    ///
    /// Success transitions to `Complete`. Every failure keeps the wizard
    /// in `Authorize` with the specific error surfaced via
    /// [`last_error`](Self::last_error) and `is_connecting` reset; the
    /// user retries explicitly. Dropping the future mid-flight tears the
    /// popup down without leaking.
    pub async fn authorize(&mut self) {
        if self.step != WizardStep::Authorize {
            warn!(step = ?self.step, "ignoring authorize outside Authorize");
            return;
        }
        let Some(platform) = self.selected else {
            // Unreachable through the public transitions; keep the dialog
            // alive rather than panic.
            warn!("authorize with no platform selected");
            return;
        };

        self.is_connecting = true;
        self.last_error = None;

        let result = self.run_attempt(platform).await;
        self.is_connecting = false;

        match result {
            Ok(connection) => {
                info!(%platform, account = %connection.account_name, "platform connected");
                self.connection = Some(connection);
                self.step = WizardStep::Complete;
            }
            Err(err) => {
                info!(%platform, error = %err, "authorization attempt failed");
                self.last_error = Some(err);
            }
        }
    }

    async fn run_attempt(&self, platform: PlatformId) -> Result<PlatformConnection> {
        let issued = self.client.authorization_url(platform).await?;
        let grant = self.popup.begin_authorization(&issued.auth_url).await?;

        if grant.state != issued.state {
            // The backend rejects the mismatch authoritatively; log it so
            // a forged or stale popup message is visible in the trace.
            warn!(%platform, "popup state does not match issued state");
        }

        self.client
            .exchange_code(ExchangeRequest {
                platform,
                code: grant.code,
                state: grant.state,
            })
            .await
    }

    /// Tear down the dialog session.
    ///
    /// Valid in every step, any number of times; resets all wizard state
    /// to its initial values and never panics. Any in-flight popup is torn
    /// down when its `authorize()` future is dropped, not here.
    pub fn close(&mut self) {
        self.step = match self.initial_platform {
            Some(_) => WizardStep::Authorize,
            None => WizardStep::SelectPlatform,
        };
        self.selected = self.initial_platform;
        self.is_connecting = false;
        self.last_error = None;
        self.connection = None;
    }
}
