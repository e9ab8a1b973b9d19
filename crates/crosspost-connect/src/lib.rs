//! # crosspost-connect - Platform Connection Flow
//!
//! Implements the OAuth connection flow for Crosspost: the three-step
//! connection wizard, the popup controller that owns the consent window and
//! its completion protocol, and the remote connection client that talks to
//! the backend.
//!
//! The flow is single-threaded and event-driven; every operation is an
//! async task that suspends awaiting either the backend or the popup's
//! outcome. The popup's outcome resolves exactly once per attempt.

pub mod bus;
pub mod client;
pub mod config;
pub mod popup;
pub mod test_utils;
pub mod window;
pub mod wizard;

// Re-export primary types
pub use bus::{MessageBus, MessageSubscription};
pub use client::{AuthorizationUrl, ConnectionClient, ExchangeRequest, HttpConnectionClient};
pub use config::ConnectSettings;
pub use popup::{AuthorizationGrant, PopupController};
pub use window::{Bounds, PopupGeometry, PopupWindow, WindowSystem};
pub use wizard::{ConnectionWizard, WizardStep};
