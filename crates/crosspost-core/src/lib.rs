//! # crosspost-core - Core Domain Types
//!
//! Foundation crate for Crosspost's platform connection flow. Provides the
//! platform registry, the cross-window completion message contract, the
//! stored connection record, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Platforms (`platform`)
//! - [`PlatformId`] - Fixed set of supported platforms, kebab-case wire form
//! - [`PlatformInfo`] - Registry copy: display name, color token, permissions
//! - [`ALL_PLATFORMS`] - All platforms in display order
//!
//! ### Messages (`message`)
//! - [`CompletionMessage`] - Tagged `OAUTH_SUCCESS` / `OAUTH_ERROR` payload
//! - [`Origin`] - Sender origin, compared for exact equality
//! - [`InboundMessage`] - Message plus the origin it arrived from
//!
//! ### Connections (`connection`)
//! - [`PlatformConnection`] - Backend-owned record of a stored connection
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with recoverable classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context

pub mod connection;
pub mod error;
pub mod logging;
pub mod message;
pub mod platform;

/// Prelude for common imports used throughout all Crosspost crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use connection::PlatformConnection;
pub use error::{Error, Result, ResultExt};
pub use message::{CompletionMessage, InboundMessage, Origin};
pub use platform::{PlatformId, PlatformInfo, ALL_PLATFORMS};
