//! Persisted connection record
//!
//! Owned by the backend; the connection flow only triggers its creation and
//! reads it back for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformId;

/// A stored platform connection, as returned by the exchange endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConnection {
    pub id: String,
    pub platform: PlatformId,
    /// Account display name on the connected platform (e.g. a page or
    /// channel name), as resolved by the backend during the exchange.
    pub account_name: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub connected_at: DateTime<Utc>,
}
