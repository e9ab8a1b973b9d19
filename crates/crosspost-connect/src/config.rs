//! Settings parser for crosspost/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::window::{PopupGeometry, DEFAULT_POPUP_HEIGHT, DEFAULT_POPUP_WIDTH};
use crosspost_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR: &str = "crosspost";

const DEFAULT_API_BASE: &str = "https://api.crosspost.app";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_AUTHORIZE_TIMEOUT_SECS: u64 = 300;

/// Connection flow settings, the `[connect]` table of `config.toml`.
///
/// Every field has a default; a missing file or a partial table is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectSettings {
    /// Base URL of the Crosspost backend.
    pub api_base: Url,

    /// Popup viewport size.
    pub popup_width: u32,
    pub popup_height: u32,

    /// How often the controller checks whether the user closed the popup.
    pub poll_interval_ms: u64,

    /// Upper bound on waiting for an abandoned popup. The observed web
    /// client waits forever; we bound it and surface a timeout instead.
    pub authorize_timeout_secs: u64,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            popup_width: DEFAULT_POPUP_WIDTH,
            popup_height: DEFAULT_POPUP_HEIGHT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            authorize_timeout_secs: DEFAULT_AUTHORIZE_TIMEOUT_SECS,
        }
    }
}

impl ConnectSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn authorize_timeout(&self) -> Duration {
        Duration::from_secs(self.authorize_timeout_secs)
    }

    pub fn popup_geometry(&self) -> PopupGeometry {
        PopupGeometry::new(self.popup_width, self.popup_height)
    }

    /// Load settings from the user's config directory.
    ///
    /// Missing file yields defaults; a malformed file is an error rather
    /// than silently ignored.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific config file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&contents)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        Ok(file.connect)
    }
}

/// Full config file shape; other tools own their own tables.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    connect: ConnectSettings,
}

/// `<config dir>/crosspost/config.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(CONFIG_DIR).join(CONFIG_FILENAME))
}
