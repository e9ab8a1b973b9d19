//! Popup window abstraction
//!
//! The connection flow never touches a window manager directly. It opens
//! popups through [`WindowSystem`] and observes/closes them through
//! [`PopupWindow`], so the same controller drives a browser `window.open`,
//! a system-browser-plus-loopback driver, or a test stub.

use url::Url;

use crosspost_core::prelude::*;

/// Fixed popup viewport used for OAuth consent screens.
pub const DEFAULT_POPUP_WIDTH: u32 = 600;
pub const DEFAULT_POPUP_HEIGHT: u32 = 700;

/// Screen-space rectangle (position + size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Requested popup size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    pub width: u32,
    pub height: u32,
}

impl Default for PopupGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_POPUP_WIDTH,
            height: DEFAULT_POPUP_HEIGHT,
        }
    }
}

impl PopupGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Compute the popup bounds centered on the parent window.
    ///
    /// Callers pass the parent bounds at call time; caching them would
    /// mis-center the popup after the parent moves between attempts.
    pub fn centered_on(&self, parent: Bounds) -> Bounds {
        let x = parent.x + (parent.width as i32 - self.width as i32) / 2;
        let y = parent.y + (parent.height as i32 - self.height as i32) / 2;
        Bounds::new(x, y, self.width, self.height)
    }
}

/// An open popup window owned by the controller for one attempt.
///
/// Implementations must make `close` idempotent and must close the
/// underlying window on `Drop`: an in-flight authorization future being
/// dropped is the cancellation path, and it must not leak the window.
pub trait PopupWindow: Send + std::fmt::Debug {
    /// Whether the user has closed the window out from under us.
    fn is_closed(&self) -> bool;

    /// Close the window. Safe to call more than once.
    fn close(&mut self);
}

/// Window-manager seam: knows where the parent window is and can open
/// popups at a given position.
pub trait WindowSystem: Send + Sync {
    /// Current parent window bounds, queried fresh for every attempt.
    fn parent_bounds(&self) -> Bounds;

    /// Open a popup at `bounds` pointed at `url`.
    ///
    /// Returns [`Error::PopupBlocked`] when the environment refuses to
    /// open a window (e.g. a browser popup blocker).
    fn open(&self, url: &Url, bounds: Bounds) -> Result<Box<dyn PopupWindow>>;
}
