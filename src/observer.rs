//! Observer Boundary for Unsolicited Link Events

use crate::config::MacAddress;

/// Receives events the module sends without being prompted by a command.
///
/// Callbacks are invoked synchronously from the frame-completion path, so
/// implementations must not block. At most one observer is registered per
/// link; registering another silently replaces it.
pub trait LinkObserver {
    /// A plain data frame arrived while no transaction was pending.
    ///
    /// Under RF-comm framing the binary length prefix has already been
    /// stripped.
    fn on_data(&mut self, _data: &[u8]) {}

    /// A central connected; `mac` is the peer address from the notification.
    fn on_connected(&mut self, _mac: &MacAddress) {}

    /// The active connection was lost.
    fn on_disconnected(&mut self) {}
}

/// Observer that ignores every event.
pub struct NullObserver;

impl LinkObserver for NullObserver {}
