//! AT-Command Wrappers
//!
//! Typed front-ends over [`DeviceLink::execute`](crate::link::DeviceLink::execute),
//! split by concern:
//! - `system`: liveness, reboot/restart sequencing, factory reset, baud rate,
//!   sleep/wake, firmware version
//! - `radio`: address, name, advertising, connection parameters, power, role,
//!   bonding, notifications
//!
//! Commands are ASCII strings of the form `AT+<NAME><args>`; the module
//! answers `OK+<TAG>...` on success. Formatting is bounded: a command that
//! would not fit the transmit buffer is rejected locally instead of being
//! silently truncated.

use heapless::String;

pub mod radio;
pub mod system;

/// Capacity of the formatted-command buffer.
pub(crate) const MAX_COMMAND_LEN: usize = 32;

pub(crate) type CommandBuffer = String<MAX_COMMAND_LEN>;

/// Acknowledgment prefix for setter commands.
pub(crate) const SET_ACK: &str = "OK+Set";

/// Response prefix for getter commands; the value starts at offset 7.
pub(crate) const GET_ACK: &str = "OK+Get";

/// Offset of the numeric value inside an `OK+Get:` response.
pub(crate) const GET_VALUE_OFFSET: usize = 7;

/// Format a command into a bounded buffer; `None` when it does not fit.
pub(crate) fn format_command(args: core::fmt::Arguments<'_>) -> Option<CommandBuffer> {
    let mut buffer = CommandBuffer::new();
    core::fmt::write(&mut buffer, args).ok()?;
    Some(buffer)
}
