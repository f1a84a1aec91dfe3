#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! HM-10 BLE Module Link Driver
//!
//! This crate drives an HM-10 Bluetooth-LE module over a DMA-fed serial link,
//! organized into clear architectural layers:
//!
//! - `frame`/`framer`: extraction of discrete messages from the circular
//!   receive region, using the hardware byte counter as the only cursor
//! - `link`: the blocking command/response transaction engine and the
//!   classifier that intercepts unsolicited connection notifications
//! - `commands`: typed AT-command wrappers (system and radio settings)
//!
//! The physical byte transport is abstracted behind [`Transport`]; unsolicited
//! events reach the application through [`LinkObserver`].

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod commands;
pub mod config;
pub mod frame;
pub mod framer;
pub mod link;
pub mod observer;
pub mod transport;

pub use commands::system::RestartPolicy;
pub use config::{
    AdvertInterval, AdvertType, Baudrate, BondMode, ConnInterval, ConnTimeout, DeviceName,
    FirmwareVersion, MacAddress, ModulePower, OutputPower, Role, WorkMode,
};
pub use frame::{Frame, MAX_FRAME_LEN};
pub use link::{ConnectionState, DeviceLink, Error, DEFAULT_TIMEOUT, PROBE_TIMEOUT};
pub use observer::{LinkObserver, NullObserver};
pub use transport::Transport;
