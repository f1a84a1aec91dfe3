//! HM-10 Module Settings
//!
//! This module defines the bounded setting enumerations of the HM-10 module,
//! each with an explicit invalid sentinel used as the "operation not
//! applicable" signal, plus the string types carried in responses:
//! - Baud rate (with the wire-code-to-Hz lookup table)
//! - Advertising interval and type
//! - Connection interval and supervision timeout
//! - Work mode, module power, output driver power, role, bond mode
//! - MAC address, device name, firmware version strings

use heapless::String;

/// Maximum length of a device name accepted by `AT+NAME` (datasheet limit).
pub const NAME_MAX: usize = 12;

/// Maximum textual length of a MAC address (colon-separated form).
pub const MAC_TEXT_MAX: usize = 17;

/// Device name as carried in `OK+NAME:` responses.
pub type DeviceName = String<NAME_MAX>;

/// Firmware version string as carried in `AT+VERR?` responses.
pub type FirmwareVersion = String<16>;

macro_rules! setting {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
            @invalid $invalid:ident = $ivalue:literal,
        }
    ) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
            /// Sentinel for values the module does not accept.
            $invalid = $ivalue,
        }

        impl $name {
            /// Wire code of the setting, `None` for the invalid sentinel.
            pub fn code(self) -> Option<u8> {
                match self {
                    Self::$invalid => None,
                    other => Some(other as u8),
                }
            }

            /// Decode a wire code, mapping unknown values to the sentinel.
            pub fn from_code(code: u8) -> Self {
                match code {
                    $( $value => Self::$variant, )+
                    _ => Self::$invalid,
                }
            }
        }
    };
}

setting! {
    /// Serial baud rate selector (`AT+BAUD`).
    pub enum Baudrate {
        Baud9600 = 0,
        Baud19200 = 1,
        Baud38400 = 2,
        Baud57600 = 3,
        Baud115200 = 4,
        Baud4800 = 5,
        Baud2400 = 6,
        Baud1200 = 7,
        Baud230400 = 8,
        @invalid Invalid = 9,
    }
}

/// `Baudrate` wire-code lookup table, in bits per second.
pub const BAUDRATE_HZ: [u32; 10] = [
    9600, 19200, 38400, 57600, 115200, 4800, 2400, 1200, 230400, 0,
];

impl Baudrate {
    /// Serial bit rate in Hz, `None` for the invalid sentinel.
    pub fn hz(self) -> Option<u32> {
        BAUDRATE_HZ
            .get(self as usize)
            .copied()
            .filter(|&hz| hz != 0)
    }
}

impl Default for Baudrate {
    /// The module's documented factory default.
    fn default() -> Self {
        Self::Baud9600
    }
}

setting! {
    /// Advertising interval selector (`AT+ADVI`, hexadecimal wire code).
    pub enum AdvertInterval {
        Adv100ms = 0,
        Adv152ms = 1,
        Adv211ms = 2,
        Adv318ms = 3,
        Adv417ms = 4,
        Adv546ms = 5,
        Adv760ms = 6,
        Adv852ms = 7,
        Adv1022ms = 8,
        Adv1285ms = 9,
        Adv2000ms = 10,
        Adv3000ms = 11,
        Adv4000ms = 12,
        Adv5000ms = 13,
        Adv6000ms = 14,
        Adv7000ms = 15,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Advertising type selector (`AT+ADTY`).
    pub enum AdvertType {
        /// Advertising, scan response and connectable.
        All = 0,
        /// Only the last connected device may reconnect.
        LastDeviceOnly = 1,
        /// Advertising and scan response only.
        ScanResponseOnly = 2,
        /// Advertising only.
        AdvertisingOnly = 3,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Minimum link-layer connection interval selector (`AT+COMI`).
    pub enum ConnInterval {
        Conn7ms = 0,
        Conn10ms = 1,
        Conn15ms = 2,
        Conn20ms = 3,
        Conn25ms = 4,
        Conn30ms = 5,
        Conn35ms = 6,
        Conn40ms = 7,
        Conn45ms = 8,
        Conn4000ms = 9,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Connection supervision timeout selector (`AT+COSU`).
    pub enum ConnTimeout {
        Timeout100ms = 0,
        Timeout1000ms = 1,
        Timeout2000ms = 2,
        Timeout3000ms = 3,
        Timeout4000ms = 4,
        Timeout5000ms = 5,
        Timeout6000ms = 6,
        @invalid Invalid = 255,
    }
}

setting! {
    /// System work mode selector (`AT+MODE`).
    pub enum WorkMode {
        /// Plain transmission mode.
        Transmission = 0,
        /// Transmission plus PIO state acquisition.
        PioAcquisition = 1,
        /// Transmission plus remote control of local PIOs.
        RemoteControl = 2,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Radio power selector (`AT+POWE`).
    pub enum ModulePower {
        Minus23Dbm = 0,
        Minus6Dbm = 1,
        Dbm0 = 2,
        Dbm6 = 3,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Output driver power selector (`AT+PCTL`).
    pub enum OutputPower {
        Normal = 0,
        Max = 1,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Master/slave role selector (`AT+ROLE`).
    pub enum Role {
        Peripheral = 0,
        Central = 1,
        @invalid Invalid = 255,
    }
}

setting! {
    /// Bonding mode selector (`AT+TYPE`).
    pub enum BondMode {
        NoPin = 0,
        AuthNoPin = 1,
        AuthWithPin = 2,
        AuthAndBond = 3,
        @invalid Invalid = 255,
    }
}

/// MAC address of a peer or of the module itself.
///
/// Stored textually as the module reports it: 12 bare hex digits from
/// `OK+ADDR:`, or the colon-separated form from connection notifications.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(String<MAC_TEXT_MAX>);

impl MacAddress {
    /// Textual form of the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an address from raw response bytes, truncating past capacity.
    pub fn from_ascii(bytes: &[u8]) -> Self {
        let mut text = String::new();
        for &b in bytes.iter().take(MAC_TEXT_MAX) {
            if text.push(b as char).is_err() {
                break;
            }
        }
        Self(text)
    }
}

/// True for the bare 12-hex-digit form `AT+ADDR` accepts.
pub fn is_bare_mac(text: &str) -> bool {
    text.len() == 12 && text.bytes().all(|b| b.is_ascii_hexdigit())
}
