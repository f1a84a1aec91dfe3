//! Radio and Identity Commands
//!
//! Getters/setters for the module's bounded settings, plus address and name
//! management. Every setter validates its argument locally and returns
//! [`Error::InvalidParameter`] before anything reaches the wire.

use crate::commands::{format_command, GET_ACK, GET_VALUE_OFFSET, SET_ACK};
use crate::config::{
    is_bare_mac, AdvertInterval, AdvertType, BondMode, ConnInterval, ConnTimeout, DeviceName,
    MacAddress, ModulePower, OutputPower, Role, WorkMode, NAME_MAX,
};
use crate::link::{DeviceLink, Error, DEFAULT_TIMEOUT};
use crate::observer::LinkObserver;
use crate::transport::Transport;

/// Offset of the value inside `OK+ADDR:` and `OK+NAME:` responses.
const TAGGED_VALUE_OFFSET: usize = 8;

macro_rules! setting_pair {
    // Decimal wire code (the common case).
    ($ty:ty, $tag:literal, $get:ident, $set:ident) => {
        setting_pair!(@build $ty, $tag, $get, $set, 10, "AT+", $tag, "{}");
    };
    // Hexadecimal wire code (advertising interval).
    ($ty:ty, $tag:literal, $get:ident, $set:ident, hex) => {
        setting_pair!(@build $ty, $tag, $get, $set, 16, "AT+", $tag, "{:X}");
    };
    (@build $ty:ty, $tag:literal, $get:ident, $set:ident, $radix:expr, $($setfmt:literal),+) => {
        #[doc = concat!("Query the setting behind `AT+", $tag, "?`.")]
        pub async fn $get(&mut self) -> Result<$ty, Error<T::Error>> {
            let frame = self
                .execute(concat!("AT+", $tag, "?"), DEFAULT_TIMEOUT)
                .await?;
            if !frame.starts_with(GET_ACK) {
                return Err(Error::UnexpectedResponse);
            }
            let code = frame
                .number_at(GET_VALUE_OFFSET, $radix)
                .ok_or(Error::UnexpectedResponse)?;
            Ok(<$ty>::from_code(code as u8))
        }

        #[doc = concat!("Change the setting behind `AT+", $tag, "`.")]
        pub async fn $set(&mut self, value: $ty) -> Result<(), Error<T::Error>> {
            let code = value.code().ok_or(Error::InvalidParameter)?;
            let cmd = format_command(format_args!(concat!($($setfmt),+), code))
                .ok_or(Error::CommandTooLong)?;
            let acked = self.execute(&cmd, DEFAULT_TIMEOUT).await?.starts_with(SET_ACK);
            if acked {
                Ok(())
            } else {
                Err(Error::UnexpectedResponse)
            }
        }
    };
}

impl<T: Transport, O: LinkObserver> DeviceLink<T, O> {
    /// Query the module's own MAC address (`AT+ADDR?`).
    pub async fn get_mac_address(&mut self) -> Result<MacAddress, Error<T::Error>> {
        let frame = self.execute("AT+ADDR?", DEFAULT_TIMEOUT).await?;
        if !frame.starts_with("OK+ADDR:") {
            return Err(Error::UnexpectedResponse);
        }
        Ok(MacAddress::from_ascii(frame.text_at(TAGGED_VALUE_OFFSET)))
    }

    /// Set the module's MAC address (`AT+ADDR<12 hex digits>`).
    pub async fn set_mac_address(&mut self, mac: &str) -> Result<(), Error<T::Error>> {
        if !is_bare_mac(mac) {
            return Err(Error::InvalidParameter);
        }
        let cmd = format_command(format_args!("AT+ADDR{}", mac)).ok_or(Error::CommandTooLong)?;
        let acked = self.execute(&cmd, DEFAULT_TIMEOUT).await?.starts_with(SET_ACK);
        if acked {
            Ok(())
        } else {
            Err(Error::UnexpectedResponse)
        }
    }

    /// Query the advertised device name (`AT+NAME?`).
    pub async fn get_name(&mut self) -> Result<DeviceName, Error<T::Error>> {
        let frame = self.execute("AT+NAME?", DEFAULT_TIMEOUT).await?;
        if !frame.starts_with("OK+NAME:") {
            return Err(Error::UnexpectedResponse);
        }
        let text = frame
            .str_at(TAGGED_VALUE_OFFSET)
            .ok_or(Error::UnexpectedResponse)?;
        let mut name = DeviceName::new();
        for ch in text.chars() {
            if name.push(ch).is_err() {
                break;
            }
        }
        Ok(name)
    }

    /// Set the advertised device name (`AT+NAME<s>`, at most 12 bytes).
    pub async fn set_name(&mut self, name: &str) -> Result<(), Error<T::Error>> {
        if name.is_empty() || name.len() > NAME_MAX {
            return Err(Error::InvalidParameter);
        }
        let cmd = format_command(format_args!("AT+NAME{}", name)).ok_or(Error::CommandTooLong)?;
        let acked = self.execute(&cmd, DEFAULT_TIMEOUT).await?.starts_with(SET_ACK);
        if acked {
            Ok(())
        } else {
            Err(Error::UnexpectedResponse)
        }
    }

    /// Enable or disable `OK+CONN`/`OK+LOST` notifications (`AT+NOTI`).
    pub async fn set_notifications(&mut self, enabled: bool) -> Result<(), Error<T::Error>> {
        let cmd = format_command(format_args!("AT+NOTI{}", enabled as u8))
            .ok_or(Error::CommandTooLong)?;
        let acked = self.execute(&cmd, DEFAULT_TIMEOUT).await?.starts_with(SET_ACK);
        if acked {
            Ok(())
        } else {
            Err(Error::UnexpectedResponse)
        }
    }

    setting_pair!(AdvertInterval, "ADVI", get_advert_interval, set_advert_interval, hex);
    setting_pair!(AdvertType, "ADTY", get_advert_type, set_advert_type);
    setting_pair!(ConnInterval, "COMI", get_conn_interval, set_conn_interval);
    setting_pair!(ConnTimeout, "COSU", get_conn_timeout, set_conn_timeout);
    setting_pair!(WorkMode, "MODE", get_work_mode, set_work_mode);
    setting_pair!(ModulePower, "POWE", get_module_power, set_module_power);
    setting_pair!(OutputPower, "PCTL", get_output_power, set_output_power);
    setting_pair!(Role, "ROLE", get_role, set_role);
    setting_pair!(BondMode, "TYPE", get_bond_mode, set_bond_mode);
}
