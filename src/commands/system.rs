//! System Commands and the Reboot/Reconfiguration Sequencer
//!
//! Baud-rate changes and factory resets only take effect after the module
//! reboots, so the two are coordinated here: the local transport speed is
//! never touched before the module has acknowledged `AT+RESET`, which keeps
//! both ends of the wire on the same baud rate at every instant.

use embassy_time::{Duration, Timer};

use crate::commands::{format_command, GET_ACK, GET_VALUE_OFFSET, SET_ACK};
use crate::config::{Baudrate, FirmwareVersion};
use crate::link::{DeviceLink, Error, DEFAULT_TIMEOUT};
use crate::observer::LinkObserver;
use crate::transport::Transport;

/// Restart wait parameters for [`DeviceLink::reboot_with`].
///
/// `max_attempts: None` waits indefinitely for the module to come back, which
/// matches the hardware's unbounded restart time; callers that need a bound
/// set `Some(n)` and get [`Error::Timeout`] when it is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RestartPolicy {
    /// Settle delay before the first liveness probe.
    pub settle: Duration,
    /// Delay between liveness probes.
    pub poll_interval: Duration,
    /// Probe budget; `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

impl<T: Transport, O: LinkObserver> DeviceLink<T, O> {
    /// Probe the module with a bare `AT`, using the short probe deadline.
    pub async fn is_alive(&mut self) -> bool {
        match self.execute("AT", crate::link::PROBE_TIMEOUT).await {
            Ok(frame) => frame.starts_with("OK"),
            Err(_) => false,
        }
    }

    /// Query the firmware version string (`AT+VERR?`).
    pub async fn version(&mut self) -> Result<FirmwareVersion, Error<T::Error>> {
        let frame = self.execute("AT+VERR?", DEFAULT_TIMEOUT).await?;
        let text = frame.str_at(0).ok_or(Error::UnexpectedResponse)?;
        let mut version = FirmwareVersion::new();
        for ch in text.chars() {
            if version.push(ch).is_err() {
                break;
            }
        }
        Ok(version)
    }

    /// Query the baud-rate code the module is configured for (`AT+BAUD?`).
    pub async fn get_baudrate(&mut self) -> Result<Baudrate, Error<T::Error>> {
        let frame = self.execute("AT+BAUD?", DEFAULT_TIMEOUT).await?;
        if !frame.starts_with(GET_ACK) {
            return Err(Error::UnexpectedResponse);
        }
        let code = frame
            .number_at(GET_VALUE_OFFSET, 10)
            .ok_or(Error::UnexpectedResponse)?;
        Ok(Baudrate::from_code(code as u8))
    }

    /// Request a baud-rate change (`AT+BAUD<n>`).
    ///
    /// The module applies the new rate only after a reboot; until then the
    /// link keeps running at the current rate and the request is merely
    /// recorded as pending.
    pub async fn set_baudrate(&mut self, baud: Baudrate) -> Result<(), Error<T::Error>> {
        let code = baud.code().ok_or(Error::InvalidParameter)?;
        let cmd =
            format_command(format_args!("AT+BAUD{}", code)).ok_or(Error::CommandTooLong)?;
        let acked = self.execute(&cmd, DEFAULT_TIMEOUT).await?.starts_with(SET_ACK);
        if !acked {
            return Err(Error::UnexpectedResponse);
        }
        self.pending_baud = baud;
        info!("baud change to {} pending reboot", baud.hz().unwrap_or(0));
        Ok(())
    }

    /// Reboot the module (`AT+RESET`), waiting for it to come back when
    /// `wait_for_restart` is set.
    pub async fn reboot(&mut self, wait_for_restart: bool) -> Result<(), Error<T::Error>> {
        let policy = wait_for_restart.then(RestartPolicy::default);
        self.reboot_with(policy).await
    }

    /// Reboot with an explicit restart-wait policy; `None` returns as soon as
    /// the reset is acknowledged.
    pub async fn reboot_with(
        &mut self,
        restart: Option<RestartPolicy>,
    ) -> Result<(), Error<T::Error>> {
        let acked = self
            .execute("AT+RESET", DEFAULT_TIMEOUT)
            .await?
            .starts_with("OK+RESET");
        if !acked {
            return Err(Error::UnexpectedResponse);
        }

        // The module has acknowledged and is restarting; only now may the
        // local side change speed without the two ends disagreeing mid-frame.
        if self.factory_reboot_pending {
            self.apply_local_baud(Baudrate::default())?;
            self.factory_reboot_pending = false;
            info!("factory defaults restored, link back at default baud");
        } else if self.current_baud != self.pending_baud {
            let pending = self.pending_baud;
            self.apply_local_baud(pending)?;
            info!("link reconfigured to pending baud");
        }

        if let Some(policy) = restart {
            Timer::after(policy.settle).await;
            let mut attempts: u32 = 0;
            while !self.is_alive().await {
                attempts += 1;
                if let Some(max) = policy.max_attempts {
                    if attempts >= max {
                        warn!("module not alive after {} restart probes", attempts);
                        return Err(Error::Timeout);
                    }
                }
                Timer::after(policy.poll_interval).await;
            }
            debug!("module alive after restart, {} extra probes", attempts);
        }
        Ok(())
    }

    /// Factory-reset the module (`AT+RENEW`) and reboot it.
    ///
    /// The reset also reverts the module's baud rate, so the completing
    /// reboot drops the local transport back to the factory default.
    pub async fn factory_reset(&mut self) -> Result<(), Error<T::Error>> {
        let acked = self
            .execute("AT+RENEW", DEFAULT_TIMEOUT)
            .await?
            .starts_with("OK+RENEW");
        if !acked {
            return Err(Error::UnexpectedResponse);
        }
        self.factory_reboot_pending = true;
        self.reboot(true).await
    }

    /// Put the module into sleep mode (`AT+SLEEP`).
    pub async fn sleep(&mut self) -> Result<(), Error<T::Error>> {
        let acked = self
            .execute("AT+SLEEP", DEFAULT_TIMEOUT)
            .await?
            .starts_with("OK+SLEEP");
        if acked {
            Ok(())
        } else {
            Err(Error::UnexpectedResponse)
        }
    }

    /// Wake the module from sleep.
    ///
    /// Anything longer than 80 bytes on the wire brings the module up; it
    /// acknowledges with `OK+WAKE`.
    pub async fn wake(&mut self) -> Result<(), Error<T::Error>> {
        const WAKE_BURST: [u8; 84] = [b'W'; 84];
        let woke = self
            .transact(&WAKE_BURST, DEFAULT_TIMEOUT, true)
            .await?
            .starts_with("OK+WAKE");
        if woke {
            Ok(())
        } else {
            Err(Error::UnexpectedResponse)
        }
    }

    fn apply_local_baud(&mut self, baud: Baudrate) -> Result<(), Error<T::Error>> {
        let hz = baud.hz().ok_or(Error::InvalidParameter)?;
        self.transport.set_baudrate(hz).map_err(Error::Transport)?;
        self.current_baud = baud;
        self.pending_baud = baud;
        Ok(())
    }
}
