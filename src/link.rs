//! Device Link and Transaction Engine
//!
//! [`DeviceLink`] owns one physical connection to the module and layers three
//! things over the byte transport:
//! - the framer (ring cursors to null-terminated [`Frame`]s)
//! - the classifier that intercepts unsolicited `OK+CONN`/`OK+LOST`
//!   notifications before the command layer sees them
//! - the blocking command/response transaction engine with timeouts
//!
//! One execution context issues commands at a time; the design carries no
//! internal queuing or mutual exclusion for concurrent submission.

use embassy_time::{with_deadline, Duration, Instant};

use crate::config::{Baudrate, MacAddress};
use crate::frame::Frame;
use crate::framer;
use crate::observer::{LinkObserver, NullObserver};
use crate::transport::Transport;

/// Deadline for an ordinary command/response transaction.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Deadline for liveness probes (`AT`), kept short for snappy restart polls.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

const CONNECTED_PREFIX: &str = "OK+CONN";
const LOST_PREFIX: &str = "OK+LOST";

/// Offset of the peer MAC inside an `OK+CONN:` notification.
const CONN_MAC_OFFSET: usize = 8;

/// Driver errors; every failure path returns one, none is fatal to the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Issuing the transmission failed; nothing was sent.
    Transmit(E),
    /// Arming reception or reconfiguring the link failed.
    Transport(E),
    /// No qualifying frame arrived within the deadline.
    Timeout,
    /// A frame arrived but its prefix did not match the expectation.
    UnexpectedResponse,
    /// A receive span exceeded the frame buffer between two idle boundaries.
    FramingLoss,
    /// The formatted command does not fit the transmit buffer.
    CommandTooLong,
    /// A parameter was rejected locally before any transmission.
    InvalidParameter,
}

/// Connection state as tracked by the unsolicited-event classifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected(MacAddress),
}

/// One HM-10 link: framer state, classifier state and the transaction engine.
pub struct DeviceLink<T: Transport, O: LinkObserver = NullObserver> {
    pub(crate) transport: T,
    pub(crate) observer: Option<O>,

    /// Start of not-yet-consumed ring bytes, index modulo the ring capacity.
    pub(crate) read_cursor: usize,
    /// The single live assembled frame; overwritten on each idle boundary.
    pub(crate) frame: Frame,

    pub(crate) rx_busy: bool,
    pub(crate) tx_busy: bool,

    pub(crate) connection: ConnectionState,
    pub(crate) current_baud: Baudrate,
    pub(crate) pending_baud: Baudrate,
    pub(crate) factory_reboot_pending: bool,
    pub(crate) rf_comm_mode: bool,
}

impl<T: Transport> DeviceLink<T> {
    /// Bind a link to its transport, without an observer.
    ///
    /// Both baud-rate fields start at the module's factory default; callers
    /// talking to a reconfigured module should set the transport speed before
    /// [`Self::start`].
    pub fn new(transport: T) -> Self {
        Self::with_observer_slot(transport, None)
    }
}

impl<T: Transport, O: LinkObserver> DeviceLink<T, O> {
    /// Bind a link to its transport with an unsolicited-event observer.
    pub fn with_observer(transport: T, observer: O) -> Self {
        Self::with_observer_slot(transport, Some(observer))
    }

    fn with_observer_slot(transport: T, observer: Option<O>) -> Self {
        Self {
            transport,
            observer,
            read_cursor: 0,
            frame: Frame::new(),
            rx_busy: false,
            tx_busy: false,
            connection: ConnectionState::Disconnected,
            current_baud: Baudrate::default(),
            pending_baud: Baudrate::default(),
            factory_reboot_pending: false,
            rf_comm_mode: false,
        }
    }

    /// Arm continuous reception; must run once before the first transaction.
    pub fn start(&mut self) -> Result<(), Error<T::Error>> {
        self.transport.start_receive().map_err(Error::Transport)?;
        self.resync();
        debug!("link receive armed, ring capacity {}", self.transport.ring().len());
        Ok(())
    }

    /// Replace the registered observer, silently dropping the previous one.
    pub fn set_observer(&mut self, observer: O) {
        self.observer = Some(observer);
    }

    /// Remove and return the registered observer.
    pub fn clear_observer(&mut self) -> Option<O> {
        self.observer.take()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// True while a receive wait is in progress.
    pub fn is_rx(&self) -> bool {
        self.rx_busy
    }

    /// True while a transmission is in flight.
    pub fn is_tx(&self) -> bool {
        self.tx_busy
    }

    pub fn is_busy(&self) -> bool {
        self.rx_busy || self.tx_busy
    }

    /// Connection state as maintained by the classifier.
    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected(_))
    }

    /// MAC of the connected central, if any.
    pub fn master_mac(&self) -> Option<&MacAddress> {
        match &self.connection {
            ConnectionState::Connected(mac) => Some(mac),
            ConnectionState::Disconnected => None,
        }
    }

    /// Baud rate the local transport currently runs at.
    pub fn baudrate(&self) -> Baudrate {
        self.current_baud
    }

    /// Baud rate that takes effect on the next reboot.
    pub fn pending_baudrate(&self) -> Baudrate {
        self.pending_baud
    }

    /// Treat the first byte of unsolicited data frames as a binary length
    /// prefix and strip it before delivery. Command responses are unaffected.
    pub fn set_rf_comm_mode(&mut self, enabled: bool) {
        self.rf_comm_mode = enabled;
    }

    pub fn rf_comm_mode(&self) -> bool {
        self.rf_comm_mode
    }

    /// Run one command/response transaction.
    ///
    /// Transmits `command`, waits for its completion, then blocks until a
    /// response frame arrives or `timeout` elapses. Unsolicited connection
    /// notifications arriving meanwhile are classified and consumed without
    /// releasing the wait.
    pub async fn execute(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<&Frame, Error<T::Error>> {
        self.transact(command.as_bytes(), timeout, true).await
    }

    /// [`Self::execute`] with control over the transmit-completion wait.
    ///
    /// With `wait_for_tx` false the response wait starts immediately; the
    /// next transaction picks up the leftover completion first.
    pub async fn execute_with(
        &mut self,
        command: &str,
        timeout: Duration,
        wait_for_tx: bool,
    ) -> Result<&Frame, Error<T::Error>> {
        self.transact(command.as_bytes(), timeout, wait_for_tx).await
    }

    /// Transmit a raw payload to the connected peer with no response wait.
    pub async fn send(&mut self, data: &[u8], wait_for_tx: bool) -> Result<(), Error<T::Error>> {
        self.transmit(data, wait_for_tx).await
    }

    /// Pump one idle boundary while no transaction is pending.
    ///
    /// The classifier has first refusal on the assembled frame; anything it
    /// does not consume is delivered to the data observer, honoring RF-comm
    /// framing.
    pub async fn process_events(&mut self) -> Result<(), Error<T::Error>> {
        self.transport.receive_idle().await;
        if !self.collect_frame()? {
            return Ok(());
        }
        if self.classify() {
            return Ok(());
        }
        let Self {
            frame,
            observer,
            rf_comm_mode,
            ..
        } = self;
        if let Some(observer) = observer.as_mut() {
            if *rf_comm_mode {
                if let Some((&prefix_len, rest)) = frame.as_bytes().split_first() {
                    let take = (prefix_len as usize).min(rest.len());
                    observer.on_data(&rest[..take]);
                }
            } else {
                observer.on_data(frame.as_bytes());
            }
        }
        Ok(())
    }

    pub(crate) async fn transact(
        &mut self,
        bytes: &[u8],
        timeout: Duration,
        wait_for_tx: bool,
    ) -> Result<&Frame, Error<T::Error>> {
        // Drop whatever an expired transaction may have left in the ring so a
        // stale frame cannot be misattributed to this one.
        self.resync();
        self.transmit(bytes, wait_for_tx).await?;
        self.wait_response(timeout).await
    }

    async fn transmit(&mut self, data: &[u8], wait_for_tx: bool) -> Result<(), Error<T::Error>> {
        if self.tx_busy {
            // A deferred transmission is still in flight.
            self.transport.transmit_done().await;
            self.tx_busy = false;
        }
        if let Err(e) = self.transport.start_transmit(data) {
            self.tx_busy = false;
            error!("transmit issue failed, {} bytes dropped", data.len());
            return Err(Error::Transmit(e));
        }
        self.tx_busy = true;
        trace!("transmit started, {} bytes", data.len());
        if wait_for_tx {
            self.transport.transmit_done().await;
            self.tx_busy = false;
        }
        Ok(())
    }

    async fn wait_response(&mut self, timeout: Duration) -> Result<&Frame, Error<T::Error>> {
        self.rx_busy = true;
        let deadline = Instant::now() + timeout;
        loop {
            if with_deadline(deadline, self.transport.receive_idle())
                .await
                .is_err()
            {
                // Timeout hygiene: force the busy flag down and discard
                // whatever the device may still complete later.
                self.rx_busy = false;
                self.resync();
                warn!("transaction timed out after {} ms", timeout.as_millis());
                return Err(Error::Timeout);
            }
            match self.collect_frame() {
                Err(e) => {
                    self.rx_busy = false;
                    return Err(e);
                }
                Ok(false) => continue,
                Ok(true) => {}
            }
            if self.classify() {
                // Consumed as an unsolicited event; the caller's wait goes on.
                continue;
            }
            self.rx_busy = false;
            return Ok(&self.frame);
        }
    }

    /// Assemble the span since the previous boundary into the frame slot.
    ///
    /// Returns whether a new frame is live. The read cursor advances to the
    /// write cursor in every case, including framing loss.
    fn collect_frame(&mut self) -> Result<bool, Error<T::Error>> {
        let capacity = self.transport.ring().len();
        if capacity == 0 {
            return Ok(false);
        }
        let remaining = self.transport.bytes_remaining().min(capacity);
        let write_cursor = (capacity - remaining) % capacity;
        let assembled = framer::assemble(
            self.transport.ring(),
            self.read_cursor,
            write_cursor,
            &mut self.frame,
        );
        self.read_cursor = write_cursor;
        match assembled {
            Ok(0) => Ok(false),
            Ok(len) => {
                trace!("frame assembled, {} bytes", len);
                Ok(true)
            }
            Err(loss) => {
                warn!("framing loss, span of {} bytes exceeds the frame buffer", loss.span);
                Err(Error::FramingLoss)
            }
        }
    }

    /// Give the classifier first refusal on the live frame.
    ///
    /// Returns true when the frame was fully consumed as an unsolicited
    /// connection notification. Connection state transitions happen only
    /// here.
    fn classify(&mut self) -> bool {
        if self.frame.starts_with(CONNECTED_PREFIX) {
            let mac = MacAddress::from_ascii(self.frame.text_at(CONN_MAC_OFFSET));
            info!("central connected: {}", mac.as_str());
            self.connection = ConnectionState::Connected(mac.clone());
            if let Some(observer) = self.observer.as_mut() {
                observer.on_connected(&mac);
            }
            true
        } else if self.frame.starts_with(LOST_PREFIX) {
            info!("connection lost");
            self.connection = ConnectionState::Disconnected;
            if let Some(observer) = self.observer.as_mut() {
                observer.on_disconnected();
            }
            true
        } else {
            false
        }
    }

    /// Snap the read cursor to the hardware write position, discarding any
    /// unconsumed ring bytes.
    fn resync(&mut self) {
        let capacity = self.transport.ring().len();
        if capacity == 0 {
            return;
        }
        let remaining = self.transport.bytes_remaining().min(capacity);
        self.read_cursor = (capacity - remaining) % capacity;
    }
}
