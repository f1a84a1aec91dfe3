//! Common test utilities
//!
//! Provides a scriptable [`MockTransport`] standing in for the UART/DMA byte
//! transport, and a recording observer for unsolicited events. The mock keeps
//! a real circular receive region so the driver's cursor arithmetic is
//! exercised end to end: scripted frames are written into the ring byte by
//! byte, wrapping exactly like the hardware counter would.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hm10_link::{LinkObserver, MacAddress, Transport};

/// Default ring capacity for tests; small enough to wrap often.
pub const RING_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// State shared between a test and the transport it moved into the link.
#[derive(Default)]
pub struct Shared {
    /// Every buffer passed to `start_transmit`, in order.
    pub sent: Vec<Vec<u8>>,
    /// Frames delivered on successive idle boundaries.
    pub script: VecDeque<Vec<u8>>,
    /// Baud rates passed to `set_baudrate`, in order.
    pub bauds: Vec<u32>,
    /// Fail the next `start_transmit` calls.
    pub fail_transmit: bool,
}

pub struct MockTransport {
    ring: Vec<u8>,
    /// Total bytes ever written; the write cursor is `fill % capacity`.
    fill: usize,
    /// Idle boundaries that already have their bytes in the ring.
    pending_idles: usize,
    receiving: bool,
    shared: Rc<RefCell<Shared>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_capacity(RING_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: vec![0; capacity],
            fill: 0,
            pending_idles: 0,
            receiving: false,
            shared: Rc::new(RefCell::new(Shared::default())),
        }
    }

    /// Handle for scripting responses and inspecting traffic after the
    /// transport has moved into the link.
    pub fn shared(&self) -> Rc<RefCell<Shared>> {
        self.shared.clone()
    }

    /// Queue a frame for delivery on the next idle boundary.
    pub fn expect(&self, frame: &[u8]) {
        self.shared.borrow_mut().script.push_back(frame.to_vec());
    }

    /// Write bytes into the ring immediately and mark an idle boundary as
    /// already signalled, simulating a frame that arrived while nobody was
    /// waiting (e.g. the response to an expired transaction).
    pub fn inject(&mut self, bytes: &[u8]) {
        self.write_bytes(bytes);
        self.pending_idles += 1;
    }

    fn write_bytes(&mut self, data: &[u8]) {
        let capacity = self.ring.len();
        for &b in data {
            self.ring[self.fill % capacity] = b;
            self.fill += 1;
        }
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn start_receive(&mut self) -> Result<(), MockError> {
        self.receiving = true;
        Ok(())
    }

    fn ring(&self) -> &[u8] {
        &self.ring
    }

    fn bytes_remaining(&self) -> usize {
        let capacity = self.ring.len();
        capacity - (self.fill % capacity)
    }

    fn start_transmit(&mut self, data: &[u8]) -> Result<(), MockError> {
        if self.shared.borrow().fail_transmit {
            return Err(MockError);
        }
        self.shared.borrow_mut().sent.push(data.to_vec());
        Ok(())
    }

    async fn transmit_done(&mut self) {}

    async fn receive_idle(&mut self) {
        if self.pending_idles > 0 {
            self.pending_idles -= 1;
            return;
        }
        let next = self.shared.borrow_mut().script.pop_front();
        match next {
            Some(frame) => self.write_bytes(&frame),
            // Nothing scripted: no more boundaries will ever be signalled.
            None => core::future::pending::<()>().await,
        }
    }

    fn set_baudrate(&mut self, baud: u32) -> Result<(), MockError> {
        self.shared.borrow_mut().bauds.push(baud);
        Ok(())
    }
}

/// Everything the recording observer saw, in order of arrival.
#[derive(Default)]
pub struct Events {
    pub connected: Vec<String>,
    pub disconnected: usize,
    pub data: Vec<Vec<u8>>,
}

pub struct RecordingObserver(pub Rc<RefCell<Events>>);

impl RecordingObserver {
    pub fn new() -> (Self, Rc<RefCell<Events>>) {
        let events = Rc::new(RefCell::new(Events::default()));
        (Self(events.clone()), events)
    }
}

impl LinkObserver for RecordingObserver {
    fn on_data(&mut self, data: &[u8]) {
        self.0.borrow_mut().data.push(data.to_vec());
    }

    fn on_connected(&mut self, mac: &MacAddress) {
        self.0.borrow_mut().connected.push(mac.as_str().to_string());
    }

    fn on_disconnected(&mut self) {
        self.0.borrow_mut().disconnected += 1;
    }
}

/// Helper: last transmitted buffer as text.
pub fn last_sent(shared: &Rc<RefCell<Shared>>) -> String {
    let shared = shared.borrow();
    let last = shared.sent.last().expect("nothing was transmitted");
    String::from_utf8(last.clone()).expect("transmitted bytes were not ASCII")
}
