//! Byte Transport Boundary
//!
//! The driver never touches hardware directly; it consumes this trait. An
//! implementation typically wraps a UART with two DMA streams: a circular
//! receive stream whose remaining-byte counter backs [`Transport::bytes_remaining`],
//! and a one-shot transmit stream whose completion interrupt resolves
//! [`Transport::transmit_done`]. The receiver's inter-frame idle detection
//! (no new bytes for a minimum gap) resolves [`Transport::receive_idle`].

/// Asynchronous byte transport feeding the link from a circular DMA region.
pub trait Transport {
    /// Transport-specific failure reported when issuing an operation.
    type Error: core::fmt::Debug;

    /// Arm continuous circular reception into the transport's ring region.
    fn start_receive(&mut self) -> Result<(), Self::Error>;

    /// The circular receive region the DMA engine fills.
    ///
    /// The returned slice is the whole ring; its length is the ring capacity.
    fn ring(&self) -> &[u8];

    /// Bytes left until the hardware write cursor wraps to the ring base.
    ///
    /// The absolute write position is `capacity - bytes_remaining()`.
    fn bytes_remaining(&self) -> usize;

    /// Begin an asynchronous transmission of `data`.
    ///
    /// An `Err` means nothing was sent and no completion will follow.
    fn start_transmit(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Resolves once the in-flight transmission has completed.
    async fn transmit_done(&mut self);

    /// Resolves at the next reception idle boundary (inter-frame gap).
    async fn receive_idle(&mut self);

    /// Reconfigure the local link to `baud` bits per second.
    ///
    /// Reception state and ring contents must survive the change.
    fn set_baudrate(&mut self, baud: u32) -> Result<(), Self::Error>;
}
