//! Circular Receive Framing
//!
//! The transport's DMA engine writes bytes into a fixed ring and reports only
//! how many bytes remain until its write cursor wraps; there are no message
//! delimiters on the wire. Each reception idle boundary turns the span between
//! the previous read cursor and the current write cursor into one linear,
//! null-terminated [`Frame`].
//!
//! Bytes older than the previous read cursor are permanently lost: this is a
//! deliberate at-most-one-frame buffering policy, not a queue.

use crate::frame::Frame;

/// A receive span did not fit the frame buffer; assembling it would have
/// silently dropped bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FramingLoss {
    /// Length of the span that could not be assembled.
    pub span: usize,
}

/// Assemble the ring span `[read_cursor, write_cursor)` into `out`.
///
/// Cursors are indices modulo the ring capacity. When the write cursor has
/// wrapped past the physical end of the ring since the previous boundary, the
/// tail of the ring and its head are concatenated in that order.
///
/// Returns the assembled length. Zero means no bytes arrived since the last
/// boundary and `out` is untouched; a span exactly as long as the ring is
/// indistinguishable from an empty one given only two cursors, and is treated
/// as empty. The caller advances its read cursor to `write_cursor` afterwards,
/// hit or miss.
pub fn assemble(
    ring: &[u8],
    read_cursor: usize,
    write_cursor: usize,
    out: &mut Frame,
) -> Result<usize, FramingLoss> {
    debug_assert!(read_cursor < ring.len() && write_cursor < ring.len());

    let (head, tail): (&[u8], &[u8]) = if read_cursor <= write_cursor {
        (&ring[read_cursor..write_cursor], &[])
    } else {
        // The hardware cursor rolled over the ring since the previous frame.
        (&ring[read_cursor..], &ring[..write_cursor])
    };

    let span = head.len() + tail.len();
    if span == 0 {
        return Ok(0);
    }
    if !out.load(head, tail) {
        return Err(FramingLoss { span });
    }
    Ok(span)
}
