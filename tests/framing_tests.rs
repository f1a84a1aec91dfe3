//! Framer unit and property tests
//!
//! The framer is pure cursor arithmetic over a byte slice, so these tests
//! drive it directly: a shadow `fill` counter plays the hardware byte
//! counter, and frames are compared against the exact bytes written.

use hm10_link::frame::Frame;
use hm10_link::framer;

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

/// Write `data` into `ring` starting at the absolute position `fill`,
/// wrapping like the DMA engine, and return the updated fill counter.
fn dma_write(ring: &mut [u8], mut fill: usize, data: &[u8]) -> usize {
    let capacity = ring.len();
    for &b in data {
        ring[fill % capacity] = b;
        fill += 1;
    }
    fill
}

#[test]
fn frame_survives_wraparound_boundary() {
    // Ring capacity 16, cursor at 14, 6 bytes written: 2 before the wrap,
    // 4 after.
    let mut ring = [0u8; 16];
    let mut fill = 14;
    let read_cursor = fill % 16;
    fill = dma_write(&mut ring, fill, b"OK+Set");

    let mut frame = Frame::new();
    let span = framer::assemble(&ring, read_cursor, fill % 16, &mut frame).unwrap();
    assert_eq!(span, 6);
    assert_eq!(frame.as_bytes(), b"OK+Set");
}

#[test]
fn at_most_one_frame_is_live() {
    let mut ring = [0u8; 16];
    let mut frame = Frame::new();

    let mut fill = dma_write(&mut ring, 0, b"first");
    framer::assemble(&ring, 0, fill % 16, &mut frame).unwrap();

    let read_cursor = fill % 16;
    fill = dma_write(&mut ring, fill, b"2nd");
    framer::assemble(&ring, read_cursor, fill % 16, &mut frame).unwrap();

    // Two idle boundaries without a consumer read: only the second frame's
    // data remains.
    assert_eq!(frame.as_bytes(), b"2nd");
}

#[test]
fn empty_boundary_produces_no_frame() {
    let ring = [0u8; 16];
    let mut frame = Frame::new();
    assert_eq!(framer::assemble(&ring, 9, 9, &mut frame), Ok(0));
}

#[test]
fn full_revolution_is_ambiguous_and_dropped() {
    // Writing exactly one capacity's worth of bytes parks the write cursor on
    // the read cursor; with only two cursors that is indistinguishable from
    // no data, and the framer must not invent a frame.
    let mut ring = [0u8; 16];
    let fill = dma_write(&mut ring, 3, &[b'z'; 16]);
    let mut frame = Frame::new();
    assert_eq!(framer::assemble(&ring, 3, fill % 16, &mut frame), Ok(0));
}

proptest! {
    /// Any sequence of chunked writes that stays within capacity between two
    /// idle boundaries reassembles to the exact byte sequence written.
    #[test]
    fn chunked_writes_reassemble_exactly(
        start in 0usize..32,
        chunks in prop_vec(prop_vec(any::<u8>(), 1..8), 1..6),
    ) {
        let mut ring = [0u8; 32];
        let mut fill = start;
        let read_cursor = fill % 32;

        let mut written = Vec::new();
        for chunk in &chunks {
            fill = dma_write(&mut ring, fill, chunk);
            written.extend_from_slice(chunk);
        }
        prop_assume!(written.len() < 32);

        let mut frame = Frame::new();
        let span = framer::assemble(&ring, read_cursor, fill % 32, &mut frame).unwrap();
        prop_assert_eq!(span, written.len());
        prop_assert_eq!(frame.as_bytes(), written.as_slice());
    }

    /// Back-to-back frames each reassemble from their own span only.
    #[test]
    fn consecutive_frames_do_not_merge(
        first in prop_vec(any::<u8>(), 1..20),
        second in prop_vec(any::<u8>(), 1..20),
    ) {
        let mut ring = [0u8; 32];
        let mut frame = Frame::new();

        let mut fill = dma_write(&mut ring, 0, &first);
        framer::assemble(&ring, 0, fill % 32, &mut frame).unwrap();

        let read_cursor = fill % 32;
        fill = dma_write(&mut ring, fill, &second);
        framer::assemble(&ring, read_cursor, fill % 32, &mut frame).unwrap();

        prop_assert_eq!(frame.as_bytes(), second.as_slice());
    }
}
