//! Assembled Message Frames
//!
//! A [`Frame`] holds the most recently completed message extracted from the
//! receive ring: a bounded, null-terminated byte string plus helpers for the
//! response formats the module uses:
//! - byte-exact prefix matching (`OK+Set`, `OK+ADDR:`, ...)
//! - numeric field extraction in base 10 or 16, stopping at the first
//!   non-digit
//! - string field extraction, stopping at NUL, CR or LF

/// Maximum payload length of one assembled frame, terminator excluded.
pub const MAX_FRAME_LEN: usize = 128;

/// One contiguous, null-terminated message extracted from the receive stream.
///
/// At most one frame is live at a time; each idle boundary overwrites it.
#[derive(Debug, Clone)]
pub struct Frame {
    buf: [u8; MAX_FRAME_LEN + 1],
    len: usize,
}

impl Frame {
    /// An empty frame.
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_FRAME_LEN + 1],
            len: 0,
        }
    }

    /// Stored payload length, terminator excluded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload bytes, terminator excluded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Payload as UTF-8 text, if it is valid.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    /// Byte-for-byte prefix comparison, case-sensitive, no wildcards.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_bytes().starts_with(prefix.as_bytes())
    }

    /// Parse a number starting at `offset`, stopping at the first non-digit.
    ///
    /// Returns `None` when no digit is present at the offset.
    pub fn number_at(&self, offset: usize, radix: u32) -> Option<u32> {
        let mut value: u32 = 0;
        let mut any_digit = false;
        for &b in self.as_bytes().get(offset..)? {
            match (b as char).to_digit(radix) {
                Some(d) => {
                    value = value.wrapping_mul(radix).wrapping_add(d);
                    any_digit = true;
                }
                None => break,
            }
        }
        any_digit.then_some(value)
    }

    /// Bytes starting at `offset`, up to the first NUL, CR or LF.
    pub fn text_at(&self, offset: usize) -> &[u8] {
        let bytes = match self.as_bytes().get(offset..) {
            Some(bytes) => bytes,
            None => return &[],
        };
        let end = bytes
            .iter()
            .position(|&b| b == 0 || b == b'\r' || b == b'\n')
            .unwrap_or(bytes.len());
        &bytes[..end]
    }

    /// [`Self::text_at`] as UTF-8 text, if it is valid.
    pub fn str_at(&self, offset: usize) -> Option<&str> {
        core::str::from_utf8(self.text_at(offset)).ok()
    }

    /// Overwrite the frame with `head` followed by `tail`, null-terminated.
    ///
    /// Returns false without touching the frame when the payload would not
    /// fit.
    pub(crate) fn load(&mut self, head: &[u8], tail: &[u8]) -> bool {
        let total = head.len() + tail.len();
        if total > MAX_FRAME_LEN {
            return false;
        }
        self.buf[..head.len()].copy_from_slice(head);
        self.buf[head.len()..total].copy_from_slice(tail);
        self.buf[total] = 0;
        self.len = total;
        true
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
