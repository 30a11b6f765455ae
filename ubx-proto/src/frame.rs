//! UBX frame buffer, checksum, and frame builder.
//!
//! # Frame Layout
//!
//! ```text
//! +------+------+-------+----+-----------+---------+------+------+
//! | 0xB5 | 0x62 | class | id | len (LE)  | payload | CK_A | CK_B |
//! +------+------+-------+----+-----------+---------+------+------+
//!    0      1      2      3     4    5      6..      len+6  len+7
//! ```
//!
//! The checksum is an 8-bit Fletcher sum over class, id, length and payload.

use crate::{CHECKSUM_SIZE, HEADER_SIZE, MAX_FRAME_SIZE, SYNC1, SYNC2};

/// A UBX frame while it is being assembled and parsed.
///
/// Lives inside the parser and is reset at the start of every frame.
pub struct UbxFrame {
    raw: [u8; MAX_FRAME_SIZE],
    cursor: usize,
    class: u8,
    id: u8,
    total_length: usize,
    complete: bool,
}

impl UbxFrame {
    /// Create an empty frame buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: [0u8; MAX_FRAME_SIZE],
            cursor: 0,
            class: 0,
            id: 0,
            total_length: HEADER_SIZE,
            complete: false,
        }
    }

    /// Forget the current frame and start again at index 0.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.class = 0;
        self.id = 0;
        self.total_length = HEADER_SIZE;
        self.complete = false;
    }

    /// Message class (valid once index 2 was read).
    #[inline]
    #[must_use]
    pub const fn class(&self) -> u8 {
        self.class
    }

    /// Message id (valid once index 3 was read).
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Whole frame length including header and checksum (valid once index
    /// 5 was read).
    #[inline]
    #[must_use]
    pub const fn total_length(&self) -> usize {
        self.total_length
    }

    /// Payload length declared in the header.
    #[inline]
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.total_length - HEADER_SIZE - CHECKSUM_SIZE
    }

    /// Current read/parse position within the frame.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if every byte of the frame has been received.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Bytes received so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.raw[..self.cursor.min(MAX_FRAME_SIZE)]
    }

    /// Payload of a complete frame.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.raw[HEADER_SIZE..HEADER_SIZE + self.payload_len()]
    }

    /// Received checksum bytes of a complete frame.
    #[must_use]
    pub fn checksum(&self) -> (u8, u8) {
        let end = self.total_length;
        (self.raw[end - 2], self.raw[end - 1])
    }

    /// Check if the received checksum matches the frame contents.
    ///
    /// The parser reports the result but accepts the frame either way.
    #[must_use]
    pub fn checksum_matches(&self) -> bool {
        let end = self.total_length - CHECKSUM_SIZE;
        checksum(&self.raw[2..end]) == self.checksum()
    }

    pub(crate) fn store(&mut self, byte: u8) {
        self.raw[self.cursor] = byte;
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.cursor += n;
    }

    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub(crate) fn set_class(&mut self, class: u8) {
        self.class = class;
    }

    pub(crate) fn set_id(&mut self, id: u8) {
        self.id = id;
    }

    pub(crate) fn set_total_length(&mut self, total_length: usize) {
        self.total_length = total_length;
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub(crate) fn raw(&self) -> &[u8; MAX_FRAME_SIZE] {
        &self.raw
    }
}

impl Default for UbxFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// 8-bit Fletcher checksum over `data` (class through end of payload).
#[must_use]
pub fn checksum(data: &[u8]) -> (u8, u8) {
    data.iter().fold((0u8, 0u8), |(a, b), &byte| {
        let a = a.wrapping_add(byte);
        (a, b.wrapping_add(a))
    })
}

/// Error type for [`build_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuildError {
    /// The output buffer is too small to hold the frame.
    BufferTooSmall,
    /// The payload does not fit in a 16-bit length field.
    PayloadTooLong,
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::PayloadTooLong => write!(f, "payload too long"),
        }
    }
}

/// Write a complete UBX frame (sync, header, payload, checksum) into `buf`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`BuildError::BufferTooSmall`] if `buf` cannot hold the frame and
/// [`BuildError::PayloadTooLong`] if the payload exceeds `u16::MAX` bytes.
pub fn build_frame(class: u8, id: u8, payload: &[u8], buf: &mut [u8]) -> Result<usize, BuildError> {
    let len = u16::try_from(payload.len()).map_err(|_| BuildError::PayloadTooLong)?;
    let total = HEADER_SIZE + payload.len() + CHECKSUM_SIZE;
    if buf.len() < total {
        return Err(BuildError::BufferTooSmall);
    }

    let [len_lo, len_hi] = len.to_le_bytes();
    buf[..HEADER_SIZE].copy_from_slice(&[SYNC1, SYNC2, class, id, len_lo, len_hi]);
    buf[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);

    let (ck_a, ck_b) = checksum(&buf[2..HEADER_SIZE + payload.len()]);
    buf[total - 2] = ck_a;
    buf[total - 1] = ck_b;

    Ok(total)
}
