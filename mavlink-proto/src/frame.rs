//! MAVLink v1 frame header and encoder.
//!
//! # Frame Layout
//!
//! ```text
//! +------+-----+-----+-------+--------+-------+---------+----------+
//! | 0xFE | len | seq | sysid | compid | msgid | payload | CRC (LE) |
//! +------+-----+-----+-------+--------+-------+---------+----------+
//! ```

use crate::crc::frame_crc;
use crate::messages::{crc_extra, MavMessage};
use crate::{CHECKSUM_LEN, HEADER_LEN, MAVLINK_STX_V1};

/// Header fields of a frame besides length and message id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Per-sender sequence number.
    pub sequence: u8,
    /// Sending system.
    pub system_id: u8,
    /// Sending component.
    pub component_id: u8,
}

/// A decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Sequence and sender.
    pub header: FrameHeader,
    /// Decoded payload.
    pub message: MavMessage,
}

/// Encoder error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The output buffer cannot hold the frame.
    BufferTooSmall,
    /// The message id has no known layout.
    UnknownMessage,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::UnknownMessage => write!(f, "unknown message"),
        }
    }
}

/// Write one complete frame for `message` into `buf`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`EncodeError::UnknownMessage`] for [`MavMessage::Unknown`] and
/// [`EncodeError::BufferTooSmall`] if `buf` cannot hold the frame.
pub fn encode(header: FrameHeader, message: &MavMessage, buf: &mut [u8]) -> Result<usize, EncodeError> {
    let id = message.id();
    let extra = crc_extra(id).ok_or(EncodeError::UnknownMessage)?;

    let payload_buf = buf.get_mut(HEADER_LEN..).ok_or(EncodeError::BufferTooSmall)?;
    let payload_len = message
        .encode_payload(payload_buf)
        .ok_or(EncodeError::BufferTooSmall)?;

    let crc_start = HEADER_LEN + payload_len;
    let total = crc_start + CHECKSUM_LEN;
    if buf.len() < total {
        return Err(EncodeError::BufferTooSmall);
    }

    buf[..HEADER_LEN].copy_from_slice(&[
        MAVLINK_STX_V1,
        payload_len as u8,
        header.sequence,
        header.system_id,
        header.component_id,
        id,
    ]);

    let crc = frame_crc(&buf[1..crc_start], extra);
    buf[crc_start..total].copy_from_slice(&crc.to_le_bytes());

    Ok(total)
}

/// Frame encoder for one sender, numbering frames sequentially.
pub struct Encoder {
    system_id: u8,
    component_id: u8,
    sequence: u8,
}

impl Encoder {
    /// Create an encoder sending as `system_id`/`component_id`.
    #[must_use]
    pub const fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: 0,
        }
    }

    /// Sequence number the next frame will carry.
    #[inline]
    #[must_use]
    pub const fn next_sequence(&self) -> u8 {
        self.sequence
    }

    /// Encode `message` into `buf` with the next sequence number.
    ///
    /// The sequence number only advances when encoding succeeds.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn encode(&mut self, message: &MavMessage, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let header = FrameHeader {
            sequence: self.sequence,
            system_id: self.system_id,
            component_id: self.component_id,
        };
        let len = encode(header, message, buf)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(len)
    }
}
