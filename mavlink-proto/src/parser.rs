//! Byte-at-a-time MAVLink v1 frame parser.
//!
//! Only the v1 framing (`0xFE` start byte, 1-byte message id) is spoken on
//! the boat's radio link. Bytes before a start byte are ignored.

use crate::crc::frame_crc;
use crate::frame::{Frame, FrameHeader};
use crate::messages::{crc_extra, MavMessage};
use crate::{CHECKSUM_LEN, HEADER_LEN, MAVLINK_STX_V1, MAX_FRAME_SIZE};

/// Parser error. Each one means a frame was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// CRC mismatch.
    CrcError,
    /// Payload length does not match the message definition.
    InvalidLength,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CrcError => write!(f, "CRC mismatch"),
            Self::InvalidLength => write!(f, "invalid payload length"),
        }
    }
}

/// MAVLink frame parser.
pub struct MavlinkParser {
    buffer: [u8; MAX_FRAME_SIZE],
    pos: usize,
    state: ParserState,
    drops: u32,
}

#[derive(Clone, Copy)]
enum ParserState {
    WaitingForStart,
    ReadingHeader,
    ReadingPayload { expected_len: usize },
}

impl MavlinkParser {
    /// Create a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; MAX_FRAME_SIZE],
            pos: 0,
            state: ParserState::WaitingForStart,
            drops: 0,
        }
    }

    /// Reset parser state.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.state = ParserState::WaitingForStart;
    }

    /// Frames dropped since the parser was created.
    #[inline]
    #[must_use]
    pub const fn drop_count(&self) -> u32 {
        self.drops
    }

    /// Feed a byte to the parser.
    ///
    /// Returns `Some(frame)` once a complete valid frame was parsed.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when a complete frame had to be dropped.
    /// The parser is ready for the next frame either way.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<Frame>, ParseError> {
        match self.state {
            ParserState::WaitingForStart => {
                if byte == MAVLINK_STX_V1 {
                    self.buffer[0] = byte;
                    self.pos = 1;
                    self.state = ParserState::ReadingHeader;
                }
                Ok(None)
            }
            ParserState::ReadingHeader => {
                self.buffer[self.pos] = byte;
                self.pos += 1;

                if self.pos >= HEADER_LEN {
                    let payload_len = self.buffer[1] as usize;
                    let expected_len = HEADER_LEN + payload_len + CHECKSUM_LEN;
                    self.state = ParserState::ReadingPayload { expected_len };
                }
                Ok(None)
            }
            ParserState::ReadingPayload { expected_len } => {
                self.buffer[self.pos] = byte;
                self.pos += 1;

                if self.pos >= expected_len {
                    let result = self.parse_frame();
                    self.reset();
                    if result.is_err() {
                        self.drops = self.drops.wrapping_add(1);
                    }
                    result.map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Parse a complete frame.
    fn parse_frame(&self) -> Result<Frame, ParseError> {
        let payload_len = self.buffer[1] as usize;
        let header = FrameHeader {
            sequence: self.buffer[2],
            system_id: self.buffer[3],
            component_id: self.buffer[4],
        };
        let msg_id = self.buffer[5];

        // Without CRC_EXTRA the checksum cannot be verified
        let Some(extra) = crc_extra(msg_id) else {
            return Ok(Frame {
                header,
                message: MavMessage::Unknown(msg_id),
            });
        };

        let crc_start = HEADER_LEN + payload_len;
        let calculated_crc = frame_crc(&self.buffer[1..crc_start], extra);
        let received_crc = u16::from_le_bytes([self.buffer[crc_start], self.buffer[crc_start + 1]]);

        if calculated_crc != received_crc {
            return Err(ParseError::CrcError);
        }

        let message = MavMessage::decode(msg_id, &self.buffer[HEADER_LEN..crc_start])?;
        Ok(Frame { header, message })
    }
}

impl Default for MavlinkParser {
    fn default() -> Self {
        Self::new()
    }
}
