//! Rescue-boat command messages and their payload layouts.
//!
//! All multi-byte fields are little-endian. Ids, payload lengths and
//! `CRC_EXTRA` values must match the peers' generated message headers.
//!
//! | Id  | Message        | Len | CRC_EXTRA |
//! |-----|----------------|-----|-----------|
//! | 240 | XBEE_HEARTBEAT | 2   | 58        |
//! | 241 | START_RESCUE   | 10  | 50        |
//! | 242 | MAVLINK_ACK    | 1   | 203       |
//! | 243 | TEST_DATA      | 1   | 205       |

use crate::parser::ParseError;

/// XBEE_HEARTBEAT message ID.
pub const MSG_ID_XBEE_HEARTBEAT: u8 = 240;

/// START_RESCUE message ID.
pub const MSG_ID_START_RESCUE: u8 = 241;

/// MAVLINK_ACK message ID.
pub const MSG_ID_MAVLINK_ACK: u8 = 242;

/// TEST_DATA message ID.
pub const MSG_ID_TEST_DATA: u8 = 243;

const XBEE_HEARTBEAT_LEN: usize = 2;
const START_RESCUE_LEN: usize = 10;
const MAVLINK_ACK_LEN: usize = 1;
const TEST_DATA_LEN: usize = 1;

const CRC_EXTRA_XBEE_HEARTBEAT: u8 = 58;
const CRC_EXTRA_START_RESCUE: u8 = 50;
const CRC_EXTRA_MAVLINK_ACK: u8 = 203;
const CRC_EXTRA_TEST_DATA: u8 = 205;

/// Radio link keep-alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct XbeeHeartbeat {
    /// Non-zero if the sender wants an ack.
    pub ack: u8,
    /// Free-form data byte.
    pub data: u8,
}

/// Command sending the boat to a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartRescue {
    /// Target latitude, degrees * 1e7.
    pub latitude: i32,
    /// Target longitude, degrees * 1e7.
    pub longitude: i32,
    /// Non-zero if the receiver must answer with a [`MavlinkAck`].
    pub ack: u8,
    /// Boat status flags.
    pub status: u8,
}

impl StartRescue {
    /// Check if the sender asked for an acknowledgment.
    #[inline]
    #[must_use]
    pub const fn ack_requested(&self) -> bool {
        self.ack != 0
    }
}

/// Acknowledgment of a previously received message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MavlinkAck {
    /// Id of the acknowledged message.
    pub message_name: u8,
}

/// Radio link test payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestData {
    /// Data byte.
    pub data: u8,
}

/// Decoded command message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MavMessage {
    XbeeHeartbeat(XbeeHeartbeat),
    StartRescue(StartRescue),
    MavlinkAck(MavlinkAck),
    TestData(TestData),
    /// Frame with an id this crate does not know; payload not checked.
    Unknown(u8),
}

impl MavMessage {
    /// Message id on the wire.
    #[must_use]
    pub const fn id(&self) -> u8 {
        match self {
            Self::XbeeHeartbeat(_) => MSG_ID_XBEE_HEARTBEAT,
            Self::StartRescue(_) => MSG_ID_START_RESCUE,
            Self::MavlinkAck(_) => MSG_ID_MAVLINK_ACK,
            Self::TestData(_) => MSG_ID_TEST_DATA,
            Self::Unknown(id) => *id,
        }
    }

    /// Decode a payload for message `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidLength`] if the payload length does not
    /// match the message definition.
    pub fn decode(id: u8, payload: &[u8]) -> Result<Self, ParseError> {
        if let Some(expected) = payload_len(id) {
            if payload.len() != expected {
                return Err(ParseError::InvalidLength);
            }
        }

        let message = match id {
            MSG_ID_XBEE_HEARTBEAT => Self::XbeeHeartbeat(XbeeHeartbeat {
                ack: payload[0],
                data: payload[1],
            }),
            MSG_ID_START_RESCUE => Self::StartRescue(StartRescue {
                latitude: i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
                longitude: i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
                ack: payload[8],
                status: payload[9],
            }),
            MSG_ID_MAVLINK_ACK => Self::MavlinkAck(MavlinkAck {
                message_name: payload[0],
            }),
            MSG_ID_TEST_DATA => Self::TestData(TestData { data: payload[0] }),
            other => Self::Unknown(other),
        };
        Ok(message)
    }

    /// Write the payload into `buf` and return its length.
    ///
    /// Returns `None` for [`MavMessage::Unknown`] or if `buf` is too short.
    #[must_use]
    pub fn encode_payload(&self, buf: &mut [u8]) -> Option<usize> {
        let len = payload_len(self.id())?;
        let out = buf.get_mut(..len)?;

        match self {
            Self::XbeeHeartbeat(m) => out.copy_from_slice(&[m.ack, m.data]),
            Self::StartRescue(m) => {
                out[0..4].copy_from_slice(&m.latitude.to_le_bytes());
                out[4..8].copy_from_slice(&m.longitude.to_le_bytes());
                out[8] = m.ack;
                out[9] = m.status;
            }
            Self::MavlinkAck(m) => out[0] = m.message_name,
            Self::TestData(m) => out[0] = m.data,
            Self::Unknown(_) => return None,
        }
        Some(len)
    }
}

/// Payload length of a known message id.
#[must_use]
pub const fn payload_len(id: u8) -> Option<usize> {
    match id {
        MSG_ID_XBEE_HEARTBEAT => Some(XBEE_HEARTBEAT_LEN),
        MSG_ID_START_RESCUE => Some(START_RESCUE_LEN),
        MSG_ID_MAVLINK_ACK => Some(MAVLINK_ACK_LEN),
        MSG_ID_TEST_DATA => Some(TEST_DATA_LEN),
        _ => None,
    }
}

/// `CRC_EXTRA` seed of a known message id.
#[must_use]
pub const fn crc_extra(id: u8) -> Option<u8> {
    match id {
        MSG_ID_XBEE_HEARTBEAT => Some(CRC_EXTRA_XBEE_HEARTBEAT),
        MSG_ID_START_RESCUE => Some(CRC_EXTRA_START_RESCUE),
        MSG_ID_MAVLINK_ACK => Some(CRC_EXTRA_MAVLINK_ACK),
        MSG_ID_TEST_DATA => Some(CRC_EXTRA_TEST_DATA),
        _ => None,
    }
}
