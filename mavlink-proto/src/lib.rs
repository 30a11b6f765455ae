//! MAVLink v1 framing for the rescue-boat radio link.
//!
//! This crate provides chip-agnostic encoding and parsing of the command
//! messages exchanged between the boat and its base station over the XBee
//! radio. It does not depend on the generated MAVLink crates; only the
//! four messages of the boat's own dialect are supported.
//!
//! # Example
//!
//! ```
//! use mavlink_proto::{Encoder, MavMessage, MavlinkParser, StartRescue, COMPONENT_ID, SYSTEM_ID};
//!
//! let mut encoder = Encoder::new(SYSTEM_ID, COMPONENT_ID);
//! let mut buf = [0u8; 32];
//! let msg = MavMessage::StartRescue(StartRescue {
//!     latitude: 369_912_345,
//!     longitude: -1_220_567_890,
//!     ack: 1,
//!     status: 0,
//! });
//! let len = encoder.encode(&msg, &mut buf).unwrap();
//!
//! let mut parser = MavlinkParser::new();
//! let mut decoded = None;
//! for &byte in &buf[..len] {
//!     if let Ok(Some(frame)) = parser.push_byte(byte) {
//!         decoded = Some(frame.message);
//!     }
//! }
//! assert_eq!(decoded, Some(msg));
//! ```
//!
//! # Message Types
//!
//! - **XBEE_HEARTBEAT** (ID 240): Radio link keep-alive
//! - **START_RESCUE** (ID 241): Send the boat to a position, optionally acknowledged
//! - **MAVLINK_ACK** (ID 242): Acknowledges a message by id
//! - **TEST_DATA** (ID 243): Link test payload
//!
//! # UART Configuration
//!
//! XBee radios are usually configured for 57600 baud, 8N1.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod crc;
pub mod frame;
pub mod messages;
pub mod parser;

pub use frame::{encode, EncodeError, Encoder, Frame, FrameHeader};
pub use messages::{
    MavMessage, MavlinkAck, StartRescue, TestData, XbeeHeartbeat, MSG_ID_MAVLINK_ACK,
    MSG_ID_START_RESCUE, MSG_ID_TEST_DATA, MSG_ID_XBEE_HEARTBEAT,
};
pub use parser::{MavlinkParser, ParseError};

/// MAVLink 1 start byte.
pub const MAVLINK_STX_V1: u8 = 0xFE;

/// STX, length, sequence, system, component and message id.
pub const HEADER_LEN: usize = 6;

/// CRC bytes at the end of every frame.
pub const CHECKSUM_LEN: usize = 2;

/// Largest MAVLink v1 frame.
pub const MAX_FRAME_SIZE: usize = HEADER_LEN + 255 + CHECKSUM_LEN;

/// System id the boat sends as.
pub const SYSTEM_ID: u8 = 15;

/// Component id the boat sends as.
pub const COMPONENT_ID: u8 = 15;

/// Baud rate of the radio telemetry modem.
pub const MAVLINK_BAUDRATE_TELEMETRY: u32 = 57_600;
