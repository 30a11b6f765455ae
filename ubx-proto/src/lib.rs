//! UBX navigation frame parsing (chip-agnostic).
//!
//! Reassembles u-blox UBX frames from a [`serial_link::ByteSource`] one byte
//! at a time and decodes the navigation messages the boat uses into a
//! [`NavigationState`].
//!
//! # Supported Messages
//!
//! | Class | Id   | Message    | Fields used                         |
//! |-------|------|------------|-------------------------------------|
//! | 0x01  | 0x02 | NAV-POSLLH | longitude, latitude, altitude (MSL) |
//! | 0x01  | 0x03 | NAV-STATUS | fix type                            |
//! | 0x01  | 0x12 | NAV-VELNED | north/east velocity, heading        |
//!
//! Every other message is skipped.
//!
//! # Example
//!
//! ```
//! use serial_link::{ByteQueue, ByteSink};
//! use ubx_proto::{build_frame, UbxParser, CLASS_NAV, NAV_STATUS};
//!
//! let mut queue: ByteQueue<64> = ByteQueue::new();
//! let (mut writer, mut reader) = queue.split();
//!
//! let mut frame = [0u8; 32];
//! let mut payload = [0u8; 16];
//! payload[4] = 0x03; // 3D fix
//! let len = build_frame(CLASS_NAV, NAV_STATUS, &payload, &mut frame).unwrap();
//! writer.push_slice(&frame[..len]);
//!
//! let mut parser = UbxParser::new();
//! parser.poll(&mut reader, 0, 512, |_event| {});
//!
//! assert!(parser.navigation().has_fix());
//! assert!(parser.navigation().is_connected());
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod fields;
pub mod frame;
pub mod navigation;
pub mod parser;

pub use fields::{layout_for, Field, FieldSpec, MessageLayout};
pub use frame::{build_frame, checksum, BuildError, UbxFrame};
pub use navigation::{ErrorCorrection, NavigationState};
pub use parser::{ParserState, ParserStats, UbxEvent, UbxParser};

/// First sync byte.
pub const SYNC1: u8 = 0xB5;

/// Second sync byte.
pub const SYNC2: u8 = 0x62;

/// Sync, class, id and length bytes.
pub const HEADER_SIZE: usize = 6;

/// CK_A and CK_B.
pub const CHECKSUM_SIZE: usize = 2;

/// Largest frame the parser buffers, header and checksum included.
pub const MAX_FRAME_SIZE: usize = 255;

/// NAV message class.
pub const CLASS_NAV: u8 = 0x01;

/// NAV-POSLLH message id.
pub const NAV_POSLLH: u8 = 0x02;

/// NAV-STATUS message id.
pub const NAV_STATUS: u8 = 0x03;

/// NAV-VELNED message id.
pub const NAV_VELNED: u8 = 0x12;

/// Fix type reported when the receiver has no position solution.
pub const NO_FIX: u8 = 0x00;

/// How long the link counts as connected after the last sync, in ms.
pub const CONNECTION_TIMEOUT_MS: u64 = 5_000;

/// GPS UART baud rate.
pub const GPS_BAUDRATE: u32 = 38_400;
