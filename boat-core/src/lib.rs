//! Rescue-boat controller core (chip-agnostic).
//!
//! Ties the serial links, the GPS parser and the radio command protocol
//! together into one non-blocking scheduler tick.
//!
//! # Architecture
//!
//! ```text
//!  GPS UART ──irq──▶ inbound queue ──▶ UbxParser ──▶ NavigationState
//!
//!  Radio UART ─irq─▶ inbound queue ──▶ CommandProtocol ──▶ CommandHandler
//!            ◀─irq── outbound queue ◀──┘  ▲
//!                                         └── AckSupervisor (resend on timeout)
//! ```
//!
//! All protocol state lives in one [`Controller`], owned by the task that
//! runs the scheduler loop. Interrupt handlers only ever see their own end
//! of the byte queues.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod command;
pub mod config;
pub mod controller;
pub mod events;
pub mod retry;

pub use command::{AckStatus, CommandHandler, CommandProtocol, PendingAck, SendError};
pub use config::Config;
pub use controller::{Controller, TickReport};
pub use events::{Event, EventCounters, EventSink, NullEventSink};
pub use retry::{AckOutcome, AckSupervisor};

// Re-exported so firmware and tests need only this crate
pub use mavlink_proto::{MavlinkAck, StartRescue, TestData, XbeeHeartbeat};
pub use serial_link::{split_link, ByteQueue, Channel, LinkDriver};
pub use ubx_proto::NavigationState;
