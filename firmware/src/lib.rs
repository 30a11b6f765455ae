//! Rescue-boat link controller for RP2040.
//!
//! Wires the chip-agnostic [`boat_core::Controller`] to two hardware UARTs:
//! the GPS receiver and the radio modem. Interrupt-driven pump tasks move
//! bytes between the UARTs and the link queues; one control task runs the
//! scheduler tick.
//!
//! # Pins
//!
//! | Link  | UART  | TX     | RX     | Baud    |
//! |-------|-------|--------|--------|---------|
//! | GPS   | UART0 | GPIO 0 | GPIO 1 | 38 400  |
//! | Radio | UART1 | GPIO 8 | GPIO 9 | 57 600  |

#![no_std]

pub use boat_core::{
    split_link, AckOutcome, ByteQueue, Channel, CommandHandler, Config, Controller, Event,
    EventSink, LinkDriver, NavigationState, StartRescue,
};
pub use serial_link::{IrqPort, QueueReader, QueueWriter, QUEUE_SIZE};

pub mod mission;
pub mod pump;

pub use mission::{LogEvents, RescueMission};
pub use pump::{receive_into, transmit_from, TX_CHUNK};

/// Scheduler tick period.
pub const TICK_MS: u64 = 10;

/// GPS UART baud rate.
pub const GPS_BAUDRATE: u32 = ubx_proto::GPS_BAUDRATE;

/// Radio UART baud rate.
pub const RADIO_BAUDRATE: u32 = mavlink_proto::MAVLINK_BAUDRATE_TELEMETRY;
