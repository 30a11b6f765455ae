//! Interrupt-fed byte queues for the boat's serial links.
//!
//! This crate decouples UART hardware from protocol parsing. Hardware
//! interrupt handlers (or the tasks standing in for them) push received
//! bytes into an inbound queue and pull bytes to transmit from an outbound
//! queue; the application loop does the opposite. No locks are involved:
//! each queue has exactly one producer and one consumer, and the split
//! handle types make any other arrangement a compile error.
//!
//! # Overview
//!
//! - [`queue`]: [`ByteQueue`] and its [`QueueWriter`] / [`QueueReader`] handles
//! - [`link`]: per-channel [`AppPort`] / [`IrqPort`] pairs and the [`LinkDriver`]
//! - [`ByteSource`] / [`ByteSink`]: the seams protocol parsers consume
//!
//! # Example
//!
//! ```
//! use serial_link::{split_link, ByteQueue};
//!
//! let mut rx: ByteQueue<64> = ByteQueue::new();
//! let mut tx: ByteQueue<64> = ByteQueue::new();
//! let (mut app, mut irq) = split_link(&mut rx, &mut tx);
//!
//! // Receive interrupt
//! irq.on_receive(0xB5);
//!
//! // Application loop
//! assert_eq!(app.inbound.pop(), Some(0xB5));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod link;
pub mod queue;

pub use link::{split_link, AppPort, Channel, Direction, IrqPort, LinkDriver, LinkStats, QueueRef};
pub use queue::{ByteQueue, QueueReader, QueueWriter, QUEUE_SIZE};

/// A stream of received bytes, consumed in arrival order.
///
/// Implemented by [`QueueReader`]; protocol state machines take this trait
/// so they can be driven from any byte source in tests.
pub trait ByteSource {
    /// Return the next byte without consuming it.
    fn peek(&self) -> Option<u8>;

    /// Consume and return the next byte.
    fn pop(&mut self) -> Option<u8>;

    /// Check if no byte is available right now.
    fn is_empty(&self) -> bool {
        self.peek().is_none()
    }
}

/// A destination for bytes to transmit.
///
/// Implemented by [`QueueWriter`].
pub trait ByteSink {
    /// Queue one byte; returns `false` if it was dropped.
    fn push(&mut self, byte: u8) -> bool;

    /// Queue `bytes` in order; returns how many were accepted.
    ///
    /// Bytes that do not fit are dropped one by one, so each one counts as
    /// an overflow.
    fn push_slice(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| self.push(b)).count()
    }
}
