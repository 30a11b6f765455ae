//! Serial link ports built from a pair of byte queues.
//!
//! Each physical serial channel owns two [`ByteQueue`]s: one inbound (filled
//! by the receive interrupt) and one outbound (drained by the transmit
//! interrupt). [`split_link`] hands out the two ends:
//!
//! - [`AppPort`] for the application loop: reads inbound, writes outbound.
//! - [`IrqPort`] for the interrupt handler: writes inbound, reads outbound.
//!
//! [`LinkDriver`] groups the application ports of every channel so protocol
//! code can address them by [`Channel`].

use crate::queue::{ByteQueue, QueueReader, QueueWriter};
use crate::{ByteSink, ByteSource};

/// Physical serial channels on the boat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// GPS receiver (UBX binary protocol).
    Gps,
    /// Radio modem (MAVLink command protocol).
    Radio,
}

/// Direction of a queue relative to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Bytes received from the wire.
    Inbound,
    /// Bytes waiting to be transmitted.
    Outbound,
}

/// Application-side end of a serial link.
pub struct AppPort<'q, const N: usize> {
    /// Received bytes, oldest first.
    pub inbound: QueueReader<'q, N>,
    /// Bytes to transmit.
    pub outbound: QueueWriter<'q, N>,
}

impl<const N: usize> AppPort<'_, N> {
    /// Counters for this link.
    #[must_use]
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            rx_pending: self.inbound.len(),
            rx_overflows: self.inbound.overflow_count(),
            tx_pending: self.outbound.len(),
            tx_overflows: self.outbound.overflow_count(),
        }
    }
}

/// Interrupt-side end of a serial link.
pub struct IrqPort<'q, const N: usize> {
    inbound: QueueWriter<'q, N>,
    outbound: QueueReader<'q, N>,
}

impl<'q, const N: usize> IrqPort<'q, N> {
    /// Store a byte that just arrived on the wire.
    ///
    /// Returns `false` if the inbound queue was full and the byte was dropped.
    #[inline]
    pub fn on_receive(&mut self, byte: u8) -> bool {
        self.inbound.push(byte)
    }

    /// Next byte to hand to the transmitter, or `None` when there is
    /// nothing left to send (transmission stops until more is queued).
    #[inline]
    pub fn next_to_transmit(&mut self) -> Option<u8> {
        self.outbound.pop()
    }

    /// Check if there are bytes waiting to be transmitted.
    #[inline]
    #[must_use]
    pub fn has_pending_tx(&self) -> bool {
        !self.outbound.is_empty()
    }

    /// Separate the receive and transmit halves, e.g. to run them in
    /// different tasks.
    #[must_use]
    pub fn into_parts(self) -> (QueueWriter<'q, N>, QueueReader<'q, N>) {
        (self.inbound, self.outbound)
    }
}

/// Wire two queues into the application and interrupt ends of one link.
pub fn split_link<'q, const N: usize>(
    rx: &'q mut ByteQueue<N>,
    tx: &'q mut ByteQueue<N>,
) -> (AppPort<'q, N>, IrqPort<'q, N>) {
    let (rx_writer, rx_reader) = rx.split();
    let (tx_writer, tx_reader) = tx.split();
    (
        AppPort {
            inbound: rx_reader,
            outbound: tx_writer,
        },
        IrqPort {
            inbound: rx_writer,
            outbound: tx_reader,
        },
    )
}

/// Snapshot of one link's queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Received bytes not yet consumed.
    pub rx_pending: usize,
    /// Received bytes dropped because the inbound queue was full.
    pub rx_overflows: u32,
    /// Bytes not yet transmitted.
    pub tx_pending: usize,
    /// Outgoing bytes dropped because the outbound queue was full.
    pub tx_overflows: u32,
}

/// Borrowed queue handle returned by [`LinkDriver::queue_for`].
pub enum QueueRef<'a, 'q, const N: usize> {
    /// Application reads received bytes from here.
    Inbound(&'a mut QueueReader<'q, N>),
    /// Application writes bytes to transmit here.
    Outbound(&'a mut QueueWriter<'q, N>),
}

/// Application ports for every serial channel.
pub struct LinkDriver<'q, const N: usize> {
    gps: AppPort<'q, N>,
    radio: AppPort<'q, N>,
}

impl<'q, const N: usize> LinkDriver<'q, N> {
    /// Group the application ports of the GPS and radio links.
    #[must_use]
    pub fn new(gps: AppPort<'q, N>, radio: AppPort<'q, N>) -> Self {
        Self { gps, radio }
    }

    /// Application port of `channel`.
    pub fn port(&mut self, channel: Channel) -> &mut AppPort<'q, N> {
        match channel {
            Channel::Gps => &mut self.gps,
            Channel::Radio => &mut self.radio,
        }
    }

    /// Queue of `channel` in the given direction.
    pub fn queue_for(&mut self, channel: Channel, direction: Direction) -> QueueRef<'_, 'q, N> {
        let port = self.port(channel);
        match direction {
            Direction::Inbound => QueueRef::Inbound(&mut port.inbound),
            Direction::Outbound => QueueRef::Outbound(&mut port.outbound),
        }
    }

    /// Inbound queue of `channel`.
    pub fn inbound(&mut self, channel: Channel) -> &mut QueueReader<'q, N> {
        &mut self.port(channel).inbound
    }

    /// Outbound queue of `channel`.
    pub fn outbound(&mut self, channel: Channel) -> &mut QueueWriter<'q, N> {
        &mut self.port(channel).outbound
    }

    /// Counters for `channel`.
    pub fn stats(&mut self, channel: Channel) -> LinkStats {
        self.port(channel).stats()
    }
}

impl<const N: usize> ByteSource for QueueReader<'_, N> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        QueueReader::peek(self)
    }

    #[inline]
    fn pop(&mut self) -> Option<u8> {
        QueueReader::pop(self)
    }
}

impl<const N: usize> ByteSink for QueueWriter<'_, N> {
    #[inline]
    fn push(&mut self, byte: u8) -> bool {
        QueueWriter::push(self, byte)
    }
}
