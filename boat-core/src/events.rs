//! Observability hook for the controller.
//!
//! Nothing in the core fails hard: bad frames, unknown messages and queue
//! overflows are absorbed. Every such case is still reported as an
//! [`Event`] so tests and the firmware can see what was dropped.

use mavlink_proto::ParseError;
use serial_link::Channel;
use ubx_proto::UbxEvent;

use crate::retry::AckOutcome;

/// Something the controller observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Reported by the GPS parser.
    Gps(UbxEvent),
    /// Heartbeat received on the radio link.
    HeartbeatReceived {
        /// Data byte of the heartbeat.
        data: u8,
    },
    /// START_RESCUE received and routed to the handler.
    RescueReceived {
        /// Target latitude, degrees * 1e7.
        latitude: i32,
        /// Target longitude, degrees * 1e7.
        longitude: i32,
        /// Status byte.
        status: u8,
    },
    /// Ack for a pending command arrived.
    AckReceived {
        /// Id of the acknowledged message.
        message_name: u8,
    },
    /// We answered a command with an ack.
    AckSent {
        /// Id of the acknowledged message.
        message_name: u8,
    },
    /// The command framer dropped a frame.
    FrameDropped(ParseError),
    /// A command frame with an unknown id was ignored.
    UnknownCommand(u8),
    /// An outgoing frame did not fit in the outbound queue.
    TxOverflow {
        /// Link the frame was for.
        channel: Channel,
        /// Bytes that were lost.
        dropped: usize,
    },
    /// The retry supervisor resolved or resent a pending ack.
    Ack(AckOutcome),
}

/// Receiver of controller events.
pub trait EventSink {
    /// Handle one event. Must not block.
    fn record(&mut self, event: Event);
}

/// Event sink that discards everything.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn record(&mut self, _event: Event) {}
}

/// Event sink that only counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventCounters {
    pub gps_connects: u32,
    pub gps_disconnects: u32,
    pub gps_frames: u32,
    pub gps_sync_errors: u32,
    pub gps_checksum_mismatches: u32,
    pub heartbeats: u32,
    pub rescues: u32,
    pub acks_received: u32,
    pub acks_sent: u32,
    pub frames_dropped: u32,
    pub unknown_commands: u32,
    pub tx_overflows: u32,
    pub resends: u32,
    pub gave_up: u32,
}

impl EventSink for EventCounters {
    fn record(&mut self, event: Event) {
        match event {
            Event::Gps(UbxEvent::Connected) => self.gps_connects += 1,
            Event::Gps(UbxEvent::Disconnected) => self.gps_disconnects += 1,
            Event::Gps(UbxEvent::FrameParsed { .. }) => self.gps_frames += 1,
            Event::Gps(UbxEvent::SyncError { .. }) => self.gps_sync_errors += 1,
            Event::Gps(UbxEvent::FrameReceived { checksum_ok: false, .. }) => {
                self.gps_checksum_mismatches += 1;
            }
            Event::Gps(_) => {}
            Event::HeartbeatReceived { .. } => self.heartbeats += 1,
            Event::RescueReceived { .. } => self.rescues += 1,
            Event::AckReceived { .. } => self.acks_received += 1,
            Event::AckSent { .. } => self.acks_sent += 1,
            Event::FrameDropped(_) => self.frames_dropped += 1,
            Event::UnknownCommand(_) => self.unknown_commands += 1,
            Event::TxOverflow { .. } => self.tx_overflows += 1,
            Event::Ack(AckOutcome::Resent { .. }) => self.resends += 1,
            Event::Ack(AckOutcome::GaveUp) => self.gave_up += 1,
            Event::Ack(AckOutcome::Delivered) => {}
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: Event) {
        (**self).record(event);
    }
}
