//! Command dispatch over the radio link and the START_RESCUE ack contract.
//!
//! [`CommandProtocol`] drains an inbound queue through the MAVLink framer,
//! routes each decoded message to a [`CommandHandler`], and encodes
//! outgoing frames straight onto the outbound queue.
//!
//! # Ack contract
//!
//! START_RESCUE is the only reliable message. When it is sent with an ack
//! requested, the exact encoded bytes are kept in a [`PendingAck`]:
//!
//! ```text
//!  None ──send(ack)──▶ Waiting ──ack received──▶ Received
//!                       ▲   │
//!                       └───┘ resend (same bytes)
//! ```
//!
//! [`CommandProtocol::resend`] never re-encodes; the peer sees the same
//! sequence number again. Deciding when to resend and when to stop is up
//! to the caller (see [`crate::retry::AckSupervisor`]).

use heapless::Vec;
use mavlink_proto::{
    EncodeError, Encoder, MavMessage, MavlinkAck, MavlinkParser, StartRescue, TestData,
    XbeeHeartbeat, MAX_FRAME_SIZE, MSG_ID_START_RESCUE,
};
use serial_link::{ByteSink, Channel, LinkDriver};

use crate::events::{Event, EventSink};

#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Delivery state of the last acknowledged command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckStatus {
    /// Nothing is waiting for an ack.
    None,
    /// Sent, no ack yet.
    Waiting,
    /// The peer acknowledged it.
    Received,
}

/// Bytes and destination of the last START_RESCUE sent with an ack request.
pub struct PendingAck {
    status: AckStatus,
    last_frame: Vec<u8, MAX_FRAME_SIZE>,
    destination: Channel,
    generation: u32,
}

impl PendingAck {
    const fn new() -> Self {
        Self {
            status: AckStatus::None,
            last_frame: Vec::new(),
            destination: Channel::Radio,
            generation: 0,
        }
    }

    /// Current delivery state.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> AckStatus {
        self.status
    }

    /// Exact bytes that were enqueued.
    #[inline]
    #[must_use]
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    /// Link the frame was sent on.
    #[inline]
    #[must_use]
    pub const fn destination(&self) -> Channel {
        self.destination
    }

    /// Bumped every time a new frame is captured. Resends keep it.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Receiver of decoded commands.
///
/// Only START_RESCUE must be handled; the other messages default to no-ops.
pub trait CommandHandler {
    /// The base station sent the boat to a position.
    fn on_start_rescue(&mut self, command: &StartRescue);

    /// Radio heartbeat received.
    fn on_heartbeat(&mut self, _heartbeat: &XbeeHeartbeat) {}

    /// Link test data received.
    fn on_test_data(&mut self, _data: &TestData) {}
}

/// Error type for send operations.
///
/// Sends are fire-and-forget; callers may ignore these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// The message could not be encoded.
    Encode(EncodeError),
    /// The outbound queue filled up; the tail of the frame was lost.
    Overflow {
        /// Bytes that did not fit.
        dropped: usize,
    },
    /// `resend` was called with no captured frame.
    NothingPending,
}

impl core::fmt::Display for SendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "encode failed: {e}"),
            Self::Overflow { dropped } => write!(f, "outbound queue full, {dropped} bytes dropped"),
            Self::NothingPending => write!(f, "no frame to resend"),
        }
    }
}

impl From<EncodeError> for SendError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

/// MAVLink command dispatcher and sender.
pub struct CommandProtocol {
    parser: MavlinkParser,
    encoder: Encoder,
    pending: PendingAck,
    packet_drops: u32,
}

impl CommandProtocol {
    /// Create a protocol instance sending as `system_id`/`component_id`.
    #[must_use]
    pub const fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            parser: MavlinkParser::new(),
            encoder: Encoder::new(system_id, component_id),
            pending: PendingAck::new(),
            packet_drops: 0,
        }
    }

    /// State of the last START_RESCUE sent with an ack request.
    #[inline]
    #[must_use]
    pub const fn pending_ack(&self) -> &PendingAck {
        &self.pending
    }

    /// Frames dropped by the framer so far.
    #[inline]
    #[must_use]
    pub const fn packet_drops(&self) -> u32 {
        self.packet_drops
    }

    /// Drain up to `max_bytes` from `channel` and dispatch every complete
    /// frame. Returns the number of bytes consumed.
    pub fn receive<const N: usize, H, E>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        max_bytes: usize,
        handler: &mut H,
        events: &mut E,
    ) -> usize
    where
        H: CommandHandler + ?Sized,
        E: EventSink + ?Sized,
    {
        let mut consumed = 0;
        while consumed < max_bytes {
            let Some(byte) = links.inbound(channel).pop() else {
                break;
            };
            consumed += 1;

            match self.parser.push_byte(byte) {
                Ok(Some(frame)) => self.dispatch(links, channel, frame.message, handler, events),
                Ok(None) => {}
                Err(e) => {
                    debug!("Dropped command frame: {}", e);
                    self.packet_drops = self.packet_drops.wrapping_add(1);
                    events.record(Event::FrameDropped(e));
                }
            }
        }
        consumed
    }

    fn dispatch<const N: usize, H, E>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        message: MavMessage,
        handler: &mut H,
        events: &mut E,
    ) where
        H: CommandHandler + ?Sized,
        E: EventSink + ?Sized,
    {
        match message {
            MavMessage::XbeeHeartbeat(heartbeat) => {
                events.record(Event::HeartbeatReceived { data: heartbeat.data });
                handler.on_heartbeat(&heartbeat);
            }
            MavMessage::TestData(data) => handler.on_test_data(&data),
            MavMessage::StartRescue(command) => {
                if command.ack_requested() {
                    match self.send_ack(links, channel, MSG_ID_START_RESCUE) {
                        Ok(_) => events.record(Event::AckSent {
                            message_name: MSG_ID_START_RESCUE,
                        }),
                        Err(e) => report_send_error(events, channel, e),
                    }
                }
                info!(
                    "START_RESCUE lat {} lon {} status {}",
                    command.latitude, command.longitude, command.status
                );
                events.record(Event::RescueReceived {
                    latitude: command.latitude,
                    longitude: command.longitude,
                    status: command.status,
                });
                handler.on_start_rescue(&command);
            }
            MavMessage::MavlinkAck(ack) => {
                if self.receive_ack(&ack) {
                    events.record(Event::AckReceived {
                        message_name: ack.message_name,
                    });
                }
            }
            MavMessage::Unknown(id) => events.record(Event::UnknownCommand(id)),
        }
    }

    /// Handle a decoded ack.
    ///
    /// Any START_RESCUE ack marks the pending ack [`AckStatus::Received`],
    /// including one arriving late after the command was given up on.
    /// Returns `true` if the status changed.
    pub fn receive_ack(&mut self, ack: &MavlinkAck) -> bool {
        if ack.message_name != MSG_ID_START_RESCUE {
            return false;
        }
        debug!("START_RESCUE acknowledged");
        let changed = self.pending.status != AckStatus::Received;
        self.pending.status = AckStatus::Received;
        changed
    }

    /// Acknowledge message `message_name` on `channel`.
    ///
    /// # Errors
    ///
    /// See [`SendError`].
    pub fn send_ack<const N: usize>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        message_name: u8,
    ) -> Result<usize, SendError> {
        let message = MavMessage::MavlinkAck(MavlinkAck { message_name });
        self.send(links, channel, &message)
    }

    /// Send a radio heartbeat.
    ///
    /// # Errors
    ///
    /// See [`SendError`].
    pub fn send_heartbeat<const N: usize>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        data: u8,
    ) -> Result<usize, SendError> {
        let message = MavMessage::XbeeHeartbeat(XbeeHeartbeat { ack: 1, data });
        self.send(links, channel, &message)
    }

    /// Send link test data.
    ///
    /// # Errors
    ///
    /// See [`SendError`].
    pub fn send_test_data<const N: usize>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        data: u8,
    ) -> Result<usize, SendError> {
        let message = MavMessage::TestData(TestData { data });
        self.send(links, channel, &message)
    }

    /// Send START_RESCUE.
    ///
    /// With `ack_requested`, the encoded frame is captured for [`resend`]
    /// and the pending ack becomes [`AckStatus::Waiting`], replacing any
    /// earlier pending command. This happens even if the frame overflowed
    /// the outbound queue, so a resend can still deliver it.
    ///
    /// [`resend`]: Self::resend
    ///
    /// # Errors
    ///
    /// See [`SendError`].
    pub fn send_rescue_start<const N: usize>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        ack_requested: bool,
        status: u8,
        latitude: i32,
        longitude: i32,
    ) -> Result<usize, SendError> {
        let message = MavMessage::StartRescue(StartRescue {
            latitude,
            longitude,
            ack: u8::from(ack_requested),
            status,
        });

        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = self.encoder.encode(&message, &mut buf)?;
        let frame = &buf[..len];

        if ack_requested {
            self.pending.last_frame.clear();
            self.pending
                .last_frame
                .extend_from_slice(frame)
                .map_err(|()| SendError::Encode(EncodeError::BufferTooSmall))?;
            self.pending.destination = channel;
            self.pending.status = AckStatus::Waiting;
            self.pending.generation = self.pending.generation.wrapping_add(1);
        }

        write_frame(links.outbound(channel), frame)
    }

    /// Retransmit the captured START_RESCUE frame verbatim on its original
    /// channel and go back to [`AckStatus::Waiting`].
    ///
    /// # Errors
    ///
    /// Returns [`SendError::NothingPending`] if no frame was ever captured,
    /// or [`SendError::Overflow`] if the outbound queue filled up.
    pub fn resend<const N: usize>(&mut self, links: &mut LinkDriver<'_, N>) -> Result<usize, SendError> {
        if self.pending.last_frame.is_empty() {
            return Err(SendError::NothingPending);
        }
        self.pending.status = AckStatus::Waiting;
        write_frame(links.outbound(self.pending.destination), &self.pending.last_frame)
    }

    /// Stop tracking the pending command. The captured frame is kept.
    pub fn cancel_pending(&mut self) {
        self.pending.status = AckStatus::None;
    }

    fn send<const N: usize>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        channel: Channel,
        message: &MavMessage,
    ) -> Result<usize, SendError> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = self.encoder.encode(message, &mut buf)?;
        write_frame(links.outbound(channel), &buf[..len])
    }
}

/// Queue a whole frame; whatever does not fit is lost.
fn write_frame<S: ByteSink + ?Sized>(sink: &mut S, frame: &[u8]) -> Result<usize, SendError> {
    let accepted = sink.push_slice(frame);
    if accepted == frame.len() {
        Ok(accepted)
    } else {
        let dropped = frame.len() - accepted;
        warn!("Outbound queue full, {=usize} bytes dropped", dropped);
        Err(SendError::Overflow { dropped })
    }
}

/// Turn a failed send into an event.
pub(crate) fn report_send_error<E: EventSink + ?Sized>(events: &mut E, channel: Channel, error: SendError) {
    if let SendError::Overflow { dropped } = error {
        events.record(Event::TxOverflow { channel, dropped });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::events::EventCounters;
    use mavlink_proto::{encode, FrameHeader, MSG_ID_MAVLINK_ACK};
    use serial_link::{split_link, ByteQueue, IrqPort};
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct Recorder {
        rescues: StdVec<StartRescue>,
        heartbeats: StdVec<XbeeHeartbeat>,
        test_data: StdVec<TestData>,
    }

    impl CommandHandler for Recorder {
        fn on_start_rescue(&mut self, command: &StartRescue) {
            self.rescues.push(*command);
        }

        fn on_heartbeat(&mut self, heartbeat: &XbeeHeartbeat) {
            self.heartbeats.push(*heartbeat);
        }

        fn on_test_data(&mut self, data: &TestData) {
            self.test_data.push(*data);
        }
    }

    fn drain<const N: usize>(irq: &mut IrqPort<'_, N>) -> StdVec<u8> {
        core::iter::from_fn(|| irq.next_to_transmit()).collect()
    }

    fn frame_bytes(message: MavMessage) -> StdVec<u8> {
        let header = FrameHeader {
            sequence: 3,
            system_id: 1,
            component_id: 1,
        };
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = encode(header, &message, &mut buf).unwrap();
        buf[..len].to_vec()
    }

    macro_rules! setup {
        ($links:ident, $gps_irq:ident, $radio_irq:ident) => {
            let mut gps_rx: ByteQueue<128> = ByteQueue::new();
            let mut gps_tx: ByteQueue<128> = ByteQueue::new();
            let mut radio_rx: ByteQueue<128> = ByteQueue::new();
            let mut radio_tx: ByteQueue<128> = ByteQueue::new();
            #[allow(unused_mut, unused_variables)]
            let (gps, mut $gps_irq) = split_link(&mut gps_rx, &mut gps_tx);
            #[allow(unused_mut, unused_variables)]
            let (radio, mut $radio_irq) = split_link(&mut radio_rx, &mut radio_tx);
            let mut $links = LinkDriver::new(gps, radio);
        };
    }

    #[test]
    fn test_send_rescue_start_with_ack_captures_frame() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);

        let len = protocol
            .send_rescue_start(&mut links, Channel::Radio, true, 2, 7_654_321, 1_234_567)
            .unwrap();

        let sent = drain(&mut radio_irq);
        assert_eq!(sent.len(), len);
        assert_eq!(protocol.pending_ack().status(), AckStatus::Waiting);
        assert_eq!(protocol.pending_ack().last_frame(), &sent[..]);
        assert_eq!(protocol.pending_ack().destination(), Channel::Radio);
        assert!(drain(&mut gps_irq).is_empty());
    }

    #[test]
    fn test_send_rescue_start_without_ack() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);

        protocol
            .send_rescue_start(&mut links, Channel::Radio, false, 0, 1, 2)
            .unwrap();

        assert!(!drain(&mut radio_irq).is_empty());
        assert_eq!(protocol.pending_ack().status(), AckStatus::None);
        assert!(protocol.pending_ack().last_frame().is_empty());
        assert_eq!(
            protocol.resend(&mut links),
            Err(SendError::NothingPending)
        );
    }

    #[test]
    fn test_ack_marks_received() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);
        let mut handler = Recorder::default();
        let mut events = EventCounters::default();

        protocol
            .send_rescue_start(&mut links, Channel::Radio, true, 0, 1, 2)
            .unwrap();

        for b in frame_bytes(MavMessage::MavlinkAck(MavlinkAck {
            message_name: MSG_ID_START_RESCUE,
        })) {
            radio_irq.on_receive(b);
        }
        protocol.receive(&mut links, Channel::Radio, 512, &mut handler, &mut events);

        assert_eq!(protocol.pending_ack().status(), AckStatus::Received);
        assert_eq!(events.acks_received, 1);
    }

    #[test]
    fn test_ack_for_other_message_ignored() {
        let mut protocol = CommandProtocol::new(15, 15);
        protocol.pending.status = AckStatus::Waiting;

        assert!(!protocol.receive_ack(&MavlinkAck {
            message_name: MSG_ID_MAVLINK_ACK
        }));
        assert_eq!(protocol.pending_ack().status(), AckStatus::Waiting);
    }

    #[test]
    fn test_ack_without_pending_marks_received() {
        let mut protocol = CommandProtocol::new(15, 15);
        let ack = MavlinkAck {
            message_name: MSG_ID_START_RESCUE,
        };

        assert!(protocol.receive_ack(&ack));
        assert_eq!(protocol.pending_ack().status(), AckStatus::Received);

        // Duplicate ack changes nothing
        assert!(!protocol.receive_ack(&ack));
        assert_eq!(protocol.pending_ack().status(), AckStatus::Received);
    }

    #[test]
    fn test_late_ack_after_cancel() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);

        protocol
            .send_rescue_start(&mut links, Channel::Radio, true, 0, 7, 8)
            .unwrap();
        protocol.cancel_pending();
        assert_eq!(protocol.pending_ack().status(), AckStatus::None);

        assert!(protocol.receive_ack(&MavlinkAck {
            message_name: MSG_ID_START_RESCUE
        }));
        assert_eq!(protocol.pending_ack().status(), AckStatus::Received);
    }

    #[test]
    fn test_resend_is_byte_identical() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);

        protocol
            .send_rescue_start(&mut links, Channel::Radio, true, 1, -5, 6)
            .unwrap();
        let first = drain(&mut radio_irq);

        // Other traffic in between must not change the resent frame
        protocol.send_heartbeat(&mut links, Channel::Radio, 0).unwrap();
        drain(&mut radio_irq);

        protocol.resend(&mut links).unwrap();
        let second = drain(&mut radio_irq);

        assert_eq!(first, second);
        assert_eq!(protocol.pending_ack().status(), AckStatus::Waiting);
    }

    #[test]
    fn test_resend_after_received_rearms() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);

        protocol
            .send_rescue_start(&mut links, Channel::Radio, true, 1, 1, 1)
            .unwrap();
        assert!(protocol.receive_ack(&MavlinkAck {
            message_name: MSG_ID_START_RESCUE
        }));

        protocol.resend(&mut links).unwrap();
        assert_eq!(protocol.pending_ack().status(), AckStatus::Waiting);
    }

    #[test]
    fn test_received_rescue_with_ack_is_answered() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);
        let mut handler = Recorder::default();
        let mut events = EventCounters::default();

        let command = StartRescue {
            latitude: 369_912_345,
            longitude: -1_220_567_890,
            ack: 1,
            status: 9,
        };
        for b in frame_bytes(MavMessage::StartRescue(command)) {
            radio_irq.on_receive(b);
        }
        protocol.receive(&mut links, Channel::Radio, 512, &mut handler, &mut events);

        assert_eq!(handler.rescues, std::vec![command]);
        assert_eq!(events.acks_sent, 1);

        // The reply is an ack naming START_RESCUE
        let reply = drain(&mut radio_irq);
        let mut parser = MavlinkParser::new();
        let decoded: StdVec<_> = reply
            .iter()
            .filter_map(|&b| parser.push_byte(b).unwrap())
            .collect();
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            decoded[0].message,
            MavMessage::MavlinkAck(MavlinkAck {
                message_name: MSG_ID_START_RESCUE
            })
        );
        assert_eq!(decoded[0].header.system_id, 15);
    }

    #[test]
    fn test_received_rescue_without_ack_is_not_answered() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);
        let mut handler = Recorder::default();
        let mut events = EventCounters::default();

        for b in frame_bytes(MavMessage::StartRescue(StartRescue::default())) {
            radio_irq.on_receive(b);
        }
        protocol.receive(&mut links, Channel::Radio, 512, &mut handler, &mut events);

        assert_eq!(handler.rescues.len(), 1);
        assert!(drain(&mut radio_irq).is_empty());
    }

    #[test]
    fn test_dispatch_heartbeat_test_data_and_unknown() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);
        let mut handler = Recorder::default();
        let mut events = EventCounters::default();

        let mut bytes = frame_bytes(MavMessage::XbeeHeartbeat(XbeeHeartbeat { ack: 1, data: 7 }));
        bytes.extend(frame_bytes(MavMessage::TestData(TestData { data: 0x33 })));
        // Unknown id 0 with a one byte payload
        bytes.extend_from_slice(&[0xFE, 0x01, 0x00, 0x01, 0x01, 0x00, 0x55, 0x00, 0x00]);
        for b in bytes {
            radio_irq.on_receive(b);
        }
        protocol.receive(&mut links, Channel::Radio, 512, &mut handler, &mut events);

        assert_eq!(handler.heartbeats, std::vec![XbeeHeartbeat { ack: 1, data: 7 }]);
        assert_eq!(handler.test_data, std::vec![TestData { data: 0x33 }]);
        assert_eq!(events.heartbeats, 1);
        assert_eq!(events.unknown_commands, 1);
        assert_eq!(protocol.packet_drops(), 0);
    }

    #[test]
    fn test_corrupt_frames_count_drops() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);
        let mut handler = Recorder::default();
        let mut events = EventCounters::default();

        for _ in 0..3 {
            let mut bytes = frame_bytes(MavMessage::TestData(TestData { data: 1 }));
            let last = bytes.len() - 1;
            bytes[last] ^= 0xFF;
            for b in bytes {
                radio_irq.on_receive(b);
            }
        }
        protocol.receive(&mut links, Channel::Radio, 512, &mut handler, &mut events);

        assert_eq!(protocol.packet_drops(), 3);
        assert_eq!(events.frames_dropped, 3);
        assert!(handler.test_data.is_empty());
    }

    #[test]
    fn test_receive_respects_byte_budget() {
        setup!(links, gps_irq, radio_irq);
        let mut protocol = CommandProtocol::new(15, 15);
        let mut handler = Recorder::default();

        let bytes = frame_bytes(MavMessage::TestData(TestData { data: 1 }));
        for &b in &bytes {
            radio_irq.on_receive(b);
        }

        let consumed = protocol.receive(&mut links, Channel::Radio, 4, &mut handler, &mut crate::NullEventSink);
        assert_eq!(consumed, 4);
        assert!(handler.test_data.is_empty());

        let consumed = protocol.receive(&mut links, Channel::Radio, 512, &mut handler, &mut crate::NullEventSink);
        assert_eq!(consumed, bytes.len() - 4);
        assert_eq!(handler.test_data.len(), 1);
    }

    #[test]
    fn test_overflow_reported() {
        let mut gps_rx: ByteQueue<8> = ByteQueue::new();
        let mut gps_tx: ByteQueue<8> = ByteQueue::new();
        let mut radio_rx: ByteQueue<8> = ByteQueue::new();
        let mut radio_tx: ByteQueue<8> = ByteQueue::new();
        let (gps, _gps_irq) = split_link(&mut gps_rx, &mut gps_tx);
        let (radio, _radio_irq) = split_link(&mut radio_rx, &mut radio_tx);
        let mut links = LinkDriver::new(gps, radio);
        let mut protocol = CommandProtocol::new(15, 15);

        // 18-byte frame into a 7-byte queue
        let result = protocol.send_rescue_start(&mut links, Channel::Radio, true, 0, 0, 0);
        assert_eq!(result, Err(SendError::Overflow { dropped: 11 }));
        assert_eq!(links.stats(Channel::Radio).tx_overflows, 11);

        // Still captured for a later resend
        assert_eq!(protocol.pending_ack().status(), AckStatus::Waiting);
        assert_eq!(protocol.pending_ack().last_frame().len(), 18);
    }
}
