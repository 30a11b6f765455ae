//! Queue, GPS parser and command protocol driven together through the
//! scheduler tick, the way the firmware runs them.

use boat_core::{
    split_link, AckOutcome, AckStatus, ByteQueue, Channel, CommandHandler, Config, Controller,
    EventCounters, LinkDriver, StartRescue,
};
use mavlink_proto::{
    encode, FrameHeader, MavMessage, MavlinkAck, MavlinkParser, XbeeHeartbeat, MSG_ID_START_RESCUE,
};
use serial_link::{IrqPort, QUEUE_SIZE};
use ubx_proto::{build_frame, CLASS_NAV, NAV_POSLLH, NAV_STATUS};

type Irq = IrqPort<'static, QUEUE_SIZE>;

#[derive(Default)]
struct Mission {
    rescues: Vec<StartRescue>,
}

impl CommandHandler for Mission {
    fn on_start_rescue(&mut self, command: &StartRescue) {
        self.rescues.push(*command);
    }
}

fn queue() -> &'static mut ByteQueue<QUEUE_SIZE> {
    Box::leak(Box::new(ByteQueue::new()))
}

fn bench() -> (LinkDriver<'static, QUEUE_SIZE>, Irq, Irq) {
    let (gps, gps_irq) = split_link(queue(), queue());
    let (radio, radio_irq) = split_link(queue(), queue());
    (LinkDriver::new(gps, radio), gps_irq, radio_irq)
}

fn controller(config: Config) -> Controller<Mission, EventCounters> {
    Controller::new(config, Mission::default(), EventCounters::default())
}

fn quiet() -> Config {
    Config {
        heartbeat_interval_ms: 0,
        ..Config::default()
    }
}

fn receive(irq: &mut Irq, bytes: &[u8]) {
    for &b in bytes {
        assert!(irq.on_receive(b));
    }
}

fn transmitted(irq: &mut Irq) -> Vec<u8> {
    std::iter::from_fn(|| irq.next_to_transmit()).collect()
}

fn decode_all(bytes: &[u8]) -> Vec<MavMessage> {
    let mut parser = MavlinkParser::new();
    bytes
        .iter()
        .filter_map(|&b| parser.push_byte(b).ok().flatten())
        .map(|frame| frame.message)
        .collect()
}

fn base_station(message: MavMessage) -> Vec<u8> {
    let header = FrameHeader {
        sequence: 0,
        system_id: 255,
        component_id: 0,
    };
    let mut buf = [0u8; 64];
    let len = encode(header, &message, &mut buf).unwrap();
    buf[..len].to_vec()
}

fn posllh(lon: i32, lat: i32, alt: i32) -> Vec<u8> {
    let mut payload = [0u8; 28];
    payload[4..8].copy_from_slice(&lon.to_le_bytes());
    payload[8..12].copy_from_slice(&lat.to_le_bytes());
    payload[16..20].copy_from_slice(&alt.to_le_bytes());
    let mut buf = [0u8; 64];
    let len = build_frame(CLASS_NAV, NAV_POSLLH, &payload, &mut buf).unwrap();
    buf[..len].to_vec()
}

#[test]
fn test_gps_position_reaches_navigation() {
    let (mut links, mut gps_irq, _radio_irq) = bench();
    let mut boat = controller(quiet());

    receive(&mut gps_irq, &posllh(1_234_567, 7_654_321, 1_000));
    boat.tick(&mut links, 0);

    let nav = boat.navigation();
    assert_eq!(nav.raw_latitude(), 7_654_321);
    assert_eq!(nav.raw_longitude(), 1_234_567);
    assert_eq!(nav.raw_altitude(), 1_000);
    assert!(nav.has_position());
    assert!(nav.is_connected());
    assert_eq!(boat.gps_stats().frames_parsed, 1);
    assert_eq!(boat.events().gps_connects, 1);
}

#[test]
fn test_gps_frames_spread_over_ticks() {
    let (mut links, mut gps_irq, _radio_irq) = bench();
    let mut boat = controller(Config {
        max_bytes_per_tick: 8,
        ..quiet()
    });

    let mut stream = posllh(10, 20, 30);
    let mut status = [0u8; 64];
    let mut payload = [0u8; 16];
    payload[4] = 0x03;
    let len = build_frame(CLASS_NAV, NAV_STATUS, &payload, &mut status).unwrap();
    stream.extend_from_slice(&status[..len]);
    receive(&mut gps_irq, &stream);

    let first = boat.tick(&mut links, 0);
    assert!(first.gps_steps <= 16);
    assert!(!boat.navigation().has_position());

    for t in 1..20 {
        boat.tick(&mut links, t);
    }
    assert!(boat.navigation().has_position());
    assert!(boat.navigation().has_fix());
    assert_eq!(boat.navigation().raw_latitude(), 20);
}

#[test]
fn test_gps_disconnects_after_timeout() {
    let (mut links, mut gps_irq, _radio_irq) = bench();
    let mut boat = controller(quiet());

    receive(&mut gps_irq, &posllh(1, 2, 3));
    boat.tick(&mut links, 1_000);
    boat.tick(&mut links, 5_999);
    assert!(boat.navigation().is_connected());

    boat.tick(&mut links, 6_000);
    assert!(!boat.navigation().is_connected());
    assert_eq!(boat.events().gps_disconnects, 1);

    // Position survives the disconnect
    assert!(boat.navigation().has_position());
}

#[test]
fn test_garbage_on_gps_is_absorbed() {
    let (mut links, mut gps_irq, _radio_irq) = bench();
    let mut boat = controller(quiet());

    receive(&mut gps_irq, &[0x00, 0x11, 0xB5, 0x00, 0x22]);
    receive(&mut gps_irq, &posllh(4, 5, 6));
    boat.tick(&mut links, 0);

    assert_eq!(boat.gps_stats().sync_errors, 4);
    assert_eq!(boat.navigation().raw_altitude(), 6);
}

#[test]
fn test_gps_flood_counts_overflow() {
    let (mut links, mut gps_irq, _radio_irq) = bench();

    for _ in 0..QUEUE_SIZE + 9 {
        gps_irq.on_receive(0x00);
    }

    let stats = links.stats(Channel::Gps);
    assert_eq!(stats.rx_pending, QUEUE_SIZE - 1);
    assert_eq!(stats.rx_overflows, 10);
}

#[test]
fn test_rescue_start_ack_round_trip() {
    let (mut links, _gps_irq, mut radio_irq) = bench();
    let mut boat = controller(quiet());

    boat.request_rescue_start(&mut links, true, 1, 369_912_345, -1_220_567_890)
        .unwrap();
    let sent = transmitted(&mut radio_irq);

    let pending = boat.commands().pending_ack();
    assert_eq!(pending.status(), AckStatus::Waiting);
    assert_eq!(pending.last_frame(), &sent[..]);
    assert_eq!(
        decode_all(&sent),
        vec![MavMessage::StartRescue(StartRescue {
            latitude: 369_912_345,
            longitude: -1_220_567_890,
            ack: 1,
            status: 1,
        })]
    );

    receive(
        &mut radio_irq,
        &base_station(MavMessage::MavlinkAck(MavlinkAck {
            message_name: MSG_ID_START_RESCUE,
        })),
    );
    let report = boat.tick(&mut links, 10);

    assert_eq!(boat.commands().pending_ack().status(), AckStatus::Received);
    assert_eq!(report.ack, Some(AckOutcome::Delivered));
    assert_eq!(boat.events().acks_received, 1);
}

#[test]
fn test_unacked_rescue_is_resent_verbatim() {
    let (mut links, _gps_irq, mut radio_irq) = bench();
    let config = Config {
        ack_timeout_ms: 200,
        max_resends: 2,
        ..quiet()
    };
    let mut boat = controller(config);

    boat.request_rescue_start(&mut links, true, 0, 1, 2).unwrap();
    let original = transmitted(&mut radio_irq);

    assert_eq!(boat.tick(&mut links, 0).ack, None);
    assert_eq!(boat.tick(&mut links, 199).ack, None);
    assert!(transmitted(&mut radio_irq).is_empty());

    assert_eq!(
        boat.tick(&mut links, 200).ack,
        Some(AckOutcome::Resent { attempt: 1 })
    );
    assert_eq!(transmitted(&mut radio_irq), original);
    assert_eq!(boat.commands().pending_ack().status(), AckStatus::Waiting);

    assert_eq!(
        boat.tick(&mut links, 400).ack,
        Some(AckOutcome::Resent { attempt: 2 })
    );
    assert_eq!(transmitted(&mut radio_irq), original);

    assert_eq!(boat.tick(&mut links, 600).ack, Some(AckOutcome::GaveUp));
    assert!(transmitted(&mut radio_irq).is_empty());
    assert_eq!(boat.commands().pending_ack().status(), AckStatus::None);
}

#[test]
fn test_manual_resend_before_ack() {
    let (mut links, _gps_irq, mut radio_irq) = bench();
    let mut boat = controller(quiet());

    boat.request_rescue_start(&mut links, true, 0, 11, 22).unwrap();
    let original = transmitted(&mut radio_irq);

    boat.commands_mut().resend(&mut links).unwrap();
    assert_eq!(transmitted(&mut radio_irq), original);
    assert_eq!(boat.commands().pending_ack().status(), AckStatus::Waiting);
}

#[test]
fn test_incoming_rescue_is_acked_and_routed() {
    let (mut links, _gps_irq, mut radio_irq) = bench();
    let mut boat = controller(quiet());

    let command = StartRescue {
        latitude: -337_512_345,
        longitude: 1_512_098_765,
        ack: 1,
        status: 0,
    };
    receive(&mut radio_irq, &base_station(MavMessage::StartRescue(command)));
    boat.tick(&mut links, 0);

    assert_eq!(boat.handler().rescues, vec![command]);
    assert_eq!(
        decode_all(&transmitted(&mut radio_irq)),
        vec![MavMessage::MavlinkAck(MavlinkAck {
            message_name: MSG_ID_START_RESCUE
        })]
    );
}

#[test]
fn test_heartbeat_every_interval() {
    let (mut links, mut gps_irq, mut radio_irq) = bench();
    let mut boat = controller(Config::default());

    assert!(boat.tick(&mut links, 0).heartbeat_sent);
    assert!(!boat.tick(&mut links, 500).heartbeat_sent);

    receive(&mut gps_irq, &posllh(1, 2, 3));
    assert!(boat.tick(&mut links, 1_000).heartbeat_sent);

    let heartbeats: Vec<_> = decode_all(&transmitted(&mut radio_irq))
        .into_iter()
        .filter_map(|m| match m {
            MavMessage::XbeeHeartbeat(hb) => Some(hb),
            _ => None,
        })
        .collect();

    assert_eq!(
        heartbeats,
        vec![
            XbeeHeartbeat { ack: 1, data: 0 },
            XbeeHeartbeat {
                ack: 1,
                data: boat_core::controller::STATUS_GPS_CONNECTED,
            },
        ]
    );
}

#[test]
fn test_corrupt_radio_frames_counted() {
    let (mut links, _gps_irq, mut radio_irq) = bench();
    let mut boat = controller(quiet());

    let mut bad = base_station(MavMessage::XbeeHeartbeat(XbeeHeartbeat { ack: 0, data: 1 }));
    let last = bad.len() - 1;
    bad[last] = bad[last].wrapping_add(1);
    receive(&mut radio_irq, &bad);
    receive(
        &mut radio_irq,
        &base_station(MavMessage::XbeeHeartbeat(XbeeHeartbeat { ack: 0, data: 2 })),
    );
    boat.tick(&mut links, 0);

    assert_eq!(boat.commands().packet_drops(), 1);
    assert_eq!(boat.events().frames_dropped, 1);
    assert_eq!(boat.events().heartbeats, 1);
}

#[test]
fn test_unbounded_tick_budget() {
    let (mut links, mut gps_irq, mut radio_irq) = bench();
    let mut boat = controller(Config {
        max_bytes_per_tick: usize::MAX,
        ..quiet()
    });

    receive(&mut gps_irq, &posllh(7, 8, 9));
    receive(
        &mut radio_irq,
        &base_station(MavMessage::XbeeHeartbeat(XbeeHeartbeat { ack: 0, data: 3 })),
    );
    boat.tick(&mut links, 0);

    assert_eq!(boat.navigation().raw_altitude(), 9);
    assert_eq!(boat.events().heartbeats, 1);
}
