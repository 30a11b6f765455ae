//! Firmware-side command handler and event log.

use boat_core::{AckOutcome, CommandHandler, Event, EventSink, StartRescue, TestData, XbeeHeartbeat};
use defmt::{debug, info, warn};
use ubx_proto::UbxEvent;

/// Keeps the latest rescue target received over the radio.
#[derive(Default)]
pub struct RescueMission {
    target: Option<StartRescue>,
    base_alive: u32,
}

impl RescueMission {
    /// Create a mission with no target.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: None,
            base_alive: 0,
        }
    }

    /// Latest rescue target, if any.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&StartRescue> {
        self.target.as_ref()
    }

    /// Heartbeats seen from the base station.
    #[inline]
    #[must_use]
    pub fn base_heartbeats(&self) -> u32 {
        self.base_alive
    }
}

impl CommandHandler for RescueMission {
    fn on_start_rescue(&mut self, command: &StartRescue) {
        info!(
            "rescue target lat={=i32} lon={=i32} status={=u8}",
            command.latitude, command.longitude, command.status
        );
        self.target = Some(*command);
    }

    fn on_heartbeat(&mut self, heartbeat: &XbeeHeartbeat) {
        self.base_alive = self.base_alive.wrapping_add(1);
        debug!("base heartbeat data={=u8}", heartbeat.data);
    }

    fn on_test_data(&mut self, data: &TestData) {
        info!("test data {=u8}", data.data);
    }
}

/// Event sink that writes everything to the defmt log.
pub struct LogEvents;

impl EventSink for LogEvents {
    fn record(&mut self, event: Event) {
        match event {
            Event::Gps(UbxEvent::Connected) => info!("GPS connected"),
            Event::Gps(UbxEvent::Disconnected) => warn!("GPS lost"),
            Event::Gps(UbxEvent::Oversized { payload_len }) => {
                warn!("GPS frame too large ({=u16} byte payload)", payload_len);
            }
            Event::Gps(e) => debug!("GPS {}", e),
            Event::FrameDropped(e) => warn!("radio frame dropped: {}", e),
            Event::TxOverflow { channel, dropped } => {
                warn!("{} outbound queue full, {=usize} bytes lost", channel, dropped);
            }
            Event::Ack(AckOutcome::GaveUp) => warn!("START_RESCUE never acknowledged"),
            e => debug!("{}", e),
        }
    }
}
