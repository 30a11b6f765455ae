//! One scheduler tick of the boat controller.
//!
//! [`Controller`] owns every piece of mutable protocol state (navigation
//! data, command framer, pending ack) and is the only thing that touches
//! it. The firmware calls [`Controller::tick`] periodically with the
//! application ends of the serial links; each tick:
//!
//! 1. advances the GPS parser over the GPS inbound queue
//! 2. runs the GPS connection timeout check
//! 3. dispatches commands from the radio inbound queue
//! 4. sends a heartbeat when one is due
//! 5. lets the ack supervisor resend or give up
//!
//! Nothing in a tick blocks; parsers stop after `max_bytes_per_tick`
//! bytes and pick up where they left off on the next tick.

use serial_link::{Channel, LinkDriver};
use ubx_proto::{NavigationState, ParserStats, UbxParser};

use crate::command::{report_send_error, CommandHandler, CommandProtocol, SendError};
use crate::config::Config;
use crate::events::{Event, EventSink};
use crate::retry::{AckOutcome, AckSupervisor};

/// Heartbeat data bit: GPS link is up.
pub const STATUS_GPS_CONNECTED: u8 = 1 << 0;

/// Heartbeat data bit: GPS has a fix.
pub const STATUS_GPS_FIX: u8 = 1 << 1;

/// Heartbeat data bit: a START_RESCUE is waiting for its ack.
pub const STATUS_ACK_PENDING: u8 = 1 << 2;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Parser steps taken on the GPS link.
    pub gps_steps: usize,
    /// Bytes consumed from the radio link.
    pub radio_bytes: usize,
    /// A heartbeat was queued.
    pub heartbeat_sent: bool,
    /// Ack supervisor result.
    pub ack: Option<AckOutcome>,
}

/// Scheduler tick context.
pub struct Controller<H, E> {
    config: Config,
    gps: UbxParser,
    commands: CommandProtocol,
    supervisor: AckSupervisor,
    handler: H,
    events: E,
    next_heartbeat: u64,
}

impl<H: CommandHandler, E: EventSink> Controller<H, E> {
    /// Create a controller. The first tick sends a heartbeat.
    #[must_use]
    pub fn new(config: Config, handler: H, events: E) -> Self {
        Self {
            config,
            gps: UbxParser::with_timeout(config.gps_timeout_ms),
            commands: CommandProtocol::new(config.system_id, config.component_id),
            supervisor: AckSupervisor::new(config.ack_timeout_ms, config.max_resends),
            handler,
            events,
            next_heartbeat: 0,
        }
    }

    /// Run one scheduler tick at time `now_ms`.
    pub fn tick<const N: usize>(&mut self, links: &mut LinkDriver<'_, N>, now_ms: u64) -> TickReport {
        let budget = self.config.max_bytes_per_tick;
        let events = &mut self.events;

        // Bytes drained from the queue plus one Idle -> Reading step per frame
        let gps_steps = self.gps.poll(links.inbound(Channel::Gps), now_ms, budget.saturating_mul(2), |e| {
            events.record(Event::Gps(e));
        });

        let radio_bytes = self.commands.receive(
            links,
            Channel::Radio,
            budget,
            &mut self.handler,
            &mut self.events,
        );

        let heartbeat_sent = self.heartbeat(links, now_ms);

        let ack = self
            .supervisor
            .poll(&mut self.commands, links, now_ms, &mut self.events);

        TickReport {
            gps_steps,
            radio_bytes,
            heartbeat_sent,
            ack,
        }
    }

    fn heartbeat<const N: usize>(&mut self, links: &mut LinkDriver<'_, N>, now_ms: u64) -> bool {
        let interval = self.config.heartbeat_interval_ms;
        if interval == 0 || now_ms < self.next_heartbeat {
            return false;
        }
        self.next_heartbeat = now_ms.saturating_add(interval);

        let data = self.status_byte();
        match self.commands.send_heartbeat(links, Channel::Radio, data) {
            Ok(_) => true,
            Err(e) => {
                report_send_error(&mut self.events, Channel::Radio, e);
                false
            }
        }
    }

    /// Status flags sent as heartbeat data.
    #[must_use]
    pub fn status_byte(&self) -> u8 {
        let nav = self.gps.navigation();
        let mut status = 0;
        if nav.is_connected() {
            status |= STATUS_GPS_CONNECTED;
        }
        if nav.has_fix() {
            status |= STATUS_GPS_FIX;
        }
        if self.commands.pending_ack().status() == crate::AckStatus::Waiting {
            status |= STATUS_ACK_PENDING;
        }
        status
    }

    /// Send START_RESCUE on the radio link.
    ///
    /// # Errors
    ///
    /// See [`SendError`]. With `ack_requested`, the command is tracked and
    /// resent even when the first send overflowed.
    pub fn request_rescue_start<const N: usize>(
        &mut self,
        links: &mut LinkDriver<'_, N>,
        ack_requested: bool,
        status: u8,
        latitude: i32,
        longitude: i32,
    ) -> Result<usize, SendError> {
        let result = self.commands.send_rescue_start(
            links,
            Channel::Radio,
            ack_requested,
            status,
            latitude,
            longitude,
        );
        if let Err(e) = result {
            report_send_error(&mut self.events, Channel::Radio, e);
        }
        result
    }

    /// Latest navigation data.
    #[inline]
    #[must_use]
    pub fn navigation(&self) -> &NavigationState {
        self.gps.navigation()
    }

    /// Navigation data, for error-correction settings.
    #[inline]
    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        self.gps.navigation_mut()
    }

    /// GPS parser totals.
    #[inline]
    #[must_use]
    pub fn gps_stats(&self) -> ParserStats {
        self.gps.stats()
    }

    /// Command protocol state.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &CommandProtocol {
        &self.commands
    }

    /// Command protocol, for direct sends and resends.
    #[inline]
    pub fn commands_mut(&mut self) -> &mut CommandProtocol {
        &mut self.commands
    }

    /// Command handler.
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Event sink.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Configuration in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
