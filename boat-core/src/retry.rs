//! Ack timeout and resend policy for START_RESCUE.
//!
//! [`CommandProtocol`] only knows how to resend; [`AckSupervisor`] decides
//! when. It watches the pending ack once per tick, resends after
//! `ack_timeout_ms` without an answer, and gives up after `max_resends`
//! attempts. A new START_RESCUE with an ack request (new generation), or a
//! manual resend after the command was delivered, restarts the count.

use serial_link::LinkDriver;

use crate::command::{report_send_error, AckStatus, CommandProtocol};
use crate::events::{Event, EventSink};

#[cfg(feature = "defmt")]
use defmt::{info, warn};

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// What the supervisor did on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckOutcome {
    /// The pending command was acknowledged.
    Delivered,
    /// The pending command was sent again.
    Resent {
        /// Resend count for this command, starting at 1.
        attempt: u8,
    },
    /// No ack after the last resend; the command was dropped.
    GaveUp,
}

#[derive(Clone, Copy)]
struct Attempt {
    generation: u32,
    deadline: u64,
    resends: u8,
    /// Pending status left behind once an outcome was reported.
    settled: Option<AckStatus>,
}

/// Drives [`CommandProtocol::resend`] from a timer.
pub struct AckSupervisor {
    timeout_ms: u64,
    max_resends: u8,
    attempt: Option<Attempt>,
}

impl AckSupervisor {
    /// Create a supervisor.
    #[must_use]
    pub const fn new(timeout_ms: u64, max_resends: u8) -> Self {
        Self {
            timeout_ms,
            max_resends,
            attempt: None,
        }
    }

    /// Resends made for the command currently tracked.
    #[must_use]
    pub fn resends(&self) -> u8 {
        self.attempt.map_or(0, |a| a.resends)
    }

    /// Check the pending ack and resend or give up if it is overdue.
    ///
    /// Each outcome is reported once per command.
    pub fn poll<const N: usize, E: EventSink + ?Sized>(
        &mut self,
        protocol: &mut CommandProtocol,
        links: &mut LinkDriver<'_, N>,
        now_ms: u64,
        events: &mut E,
    ) -> Option<AckOutcome> {
        let pending = protocol.pending_ack();
        let status = pending.status();
        let generation = pending.generation();
        let destination = pending.destination();

        if status == AckStatus::None {
            self.attempt = None;
            return None;
        }

        // A resend after delivery, or a late ack after giving up, starts a
        // fresh attempt
        let stale = |a: Attempt| {
            a.generation != generation || a.settled.is_some_and(|s| s != status)
        };
        if self.attempt.map_or(true, stale) {
            self.attempt = Some(Attempt {
                generation,
                deadline: now_ms.saturating_add(self.timeout_ms),
                resends: 0,
                settled: None,
            });
        }

        let Some(attempt) = self.attempt.as_mut() else {
            return None;
        };
        if attempt.settled.is_some() {
            return None;
        }

        let outcome = match status {
            AckStatus::Received => {
                attempt.settled = Some(AckStatus::Received);
                info!("START_RESCUE delivered after {=u8} resends", attempt.resends);
                AckOutcome::Delivered
            }
            AckStatus::Waiting if now_ms < attempt.deadline => return None,
            AckStatus::Waiting if attempt.resends >= self.max_resends => {
                attempt.settled = Some(AckStatus::None);
                warn!("START_RESCUE not acknowledged, giving up");
                protocol.cancel_pending();
                AckOutcome::GaveUp
            }
            AckStatus::Waiting => {
                attempt.resends += 1;
                attempt.deadline = now_ms.saturating_add(self.timeout_ms);
                if let Err(e) = protocol.resend(links) {
                    report_send_error(events, destination, e);
                }
                AckOutcome::Resent {
                    attempt: attempt.resends,
                }
            }
            AckStatus::None => return None,
        };

        events.record(Event::Ack(outcome));
        Some(outcome)
    }
}
