//! Runtime configuration for the boat controller.

use mavlink_proto::{COMPONENT_ID, SYSTEM_ID};
use ubx_proto::CONNECTION_TIMEOUT_MS;

/// Time between radio heartbeats.
pub const HEARTBEAT_INTERVAL_MS: u64 = 1_000;

/// Time to wait for an ack before resending START_RESCUE.
pub const ACK_TIMEOUT_MS: u64 = 1_000;

/// Resend attempts before giving up on an ack.
pub const MAX_RESENDS: u8 = 5;

/// Bytes each parser may consume per scheduler tick.
pub const MAX_BYTES_PER_TICK: usize = 512;

/// Controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// MAVLink system id we send as.
    pub system_id: u8,
    /// MAVLink component id we send as.
    pub component_id: u8,
    /// GPS counts as disconnected this long after the last sync.
    pub gps_timeout_ms: u64,
    /// Upper bound on bytes drained per link and tick.
    pub max_bytes_per_tick: usize,
    /// Heartbeat period on the radio link; 0 disables heartbeats.
    pub heartbeat_interval_ms: u64,
    /// Ack wait before a resend.
    pub ack_timeout_ms: u64,
    /// Resends before an ack is given up.
    pub max_resends: u8,
}

impl Config {
    /// Default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            system_id: SYSTEM_ID,
            component_id: COMPONENT_ID,
            gps_timeout_ms: CONNECTION_TIMEOUT_MS,
            max_bytes_per_tick: MAX_BYTES_PER_TICK,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            ack_timeout_ms: ACK_TIMEOUT_MS,
            max_resends: MAX_RESENDS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
