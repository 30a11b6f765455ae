//! Navigation solution decoded from the GPS receiver.
//!
//! Values are stored exactly as they arrive on the wire (fixed-point
//! integers); conversion to floating-point units only happens in the read
//! accessors.

use crate::NO_FIX;

/// Degrees per coordinate unit (coordinates are scaled by 1e7).
const COORDINATE_SCALE: f32 = 10_000_000.0;

/// Degrees per heading unit (heading is scaled by 1e5).
const HEADING_SCALE: f32 = 100_000.0;

/// Latest navigation data seen from the GPS.
///
/// Only the UBX parser writes the decoded fields; everyone else gets a
/// shared reference (or a copy) and treats it as a snapshot. The
/// error-correction settings are the one part mission logic may change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavigationState {
    latitude: i32,
    longitude: i32,
    altitude: i32,
    velocity_north: i32,
    velocity_east: i32,
    heading: i32,
    fix_status: u8,
    connected: bool,
    has_position: bool,
    correction: ErrorCorrection,
}

/// Coordinate error offsets subtracted from the raw position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorCorrection {
    /// Apply the offsets when reading the position.
    pub enabled: bool,
    /// Latitude error, degrees * 1e7.
    pub latitude: i32,
    /// Longitude error, degrees * 1e7.
    pub longitude: i32,
}

impl NavigationState {
    /// Empty state: no position, no fix, not connected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latitude: 0,
            longitude: 0,
            altitude: 0,
            velocity_north: 0,
            velocity_east: 0,
            heading: 0,
            fix_status: NO_FIX,
            connected: false,
            has_position: false,
            correction: ErrorCorrection {
                enabled: false,
                latitude: 0,
                longitude: 0,
            },
        }
    }

    // --- Raw (wire-scaled) accessors ---

    /// Latitude in degrees * 1e7 exactly as the receiver reported it.
    #[inline]
    #[must_use]
    pub const fn raw_latitude(&self) -> i32 {
        self.latitude
    }

    /// Longitude in degrees * 1e7 exactly as the receiver reported it.
    #[inline]
    #[must_use]
    pub const fn raw_longitude(&self) -> i32 {
        self.longitude
    }

    /// Latitude in degrees * 1e7, with error correction applied if enabled.
    #[must_use]
    pub fn latitude_e7(&self) -> i32 {
        if self.correction.enabled {
            self.latitude.wrapping_sub(self.correction.latitude)
        } else {
            self.latitude
        }
    }

    /// Longitude in degrees * 1e7, with error correction applied if enabled.
    #[must_use]
    pub fn longitude_e7(&self) -> i32 {
        if self.correction.enabled {
            self.longitude.wrapping_sub(self.correction.longitude)
        } else {
            self.longitude
        }
    }

    /// Height above mean sea level in millimeters.
    #[inline]
    #[must_use]
    pub const fn raw_altitude(&self) -> i32 {
        self.altitude
    }

    /// Northward velocity in centimeters per second.
    #[inline]
    #[must_use]
    pub const fn velocity_north(&self) -> i32 {
        self.velocity_north
    }

    /// Eastward velocity in centimeters per second.
    #[inline]
    #[must_use]
    pub const fn velocity_east(&self) -> i32 {
        self.velocity_east
    }

    /// Heading of motion in degrees * 1e5.
    #[inline]
    #[must_use]
    pub const fn heading(&self) -> i32 {
        self.heading
    }

    /// GPS fix type as reported by NAV-STATUS (0 = no fix).
    #[inline]
    #[must_use]
    pub const fn fix_status(&self) -> u8 {
        self.fix_status
    }

    // --- Converted accessors ---

    /// Latitude in decimal degrees, corrected if enabled.
    #[must_use]
    pub fn latitude(&self) -> f32 {
        self.latitude_e7() as f32 / COORDINATE_SCALE
    }

    /// Longitude in decimal degrees, corrected if enabled.
    #[must_use]
    pub fn longitude(&self) -> f32 {
        self.longitude_e7() as f32 / COORDINATE_SCALE
    }

    /// Altitude in meters.
    #[must_use]
    pub fn altitude(&self) -> f32 {
        self.altitude as f32 / 1000.0
    }

    /// Northward velocity in meters per second.
    #[must_use]
    pub fn velocity_north_mps(&self) -> f32 {
        self.velocity_north as f32 / 100.0
    }

    /// Eastward velocity in meters per second.
    #[must_use]
    pub fn velocity_east_mps(&self) -> f32 {
        self.velocity_east as f32 / 100.0
    }

    /// Heading of motion in degrees.
    #[must_use]
    pub fn heading_degrees(&self) -> f32 {
        self.heading as f32 / HEADING_SCALE
    }

    // --- Status ---

    /// Check if the receiver reports a position fix.
    #[inline]
    #[must_use]
    pub const fn has_fix(&self) -> bool {
        self.fix_status != NO_FIX
    }

    /// Check if a position frame has ever been decoded.
    #[inline]
    #[must_use]
    pub const fn has_position(&self) -> bool {
        self.has_position
    }

    /// Check if GPS frames were seen within the connection timeout.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    // --- Error correction ---

    /// Current error-correction settings.
    #[inline]
    #[must_use]
    pub const fn correction(&self) -> ErrorCorrection {
        self.correction
    }

    /// Set the latitude error (degrees * 1e7).
    pub fn set_latitude_error(&mut self, error: i32) {
        self.correction.latitude = error;
    }

    /// Set the longitude error (degrees * 1e7).
    pub fn set_longitude_error(&mut self, error: i32) {
        self.correction.longitude = error;
    }

    /// Start subtracting the error offsets from the reported position.
    pub fn enable_error_correction(&mut self) {
        self.correction.enabled = true;
    }

    /// Report the raw position again.
    pub fn disable_error_correction(&mut self) {
        self.correction.enabled = false;
    }

    // --- Parser-only writers ---

    pub(crate) fn set_longitude(&mut self, value: i32) {
        self.longitude = value;
    }

    pub(crate) fn set_latitude(&mut self, value: i32) {
        self.latitude = value;
    }

    pub(crate) fn set_altitude(&mut self, value: i32) {
        self.altitude = value;
        self.has_position = true;
    }

    pub(crate) fn set_fix_status(&mut self, value: u8) {
        self.fix_status = value;
    }

    pub(crate) fn set_velocity_north(&mut self, value: i32) {
        self.velocity_north = value;
    }

    pub(crate) fn set_velocity_east(&mut self, value: i32) {
        self.velocity_east = value;
    }

    pub(crate) fn set_heading(&mut self, value: i32) {
        self.heading = value;
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}
