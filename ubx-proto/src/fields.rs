//! Payload layouts of the UBX navigation messages we decode.
//!
//! Each supported `(class, id)` pair has a table of fields keyed by payload
//! offset. The parser walks the payload one field at a time: it looks up
//! the field at the current offset, stores it into [`NavigationState`] if
//! it is one we care about, and advances by the field's width.
//!
//! Layouts follow the u-blox 6 receiver description (NAV-POSLLH,
//! NAV-STATUS, NAV-VELNED).

use crate::navigation::NavigationState;
use crate::{CLASS_NAV, NAV_POSLLH, NAV_STATUS, NAV_VELNED};

/// What to do with the bytes of one payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Known field we do not use.
    Skip,
    /// Longitude, i32 degrees * 1e7.
    Longitude,
    /// Latitude, i32 degrees * 1e7.
    Latitude,
    /// Height above mean sea level, i32 millimeters.
    Altitude,
    /// GPS fix type, u8.
    FixStatus,
    /// North velocity, i32 cm/s.
    VelocityNorth,
    /// East velocity, i32 cm/s.
    VelocityEast,
    /// Heading of motion, i32 degrees * 1e5.
    Heading,
}

impl Field {
    /// Decode `bytes` (exactly the field's width) into `nav`.
    pub fn apply(self, bytes: &[u8], nav: &mut NavigationState) {
        match self {
            Field::Skip => {}
            Field::Longitude => nav.set_longitude(read_i32(bytes)),
            Field::Latitude => nav.set_latitude(read_i32(bytes)),
            Field::Altitude => nav.set_altitude(read_i32(bytes)),
            Field::FixStatus => nav.set_fix_status(bytes[0]),
            Field::VelocityNorth => nav.set_velocity_north(read_i32(bytes)),
            Field::VelocityEast => nav.set_velocity_east(read_i32(bytes)),
            Field::Heading => nav.set_heading(read_i32(bytes)),
        }
    }
}

/// One entry of a payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Byte offset from the start of the payload.
    pub offset: usize,
    /// Width in bytes.
    pub width: usize,
    /// How the bytes are interpreted.
    pub field: Field,
}

const fn field(offset: usize, width: usize, field: Field) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        field,
    }
}

const fn skip(offset: usize, width: usize) -> FieldSpec {
    field(offset, width, Field::Skip)
}

/// Payload layout of one message type.
#[derive(Debug)]
pub struct MessageLayout {
    /// Message class.
    pub class: u8,
    /// Message id within the class.
    pub id: u8,
    /// Fields ordered by offset.
    pub fields: &'static [FieldSpec],
}

impl MessageLayout {
    /// Field starting exactly at `offset`, if any.
    #[must_use]
    pub fn field_at(&self, offset: usize) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.offset == offset)
    }
}

/// NAV-POSLLH: geodetic position.
pub const NAV_POSLLH_FIELDS: &[FieldSpec] = &[
    skip(0, 4), // iTOW
    field(4, 4, Field::Longitude),
    field(8, 4, Field::Latitude),
    skip(12, 4), // height above ellipsoid
    field(16, 4, Field::Altitude),
    skip(20, 4), // hAcc
    skip(24, 4), // vAcc
];

/// NAV-STATUS: receiver navigation status.
pub const NAV_STATUS_FIELDS: &[FieldSpec] = &[
    skip(0, 4), // iTOW
    field(4, 1, Field::FixStatus),
    skip(5, 1),  // flags
    skip(6, 1),  // fixStat
    skip(7, 1),  // flags2
    skip(8, 4),  // ttff
    skip(12, 4), // msss
];

/// NAV-VELNED: velocity in the north/east/down frame.
pub const NAV_VELNED_FIELDS: &[FieldSpec] = &[
    skip(0, 4), // iTOW
    field(4, 4, Field::VelocityNorth),
    field(8, 4, Field::VelocityEast),
    skip(12, 4), // velD
    skip(16, 4), // speed
    skip(20, 4), // gSpeed
    field(24, 4, Field::Heading),
    skip(28, 4), // sAcc
    skip(32, 4), // cAcc
];

/// Every message the parser decodes.
pub static LAYOUTS: [MessageLayout; 3] = [
    MessageLayout {
        class: CLASS_NAV,
        id: NAV_POSLLH,
        fields: NAV_POSLLH_FIELDS,
    },
    MessageLayout {
        class: CLASS_NAV,
        id: NAV_STATUS,
        fields: NAV_STATUS_FIELDS,
    },
    MessageLayout {
        class: CLASS_NAV,
        id: NAV_VELNED,
        fields: NAV_VELNED_FIELDS,
    },
];

/// Look up the layout for a `(class, id)` pair.
#[must_use]
pub fn layout_for(class: u8, id: u8) -> Option<&'static MessageLayout> {
    LAYOUTS.iter().find(|l| l.class == class && l.id == id)
}

#[inline]
fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
