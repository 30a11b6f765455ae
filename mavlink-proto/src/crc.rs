//! MAVLink frame checksum.
//!
//! MAVLink uses CRC-16/MCRF4XX (the X.25 variant with no final XOR) over
//! everything after the start byte, followed by one message-specific
//! `CRC_EXTRA` byte that is never sent on the wire.

use crc::{Crc, CRC_16_MCRF4XX};

/// CRC-16/MCRF4XX calculator with lookup table.
const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_MCRF4XX);

/// Checksum of `data` (header without STX, then payload) seeded with the
/// message's `crc_extra`.
#[inline]
#[must_use]
pub fn frame_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut digest = X25.digest();
    digest.update(data);
    digest.update(&[crc_extra]);
    digest.finalize()
}
