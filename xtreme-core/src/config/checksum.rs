//! Record checksum
//!
//! CRC-16/CCITT-FALSE (polynomial 0x1021, initial value 0xFFFF, no
//! reflection), stored big-endian after the data it covers.

use crc::{Crc, CRC_16_IBM_3740};

/// CRC-16/CCITT-FALSE calculator with lookup table.
const CCITT: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Calculate the CRC-16/CCITT-FALSE of a byte slice.
#[inline]
#[must_use]
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    CCITT.checksum(data)
}
