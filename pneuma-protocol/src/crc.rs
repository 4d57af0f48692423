//! CRC32-C compute primitive.
//!
//! The datagram layer only needs `compute(bytes) -> u32`; the trait lets
//! the composition root inject either the software implementation below or
//! a wrapper around the MCU's CRC peripheral.

use crc::{Crc, CRC_32_ISCSI};

/// A CRC32-C (Castagnoli) compute primitive: polynomial `0x1EDC6F41`,
/// init `0xFFFFFFFF`, reflected input/output, xor-out `0xFFFFFFFF`.
pub trait Crc32 {
    /// Compute the checksum of `data` in one shot.
    ///
    /// Takes `&self`: implementations wrapping a shared hardware unit must
    /// guard access internally (the receive and send paths each hold one).
    fn compute(&self, data: &[u8]) -> u32;
}

const CRC32C: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Software CRC32-C, for hosts and MCUs without a CRC peripheral.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftCrc32c;

impl SoftCrc32c {
    pub fn new() -> Self {
        Self
    }
}

impl Crc32 for SoftCrc32c {
    fn compute(&self, data: &[u8]) -> u32 {
        CRC32C.checksum(data)
    }
}
