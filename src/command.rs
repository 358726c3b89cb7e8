//! Opcodes and command framing.
use crate::config::AddressMask;
use crate::identification::Density;

pub(crate) enum Opcode {
    /// Write the 8-bit status register. Not issued by the driver.
    #[allow(dead_code)]
    WriteStatus = 0x01,
    Write = 0x02,
    Read = 0x03,
    /// Read the 8-bit status register.
    ReadStatus = 0x05,
    /// Set the write enable latch.
    WriteEnable = 0x06,
    /// Read the 32-bit device ID.
    ReadId = 0x9F,
}

/// Number of address bytes following the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    Three = 3,
    Four = 4,
}

impl AddressWidth {
    /// Parts up to 512 Kbit take three address bytes, larger ones four.
    ///
    /// Works on the raw density code so an undetected part still gets a width.
    pub fn for_density_code(code: u8) -> Self {
        if code > Density::Kb512 as u8 {
            AddressWidth::Four
        } else {
            AddressWidth::Three
        }
    }

    pub fn bytes(self) -> usize {
        self as usize
    }
}

/// An opcode followed by a big-endian address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Command {
    buf: [u8; 5],
    len: usize,
}

impl Command {
    pub fn new(opcode: Opcode, addr: u32, width: AddressWidth, mask: AddressMask) -> Self {
        let addr = match mask {
            AddressMask::Full => addr,
            // Legacy framing masked with 0xFF before shifting, so only the low byte survives.
            AddressMask::LowByte => addr & 0xFF,
        };
        let be = addr.to_be_bytes();
        let width = width.bytes();

        let mut buf = [0u8; 5];
        buf[0] = opcode as u8;
        buf[1..=width].copy_from_slice(&be[4 - width..]);
        Self {
            buf,
            len: 1 + width,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Fill pattern streamed by clear operations, one chunk at a time.
pub(crate) const ZEROES: [u8; 32] = [0; 32];

/// True when `len` bytes starting at `addr` fit inside a part of `size` bytes.
///
/// Rejects `addr > size` and any `addr + len` that would overflow.
pub fn in_bounds(size: u32, addr: u32, len: u32) -> bool {
    addr.checked_add(len).is_some_and(|end| end <= size)
}
