//! Decoding of the 32-bit device ID returned by the Read ID (9Fh) command.
//!
//! Byte layout as clocked out by the chip (first byte received is the least
//! significant byte of the register):
//!
//! | bits   | field                      |
//! |--------|----------------------------|
//! | 0..8   | manufacturer ID            |
//! | 8..16  | continuation code          |
//! | 16..21 | density code               |
//! | 21..24 | product ID, proprietary    |
//! | 24..32 | product ID                 |

use crate::command::AddressWidth;

/// The only manufacturer accepted by [`crate::Fram::init`] (Fujitsu, now RAMXEED).
pub const MANUFACTURER_ID_FUJITSU: u8 = 0x04;

/// Capacity codes found in the density field of the ID register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Density {
    Kb16 = 0b00001,
    Kb64 = 0b00011,
    Kb128 = 0b00100,
    Kb256 = 0b00101,
    Kb512 = 0b00110,
    Mb1 = 0b00111,
    Mb2 = 0b01000,
    Mb4 = 0b01001,
    Mb8 = 0b01010,
}

/// Density code to capacity in bytes. Every size used by the driver comes from here.
pub const DENSITY_TABLE: [(Density, u32); 9] = [
    (Density::Kb16, 2048),
    (Density::Kb64, 8192),
    (Density::Kb128, 16384),
    (Density::Kb256, 32768),
    (Density::Kb512, 65536),
    (Density::Mb1, 131072),
    (Density::Mb2, 262144),
    (Density::Mb4, 524288),
    (Density::Mb8, 1048576),
];

/// Looks up the capacity in bytes for a raw 5-bit density code.
///
/// Returns `None` for a code missing from [`DENSITY_TABLE`]. The drivers'
/// `init` turns that into [`crate::Error::UnknownDensity`] carrying the code,
/// which keeps this lookup free of the transport error types.
pub fn find_density(code: u8) -> Option<u32> {
    DENSITY_TABLE
        .iter()
        .find(|(density, _)| *density as u8 == code)
        .map(|&(_, capacity)| capacity)
}

impl Density {
    pub fn from_code(code: u8) -> Option<Self> {
        DENSITY_TABLE
            .iter()
            .map(|&(density, _)| density)
            .find(|density| *density as u8 == code)
    }

    pub fn capacity_bytes(self) -> u32 {
        // The table is exhaustive over the enum.
        find_density(self as u8).unwrap_or(0)
    }

    pub fn address_width(self) -> AddressWidth {
        AddressWidth::for_density_code(self as u8)
    }
}

/// The decoded identification register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identification {
    word: u32,
}

impl Identification {
    /// Build an Identification from the four Read ID bytes, in the order received.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            word: u32::from_le_bytes(bytes),
        }
    }

    /// The raw register.
    pub fn word(&self) -> u32 {
        self.word
    }

    pub fn manufacturer_id(&self) -> u8 {
        self.word as u8
    }

    pub fn continuation_code(&self) -> u8 {
        (self.word >> 8) as u8
    }

    /// The raw 5-bit density code. May not be a known [`Density`].
    pub fn density_code(&self) -> u8 {
        ((self.word >> 16) & 0x1F) as u8
    }

    pub fn density(&self) -> Option<Density> {
        Density::from_code(self.density_code())
    }

    /// The 11 product bits following the density field.
    pub fn product_id(&self) -> u16 {
        (self.word >> 21) as u16
    }
}
