/// Longest wait for the write enable latch, in milliseconds.
pub const MAX_TIMEOUT_MS: u32 = 1000;

/// How the address field of a command is derived from the target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMask {
    /// Every address byte is shifted out of the full address.
    #[default]
    Full,
    /// Only the low 8 bits of the address reach the chip, every higher byte is zero.
    ///
    /// This reproduces the framing of older firmware so images it wrote can be
    /// read back byte for byte. Any address of 256 or above aliases onto the
    /// first 256 bytes.
    LowByte,
}

/// Driver tuning knobs. `Config::default()` gives the chip-defined behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub wel_timeout_ms: u32,
    /// Pause between status polls. Only honoured by [`crate::AsyncFram`].
    pub poll_delay_us: u32,
    pub address_mask: AddressMask,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wel_timeout_ms: MAX_TIMEOUT_MS,
            poll_delay_us: 0,
            address_mask: AddressMask::Full,
        }
    }
}

impl Config {
    pub fn with_wel_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.wel_timeout_ms = timeout_ms;
        self
    }

    pub fn with_poll_delay_us(mut self, delay_us: u32) -> Self {
        self.poll_delay_us = delay_us;
        self
    }

    pub fn with_address_mask(mut self, mask: AddressMask) -> Self {
        self.address_mask = mask;
        self
    }
}
