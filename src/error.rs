use core::fmt::{self, Debug, Display};

/// The error type used by this library.
///
/// This can encapsulate a chip-select or SPI error from the transport, and adds
/// its own protocol and usage errors on top of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<CS, SPI> {
    /// The chip-select line could not be driven.
    Cs(CS),

    /// An SPI transfer failed.
    Spi(SPI),

    /// The density field of the ID register holds a code missing from the density table.
    UnknownDensity(u8),

    /// The ID register was decoded but names a different manufacturer.
    ManufacturerId(u8),

    /// The write enable latch could not be set.
    WriteEnable(WelError<CS, SPI>),

    /// `addr..addr + len` does not fit inside the detected capacity.
    Address { addr: u32, len: u32 },
}

/// Why the write enable latch handshake failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelError<CS, SPI> {
    /// The latch never read back as set before the deadline.
    Timeout,

    /// Chip-select failed on the write enable command, or on the last status poll before the deadline.
    Cs(CS),

    /// The bus failed on the write enable command, or on the last status poll before the deadline.
    Spi(SPI),
}

/// A chip-select or bus failure of a single bracketed exchange, before it is
/// attributed to the operation that ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<CS, SPI> {
    Cs(CS),
    Spi(SPI),
}

impl<CS, SPI> From<BusError<CS, SPI>> for Error<CS, SPI> {
    fn from(err: BusError<CS, SPI>) -> Self {
        match err {
            BusError::Cs(cs) => Error::Cs(cs),
            BusError::Spi(spi) => Error::Spi(spi),
        }
    }
}

impl<CS, SPI> From<BusError<CS, SPI>> for WelError<CS, SPI> {
    fn from(err: BusError<CS, SPI>) -> Self {
        match err {
            BusError::Cs(cs) => WelError::Cs(cs),
            BusError::Spi(spi) => WelError::Spi(spi),
        }
    }
}

impl<CS, SPI> From<WelError<CS, SPI>> for Error<CS, SPI> {
    fn from(err: WelError<CS, SPI>) -> Self {
        Error::WriteEnable(err)
    }
}

impl<CS: Debug, SPI: Debug> Display for WelError<CS, SPI> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WelError::Timeout => f.write_str("write enable latch did not set before the timeout"),
            WelError::Cs(cs) => write!(f, "chip select error while setting write enable: {:?}", cs),
            WelError::Spi(spi) => write!(f, "SPI error while setting write enable: {:?}", spi),
        }
    }
}

impl<CS: Debug, SPI: Debug> Display for Error<CS, SPI> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cs(cs) => write!(f, "chip select error: {:?}", cs),
            Error::Spi(spi) => write!(f, "SPI error: {:?}", spi),
            Error::UnknownDensity(code) => write!(f, "unknown density code 0b{:05b}", code),
            Error::ManufacturerId(id) => write!(f, "unexpected manufacturer ID 0x{:02X}", id),
            Error::WriteEnable(wel) => Display::fmt(wel, f),
            Error::Address { addr, len } => write!(
                f,
                "{} bytes at 0x{:08X} exceed the device capacity",
                len, addr
            ),
        }
    }
}

#[cfg(feature = "defmt")]
impl<CS, SPI> defmt::Format for WelError<CS, SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            WelError::Timeout => defmt::write!(fmt, "WelError::Timeout"),
            WelError::Cs(_) => defmt::write!(fmt, "WelError::Cs"),
            WelError::Spi(_) => defmt::write!(fmt, "WelError::Spi"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<CS, SPI> defmt::Format for Error<CS, SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Cs(_) => defmt::write!(fmt, "Error::Cs"),
            Error::Spi(_) => defmt::write!(fmt, "Error::Spi"),
            Error::UnknownDensity(code) => defmt::write!(fmt, "Error::UnknownDensity({=u8})", code),
            Error::ManufacturerId(id) => defmt::write!(fmt, "Error::ManufacturerId({=u8})", id),
            Error::WriteEnable(wel) => defmt::write!(fmt, "Error::WriteEnable({})", wel),
            Error::Address { addr, len } => {
                defmt::write!(fmt, "Error::Address(addr={=u32}, len={=u32})", addr, len)
            }
        }
    }
}
