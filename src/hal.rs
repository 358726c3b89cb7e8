//! [`Transport`] implementations on top of `embedded-hal` peripherals.
use crate::traits::{AsyncTransport, Clock, Transport};
use core::fmt::Debug;
use embedded_hal::digital::OutputPin;

/// A bus, an active-low chip-select pin and a tick source.
///
/// # Type Parameters
///
/// * **`SPI`**: The SPI bus the FRAM is attached to. Must be configured for
///   mode 0 or mode 3.
/// * **`CS`**: The **C**hip-**S**elect line attached to the `/CS` pin of the
///   part. Driven low while a command is in flight.
/// * **`C`**: Millisecond tick used for the write enable timeout.
pub struct SpiTransport<SPI, CS, C> {
    spi: SPI,
    cs: CS,
    clock: C,
}

impl<SPI, CS, C> Debug for SpiTransport<SPI, CS, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SpiTransport")
    }
}

impl<SPI, CS, C> SpiTransport<SPI, CS, C> {
    pub fn new(spi: SPI, cs: CS, clock: C) -> Self {
        Self { spi, cs, clock }
    }

    /// Gives back the peripherals.
    pub fn release(self) -> (SPI, CS, C) {
        (self.spi, self.cs, self.clock)
    }
}

impl<SPI, CS, C> Transport for SpiTransport<SPI, CS, C>
where
    SPI: embedded_hal::spi::SpiBus,
    CS: OutputPin,
    C: Clock,
{
    type CsError = CS::Error;
    type SpiError = SPI::Error;

    fn select(&mut self) -> Result<(), CS::Error> {
        self.cs.set_low()
    }

    fn deselect(&mut self) -> Result<(), CS::Error> {
        self.cs.set_high()
    }

    // Flushed so every byte is out on the wire before /CS can rise.
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), SPI::Error> {
        self.spi.write(bytes)?;
        self.spi.flush()
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), SPI::Error> {
        self.spi.read(buf)?;
        self.spi.flush()
    }

    fn now_ms(&mut self) -> u32 {
        self.clock.now_ms()
    }
}

/// Async counterpart of [`SpiTransport`]. The chip-select pin stays blocking.
pub struct AsyncSpiTransport<SPI, CS, C> {
    spi: SPI,
    cs: CS,
    clock: C,
}

impl<SPI, CS, C> Debug for AsyncSpiTransport<SPI, CS, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AsyncSpiTransport").finish()
    }
}

impl<SPI, CS, C> AsyncSpiTransport<SPI, CS, C> {
    pub fn new(spi: SPI, cs: CS, clock: C) -> Self {
        Self { spi, cs, clock }
    }

    pub fn release(self) -> (SPI, CS, C) {
        (self.spi, self.cs, self.clock)
    }
}

impl<SPI, CS, C> AsyncTransport for AsyncSpiTransport<SPI, CS, C>
where
    SPI: embedded_hal_async::spi::SpiBus,
    CS: OutputPin,
    C: Clock,
{
    type CsError = CS::Error;
    type SpiError = SPI::Error;

    async fn select(&mut self) -> Result<(), CS::Error> {
        self.cs.set_low()
    }

    async fn deselect(&mut self) -> Result<(), CS::Error> {
        self.cs.set_high()
    }

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), SPI::Error> {
        self.spi.write(bytes).await?;
        self.spi.flush().await
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<(), SPI::Error> {
        self.spi.read(buf).await?;
        self.spi.flush().await
    }

    fn now_ms(&mut self) -> u32 {
        self.clock.now_ms()
    }
}
