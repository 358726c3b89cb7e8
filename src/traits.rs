use core::fmt::Debug;

/// The four bus primitives plus a millisecond clock the driver needs from the board.
///
/// Implementations own the SPI peripheral and the chip-select line. The driver
/// never touches hardware registers directly.
pub trait Transport {
    /// Failure raised while driving the chip-select line.
    type CsError: Debug;
    /// Failure raised by the serial link.
    type SpiError: Debug;

    /// Drives chip-select active (low).
    fn select(&mut self) -> Result<(), Self::CsError>;

    /// Drives chip-select idle (high).
    fn deselect(&mut self) -> Result<(), Self::CsError>;

    /// Sends every byte of `bytes` on the bus.
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Self::SpiError>;

    /// Fills `buf` with bytes clocked in from the bus.
    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::SpiError>;

    /// Monotonic millisecond counter. Only differences are used, so wrapping is fine.
    fn now_ms(&mut self) -> u32;
}

/// Async flavour of [`Transport`]. The clock stays synchronous.
#[allow(async_fn_in_trait)]
pub trait AsyncTransport {
    type CsError: Debug;
    type SpiError: Debug;

    async fn select(&mut self) -> Result<(), Self::CsError>;

    async fn deselect(&mut self) -> Result<(), Self::CsError>;

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), Self::SpiError>;

    async fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::SpiError>;

    fn now_ms(&mut self) -> u32;
}

/// Source of the millisecond tick, e.g. a HAL's `get_tick`.
pub trait Clock {
    fn now_ms(&mut self) -> u32;
}

impl<F> Clock for F
where
    F: FnMut() -> u32,
{
    fn now_ms(&mut self) -> u32 {
        self()
    }
}
