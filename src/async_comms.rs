use core::fmt::Debug;

use crate::command::{in_bounds, Command, Opcode, ZEROES};
use crate::comms::DeviceState;
use crate::config::Config;
use crate::error::{BusError, Error, WelError};
use crate::identification::{find_density, Identification, MANUFACTURER_ID_FUJITSU};
use crate::status::{BitState, Status};
use crate::traits::AsyncTransport;
use embedded_hal_async::delay::DelayNs;

/// The error type returned by [`AsyncFram`] for a given transport.
pub type AsyncFramError<T> =
    Error<<T as AsyncTransport>::CsError, <T as AsyncTransport>::SpiError>;

/// Async driver for an SPI FRAM part.
///
/// Same operations and error ordering as [`crate::Fram`]. The write enable
/// poll loop waits `config.poll_delay_us` between status reads.
pub struct AsyncFram<T, D> {
    transport: T,
    delay: D,
    state: DeviceState,
    config: Config,
}

impl<T, D> Debug for AsyncFram<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AsyncFram")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}

impl<T, D> AsyncFram<T, D>
where
    T: AsyncTransport,
    D: DelayNs,
{
    pub fn new(transport: T, delay: D) -> Self {
        Self::with_config(transport, delay, Config::default())
    }

    pub fn with_config(transport: T, delay: D, config: Config) -> Self {
        Self {
            transport,
            delay,
            state: DeviceState::default(),
            config,
        }
    }

    /// Identifies the part and sizes it from the density code.
    pub async fn init(&mut self) -> Result<(), AsyncFramError<T>> {
        self.state.size_bytes = 0;
        let id = self.get_id().await?;
        self.state.id = id;

        let Some(size) = find_density(id.density_code()) else {
            return Err(Error::UnknownDensity(id.density_code()));
        };
        if id.manufacturer_id() != MANUFACTURER_ID_FUJITSU {
            warn!("Unexpected manufacturer ID: {}", id.manufacturer_id());
            return Err(Error::ManufacturerId(id.manufacturer_id()));
        }

        self.state.size_bytes = size;
        debug!("FRAM detected: {:?}, {} bytes", id.density(), size);
        Ok(())
    }

    /// From datasheet section "Command", RDID (9Fh).
    pub async fn get_id(&mut self) -> Result<Identification, AsyncFramError<T>> {
        let mut buf = [0u8; 4];
        self.select().await?;
        let t = &mut self.transport;
        let result = async {
            t.transmit(&[Opcode::ReadId as u8]).await?;
            t.receive(&mut buf).await
        }
        .await;
        self.finish(result).await?;
        Ok(Identification::from_bytes(buf))
    }

    pub async fn get_wel_bit(&mut self) -> Result<BitState, AsyncFramError<T>> {
        Ok(self.read_status().await?.wel())
    }

    /// Issues WREN (06h) and polls RDSR (05h) until WEL reads back set, see
    /// [`crate::Fram::set_wel_bit`].
    pub async fn set_wel_bit(&mut self) -> Result<(), WelError<T::CsError, T::SpiError>> {
        let start = self.transport.now_ms();
        self.select().await?;
        let result = self.transport.transmit(&[Opcode::WriteEnable as u8]).await;
        self.finish(result).await?;

        loop {
            let last = match self.read_status().await {
                Ok(status) if status.wel() == BitState::Set => return Ok(()),
                Ok(_) => None,
                Err(err) => Some(err),
            };
            if self.transport.now_ms().wrapping_sub(start) > self.config.wel_timeout_ms {
                warn!("WEL not set after {} ms: {:?}", self.config.wel_timeout_ms, self.state.status);
                return Err(last.map_or(WelError::Timeout, WelError::from));
            }
            if self.config.poll_delay_us > 0 {
                self.delay.delay_us(self.config.poll_delay_us).await;
            }
        }
    }

    /// From datasheet section "Command", READ (03h).
    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), AsyncFramError<T>> {
        let len = Self::length(addr, buf.len())?;
        let cmd = self.prepare(Opcode::Read, addr, len).await?;
        self.select().await?;
        let t = &mut self.transport;
        let result = async {
            t.transmit(cmd.as_bytes()).await?;
            t.receive(buf).await
        }
        .await;
        Ok(self.finish(result).await?)
    }

    /// From datasheet section "Command", WRITE (02h).
    pub async fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), AsyncFramError<T>> {
        let len = Self::length(addr, data.len())?;
        let cmd = self.prepare(Opcode::Write, addr, len).await?;
        self.select().await?;
        let t = &mut self.transport;
        let result = async {
            t.transmit(cmd.as_bytes()).await?;
            t.transmit(data).await
        }
        .await;
        Ok(self.finish(result).await?)
    }

    pub async fn clear(&mut self, addr: u32, len: u32) -> Result<(), AsyncFramError<T>> {
        let cmd = self.prepare(Opcode::Write, addr, len).await?;
        self.select().await?;
        let t = &mut self.transport;
        let result = async {
            t.transmit(cmd.as_bytes()).await?;
            let mut remaining = len;
            while remaining > 0 {
                let chunk = remaining.min(ZEROES.len() as u32);
                t.transmit(&ZEROES[..chunk as usize]).await?;
                remaining -= chunk;
            }
            Ok::<(), T::SpiError>(())
        }
        .await;
        Ok(self.finish(result).await?)
    }

    pub async fn full_chip_erase(&mut self) -> Result<(), AsyncFramError<T>> {
        self.clear(0, self.state.size_bytes).await
    }

    pub fn size_bytes(&self) -> u32 {
        self.state.size_bytes
    }

    pub fn identification(&self) -> Identification {
        self.state.id
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Gives back the transport and the delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    fn length(addr: u32, len: usize) -> Result<u32, AsyncFramError<T>> {
        u32::try_from(len).map_err(|_| Error::Address {
            addr,
            len: u32::MAX,
        })
    }

    async fn prepare(
        &mut self,
        opcode: Opcode,
        addr: u32,
        len: u32,
    ) -> Result<Command, AsyncFramError<T>> {
        if !in_bounds(self.state.size_bytes, addr, len) {
            return Err(Error::Address { addr, len });
        }
        self.set_wel_bit().await?;

        let cmd = Command::new(opcode, addr, self.state.address_width(), self.config.address_mask);
        trace!("command {:?}, {} bytes", cmd.as_bytes(), len);
        Ok(cmd)
    }

    async fn read_status(&mut self) -> Result<Status, BusError<T::CsError, T::SpiError>> {
        let mut buf = [0u8; 1];
        self.select().await?;
        let t = &mut self.transport;
        let result = async {
            t.transmit(&[Opcode::ReadStatus as u8]).await?;
            t.receive(&mut buf).await
        }
        .await;
        self.finish(result).await?;
        self.state.status = Status::from_bits_retain(buf[0]);
        Ok(self.state.status)
    }

    async fn select(&mut self) -> Result<(), BusError<T::CsError, T::SpiError>> {
        self.transport.select().await.map_err(BusError::Cs)
    }

    /// Deselects after a bracketed exchange. The exchange's own error wins.
    async fn finish<R>(
        &mut self,
        result: Result<R, T::SpiError>,
    ) -> Result<R, BusError<T::CsError, T::SpiError>> {
        let deselect = self.transport.deselect().await;
        let value = result.map_err(BusError::Spi)?;
        deselect.map_err(BusError::Cs)?;
        Ok(value)
    }
}
