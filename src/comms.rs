/// Refer to the MB85RS series datasheets (MB85RS256B, MB85RS2MT and siblings),
/// section "Command". Opcodes are shared across the family.
use crate::command::{in_bounds, AddressWidth, Command, Opcode, ZEROES};
use crate::config::Config;
use crate::error::{BusError, Error, WelError};
use crate::identification::{find_density, Identification, MANUFACTURER_ID_FUJITSU};
use crate::status::{BitState, Status};
use crate::traits::Transport;
use core::fmt::Debug;

/// The error type returned by [`Fram`] for a given transport.
pub type FramError<T> = Error<<T as Transport>::CsError, <T as Transport>::SpiError>;

/// What the driver knows about the attached part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    pub id: Identification,
    /// Status register as seen by the last poll.
    pub status: Status,
    /// Capacity resolved by `init`, zero until it succeeds.
    pub size_bytes: u32,
}

impl DeviceState {
    /// The address width is derived from the density on every command, never cached.
    pub fn address_width(&self) -> AddressWidth {
        AddressWidth::for_density_code(self.id.density_code())
    }
}

/// Blocking driver for an SPI FRAM part.
pub struct Fram<T> {
    transport: T,
    state: DeviceState,
    config: Config,
}

impl<T> Debug for Fram<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fram")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Fram<T>
where
    T: Transport,
{
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    pub fn with_config(transport: T, config: Config) -> Self {
        Self {
            transport,
            state: DeviceState::default(),
            config,
        }
    }

    /// Identifies the part and sizes it from the density code.
    ///
    /// Density is resolved before the manufacturer is checked, so an unmapped
    /// density code is reported as [`Error::UnknownDensity`] whatever the
    /// manufacturer byte says. Only full success leaves the device usable.
    pub fn init(&mut self) -> Result<(), FramError<T>> {
        self.state.size_bytes = 0;
        let id = self.get_id()?;
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

    /// Reads the 32-bit identification register.
    ///
    /// From datasheet section "Command", RDID (9Fh). Does not touch the stored
    /// device state.
    pub fn get_id(&mut self) -> Result<Identification, FramError<T>> {
        let mut buf = [0u8; 4];
        self.exchange(|t| {
            t.transmit(&[Opcode::ReadId as u8])?;
            t.receive(&mut buf)
        })?;
        Ok(Identification::from_bytes(buf))
    }

    /// Reads the status register and reports the write enable latch.
    pub fn get_wel_bit(&mut self) -> Result<BitState, FramError<T>> {
        Ok(self.read_status()?.wel())
    }

    /// Issues WREN (06h) and busy-polls RDSR (05h) until WEL reads back set.
    ///
    /// See datasheet section "Command", WREN and RDSR. Polls that fail on the
    /// bus are retried. Once more than `config.wel_timeout_ms` have passed
    /// since the command was sent, the last poll decides the error: a bus
    /// failure is reported as such, a clean read with WEL clear as
    /// [`WelError::Timeout`].
    pub fn set_wel_bit(&mut self) -> Result<(), WelError<T::CsError, T::SpiError>> {
        let start = self.transport.now_ms();
        self.exchange(|t| t.transmit(&[Opcode::WriteEnable as u8]))?;

        loop {
            let last = match self.read_status() {
                Ok(status) if status.wel() == BitState::Set => return Ok(()),
                Ok(_) => None,
                Err(err) => Some(err),
            };
            if self.transport.now_ms().wrapping_sub(start) > self.config.wel_timeout_ms {
                warn!("WEL not set after {} ms: {:?}", self.config.wel_timeout_ms, self.state.status);
                return Err(last.map_or(WelError::Timeout, WelError::from));
            }
        }
    }

    /// Reads `buf.len()` bytes starting at `addr`.
    ///
    /// From datasheet section "Command", READ (03h): opcode, address, then data
    /// clocked out for as long as /CS stays low. WEL is asserted first, like
    /// every other access.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FramError<T>> {
        let len = Self::length(addr, buf.len())?;
        let cmd = self.prepare(Opcode::Read, addr, len)?;
        self.exchange(|t| {
            t.transmit(cmd.as_bytes())?;
            t.receive(buf)
        })
        .map_err(Error::from)
    }

    /// Writes `data` starting at `addr`.
    ///
    /// From datasheet section "Command", WRITE (02h). The part writes at bus
    /// speed, so there is no busy wait after /CS rises.
    ///
    /// Errors are reported in the order: address, write enable, select,
    /// command, data, deselect.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FramError<T>> {
        let len = Self::length(addr, data.len())?;
        let cmd = self.prepare(Opcode::Write, addr, len)?;
        self.exchange(|t| {
            t.transmit(cmd.as_bytes())?;
            t.transmit(data)
        })
        .map_err(Error::from)
    }

    /// Sets `len` bytes starting at `addr` to zero.
    pub fn clear(&mut self, addr: u32, len: u32) -> Result<(), FramError<T>> {
        let cmd = self.prepare(Opcode::Write, addr, len)?;
        self.exchange(|t| {
            t.transmit(cmd.as_bytes())?;
            let mut remaining = len;
            while remaining > 0 {
                let chunk = remaining.min(ZEROES.len() as u32);
                t.transmit(&ZEROES[..chunk as usize])?;
                remaining -= chunk;
            }
            Ok(())
        })
        .map_err(Error::from)
    }

    /// Clears the whole array.
    pub fn full_chip_erase(&mut self) -> Result<(), FramError<T>> {
        self.clear(0, self.state.size_bytes)
    }

    /// Capacity in bytes, zero until [`Fram::init`] succeeds.
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

    /// Gives back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    fn length(addr: u32, len: usize) -> Result<u32, FramError<T>> {
        u32::try_from(len).map_err(|_| Error::Address {
            addr,
            len: u32::MAX,
        })
    }

    /// Bounds check, write enable, then the framed command for the access.
    fn prepare(&mut self, opcode: Opcode, addr: u32, len: u32) -> Result<Command, FramError<T>> {
        if !in_bounds(self.state.size_bytes, addr, len) {
            return Err(Error::Address { addr, len });
        }
        self.set_wel_bit()?;

        let cmd = Command::new(opcode, addr, self.state.address_width(), self.config.address_mask);
        trace!("command {:?}, {} bytes", cmd.as_bytes(), len);
        Ok(cmd)
    }

    /// RDSR (05h). Keeps the register in the device state.
    fn read_status(&mut self) -> Result<Status, BusError<T::CsError, T::SpiError>> {
        let mut buf = [0u8; 1];
        self.exchange(|t| {
            t.transmit(&[Opcode::ReadStatus as u8])?;
            t.receive(&mut buf)
        })?;
        self.state.status = Status::from_bits_retain(buf[0]);
        Ok(self.state.status)
    }

    /// Runs `body` with chip-select asserted.
    ///
    /// Deselect is attempted whenever select succeeded. The first error wins.
    fn exchange<R>(
        &mut self,
        body: impl FnOnce(&mut T) -> Result<R, T::SpiError>,
    ) -> Result<R, BusError<T::CsError, T::SpiError>> {
        self.transport.select().map_err(BusError::Cs)?;
        let result = body(&mut self.transport);
        let deselect = self.transport.deselect();
        let value = result.map_err(BusError::Spi)?;
        deselect.map_err(BusError::Cs)?;
        Ok(value)
    }
}
