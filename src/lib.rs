//! Driver for Fujitsu/RAMXEED MB85RS series SPI FRAM.
//!
//! The driver identifies the part from its device ID, sizes it from the density
//! code and exposes bounded read, write, clear and full-chip erase. Every
//! mutating command is preceded by the write enable latch handshake.
//!
//! Hardware access goes through a [`Transport`]: chip-select, byte transmit and
//! receive, and a millisecond tick. [`hal::SpiTransport`] builds one from
//! `embedded-hal` peripherals.
//!
//! ```ignore
//! let transport = SpiTransport::new(spi_bus, cs_pin, || hal_get_tick());
//! let mut fram = Fram::new(transport);
//! fram.init()?;
//! fram.write(0x0100, b"boot count")?;
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod async_comms;
mod command;
pub mod comms;
pub mod config;
mod error;
pub mod hal;
pub mod identification;
pub mod status;
pub mod traits;

#[cfg(test)]
mod sim;

pub use crate::async_comms::{AsyncFram, AsyncFramError};
pub use crate::command::{in_bounds, AddressWidth};
pub use crate::comms::{DeviceState, Fram, FramError};
pub use crate::config::{AddressMask, Config, MAX_TIMEOUT_MS};
pub use crate::error::{Error, WelError};
pub use crate::identification::{Density, Identification, MANUFACTURER_ID_FUJITSU};
pub use crate::status::{BitState, Status};
pub use crate::traits::{AsyncTransport, Clock, Transport};
