use bitflags::bitflags;

bitflags! {
    /// Status register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Status of the **W**rite **E**nable **L**atch.
        const WEL = 1 << 1;
        /// Block protect bit 0.
        const BP0 = 1 << 2;
        /// Block protect bit 1.
        const BP1 = 1 << 3;
        /// **W**rite **P**rotect **EN**able, gates the /WP pin.
        const WPEN = 1 << 7;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Status({=u8:#x})", self.bits())
    }
}

/// State of a single status bit as seen by the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitState {
    Reset,
    Set,
}

impl Status {
    pub fn wel(&self) -> BitState {
        if self.contains(Status::WEL) {
            BitState::Set
        } else {
            BitState::Reset
        }
    }
}
