//! A simulated FRAM part behind both transport traits, for unit tests.
use crate::command::AddressWidth;
use crate::identification::{find_density, Density};
use crate::traits::{AsyncTransport, Transport};

const WREN: u8 = 0x06;
const RDSR: u8 = 0x05;
const RDID: u8 = 0x9F;
const WRITE: u8 = 0x02;
const READ: u8 = 0x03;
const WEL: u8 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    Tx(Vec<u8>),
    Rx(usize),
}

pub struct SimFram {
    pub memory: Vec<u8>,
    pub id: [u8; 4],
    pub status: u8,
    pub events: Vec<Event>,
    /// Value returned by the next `now_ms` call.
    pub clock_ms: u32,
    /// Advance of the clock on every `now_ms` call.
    pub tick_ms: u32,
    /// The part never latches WREN.
    pub ignore_wren: bool,
    /// Status reads after WREN that still report WEL clear.
    pub wel_after_polls: usize,
    pub fail_status_reads: bool,
    fail_select_at: Option<usize>,
    fail_deselect_at: Option<usize>,
    fail_tx_at: Option<usize>,
    pub status_polls: usize,
    /// Data bytes accepted by write frames.
    pub bytes_written: usize,
    frame: Vec<u8>,
    cursor: usize,
    select_count: usize,
    deselect_count: usize,
    tx_count: usize,
    wel_countdown: Option<usize>,
}

impl SimFram {
    pub fn new(id: [u8; 4]) -> Self {
        let size = find_density(id[2] & 0x1F).unwrap_or(0) as usize;
        Self {
            memory: vec![0xFF; size],
            id,
            status: 0,
            events: Vec::new(),
            clock_ms: 0,
            tick_ms: 1,
            ignore_wren: false,
            wel_after_polls: 0,
            fail_status_reads: false,
            fail_select_at: None,
            fail_deselect_at: None,
            fail_tx_at: None,
            status_polls: 0,
            bytes_written: 0,
            frame: Vec::new(),
            cursor: 0,
            select_count: 0,
            deselect_count: 0,
            tx_count: 0,
            wel_countdown: None,
        }
    }

    /// MB85RS256B: 256 Kbit, Fujitsu.
    pub fn mb85rs256() -> Self {
        Self::new([0x04, 0x7F, 0x05, 0x09])
    }

    pub fn with_density(density: Density) -> Self {
        Self::new([0x04, 0x7F, density as u8, 0x09])
    }

    /// Lets `n` more select calls succeed, then fails every one after.
    pub fn fail_select_after(&mut self, n: usize) {
        self.fail_select_at = Some(self.select_count + n);
    }

    /// Lets `n` more deselect calls succeed, then fails every one after.
    pub fn fail_deselect_after(&mut self, n: usize) {
        self.fail_deselect_at = Some(self.deselect_count + n);
    }

    /// Lets `n` more transmit calls succeed, then fails every one after.
    pub fn fail_transmit_after(&mut self, n: usize) {
        self.fail_tx_at = Some(self.tx_count + n);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.events)
    }

    fn header_len(&self) -> usize {
        1 + AddressWidth::for_density_code(self.id[2] & 0x1F).bytes()
    }

    fn frame_addr(&self) -> usize {
        self.frame[1..self.header_len()]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize)
    }

    fn cell(&self, offset: usize) -> usize {
        (self.frame_addr() + offset) % self.memory.len()
    }
}

impl Transport for SimFram {
    type CsError = Fault;
    type SpiError = Fault;

    fn select(&mut self) -> Result<(), Fault> {
        if self.fail_select_at.is_some_and(|at| self.select_count >= at) {
            return Err(Fault);
        }
        self.select_count += 1;
        self.events.push(Event::Select);
        self.frame.clear();
        self.cursor = 0;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Fault> {
        if self.fail_deselect_at.is_some_and(|at| self.deselect_count >= at) {
            return Err(Fault);
        }
        self.deselect_count += 1;
        self.events.push(Event::Deselect);
        match self.frame.first() {
            Some(&WREN) if !self.ignore_wren => self.wel_countdown = Some(self.wel_after_polls),
            Some(&WRITE) if self.cursor > 0 => self.status &= !WEL,
            _ => {}
        }
        self.frame.clear();
        self.cursor = 0;
        Ok(())
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        if self.fail_tx_at.is_some_and(|at| self.tx_count >= at) {
            return Err(Fault);
        }
        self.tx_count += 1;
        self.events.push(Event::Tx(bytes.to_vec()));
        for &b in bytes {
            if self.frame.first() == Some(&WRITE) && self.frame.len() >= self.header_len() {
                if self.status & WEL != 0 {
                    let cell = self.cell(self.cursor);
                    self.memory[cell] = b;
                    self.bytes_written += 1;
                }
                self.cursor += 1;
            } else {
                self.frame.push(b);
            }
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Fault> {
        match self.frame.first() {
            Some(&RDSR) => {
                self.status_polls += 1;
                if self.fail_status_reads {
                    return Err(Fault);
                }
                match self.wel_countdown {
                    Some(0) => {
                        self.status |= WEL;
                        self.wel_countdown = None;
                    }
                    Some(n) => self.wel_countdown = Some(n - 1),
                    None => {}
                }
                buf.fill(self.status);
            }
            Some(&RDID) => {
                for (dst, src) in buf.iter_mut().zip(self.id.iter().cycle()) {
                    *dst = *src;
                }
            }
            Some(&READ) if self.frame.len() >= self.header_len() => {
                for b in buf.iter_mut() {
                    *b = self.memory[self.cell(self.cursor)];
                    self.cursor += 1;
                }
            }
            _ => buf.fill(0xFF),
        }
        self.events.push(Event::Rx(buf.len()));
        Ok(())
    }

    fn now_ms(&mut self) -> u32 {
        let now = self.clock_ms;
        self.clock_ms = self.clock_ms.wrapping_add(self.tick_ms);
        now
    }
}

impl AsyncTransport for SimFram {
    type CsError = Fault;
    type SpiError = Fault;

    async fn select(&mut self) -> Result<(), Fault> {
        Transport::select(self)
    }

    async fn deselect(&mut self) -> Result<(), Fault> {
        Transport::deselect(self)
    }

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        Transport::transmit(self, bytes)
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<(), Fault> {
        Transport::receive(self, buf)
    }

    fn now_ms(&mut self) -> u32 {
        Transport::now_ms(self)
    }
}
