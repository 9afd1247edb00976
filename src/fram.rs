//! MB85RC-family I2C FRAM.
//!
//! Memory is byte-addressed with a 16-bit address sent high byte first.
//! Multi-byte values are stored little-endian. Identification comes from the
//! reserved device-ID slave, which answers with three bytes holding a 12-bit
//! manufacturer id and a 12-bit product id whose top nibble is the density.

use crate::consts::fram as consts;
use crate::error::{ErrorCode, Result, StickyError};
use crate::i2c::{self, TwoWire};
use crate::register::{self, RegisterBus};
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use log::{debug, trace};
use std::convert::Infallible;

/// Address with all strap pins low.
pub const DEFAULT_ADDRESS: u8 = consts::ADDRESS_MIN;

/// Returned by the identification getters when the chip does not answer.
pub const INVALID_ID: u16 = 0xFFFF;

/// Raw diagnostic value for an error code, as reported by this driver family.
pub fn raw_error_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::Ok => consts::CODE_OK,
        ErrorCode::Address => consts::CODE_ERROR_ADDR,
        ErrorCode::Transport => consts::CODE_ERROR_I2C,
        ErrorCode::Connect => consts::CODE_ERROR_CONNECT,
        ErrorCode::Pin | ErrorCode::Port | ErrorCode::Value => consts::CODE_ERROR_OTHER,
    }
}

/// Placeholder pin type for chips without a write-protect line.
#[derive(Debug)]
pub enum NoPin {}

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> std::result::Result<(), Infallible> {
        match *self {}
    }
    fn set_high(&mut self) -> std::result::Result<(), Infallible> {
        match *self {}
    }
}

impl StatefulOutputPin for NoPin {
    fn is_set_high(&mut self) -> std::result::Result<bool, Infallible> {
        match *self {}
    }
    fn is_set_low(&mut self) -> std::result::Result<bool, Infallible> {
        match *self {}
    }
}

#[derive(Debug, Clone, Copy)]
enum MetaField {
    Manufacturer,
    Product,
    Density,
}

/// A handle to one FRAM chip, optionally with its WP line.
#[derive(Debug)]
pub struct Fram<W, P = NoPin> {
    regs: RegisterBus<W>,
    write_protect: Option<P>,
    error: StickyError,
}

impl<W: TwoWire> Fram<W> {
    /// Chip without a controllable write-protect pin.
    pub fn new(bus: W) -> Self {
        Self {
            regs: RegisterBus::new(bus, DEFAULT_ADDRESS),
            write_protect: None,
            error: StickyError::default(),
        }
    }
}

impl<W: TwoWire, P: StatefulOutputPin> Fram<W, P> {
    /// Chip whose WP pin is driven by `pin` (high = protected).
    pub fn with_write_protect(bus: W, pin: P) -> Self {
        Self {
            regs: RegisterBus::new(bus, DEFAULT_ADDRESS),
            write_protect: Some(pin),
            error: StickyError::default(),
        }
    }

    pub fn address(&self) -> u8 {
        self.regs.address()
    }

    /// Gives the bus (and WP pin, if any) back.
    pub fn release(self) -> (W, Option<P>) {
        (self.regs.release(), self.write_protect)
    }

    /// Selects the chip at `address` (default 0x50) and checks it answers.
    ///
    /// An address outside 0x50-0x57 is rejected without touching the bus.
    pub fn begin(&mut self, address: Option<u8>) -> Result<()> {
        let address = address.unwrap_or(DEFAULT_ADDRESS);
        let result = self.begin_inner(address);
        match &result {
            Ok(()) => debug!("FRAM at 0x{:02X} initialised", address),
            Err(e) => debug!("FRAM begin failed: {}", e),
        }
        self.error.record(result)
    }

    fn begin_inner(&mut self, address: u8) -> Result<()> {
        i2c::check_address(address, consts::ADDRESS_MIN, consts::ADDRESS_MAX)?;
        self.regs.set_address(address);
        self.regs.begin();
        self.regs.probe().map_err(register::probe_to_connect)
    }

    pub fn is_connected(&mut self) -> bool {
        let result = self.regs.probe();
        self.error.record(result).is_ok()
    }

    // --- Typed access ---

    pub fn write8(&mut self, memaddr: u16, value: u8) -> Result<()> {
        self.write(memaddr, &[value])
    }

    pub fn write16(&mut self, memaddr: u16, value: u16) -> Result<()> {
        self.write(memaddr, &value.to_le_bytes())
    }

    pub fn write32(&mut self, memaddr: u16, value: u32) -> Result<()> {
        self.write(memaddr, &value.to_le_bytes())
    }

    pub fn write_f32(&mut self, memaddr: u16, value: f32) -> Result<()> {
        self.write(memaddr, &value.to_le_bytes())
    }

    pub fn read8(&mut self, memaddr: u16) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read(memaddr, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read16(&mut self, memaddr: u16) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read(memaddr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read32(&mut self, memaddr: u16) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read(memaddr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_f32(&mut self, memaddr: u16) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read(memaddr, &mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    // --- Block access ---

    /// Writes `data` starting at `memaddr`, split into bus-sized frames.
    /// The memory address wraps past 0xFFFF.
    pub fn write(&mut self, memaddr: u16, data: &[u8]) -> Result<()> {
        let result = self.write_blocks(memaddr, data);
        self.error.record(result)
    }

    /// Fills `buf` from memory starting at `memaddr`.
    pub fn read(&mut self, memaddr: u16, buf: &mut [u8]) -> Result<()> {
        let result = self.read_blocks(memaddr, buf);
        self.error.record(result)
    }

    fn write_blocks(&mut self, memaddr: u16, data: &[u8]) -> Result<()> {
        let mut addr = memaddr;
        let mut frame = [0u8; consts::WRITE_CHUNK + 2];
        for chunk in data.chunks(consts::WRITE_CHUNK) {
            let [hi, lo] = addr.to_be_bytes();
            frame[0] = hi;
            frame[1] = lo;
            frame[2..2 + chunk.len()].copy_from_slice(chunk);
            trace!("FRAM write {} bytes @0x{:04X}", chunk.len(), addr);
            self.regs.write_frame(&frame[..2 + chunk.len()])?;
            addr = addr.wrapping_add(chunk.len() as u16);
        }
        Ok(())
    }

    fn read_blocks(&mut self, memaddr: u16, buf: &mut [u8]) -> Result<()> {
        let mut addr = memaddr;
        for chunk in buf.chunks_mut(consts::READ_CHUNK) {
            trace!("FRAM read {} bytes @0x{:04X}", chunk.len(), addr);
            let len = chunk.len() as u16;
            self.regs.read_frame(&addr.to_be_bytes(), chunk)?;
            addr = addr.wrapping_add(len);
        }
        Ok(())
    }

    // --- Identification ---
    // These report failure through sentinels only; the sticky error is left alone.

    /// 12-bit manufacturer id, or [`INVALID_ID`] if the chip does not answer.
    pub fn get_manufacturer_id(&mut self) -> u16 {
        self.metadata(MetaField::Manufacturer).unwrap_or(INVALID_ID)
    }

    /// 12-bit product id, or [`INVALID_ID`] if the chip does not answer.
    pub fn get_product_id(&mut self) -> u16 {
        self.metadata(MetaField::Product).unwrap_or(INVALID_ID)
    }

    /// Capacity in KiB, or 0 if the chip does not answer.
    pub fn get_size(&mut self) -> u32 {
        match self.metadata(MetaField::Density) {
            Ok(density) if density > 0 && density < 32 => 1u32 << density,
            _ => 0,
        }
    }

    fn metadata(&mut self, field: MetaField) -> Result<u16> {
        let id_address = consts::SLAVE_ID;
        let selector = [self.regs.address() << 1];
        let mut id = [0u8; 3];
        self.regs.transfer(id_address, &selector, &mut id, false)?;
        trace!("FRAM device id: {:02X?}", id);
        let value = match field {
            MetaField::Manufacturer => (u16::from(id[0]) << 4) | (u16::from(id[1]) >> 4),
            MetaField::Product => (u16::from(id[1] & 0x0F) << 8) | u16::from(id[2]),
            MetaField::Density => u16::from(id[1] & 0x0F),
        };
        Ok(value)
    }

    // --- Write protect ---
    // Without a WP pin these are no-ops returning false, never errors.

    /// Drives the WP pin. Returns false when no pin is configured or the
    /// pin could not be set.
    pub fn set_write_protect(&mut self, enable: bool) -> bool {
        match self.write_protect.as_mut() {
            Some(pin) => {
                debug!("FRAM write protect: {}", enable);
                if enable {
                    pin.set_high().is_ok()
                } else {
                    pin.set_low().is_ok()
                }
            }
            None => false,
        }
    }

    /// True only when a WP pin is configured and currently driven high.
    pub fn get_write_protect(&mut self) -> bool {
        match self.write_protect.as_mut() {
            Some(pin) => pin.is_set_high().unwrap_or(false),
            None => false,
        }
    }

    pub fn last_error(&mut self) -> ErrorCode {
        self.error.take()
    }
}
