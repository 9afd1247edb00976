//! MCP23017 16-bit I/O expander.
//!
//! Pins 0-7 are port A, pins 8-15 port B. Every pin operation exists in a
//! single-pin form (read-modify-write of one bit) and a whole-port form
//! (one register transaction for eight pins).

use crate::consts::mcp23017 as consts;
use crate::error::{ErrorCode, Result, StickyError};
use crate::gpio::{self, Bank, Level, PinMode};
use crate::i2c::{self, TwoWire};
use crate::register::{self, RegisterBus};
use log::{debug, trace};

/// Address with all strap pins low.
pub const DEFAULT_ADDRESS: u8 = consts::ADDRESS_MIN;

/// Raw diagnostic value for an error code, as reported by this driver family.
pub fn raw_error_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::Ok => consts::CODE_OK,
        ErrorCode::Pin => consts::CODE_PIN_ERROR,
        ErrorCode::Transport => consts::CODE_I2C_ERROR,
        ErrorCode::Value => consts::CODE_VALUE_ERROR,
        ErrorCode::Port => consts::CODE_PORT_ERROR,
        ErrorCode::Address => consts::CODE_ADDRESS_ERROR,
        ErrorCode::Connect => consts::CODE_CONNECT_ERROR,
    }
}

/// A handle to one MCP23017 on a two-wire bus.
/// **Note:** The last-error state is plain mutable data; one owner at a time.
#[derive(Debug)]
pub struct Mcp23017<W> {
    regs: RegisterBus<W>,
    error: StickyError,
}

impl<W: TwoWire> Mcp23017<W> {
    pub fn new(bus: W, address: u8) -> Self {
        Self {
            regs: RegisterBus::new(bus, address),
            error: StickyError::default(),
        }
    }

    pub fn address(&self) -> u8 {
        self.regs.address()
    }

    /// Gives the bus back.
    pub fn release(self) -> W {
        self.regs.release()
    }

    /// Initialises the bus, checks the chip answers, disables address
    /// auto-increment and enables the pull-ups on all 16 pins.
    ///
    /// Stops at the first failing step; nothing is written if the probe fails.
    pub fn begin(&mut self) -> Result<()> {
        let result = self.begin_inner();
        match &result {
            Ok(()) => debug!("MCP23017 at 0x{:02X} initialised", self.address()),
            Err(e) => debug!("MCP23017 begin failed: {}", e),
        }
        self.error.record(result)
    }

    fn begin_inner(&mut self) -> Result<()> {
        i2c::check_address(self.address(), consts::ADDRESS_MIN, consts::ADDRESS_MAX)?;
        self.regs.begin();
        self.regs.probe().map_err(register::probe_to_connect)?;
        self.regs
            .write_reg8(consts::REG_IOCR, consts::IOCR_NO_AUTO_INCREMENT)?;
        self.regs.write_reg8(consts::REG_PUR_A, 0xFF)?;
        self.regs.write_reg8(consts::REG_PUR_B, 0xFF)?;
        Ok(())
    }

    /// Zero-length probe of the bus address.
    pub fn is_connected(&mut self) -> bool {
        let result = self.regs.probe();
        self.error.record(result).is_ok()
    }

    // --- Single Pin ---

    /// Sets a pin to input or output. Accepts a [`PinMode`] or a raw mode
    /// code; anything other than INPUT, OUTPUT or INPUT_PULLUP is rejected.
    pub fn pin_mode(&mut self, pin: u8, mode: impl Into<u8>) -> Result<()> {
        let raw = mode.into();
        let result = gpio::locate_pin(Bank::Direction, pin).and_then(|loc| {
            let mode = PinMode::try_from(raw)?;
            trace!("Setting DDR pin {}: {:?}", pin, mode);
            self.update_bit(loc, mode.is_input())
        });
        self.error.record(result)
    }

    pub fn digital_write(&mut self, pin: u8, level: Level) -> Result<()> {
        let result = gpio::locate_pin(Bank::Gpio, pin)
            .and_then(|loc| self.update_bit(loc, level.into()));
        self.error.record(result)
    }

    pub fn digital_read(&mut self, pin: u8) -> Result<Level> {
        let result = self.read_bit(Bank::Gpio, pin).map(Level::from);
        self.error.record(result)
    }

    /// Reverses (or restores) the input polarity of a pin.
    pub fn set_polarity(&mut self, pin: u8, reversed: bool) -> Result<()> {
        let result = gpio::locate_pin(Bank::Polarity, pin)
            .and_then(|loc| self.update_bit(loc, reversed));
        self.error.record(result)
    }

    pub fn get_polarity(&mut self, pin: u8) -> Result<bool> {
        let result = self.read_bit(Bank::Polarity, pin);
        self.error.record(result)
    }

    pub fn set_pullup(&mut self, pin: u8, enabled: bool) -> Result<()> {
        let result = gpio::locate_pin(Bank::Pullup, pin)
            .and_then(|loc| self.update_bit(loc, enabled));
        self.error.record(result)
    }

    pub fn get_pullup(&mut self, pin: u8) -> Result<bool> {
        let result = self.read_bit(Bank::Pullup, pin);
        self.error.record(result)
    }

    // --- Whole Port ---
    // port = 0..1, value = bit pattern for pins 0-7 of that port

    /// Direction bit pattern for a port, 1 = input.
    pub fn pin_mode8(&mut self, port: u8, mask: u8) -> Result<()> {
        let result = self.write_port(Bank::Direction, port, mask);
        self.error.record(result)
    }

    pub fn write8(&mut self, port: u8, value: u8) -> Result<()> {
        let result = self.write_port(Bank::Gpio, port, value);
        self.error.record(result)
    }

    pub fn read8(&mut self, port: u8) -> Result<u8> {
        let result = self.read_port(Bank::Gpio, port);
        self.error.record(result)
    }

    pub fn set_polarity8(&mut self, port: u8, mask: u8) -> Result<()> {
        let result = self.write_port(Bank::Polarity, port, mask);
        self.error.record(result)
    }

    pub fn get_polarity8(&mut self, port: u8) -> Result<u8> {
        let result = self.read_port(Bank::Polarity, port);
        self.error.record(result)
    }

    pub fn set_pullup8(&mut self, port: u8, mask: u8) -> Result<()> {
        let result = self.write_port(Bank::Pullup, port, mask);
        self.error.record(result)
    }

    pub fn get_pullup8(&mut self, port: u8) -> Result<u8> {
        let result = self.read_port(Bank::Pullup, port);
        self.error.record(result)
    }

    /// Returns the outcome of the last operation and resets it to `Ok`.
    pub fn last_error(&mut self) -> ErrorCode {
        self.error.take()
    }

    // --- Helpers ---

    // Always writes back: reading GPIOA/B returns the pin levels, not the
    // output latch, so an unchanged read-back says nothing about the latch.
    fn update_bit(&mut self, loc: gpio::PinLocation, set: bool) -> Result<()> {
        let current = self.regs.read_reg8(loc.register)?;
        let new_val = if set {
            current | loc.mask
        } else {
            current & !loc.mask
        };
        trace!(
            "Reg 0x{:02X}: 0x{:02X} -> 0x{:02X}",
            loc.register,
            current,
            new_val
        );
        self.regs.write_reg8(loc.register, new_val)
    }

    fn read_bit(&mut self, bank: Bank, pin: u8) -> Result<bool> {
        let loc = gpio::locate_pin(bank, pin)?;
        let value = self.regs.read_reg8(loc.register)?;
        Ok(value & loc.mask != 0)
    }

    fn write_port(&mut self, bank: Bank, port: u8, value: u8) -> Result<()> {
        let reg = gpio::locate_port(bank, port)?;
        debug!("Setting {:?} port {}: 0x{:02X}", bank, port, value);
        self.regs.write_reg8(reg, value)
    }

    fn read_port(&mut self, bank: Bank, port: u8) -> Result<u8> {
        let reg = gpio::locate_port(bank, port)?;
        self.regs.read_reg8(reg)
    }
}
