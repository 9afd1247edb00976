//! Pin and port addressing for the 16-pin expander.

use crate::consts::mcp23017 as regs;
use crate::error::{Error, Result};

/// Number of pins on the expander.
pub const PIN_COUNT: u8 = 16;
/// Number of 8-pin ports (A and B).
pub const PORT_COUNT: u8 = 2;

// Raw mode codes, matching the usual board-support values.
pub const INPUT: u8 = 0x0;
pub const OUTPUT: u8 = 0x1;
pub const INPUT_PULLUP: u8 = 0x2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

/// Direction setting for a single pin.
///
/// `InputPullup` configures the direction like `Input`; the pull-up itself is
/// controlled separately through the pull-up register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
    InputPullup,
}

impl PinMode {
    /// True when the data-direction bit should be set (pin is an input).
    #[inline]
    pub fn is_input(self) -> bool {
        !matches!(self, PinMode::Output)
    }
}

impl From<PinMode> for u8 {
    fn from(mode: PinMode) -> Self {
        match mode {
            PinMode::Input => INPUT,
            PinMode::Output => OUTPUT,
            PinMode::InputPullup => INPUT_PULLUP,
        }
    }
}

impl TryFrom<u8> for PinMode {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            INPUT => Ok(PinMode::Input),
            OUTPUT => Ok(PinMode::Output),
            INPUT_PULLUP => Ok(PinMode::InputPullup),
            other => Err(Error::Value(format!(
                "pin mode {} (expected INPUT, OUTPUT or INPUT_PULLUP)",
                other
            ))),
        }
    }
}

/// Register pair a pin or port operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Direction,
    Polarity,
    Pullup,
    Gpio,
}

impl Bank {
    /// `[port A, port B]` register addresses.
    const fn registers(self) -> [u8; 2] {
        match self {
            Bank::Direction => [regs::REG_DDR_A, regs::REG_DDR_B],
            Bank::Polarity => [regs::REG_POL_A, regs::REG_POL_B],
            Bank::Pullup => [regs::REG_PUR_A, regs::REG_PUR_B],
            Bank::Gpio => [regs::REG_GPIO_A, regs::REG_GPIO_B],
        }
    }

    #[inline]
    pub fn register(self, port: Port) -> u8 {
        self.registers()[port.index() as usize]
    }
}

/// A validated pin index (0-15).
/// Use `Pin::new(num)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(u8);

impl Pin {
    /// Creates a new Pin, returning an error if the number is out of range (0-15).
    pub fn new(pin_num: u8) -> Result<Self> {
        if pin_num < PIN_COUNT {
            Ok(Pin(pin_num))
        } else {
            Err(Error::Pin {
                pin: pin_num,
                max: PIN_COUNT - 1,
            })
        }
    }

    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Port the pin belongs to (pins 8-15 live on port B).
    #[inline]
    pub fn port(&self) -> Port {
        Port(self.0 / 8)
    }

    /// Bit index (0-7) within the port register.
    #[inline]
    pub fn bit_index(&self) -> u8 {
        self.0 % 8
    }

    #[inline]
    pub fn mask(&self) -> u8 {
        1u8 << self.bit_index()
    }
}

/// A validated port index (0 = A, 1 = B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(u8);

impl Port {
    pub const A: Port = Port(0);
    pub const B: Port = Port(1);

    pub fn new(port: u8) -> Result<Self> {
        if port < PORT_COUNT {
            Ok(Port(port))
        } else {
            Err(Error::Port {
                port,
                max: PORT_COUNT - 1,
            })
        }
    }

    #[inline]
    pub fn index(&self) -> u8 {
        self.0
    }
}

/// Where a single pin lives for a given register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLocation {
    pub register: u8,
    pub mask: u8,
}

/// Maps a raw pin index onto its register and bit mask.
pub fn locate_pin(bank: Bank, pin: u8) -> Result<PinLocation> {
    let pin = Pin::new(pin)?;
    Ok(PinLocation {
        register: bank.register(pin.port()),
        mask: pin.mask(),
    })
}

/// Maps a raw port index onto its register.
pub fn locate_port(bank: Bank, port: u8) -> Result<u8> {
    Ok(bank.register(Port::new(port)?))
}
