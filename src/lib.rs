//! # wire-peripherals
//!
//! Register-level drivers for three common two-wire (I²C) peripherals:
//!
//! *   **MCP23017** 16-pin GPIO expander ([`Mcp23017`]).
//! *   **MB85RC** family FRAM ([`Fram`]).
//! *   **INA226** current, voltage and power monitor ([`Ina226`]).
//!
//! All three follow the same pattern: typed, range-checked operations are
//! turned into a handful of addressed register reads and writes through a
//! transport port ([`TwoWire`]). Every fallible operation returns a
//! [`Result`]; each handle additionally keeps the outcome of its last
//! operation, which `last_error()` returns and resets.
//!
//! ## Features
//!
//! *   Transport port trait [`TwoWire`], implemented for `&mut W` and
//!     `&RefCell<W>` so a caller-owned bus can be lent to one or several drivers.
//! *   [`HalBus`]: transport over any `embedded-hal` 1.0 `I2c` implementation.
//! *   `HidBridge` (feature `hid-bridge`): transport over an XR2280x USB-HID
//!     I²C bridge, usable from a desktop.
//! *   GPIO expander: single-pin and whole-port direction, level, polarity
//!     and pull-up control.
//! *   FRAM: typed and block reads/writes, device identification, optional
//!     write-protect pin.
//! *   INA226: averaging, conversion times, operating mode, calibration,
//!     alert configuration and scaled readings.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use std::cell::RefCell;
//! use wire_peripherals::{gpio::Level, HalBus, Mcp23017, Result};
//! # fn bus() -> MyI2c { MyI2c }
//! # struct MyI2c;
//! # impl embedded_hal::i2c::ErrorType for MyI2c { type Error = embedded_hal::i2c::ErrorKind; }
//! # impl embedded_hal::i2c::I2c for MyI2c {
//! #     fn transaction(&mut self, _: u8, _: &mut [embedded_hal::i2c::Operation<'_>])
//! #         -> std::result::Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! fn main() -> Result<()> {
//!     let bus = RefCell::new(HalBus::new(bus()));
//!     let mut expander = Mcp23017::new(&bus, 0x27);
//!     expander.begin()?;
//!     expander.pin_mode8(0, 0x00)?; // port A all outputs
//!     expander.digital_write(3, Level::High)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Reporting
//!
//! Validation errors (pin, port, parameter) are detected before any bus
//! traffic. Transport errors are detected after the fact. Neither is ever
//! retried. Operations that depend on optional hardware which was never
//! configured (the FRAM write-protect pin) simply return `false`.

mod consts;
mod error;
pub mod fram;
mod frame;
pub mod gpio;
pub mod hal;
#[cfg(feature = "hid-bridge")]
pub mod hid;
pub mod i2c;
pub mod ina226;
pub mod mcp23017;
mod register;

pub use error::{Error, ErrorCode, Result, TransportFault};
pub use fram::Fram;
pub use hal::HalBus;
#[cfg(feature = "hid-bridge")]
pub use hid::HidBridge;
pub use i2c::TwoWire;
pub use ina226::Ina226;
pub use mcp23017::Mcp23017;

/// Publicly accessible bit masks and raw codes.
pub mod flags {
    /// INA226 mask/enable register bits, for use with
    /// [`Ina226::set_mask_enable`](crate::Ina226::set_mask_enable).
    pub mod ina226 {
        pub use crate::consts::ina226::alert::{
            BUS_OVER_VOLTAGE, BUS_UNDER_VOLTAGE, CONVERSION_READY, POWER_OVER_LIMIT,
            SHUNT_OVER_VOLTAGE, SHUNT_UNDER_VOLTAGE,
        };
        pub use crate::consts::ina226::alert_flags::{
            ALERT_FUNCTION_FLAG, ALERT_LATCH_ENABLE_FLAG, ALERT_POLARITY_FLAG,
            CONVERSION_READY_FLAG, MATH_OVERFLOW_FLAG,
        };
    }

    /// Raw diagnostic codes of the MCP23017 driver family.
    pub mod mcp23017 {
        pub use crate::consts::mcp23017::{
            CODE_ADDRESS_ERROR, CODE_CONNECT_ERROR, CODE_I2C_ERROR, CODE_OK, CODE_PIN_ERROR,
            CODE_PORT_ERROR, CODE_VALUE_ERROR, INVALID_READ,
        };
    }

    /// Raw diagnostic codes of the FRAM driver family.
    pub mod fram {
        pub use crate::consts::fram::{
            CODE_ERROR_ADDR, CODE_ERROR_CONNECT, CODE_ERROR_I2C, CODE_ERROR_OTHER, CODE_OK,
        };
    }
}
