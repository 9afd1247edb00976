//! Internal constants, register addresses, and bit definitions.

// --- Two-wire completion status codes ---
pub mod status {
    pub const SUCCESS: u8 = 0;
    /// Frame did not fit the transmit buffer.
    pub const DATA_TOO_LONG: u8 = 1;
    /// Address byte was not acknowledged.
    pub const NACK_ADDRESS: u8 = 2;
    /// A data byte was not acknowledged.
    pub const NACK_DATA: u8 = 3;
    pub const OTHER: u8 = 4;
    pub const TIMEOUT: u8 = 5;
}

/// Size of the transmit/receive buffers of a typical two-wire master.
pub const WIRE_BUFFER_SIZE: usize = 32;

// --- MCP23017 16-bit port expander ---
pub mod mcp23017 {
    pub const ADDRESS_MIN: u8 = 0x20;
    pub const ADDRESS_MAX: u8 = 0x27;

    // Register Addresses (IOCON.BANK = 0)
    pub const REG_DDR_A: u8 = 0x00; // Data direction, 1 = input
    pub const REG_DDR_B: u8 = 0x01;
    pub const REG_POL_A: u8 = 0x02; // Input polarity, 1 = reversed
    pub const REG_POL_B: u8 = 0x03;
    pub const REG_IOCR: u8 = 0x0A; // I/O control
    pub const REG_PUR_A: u8 = 0x0C; // Pull-up resistors
    pub const REG_PUR_B: u8 = 0x0D;
    pub const REG_GPIO_A: u8 = 0x12;
    pub const REG_GPIO_B: u8 = 0x13;

    /// IOCON value with SEQOP set: address pointer does not auto-increment.
    pub const IOCR_NO_AUTO_INCREMENT: u8 = 0b0010_0000;

    // Raw diagnostic codes
    pub const CODE_OK: i32 = 0x00;
    pub const CODE_PIN_ERROR: i32 = 0x81;
    pub const CODE_I2C_ERROR: i32 = 0x82;
    pub const CODE_VALUE_ERROR: i32 = 0x83;
    pub const CODE_PORT_ERROR: i32 = 0x84;
    pub const CODE_ADDRESS_ERROR: i32 = 0x85;
    pub const CODE_CONNECT_ERROR: i32 = 0x86;
    pub const INVALID_READ: i32 = -100;
}

// --- MB85RC FRAM ---
pub mod fram {
    pub const ADDRESS_MIN: u8 = 0x50;
    pub const ADDRESS_MAX: u8 = 0x57;

    /// Reserved device-ID slave address (0xF8 as an 8-bit write address).
    pub const SLAVE_ID: u8 = 0x7C;

    /// Data bytes per write frame (buffer minus two memory-address bytes).
    pub const WRITE_CHUNK: usize = super::WIRE_BUFFER_SIZE - 2;
    pub const READ_CHUNK: usize = super::WIRE_BUFFER_SIZE;

    // Raw diagnostic codes
    pub const CODE_OK: i32 = 0;
    pub const CODE_ERROR_ADDR: i32 = -10;
    pub const CODE_ERROR_I2C: i32 = -11;
    pub const CODE_ERROR_CONNECT: i32 = -12;
    /// Reported for codes this driver never produces (pin/port/value).
    pub const CODE_ERROR_OTHER: i32 = -13;
}

// --- INA226 current/power monitor ---
pub mod ina226 {
    pub const ADDRESS_MIN: u8 = 0x40;
    pub const ADDRESS_MAX: u8 = 0x4F;

    // Register Addresses (16-bit, big-endian)
    pub const REG_CONFIGURATION: u8 = 0x00;
    pub const REG_SHUNT_VOLTAGE: u8 = 0x01;
    pub const REG_BUS_VOLTAGE: u8 = 0x02;
    pub const REG_POWER: u8 = 0x03;
    pub const REG_CURRENT: u8 = 0x04;
    pub const REG_CALIBRATION: u8 = 0x05;
    pub const REG_MASK_ENABLE: u8 = 0x06;
    pub const REG_ALERT_LIMIT: u8 = 0x07;
    pub const REG_MANUFACTURER: u8 = 0xFE;
    pub const REG_DIE_ID: u8 = 0xFF;

    // Configuration Register Bits/Masks
    pub mod config {
        pub const RESET: u16 = 0x8000;
        pub const AVERAGE_MASK: u16 = 0x0E00;
        pub const AVERAGE_SHIFT: u8 = 9;
        pub const BUS_VC_MASK: u16 = 0x01C0;
        pub const BUS_VC_SHIFT: u8 = 6;
        pub const SHUNT_VC_MASK: u16 = 0x0038;
        pub const SHUNT_VC_SHIFT: u8 = 3;
        pub const MODE_MASK: u16 = 0x0007;
        pub const MODE_SHIFT: u8 = 0;
        /// Largest 3-bit field code.
        pub const FIELD_MAX: u8 = 7;
    }

    // Mask/Enable Register: alert sources
    pub mod alert {
        pub const SHUNT_OVER_VOLTAGE: u16 = 0x8000;
        pub const SHUNT_UNDER_VOLTAGE: u16 = 0x4000;
        pub const BUS_OVER_VOLTAGE: u16 = 0x2000;
        pub const BUS_UNDER_VOLTAGE: u16 = 0x1000;
        pub const POWER_OVER_LIMIT: u16 = 0x0800;
        pub const CONVERSION_READY: u16 = 0x0400;
    }

    // Mask/Enable Register: status and alert-pin configuration
    pub mod alert_flags {
        pub const ALERT_FUNCTION_FLAG: u16 = 0x0010;
        pub const CONVERSION_READY_FLAG: u16 = 0x0008;
        pub const MATH_OVERFLOW_FLAG: u16 = 0x0004;
        pub const ALERT_POLARITY_FLAG: u16 = 0x0002;
        pub const ALERT_LATCH_ENABLE_FLAG: u16 = 0x0001;
    }

    // LSB weights
    pub const SHUNT_LSB_V: f32 = 2.5e-6;
    pub const BUS_LSB_V: f32 = 1.25e-3;
    pub const POWER_LSB_FACTOR: f32 = 25.0;
    /// Fixed constant of the calibration equation.
    pub const CALIBRATION_SCALE: f32 = 0.00512;
    /// Calibration register is 15 bits wide.
    pub const CALIBRATION_MAX: u16 = 0x7FFF;

    // Calibration input limits
    pub const MAX_CURRENT_MIN_A: f32 = 0.001;
    pub const MAX_CURRENT_MAX_A: f32 = 20.0;
    pub const SHUNT_MIN_OHM: f32 = 0.001;
}
