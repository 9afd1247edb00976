//! INA226 current, voltage and power monitor.
//!
//! Configure first (averaging, conversion times, mode, calibration), then
//! read. Current and power readings are scaled by the current LSB fixed by
//! [`Ina226::set_max_current_shunt`]; before calibration they read as zero.

use crate::consts::ina226 as consts;
use crate::consts::ina226::config;
use crate::error::{Error, ErrorCode, Result, StickyError};
use crate::i2c::{self, TwoWire};
use crate::register::{self, RegisterBus};
use log::{debug, trace};

/// Address with A0 and A1 tied to GND.
pub const DEFAULT_ADDRESS: u8 = consts::ADDRESS_MIN;

/// Samples averaged per reading (configuration bits 11:9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Average {
    Samples1,
    Samples4,
    Samples16,
    Samples64,
    Samples128,
    Samples256,
    Samples512,
    Samples1024,
}

impl From<Average> for u8 {
    fn from(avg: Average) -> Self {
        avg as u8
    }
}

/// Conversion time for bus or shunt measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionTime {
    Us140,
    Us204,
    Us332,
    Us588,
    Us1100,
    Us2116,
    Us4156,
    Us8244,
}

impl From<ConversionTime> for u8 {
    fn from(time: ConversionTime) -> Self {
        time as u8
    }
}

impl ConversionTime {
    pub fn micros(self) -> u32 {
        match self {
            ConversionTime::Us140 => 140,
            ConversionTime::Us204 => 204,
            ConversionTime::Us332 => 332,
            ConversionTime::Us588 => 588,
            ConversionTime::Us1100 => 1100,
            ConversionTime::Us2116 => 2116,
            ConversionTime::Us4156 => 4156,
            ConversionTime::Us8244 => 8244,
        }
    }
}

/// Operating mode (configuration bits 2:0). Code 4 is a second shutdown code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ShutDown = 0,
    ShuntTriggered = 1,
    BusTriggered = 2,
    ShuntBusTriggered = 3,
    ShuntContinuous = 5,
    BusContinuous = 6,
    ShuntBusContinuous = 7,
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        mode as u8
    }
}

/// Bit position and width of one configuration field.
#[derive(Debug, Clone, Copy)]
struct Field {
    name: &'static str,
    mask: u16,
    shift: u8,
}

const AVERAGE: Field = Field {
    name: "average",
    mask: config::AVERAGE_MASK,
    shift: config::AVERAGE_SHIFT,
};
const BUS_CONVERSION: Field = Field {
    name: "bus voltage conversion time",
    mask: config::BUS_VC_MASK,
    shift: config::BUS_VC_SHIFT,
};
const SHUNT_CONVERSION: Field = Field {
    name: "shunt voltage conversion time",
    mask: config::SHUNT_VC_MASK,
    shift: config::SHUNT_VC_SHIFT,
};
const MODE: Field = Field {
    name: "mode",
    mask: config::MODE_MASK,
    shift: config::MODE_SHIFT,
};

impl Field {
    fn check(self, code: u8) -> Result<()> {
        if code > config::FIELD_MAX {
            Err(Error::Value(format!(
                "{} code {} (expected 0-{})",
                self.name,
                code,
                config::FIELD_MAX
            )))
        } else {
            Ok(())
        }
    }

    fn insert(self, reg: u16, code: u8) -> u16 {
        (reg & !self.mask) | ((u16::from(code) << self.shift) & self.mask)
    }

    fn extract(self, reg: u16) -> u8 {
        ((reg & self.mask) >> self.shift) as u8
    }
}

/// Derived calibration values for a given full-scale current and shunt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Amps per current-register LSB.
    pub current_lsb: f32,
    /// Value written to the calibration register.
    pub register: u16,
    /// Largest current representable with this LSB.
    pub max_current: f32,
}

impl Calibration {
    /// Validates the inputs and computes the calibration register value.
    pub fn compute(max_current: f32, shunt: f32) -> Result<Self> {
        // NaN fails every comparison, so test for the accepted range.
        if !(consts::MAX_CURRENT_MIN_A..=consts::MAX_CURRENT_MAX_A).contains(&max_current) {
            return Err(Error::Value(format!(
                "max current {} A (expected {}-{} A)",
                max_current,
                consts::MAX_CURRENT_MIN_A,
                consts::MAX_CURRENT_MAX_A
            )));
        }
        if !(shunt.is_finite() && shunt >= consts::SHUNT_MIN_OHM) {
            return Err(Error::Value(format!(
                "shunt {} Ohm (minimum {} Ohm)",
                shunt,
                consts::SHUNT_MIN_OHM
            )));
        }
        let current_lsb = max_current / 32768.0;
        let calib = (consts::CALIBRATION_SCALE / (current_lsb * shunt)).round();
        if calib < 1.0 || calib > f32::from(consts::CALIBRATION_MAX) {
            return Err(Error::Value(format!(
                "calibration {} does not fit the 15-bit register",
                calib
            )));
        }
        Ok(Self {
            current_lsb,
            register: calib as u16,
            max_current: current_lsb * 32768.0,
        })
    }
}

/// A handle to one INA226 on a two-wire bus.
#[derive(Debug)]
pub struct Ina226<W> {
    regs: RegisterBus<W>,
    error: StickyError,
    current_lsb: f32,
    max_current: f32,
    shunt: f32,
}

impl<W: TwoWire> Ina226<W> {
    pub fn new(bus: W, address: u8) -> Self {
        Self {
            regs: RegisterBus::new(bus, address),
            error: StickyError::default(),
            current_lsb: 0.0,
            max_current: 0.0,
            shunt: 0.0,
        }
    }

    pub fn address(&self) -> u8 {
        self.regs.address()
    }

    pub fn release(self) -> W {
        self.regs.release()
    }

    /// Initialises the bus and checks the chip answers.
    pub fn begin(&mut self) -> Result<()> {
        let result = i2c::check_address(self.address(), consts::ADDRESS_MIN, consts::ADDRESS_MAX)
            .and_then(|()| {
                self.regs.begin();
                self.regs.probe().map_err(register::probe_to_connect)
            });
        match &result {
            Ok(()) => debug!("INA226 at 0x{:02X} initialised", self.address()),
            Err(e) => debug!("INA226 begin failed: {}", e),
        }
        self.error.record(result)
    }

    pub fn is_connected(&mut self) -> bool {
        let result = self.regs.probe();
        self.error.record(result).is_ok()
    }

    // --- Readings ---

    /// Shunt voltage in volts.
    pub fn get_shunt_voltage(&mut self) -> Result<f32> {
        let result = self
            .read(consts::REG_SHUNT_VOLTAGE)
            .map(|raw| f32::from(raw as i16) * consts::SHUNT_LSB_V);
        self.error.record(result)
    }

    /// Bus voltage in volts.
    pub fn get_bus_voltage(&mut self) -> Result<f32> {
        let result = self
            .read(consts::REG_BUS_VOLTAGE)
            .map(|raw| f32::from(raw) * consts::BUS_LSB_V);
        self.error.record(result)
    }

    /// Power in watts.
    pub fn get_power(&mut self) -> Result<f32> {
        let lsb = self.current_lsb;
        let result = self
            .read(consts::REG_POWER)
            .map(|raw| f32::from(raw) * consts::POWER_LSB_FACTOR * lsb);
        self.error.record(result)
    }

    /// Current in amps; negative when flowing backwards through the shunt.
    pub fn get_current(&mut self) -> Result<f32> {
        let lsb = self.current_lsb;
        let result = self
            .read(consts::REG_CURRENT)
            .map(|raw| f32::from(raw as i16) * lsb);
        self.error.record(result)
    }

    pub fn get_shunt_voltage_mv(&mut self) -> Result<f32> {
        self.get_shunt_voltage().map(|v| v * 1e3)
    }

    pub fn get_bus_voltage_mv(&mut self) -> Result<f32> {
        self.get_bus_voltage().map(|v| v * 1e3)
    }

    pub fn get_power_mw(&mut self) -> Result<f32> {
        self.get_power().map(|p| p * 1e3)
    }

    pub fn get_current_ma(&mut self) -> Result<f32> {
        self.get_current().map(|i| i * 1e3)
    }

    // --- Configuration ---

    /// Software reset; calibration has to be redone afterwards.
    pub fn reset(&mut self) -> Result<()> {
        let result = self.read(consts::REG_CONFIGURATION).and_then(|cfg| {
            self.regs
                .write_reg16(consts::REG_CONFIGURATION, cfg | config::RESET)
        });
        if result.is_ok() {
            debug!("INA226 reset, calibration cleared");
            self.current_lsb = 0.0;
            self.max_current = 0.0;
            self.shunt = 0.0;
        }
        self.error.record(result)
    }

    /// Accepts an [`Average`] or its raw 0-7 code.
    pub fn set_average(&mut self, avg: impl Into<u8>) -> Result<()> {
        self.set_field(AVERAGE, avg.into())
    }

    pub fn get_average(&mut self) -> Result<u8> {
        self.get_field(AVERAGE)
    }

    pub fn set_bus_voltage_conversion_time(&mut self, bvct: impl Into<u8>) -> Result<()> {
        self.set_field(BUS_CONVERSION, bvct.into())
    }

    pub fn get_bus_voltage_conversion_time(&mut self) -> Result<u8> {
        self.get_field(BUS_CONVERSION)
    }

    pub fn set_shunt_voltage_conversion_time(&mut self, svct: impl Into<u8>) -> Result<()> {
        self.set_field(SHUNT_CONVERSION, svct.into())
    }

    pub fn get_shunt_voltage_conversion_time(&mut self) -> Result<u8> {
        self.get_field(SHUNT_CONVERSION)
    }

    /// Accepts a [`Mode`] or its raw 0-7 code.
    pub fn set_mode(&mut self, mode: impl Into<u8>) -> Result<()> {
        self.set_field(MODE, mode.into())
    }

    pub fn get_mode(&mut self) -> Result<u8> {
        self.get_field(MODE)
    }

    pub fn shut_down(&mut self) -> Result<()> {
        self.set_mode(Mode::ShutDown)
    }

    pub fn set_mode_shunt_trigger(&mut self) -> Result<()> {
        self.set_mode(Mode::ShuntTriggered)
    }

    pub fn set_mode_bus_trigger(&mut self) -> Result<()> {
        self.set_mode(Mode::BusTriggered)
    }

    pub fn set_mode_shunt_bus_trigger(&mut self) -> Result<()> {
        self.set_mode(Mode::ShuntBusTriggered)
    }

    pub fn set_mode_shunt_continuous(&mut self) -> Result<()> {
        self.set_mode(Mode::ShuntContinuous)
    }

    pub fn set_mode_bus_continuous(&mut self) -> Result<()> {
        self.set_mode(Mode::BusContinuous)
    }

    pub fn set_mode_shunt_bus_continuous(&mut self) -> Result<()> {
        self.set_mode(Mode::ShuntBusContinuous)
    }

    // --- Calibration ---

    /// Calibrates for a full-scale current (A) through a shunt (Ohm).
    ///
    /// Rejects max current outside 0.001-20 A and shunts below 0.001 Ohm
    /// without touching the bus.
    pub fn set_max_current_shunt(&mut self, max_current: f32, shunt: f32) -> Result<()> {
        let result = Calibration::compute(max_current, shunt).and_then(|cal| {
            debug!(
                "INA226 calibration: max {} A, shunt {} Ohm, LSB {} A, CAL 0x{:04X}",
                max_current, shunt, cal.current_lsb, cal.register
            );
            self.regs
                .write_reg16(consts::REG_CALIBRATION, cal.register)
                .map(|()| cal)
        });
        let result = result.map(|cal| {
            self.current_lsb = cal.current_lsb;
            self.max_current = cal.max_current;
            self.shunt = shunt;
        });
        self.error.record(result)
    }

    pub fn get_current_lsb(&self) -> f32 {
        self.current_lsb
    }

    pub fn get_current_lsb_ma(&self) -> f32 {
        self.current_lsb * 1e3
    }

    pub fn get_shunt(&self) -> f32 {
        self.shunt
    }

    pub fn get_max_current(&self) -> f32 {
        self.max_current
    }

    pub fn is_calibrated(&self) -> bool {
        self.current_lsb > 0.0
    }

    // --- Alert ---

    /// Writes the mask/enable register; see [`crate::flags::ina226`].
    pub fn set_mask_enable(&mut self, mask: u16) -> Result<()> {
        let result = self.regs.write_reg16(consts::REG_MASK_ENABLE, mask);
        self.error.record(result)
    }

    /// Reads the mask/enable register. Reading clears a latched alert.
    pub fn get_mask_enable(&mut self) -> Result<u16> {
        let result = self.read(consts::REG_MASK_ENABLE);
        self.error.record(result)
    }

    pub fn set_alert_limit(&mut self, limit: u16) -> Result<()> {
        let result = self.regs.write_reg16(consts::REG_ALERT_LIMIT, limit);
        self.error.record(result)
    }

    pub fn get_alert_limit(&mut self) -> Result<u16> {
        let result = self.read(consts::REG_ALERT_LIMIT);
        self.error.record(result)
    }

    // --- Meta ---

    /// 0x5449 ("TI") on genuine parts.
    pub fn get_manufacturer_id(&mut self) -> Result<u16> {
        let result = self.read(consts::REG_MANUFACTURER);
        self.error.record(result)
    }

    /// 0x2260 on genuine parts.
    pub fn get_die_id(&mut self) -> Result<u16> {
        let result = self.read(consts::REG_DIE_ID);
        self.error.record(result)
    }

    pub fn last_error(&mut self) -> ErrorCode {
        self.error.take()
    }

    // --- Helpers ---

    fn read(&mut self, reg: u8) -> Result<u16> {
        self.regs.read_reg16(reg)
    }

    fn set_field(&mut self, field: Field, code: u8) -> Result<()> {
        let result = field.check(code).and_then(|()| {
            let cfg = self.read(consts::REG_CONFIGURATION)?;
            let new_cfg = field.insert(cfg, code);
            trace!("INA226 {} = {} (config 0x{:04X})", field.name, code, new_cfg);
            self.regs.write_reg16(consts::REG_CONFIGURATION, new_cfg)
        });
        self.error.record(result)
    }

    fn get_field(&mut self, field: Field) -> Result<u8> {
        let result = self
            .read(consts::REG_CONFIGURATION)
            .map(|cfg| field.extract(cfg));
        self.error.record(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_field_insert_extract() {
        // Power-on default: avg 1, 1.1 ms both, shunt+bus continuous
        let cfg = 0x4127;
        assert_eq!(AVERAGE.extract(cfg), 0);
        assert_eq!(BUS_CONVERSION.extract(cfg), 4);
        assert_eq!(SHUNT_CONVERSION.extract(cfg), 4);
        assert_eq!(MODE.extract(cfg), 7);

        let cfg = AVERAGE.insert(cfg, Average::Samples64.into());
        assert_eq!(cfg, 0x4727);
        let cfg = MODE.insert(cfg, Mode::ShutDown.into());
        assert_eq!(cfg, 0x4720);
        assert_eq!(BUS_CONVERSION.extract(cfg), 4);
    }

    #[test]
    fn test_field_check() {
        assert!(AVERAGE.check(7).is_ok());
        assert!(AVERAGE.check(8).is_err());
        assert!(MODE.check(255).is_err());
    }

    #[test]
    fn test_calibration_compute() {
        let cal = Calibration::compute(10.0, 0.002).unwrap();
        assert_relative_eq!(cal.current_lsb, 10.0 / 32768.0, epsilon = 1e-9);
        // 0.00512 / (0.00030517578 * 0.002) = 8388.608
        assert_eq!(cal.register, 8389);
        assert_relative_eq!(cal.max_current, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_calibration_rejects() {
        assert!(Calibration::compute(30.0, 0.002).is_err());
        assert!(Calibration::compute(0.0009, 0.002).is_err());
        assert!(Calibration::compute(0.0, 0.002).is_err());
        assert!(Calibration::compute(-1.0, 0.002).is_err());
        assert!(Calibration::compute(10.0, 0.0).is_err());
        assert!(Calibration::compute(10.0, 0.0009).is_err());
        assert!(Calibration::compute(f32::NAN, 0.002).is_err());
        // LSB too fine for the register: 0.00512 / (3.05e-8 * 0.001) overflows
        assert!(Calibration::compute(0.001, 0.001).is_err());
    }

    #[test]
    fn test_conversion_time_micros() {
        assert_eq!(ConversionTime::Us1100.micros(), 1100);
        assert_eq!(u8::from(ConversionTime::Us1100), 4);
        assert_eq!(u8::from(Average::Samples1024), 7);
        assert_eq!(u8::from(Mode::ShuntBusContinuous), 7);
    }
}
