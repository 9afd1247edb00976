use hidapi::HidApi;
use std::cell::RefCell;
use std::{error::Error, thread, time::Duration};
use wire_peripherals::ina226::{Average, ConversionTime};
use wire_peripherals::{HidBridge, Ina226};

const MONITOR_ADDRESS: u8 = 0x40;
const MAX_CURRENT_A: f32 = 0.8;
const SHUNT_OHM: f32 = 0.1;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    println!("Opening first XR2280x I2C bridge...");
    let bridge = match HidBridge::open_first(&hid_api) {
        Ok(bridge) => bridge,
        Err(e) => {
            eprintln!("Error opening bridge: {}", e);
            eprintln!(
                "Ensure device is connected and permissions are set (e.g., udev rules on Linux)."
            );
            return Err(e.into());
        }
    };
    let bus = RefCell::new(bridge);

    let mut ina = Ina226::new(&bus, MONITOR_ADDRESS);
    ina.begin()?;
    println!(
        "INA226 found (manufacturer 0x{:04X}, die 0x{:04X})",
        ina.get_manufacturer_id()?,
        ina.get_die_id()?
    );

    ina.set_average(Average::Samples16)?;
    ina.set_bus_voltage_conversion_time(ConversionTime::Us1100)?;
    ina.set_shunt_voltage_conversion_time(ConversionTime::Us1100)?;
    ina.set_mode_shunt_bus_continuous()?;
    ina.set_max_current_shunt(MAX_CURRENT_A, SHUNT_OHM)?;
    println!(
        "Calibrated: LSB {:.4} mA, max {:.3} A",
        ina.get_current_lsb_ma(),
        ina.get_max_current()
    );

    println!("   BUS(V)  SHUNT(mV)  CURRENT(mA)  POWER(mW)");
    for _ in 0..20 {
        println!(
            "{:8.3} {:10.3} {:12.3} {:10.3}",
            ina.get_bus_voltage()?,
            ina.get_shunt_voltage_mv()?,
            ina.get_current_ma()?,
            ina.get_power_mw()?
        );
        thread::sleep(Duration::from_millis(500));
    }

    ina.shut_down()?;
    Ok(())
}
