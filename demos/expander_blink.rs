use hidapi::HidApi;
use std::cell::RefCell;
use std::{error::Error, thread, time::Duration};
use wire_peripherals::{gpio::Level, HidBridge, Mcp23017};

// Expander with A0-A2 tied low
const EXPANDER_ADDRESS: u8 = 0x20;
// Pin 8 = GPB0
const BLINK_PIN_NUM: u8 = 8;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    println!("Opening first XR2280x I2C bridge...");
    let bus = RefCell::new(HidBridge::open_first(&hid_api)?);
    println!("Bridge opened.");

    let mut expander = Mcp23017::new(&bus, EXPANDER_ADDRESS);
    if let Err(e) = expander.begin() {
        eprintln!("Error: no MCP23017 at 0x{:02X}: {}", EXPANDER_ADDRESS, e);
        return Ok(());
    }

    println!("Configuring pin {} for blinking...", BLINK_PIN_NUM);
    expander.pin_mode(BLINK_PIN_NUM, wire_peripherals::gpio::OUTPUT)?;
    expander.set_pullup(BLINK_PIN_NUM, false)?; // Ensure pull-up off

    println!("Blinking pin {} (Press Ctrl+C to stop)", BLINK_PIN_NUM);
    loop {
        expander.digital_write(BLINK_PIN_NUM, Level::High)?;
        thread::sleep(Duration::from_millis(250));
        expander.digital_write(BLINK_PIN_NUM, Level::Low)?;
        thread::sleep(Duration::from_millis(250));
    }
}
