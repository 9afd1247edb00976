use hidapi::HidApi;
use std::cell::RefCell;
use std::error::Error;
use wire_peripherals::{fram::INVALID_ID, Fram, HidBridge};

const DUMP_LEN: usize = 256;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    println!("Opening first XR2280x I2C bridge...");
    let bus = RefCell::new(HidBridge::open_first(&hid_api)?);

    let mut fram = Fram::new(&bus);
    fram.begin(None)?;

    let manufacturer = fram.get_manufacturer_id();
    if manufacturer == INVALID_ID {
        println!("Chip does not report a device id.");
    } else {
        println!(
            "Manufacturer 0x{:03X}, product 0x{:03X}, size {} KiB",
            manufacturer,
            fram.get_product_id(),
            fram.get_size()
        );
    }

    let mut buf = [0u8; DUMP_LEN];
    fram.read(0x0000, &mut buf)?;
    for (row, chunk) in buf.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("{:04X}: {}", row * 16, hex.join(" "));
    }
    Ok(())
}
