//! `HalBus` against a scripted embedded-hal I2C bus.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use std::cell::RefCell;
use wire_peripherals::i2c::{status, TwoWire};
use wire_peripherals::{Error, Fram, HalBus, Mcp23017};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Write(Vec<u8>),
    Read(usize),
}

/// Answers for the addresses in `present` and fills reads from `reply`.
#[derive(Debug, Default)]
struct FakeI2c {
    present: Vec<u8>,
    reply: Vec<u8>,
    nack_data: bool,
    /// One entry per bus transaction.
    log: Vec<(u8, Vec<Step>)>,
}

impl FakeI2c {
    fn with_devices(present: &[u8]) -> Self {
        Self {
            present: present.to_vec(),
            ..Default::default()
        }
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let steps = operations
            .iter()
            .map(|op| match op {
                Operation::Write(bytes) => Step::Write(bytes.to_vec()),
                Operation::Read(buf) => Step::Read(buf.len()),
            })
            .collect();
        self.log.push((address, steps));

        if !self.present.contains(&address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        if self.nack_data {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }
        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                for (slot, b) in buf.iter_mut().zip(self.reply.iter().cycle()) {
                    *slot = *b;
                }
            }
        }
        Ok(())
    }
}

#[test]
fn test_probe_maps_nack_to_status() {
    let mut bus = HalBus::new(FakeI2c::with_devices(&[0x20]));

    bus.begin_transmission(0x21);
    assert_eq!(bus.end_transmission(true), status::NACK_ADDRESS);
    assert_eq!(
        bus.last_error_kind(),
        Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
    );

    bus.begin_transmission(0x20);
    assert_eq!(bus.end_transmission(true), status::SUCCESS);
}

#[test]
fn test_data_nack() {
    let mut fake = FakeI2c::with_devices(&[0x20]);
    fake.nack_data = true;
    let mut bus = HalBus::new(fake);

    bus.begin_transmission(0x20);
    assert!(bus.write(0x12));
    assert_eq!(bus.end_transmission(true), status::NACK_DATA);
}

#[test]
fn test_write_without_stop_merges_into_read() {
    let mut fake = FakeI2c::with_devices(&[0x7C]);
    fake.reply = vec![0x00, 0xA5, 0x10];
    let mut bus = HalBus::new(fake);

    bus.begin_transmission(0x7C);
    assert!(bus.write(0xA0));
    assert_eq!(bus.end_transmission(false), status::SUCCESS);
    assert_eq!(bus.request_from(0x7C, 3), 3);
    assert_eq!(bus.read(), Some(0x00));
    assert_eq!(bus.read(), Some(0xA5));
    assert_eq!(bus.read(), Some(0x10));
    assert_eq!(bus.read(), None);

    let fake = bus.release();
    assert_eq!(
        fake.log,
        vec![(0x7C, vec![Step::Write(vec![0xA0]), Step::Read(3)])]
    );
}

#[test]
fn test_held_write_is_flushed_by_next_frame() {
    let mut bus = HalBus::new(FakeI2c::with_devices(&[0x20, 0x21]));

    bus.begin_transmission(0x20);
    bus.write(0x01);
    assert_eq!(bus.end_transmission(false), status::SUCCESS);
    bus.begin_transmission(0x21);
    bus.write(0x02);
    assert_eq!(bus.end_transmission(true), status::SUCCESS);

    let fake = bus.release();
    assert_eq!(
        fake.log,
        vec![
            (0x20, vec![Step::Write(vec![0x01])]),
            (0x21, vec![Step::Write(vec![0x02])]),
        ]
    );
}

#[test]
fn test_undelivered_held_write_fails_next_frame() {
    let mut bus = HalBus::new(FakeI2c::with_devices(&[0x21]));

    bus.begin_transmission(0x20);
    bus.write(0x01);
    assert_eq!(bus.end_transmission(false), status::SUCCESS);
    bus.begin_transmission(0x21);
    bus.write(0x02);
    assert_eq!(bus.end_transmission(true), status::NACK_ADDRESS);

    // Reported once; the bus is usable again afterwards.
    bus.begin_transmission(0x21);
    bus.write(0x02);
    assert_eq!(bus.end_transmission(true), status::SUCCESS);

    let fake = bus.release();
    assert_eq!(
        fake.log,
        vec![
            (0x20, vec![Step::Write(vec![0x01])]),
            (0x21, vec![Step::Write(vec![0x02])]),
        ]
    );
}

#[test]
fn test_undelivered_held_write_fails_read_elsewhere() {
    let mut fake = FakeI2c::with_devices(&[0x21]);
    fake.reply = vec![0x55];
    let mut bus = HalBus::new(fake);

    bus.begin_transmission(0x20);
    bus.write(0x01);
    assert_eq!(bus.end_transmission(false), status::SUCCESS);
    assert_eq!(bus.request_from(0x21, 1), 0);
    assert_eq!(bus.read(), None);
    assert_eq!(bus.release().log.len(), 1, "read not attempted");
}

#[test]
fn test_frame_overflow() {
    let mut bus = HalBus::new(FakeI2c::with_devices(&[0x50]));

    bus.begin_transmission(0x50);
    for i in 0..32u8 {
        assert!(bus.write(i));
    }
    assert!(!bus.write(32));
    assert_eq!(bus.end_transmission(true), status::DATA_TOO_LONG);
    assert!(bus.release().log.is_empty());
}

#[test]
fn test_expander_begin_over_hal_bus() {
    let bus = RefCell::new(HalBus::new(FakeI2c::with_devices(&[0x20])));

    let mut missing = Mcp23017::new(&bus, 0x24);
    assert_eq!(missing.begin(), Err(Error::Connect { address: 0x24 }));

    let mut present = Mcp23017::new(&bus, 0x20);
    assert_eq!(present.begin(), Ok(()));

    let fake = bus.into_inner().release();
    assert_eq!(fake.log.len(), 5); // failed probe, probe, IOCON, GPPU A, GPPU B
    assert_eq!(fake.log[2], (0x20, vec![Step::Write(vec![0x0A, 0x20])]));
}

#[test]
fn test_fram_identification_over_hal_bus() {
    let mut fake = FakeI2c::with_devices(&[0x50, 0x7C]);
    fake.reply = vec![0x00, 0xA5, 0x10];
    let bus = RefCell::new(HalBus::new(fake));
    let mut fram = Fram::new(&bus);

    fram.begin(None).unwrap();
    assert_eq!(fram.get_manufacturer_id(), 0x00A);
    assert_eq!(fram.get_product_id(), 0x510);
    assert_eq!(fram.get_size(), 32);
}
