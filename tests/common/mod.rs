//! Hand-written bus mock shared by the integration tests.
//!
//! `MockBus` routes frames to simulated peripherals by address and counts
//! every transaction that reaches the wire, so tests can assert that a
//! rejected call never touched the bus.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use wire_peripherals::i2c::{status, TwoWire};

/// A simulated device behind one bus address.
pub trait Peripheral {
    /// Handles a written frame. Returns false to NACK a data byte.
    fn on_write(&mut self, bytes: &[u8]) -> bool;
    /// Produces up to `count` bytes for a read.
    fn on_read(&mut self, count: usize) -> Vec<u8>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write { address: u8, bytes: Vec<u8>, stop: bool },
    Read { address: u8, count: usize },
}

#[derive(Default)]
pub struct MockBus {
    devices: BTreeMap<u8, Rc<RefCell<dyn Peripheral>>>,
    pub began: bool,
    pub log: Vec<Op>,
    /// When set, every end_transmission reports this status.
    pub forced_status: Option<u8>,
    /// When set, reads deliver nothing.
    pub starve_reads: bool,
    target: u8,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<P: Peripheral + 'static>(&mut self, address: u8, device: Rc<RefCell<P>>) {
        self.devices.insert(address, device);
    }

    /// Number of frames and read requests that reached the wire.
    pub fn transactions(&self) -> usize {
        self.log.len()
    }

    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.log
            .iter()
            .filter_map(|op| match op {
                Op::Write { address: a, bytes, .. } if *a == address => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

impl TwoWire for MockBus {
    fn begin(&mut self) {
        self.began = true;
    }

    fn begin_transmission(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
    }

    fn write(&mut self, byte: u8) -> bool {
        if self.tx.len() >= 32 {
            return false;
        }
        self.tx.push(byte);
        true
    }

    fn end_transmission(&mut self, send_stop: bool) -> u8 {
        let bytes = std::mem::take(&mut self.tx);
        self.log.push(Op::Write {
            address: self.target,
            bytes: bytes.clone(),
            stop: send_stop,
        });
        if let Some(code) = self.forced_status {
            return code;
        }
        match self.devices.get(&self.target) {
            None => status::NACK_ADDRESS,
            Some(_) if bytes.is_empty() => status::SUCCESS,
            Some(dev) => {
                if dev.borrow_mut().on_write(&bytes) {
                    status::SUCCESS
                } else {
                    status::NACK_DATA
                }
            }
        }
    }

    fn request_from(&mut self, address: u8, count: usize) -> usize {
        self.log.push(Op::Read { address, count });
        self.rx.clear();
        if self.starve_reads {
            return 0;
        }
        if let Some(dev) = self.devices.get(&address) {
            let data = dev.borrow_mut().on_read(count);
            self.rx.extend(data.into_iter().take(count));
        }
        self.rx.len()
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

/// 8-bit register file with a pointer that does not auto-increment.
pub struct RegisterBank8 {
    pub regs: [u8; 256],
    /// Data written to this register is not acknowledged.
    pub nack_register: Option<u8>,
    pointer: u8,
}

impl RegisterBank8 {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            regs: [0u8; 256],
            nack_register: None,
            pointer: 0,
        }))
    }
}

impl Peripheral for RegisterBank8 {
    fn on_write(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > 1 && self.nack_register == Some(bytes[0]) {
            return false;
        }
        self.pointer = bytes[0];
        for &b in &bytes[1..] {
            self.regs[self.pointer as usize] = b;
        }
        true
    }

    fn on_read(&mut self, count: usize) -> Vec<u8> {
        vec![self.regs[self.pointer as usize]; count]
    }
}

/// 16-bit big-endian register file.
pub struct RegisterBank16 {
    pub regs: [u16; 256],
    pointer: u8,
}

impl RegisterBank16 {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            regs: [0u16; 256],
            pointer: 0,
        }))
    }
}

impl Peripheral for RegisterBank16 {
    fn on_write(&mut self, bytes: &[u8]) -> bool {
        self.pointer = bytes[0];
        if bytes.len() >= 3 {
            self.regs[self.pointer as usize] = u16::from_be_bytes([bytes[1], bytes[2]]);
        }
        true
    }

    fn on_read(&mut self, count: usize) -> Vec<u8> {
        let [hi, lo] = self.regs[self.pointer as usize].to_be_bytes();
        [hi, lo].into_iter().cycle().take(count).collect()
    }
}

/// 64 KiB byte-addressed memory with a 16-bit auto-incrementing pointer.
pub struct FramChip {
    pub memory: Vec<u8>,
    pointer: u16,
}

impl FramChip {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            memory: vec![0u8; 0x1_0000],
            pointer: 0,
        }))
    }
}

impl Peripheral for FramChip {
    fn on_write(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() < 2 {
            return true;
        }
        self.pointer = u16::from_be_bytes([bytes[0], bytes[1]]);
        for &b in &bytes[2..] {
            self.memory[self.pointer as usize] = b;
            self.pointer = self.pointer.wrapping_add(1);
        }
        true
    }

    fn on_read(&mut self, count: usize) -> Vec<u8> {
        (0..count)
            .map(|_| {
                let b = self.memory[self.pointer as usize];
                self.pointer = self.pointer.wrapping_add(1);
                b
            })
            .collect()
    }
}

/// Reserved device-ID slave answering with fixed identification bytes.
pub struct DeviceId {
    pub id: [u8; 3],
    pub selected: Option<u8>,
}

impl DeviceId {
    pub fn new(id: [u8; 3]) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self { id, selected: None }))
    }
}

impl Peripheral for DeviceId {
    fn on_write(&mut self, bytes: &[u8]) -> bool {
        self.selected = bytes.first().copied();
        true
    }

    fn on_read(&mut self, count: usize) -> Vec<u8> {
        self.id.iter().copied().take(count).collect()
    }
}
