//! [`TwoWire`] on top of any `embedded-hal` 1.0 I2C bus.
//!
//! Frames are buffered until `end_transmission` and then sent as one
//! `write`. A frame ended without a stop is held back and merged with the
//! following `request_from` into a single `write_read`, which gives the
//! repeated start the device-ID read of the FRAM needs.

use crate::frame::{Closed, FrameBuffer, ReadPlan};
use crate::i2c::{status, TwoWire, MAX_FRAME};
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use log::{trace, warn};

/// Status code reported for an `embedded-hal` error kind.
pub fn status_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => status::NACK_DATA,
        ErrorKind::NoAcknowledge(_) => status::NACK_ADDRESS,
        _ => status::OTHER,
    }
}

#[derive(Debug)]
pub struct HalBus<I> {
    i2c: I,
    frames: FrameBuffer,
    last_error: Option<ErrorKind>,
}

impl<I: I2c> HalBus<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            frames: FrameBuffer::new(),
            last_error: None,
        }
    }

    /// Gives the underlying bus back.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Error kind behind the most recent non-zero status, if any.
    pub fn last_error_kind(&self) -> Option<ErrorKind> {
        self.last_error
    }

    fn note(&mut self, result: Result<(), I::Error>, address: u8) -> u8 {
        match result {
            Ok(()) => status::SUCCESS,
            Err(e) => {
                let kind = e.kind();
                warn!("I2C error at 0x{:02X}: {:?}", address, kind);
                self.last_error = Some(kind);
                status_for(kind)
            }
        }
    }

    fn send(&mut self, address: u8, frame: &[u8]) -> u8 {
        trace!("I2C frame to 0x{:02X}: {:02X?}", address, frame);
        let result = self.i2c.write(address, frame);
        self.note(result, address)
    }
}

impl<I: I2c> TwoWire for HalBus<I> {
    fn begin(&mut self) {
        self.frames.reset();
    }

    fn begin_transmission(&mut self, address: u8) {
        if let Some((held_addr, frame)) = self.frames.open(address) {
            let code = self.send(held_addr, &frame);
            self.frames.settle_held(held_addr, code);
        }
    }

    fn write(&mut self, byte: u8) -> bool {
        self.frames.push(byte)
    }

    fn end_transmission(&mut self, send_stop: bool) -> u8 {
        match self.frames.close(send_stop) {
            Closed::Done(code) => code,
            Closed::Send(address, frame) => self.send(address, &frame),
        }
    }

    fn request_from(&mut self, address: u8, count: usize) -> usize {
        let plan = self.frames.plan_read(address);
        let count = count.min(MAX_FRAME);
        if count == 0 {
            return 0;
        }
        let mut buf = [0u8; MAX_FRAME];
        let result = match plan {
            ReadPlan::Combined(frame) => self.i2c.write_read(address, &frame, &mut buf[..count]),
            ReadPlan::Plain(held) => {
                if let Some((held_addr, frame)) = held {
                    let code = self.send(held_addr, &frame);
                    if code != status::SUCCESS {
                        warn!(
                            "Held frame to 0x{:02X} not delivered: status {}",
                            held_addr, code
                        );
                        return 0;
                    }
                }
                self.i2c.read(address, &mut buf[..count])
            }
        };
        if self.note(result, address) != status::SUCCESS {
            return 0;
        }
        trace!("I2C read from 0x{:02X}: {:02X?}", address, &buf[..count]);
        self.frames.fill(&buf[..count]);
        count
    }

    fn read(&mut self) -> Option<u8> {
        self.frames.pop()
    }
}
