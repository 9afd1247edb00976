//! The two-wire transport port the drivers talk through.
//!
//! Drivers never own the bus. They are generic over [`TwoWire`] and the crate
//! implements the trait for `&mut W` and `&RefCell<W>`, so the caller keeps
//! the bus and lends it out, either to one driver at a time or to several
//! drivers sharing it on one thread.

use crate::consts;
use crate::error::{Error, Result};
use std::cell::RefCell;

pub use crate::consts::status;

/// Synchronous request/response byte channel to addressed devices.
///
/// The shape follows the classic two-wire master API: a transmission is
/// opened for an address, bytes are buffered with [`TwoWire::write`], and the
/// frame goes out on [`TwoWire::end_transmission`], which returns a completion
/// status (see [`status`]). Reads are requested with
/// [`TwoWire::request_from`] and then drained byte by byte.
///
/// Implementations may block; drivers add no timeouts or retries of their own.
pub trait TwoWire {
    /// Brings up the bus master. Called from each driver's `begin()`.
    fn begin(&mut self);

    /// Opens a transmit frame for the 7-bit `address`.
    fn begin_transmission(&mut self, address: u8);

    /// Buffers one byte. Returns false when the transmit buffer is full.
    fn write(&mut self, byte: u8) -> bool;

    /// Sends the buffered frame.
    ///
    /// With `send_stop` false the bus is held for a repeated start before the
    /// next [`TwoWire::request_from`]. Returns 0 on success.
    fn end_transmission(&mut self, send_stop: bool) -> u8;

    /// Reads up to `count` bytes from `address` and returns how many arrived.
    fn request_from(&mut self, address: u8, count: usize) -> usize;

    /// Takes the next received byte, if any is left.
    fn read(&mut self) -> Option<u8>;
}

impl<W: TwoWire + ?Sized> TwoWire for &mut W {
    fn begin(&mut self) {
        (**self).begin()
    }
    fn begin_transmission(&mut self, address: u8) {
        (**self).begin_transmission(address)
    }
    fn write(&mut self, byte: u8) -> bool {
        (**self).write(byte)
    }
    fn end_transmission(&mut self, send_stop: bool) -> u8 {
        (**self).end_transmission(send_stop)
    }
    fn request_from(&mut self, address: u8, count: usize) -> usize {
        (**self).request_from(address, count)
    }
    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }
}

// Shared on one thread: each call borrows for its own duration only.
impl<W: TwoWire> TwoWire for &RefCell<W> {
    fn begin(&mut self) {
        self.borrow_mut().begin()
    }
    fn begin_transmission(&mut self, address: u8) {
        self.borrow_mut().begin_transmission(address)
    }
    fn write(&mut self, byte: u8) -> bool {
        self.borrow_mut().write(byte)
    }
    fn end_transmission(&mut self, send_stop: bool) -> u8 {
        self.borrow_mut().end_transmission(send_stop)
    }
    fn request_from(&mut self, address: u8, count: usize) -> usize {
        self.borrow_mut().request_from(address, count)
    }
    fn read(&mut self) -> Option<u8> {
        self.borrow_mut().read()
    }
}

/// Checks that `address` lies within a device family's strap range.
pub(crate) fn check_address(address: u8, min: u8, max: u8) -> Result<()> {
    if (min..=max).contains(&address) {
        Ok(())
    } else {
        Err(Error::Address { address, min, max })
    }
}

/// Human-readable meaning of a completion status.
pub fn describe_status(code: u8) -> &'static str {
    match code {
        status::SUCCESS => "success",
        status::DATA_TOO_LONG => "data too long for transmit buffer",
        status::NACK_ADDRESS => "address not acknowledged",
        status::NACK_DATA => "data not acknowledged",
        status::TIMEOUT => "timeout",
        _ => "other bus error",
    }
}

/// Largest frame a driver will hand to a transport in one go.
pub const MAX_FRAME: usize = consts::WIRE_BUFFER_SIZE;
