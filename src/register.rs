//! Register access layer shared by all drivers.
//!
//! Moves raw bytes and words between a register address and the device. It
//! knows nothing about bit meanings and does not touch any sticky error
//! state; the drivers record outcomes at their public boundary.

use crate::consts::status;
use crate::error::{Error, Result, TransportFault};
use crate::i2c::TwoWire;
use log::{trace, warn};

#[derive(Debug)]
pub(crate) struct RegisterBus<W> {
    bus: W,
    address: u8,
}

impl<W: TwoWire> RegisterBus<W> {
    pub(crate) fn new(bus: W, address: u8) -> Self {
        Self { bus, address }
    }

    #[inline]
    pub(crate) fn address(&self) -> u8 {
        self.address
    }

    pub(crate) fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    pub(crate) fn begin(&mut self) {
        self.bus.begin();
    }

    pub(crate) fn release(self) -> W {
        self.bus
    }

    /// Zero-length write to see whether anything acknowledges the address.
    pub(crate) fn probe(&mut self) -> Result<()> {
        self.bus.begin_transmission(self.address);
        let code = self.bus.end_transmission(true);
        trace!("Probe 0x{:02X}: status {}", self.address, code);
        self.check(self.address, code)
    }

    pub(crate) fn write_reg8(&mut self, reg: u8, value: u8) -> Result<()> {
        trace!("Write reg 0x{:02X} = 0x{:02X} @0x{:02X}", reg, value, self.address);
        self.write_frame(&[reg, value])
    }

    pub(crate) fn read_reg8(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_frame(&[reg], &mut buf)?;
        trace!("Read reg 0x{:02X} = 0x{:02X} @0x{:02X}", reg, buf[0], self.address);
        Ok(buf[0])
    }

    /// 16-bit registers travel most significant byte first.
    pub(crate) fn write_reg16(&mut self, reg: u8, value: u16) -> Result<()> {
        let [hi, lo] = value.to_be_bytes();
        trace!("Write reg 0x{:02X} = 0x{:04X} @0x{:02X}", reg, value, self.address);
        self.write_frame(&[reg, hi, lo])
    }

    pub(crate) fn read_reg16(&mut self, reg: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_frame(&[reg], &mut buf)?;
        let value = u16::from_be_bytes(buf);
        trace!("Read reg 0x{:02X} = 0x{:04X} @0x{:02X}", reg, value, self.address);
        Ok(value)
    }

    /// Sends `bytes` as one frame to the device address.
    pub(crate) fn write_frame(&mut self, bytes: &[u8]) -> Result<()> {
        let address = self.address;
        self.bus.begin_transmission(address);
        for &b in bytes {
            if !self.bus.write(b) {
                // Close the frame anyway so the transport is left idle.
                let _ = self.bus.end_transmission(true);
                return Err(Self::fault(address, TransportFault::Status(status::DATA_TOO_LONG)));
            }
        }
        let code = self.bus.end_transmission(true);
        self.check(address, code)
    }

    /// Writes `prefix` to the device, then reads `buf.len()` bytes back.
    pub(crate) fn read_frame(&mut self, prefix: &[u8], buf: &mut [u8]) -> Result<()> {
        let address = self.address;
        self.transfer(address, prefix, buf, true)
    }

    /// Write-then-read against an arbitrary address (e.g. a reserved ID slot).
    pub(crate) fn transfer(
        &mut self,
        address: u8,
        prefix: &[u8],
        buf: &mut [u8],
        send_stop: bool,
    ) -> Result<()> {
        self.bus.begin_transmission(address);
        for &b in prefix {
            if !self.bus.write(b) {
                let _ = self.bus.end_transmission(true);
                return Err(Self::fault(address, TransportFault::Status(status::DATA_TOO_LONG)));
            }
        }
        let code = self.bus.end_transmission(send_stop);
        self.check(address, code)?;

        let expected = buf.len();
        let actual = self.bus.request_from(address, expected);
        if actual < expected {
            warn!(
                "Short read from 0x{:02X}: got {} of {} bytes",
                address, actual, expected
            );
            return Err(Self::fault(address, TransportFault::ShortRead { expected, actual }));
        }
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.bus.read() {
                Some(b) => *slot = b,
                None => {
                    warn!("Receive buffer from 0x{:02X} drained after {} bytes", address, i);
                    return Err(Self::fault(
                        address,
                        TransportFault::ShortRead { expected, actual: i },
                    ));
                }
            }
        }
        Ok(())
    }

    fn check(&self, address: u8, code: u8) -> Result<()> {
        if code == status::SUCCESS {
            Ok(())
        } else {
            warn!(
                "Transport failure at 0x{:02X}: status {} ({})",
                address,
                code,
                crate::i2c::describe_status(code)
            );
            Err(Self::fault(address, TransportFault::Status(code)))
        }
    }

    fn fault(address: u8, fault: TransportFault) -> Error {
        Error::Transport { address, fault }
    }
}

/// Maps a failed probe during `begin()`: an unanswered address means the
/// device is not there, anything else is a bus problem.
pub(crate) fn probe_to_connect(err: Error) -> Error {
    match err {
        Error::Transport {
            address,
            fault: TransportFault::Status(status::NACK_ADDRESS),
        } => Error::Connect { address },
        other => other,
    }
}
