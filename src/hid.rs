//! [`TwoWire`] over an Exar/MaxLinear XR2280x USB-HID I2C bridge.
//!
//! Each frame becomes one I2C OUT report (flags, write size, read size,
//! slave address, up to 32 data bytes); the IN report that follows carries
//! the status flags and any read data. Enabled by the `hid-bridge` feature.

use crate::frame::{Closed, FrameBuffer, ReadPlan};
use crate::i2c::{status, TwoWire, MAX_FRAME};
use hidapi::{HidApi, HidDevice, HidResult};
use log::{debug, trace, warn};

/// Exar Corporation vendor ID.
pub const EXAR_VID: u16 = 0x04E2;
/// Product ID of the I2C HID interface (common for XR22800/1/2/4).
pub const XR2280X_I2C_PID: u16 = 0x1100;

/// Default I2C timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: i32 = 500;

/// OUT report: Flags(1) + WrSize(1) + RdSize(1) + SlaveAddr(1) + Data(32)
pub const OUT_REPORT_SIZE: usize = 36;
/// IN report: Flags(1) + WrSize(1) + RdSize(1) + Reserved(1) + Data(32)
pub const IN_REPORT_SIZE: usize = 36;
const REPORT_HEADER: usize = 4;

pub mod out_flags {
    pub const START_BIT: u8 = 1 << 0;
    pub const STOP_BIT: u8 = 1 << 1;
}

pub mod in_flags {
    pub const REQUEST_ERROR: u8 = 1 << 0;
    pub const NAK_RECEIVED: u8 = 1 << 1;
    pub const ARBITRATION_LOST: u8 = 1 << 2;
    pub const TIMEOUT: u8 = 1 << 3;
}

/// Maps IN report status flags onto a completion status.
pub fn status_for_flags(flags: u8) -> u8 {
    if flags & in_flags::REQUEST_ERROR != 0 {
        status::OTHER
    } else if flags & in_flags::NAK_RECEIVED != 0 {
        status::NACK_ADDRESS
    } else if flags & in_flags::ARBITRATION_LOST != 0 {
        status::OTHER
    } else if flags & in_flags::TIMEOUT != 0 {
        status::TIMEOUT
    } else {
        status::SUCCESS
    }
}

/// Builds the OUT report for one write-then-read exchange with start and
/// stop. Both lengths are clamped to one frame.
pub fn encode_out_report(address: u8, write: &[u8], read_len: usize) -> [u8; OUT_REPORT_SIZE] {
    let write = &write[..write.len().min(MAX_FRAME)];
    let mut report = [0u8; OUT_REPORT_SIZE];
    report[0] = out_flags::START_BIT | out_flags::STOP_BIT;
    report[1] = write.len() as u8;
    report[2] = read_len.min(MAX_FRAME) as u8;
    report[3] = address;
    report[REPORT_HEADER..REPORT_HEADER + write.len()].copy_from_slice(write);
    report
}

/// Splits an IN report into a completion status and the read data, at most
/// `read_len` bytes. Failed or truncated reports carry no data.
pub fn decode_in_report(report: &[u8], read_len: usize) -> (u8, &[u8]) {
    if report.len() < REPORT_HEADER {
        return (status::OTHER, &[]);
    }
    let code = status_for_flags(report[0]);
    if code != status::SUCCESS {
        return (code, &[]);
    }
    let got = usize::from(report[2])
        .min(read_len)
        .min(report.len() - REPORT_HEADER);
    (status::SUCCESS, &report[REPORT_HEADER..REPORT_HEADER + got])
}

/// A bus master backed by the bridge's I2C HID interface.
/// **Note:** This handle is not thread-safe (`!Send`, `!Sync`).
pub struct HidBridge {
    device: HidDevice,
    timeout_ms: i32,
    frames: FrameBuffer,
}

impl HidBridge {
    /// Opens the first bridge found. **Warning:** Ambiguous if multiple devices exist.
    pub fn open_first(hid_api: &HidApi) -> HidResult<Self> {
        let device = hid_api.open(EXAR_VID, XR2280X_I2C_PID)?;
        debug!(
            "Opened XR2280x I2C interface: VID={:04X}, PID={:04X}",
            EXAR_VID, XR2280X_I2C_PID
        );
        Ok(Self::from_device(device))
    }

    /// Wraps an already opened I2C HID interface.
    pub fn from_device(device: HidDevice) -> Self {
        Self {
            device,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            frames: FrameBuffer::new(),
        }
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: i32) {
        self.timeout_ms = timeout_ms;
    }

    /// One write-then-read exchange. Returns the completion status and the
    /// number of bytes placed in `read`.
    fn transfer(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> (u8, usize) {
        let out_buf = encode_out_report(address, write, read.len());
        trace!(
            "I2C OUT Report Buffer (addr=0x{:02X}): {:02X?}",
            address,
            &out_buf[..REPORT_HEADER + usize::from(out_buf[1])]
        );

        match self.device.write(&out_buf) {
            Ok(n) if n == out_buf.len() => {}
            Ok(n) => {
                warn!("hidapi write returned unexpected length: {} (expected {})", n, out_buf.len());
                return (status::OTHER, 0);
            }
            Err(e) => {
                warn!("hidapi write failed: {}", e);
                return (status::OTHER, 0);
            }
        }

        let mut in_buf = [0u8; IN_REPORT_SIZE];
        let bytes_read = match self.device.read_timeout(&mut in_buf, self.timeout_ms) {
            Ok(0) => return (status::TIMEOUT, 0),
            Ok(n) => n,
            Err(e) => {
                warn!("hidapi read failed: {}", e);
                return (status::OTHER, 0);
            }
        };
        trace!("I2C IN Report Buffer ({} bytes): {:02X?}", bytes_read, &in_buf[..bytes_read]);
        if bytes_read < REPORT_HEADER {
            warn!("Received short I2C IN report ({} bytes)", bytes_read);
        }

        let (code, data) = decode_in_report(&in_buf[..bytes_read], read.len());
        read[..data.len()].copy_from_slice(data);
        (code, data.len())
    }
}

impl TwoWire for HidBridge {
    fn begin(&mut self) {
        self.frames.reset();
    }

    fn begin_transmission(&mut self, address: u8) {
        if let Some((held_addr, frame)) = self.frames.open(address) {
            let code = self.transfer(held_addr, &frame, &mut []).0;
            self.frames.settle_held(held_addr, code);
        }
    }

    fn write(&mut self, byte: u8) -> bool {
        self.frames.push(byte)
    }

    fn end_transmission(&mut self, send_stop: bool) -> u8 {
        match self.frames.close(send_stop) {
            Closed::Done(code) => code,
            Closed::Send(address, frame) => self.transfer(address, &frame, &mut []).0,
        }
    }

    fn request_from(&mut self, address: u8, count: usize) -> usize {
        let plan = self.frames.plan_read(address);
        let count = count.min(MAX_FRAME);
        let mut buf = [0u8; MAX_FRAME];
        let (code, got) = match plan {
            ReadPlan::Combined(frame) => self.transfer(address, &frame, &mut buf[..count]),
            ReadPlan::Plain(held) => {
                if let Some((held_addr, frame)) = held {
                    let code = self.transfer(held_addr, &frame, &mut []).0;
                    if code != status::SUCCESS {
                        warn!(
                            "Held frame to 0x{:02X} not delivered: status {}",
                            held_addr, code
                        );
                        return 0;
                    }
                }
                self.transfer(address, &[], &mut buf[..count])
            }
        };
        if code != status::SUCCESS {
            return 0;
        }
        self.frames.fill(&buf[..got]);
        got
    }

    fn read(&mut self) -> Option<u8> {
        self.frames.pop()
    }
}
