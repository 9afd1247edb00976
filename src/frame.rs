//! Frame bookkeeping shared by the buffered bus backends.
//!
//! Bytes queue up between `begin_transmission` and `end_transmission`. A
//! frame ended without a stop is held so the backend can merge it with the
//! next read into one repeated-start exchange; if something else comes
//! first the backend sends it on its own. A failure while doing that is
//! kept and reported by the next `end_transmission`.

use crate::i2c::{status, MAX_FRAME};
use log::warn;
use std::collections::VecDeque;

/// Outcome of closing a frame.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Closed {
    /// Nothing to send; report this status.
    Done(u8),
    /// Send these bytes to this address with a stop.
    Send(u8, Vec<u8>),
}

/// How a read has to go out.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReadPlan {
    /// Held write to the same address, sent as write-then-read.
    Combined(Vec<u8>),
    /// Plain read, after sending the held frame (to another address) if any.
    Plain(Option<(u8, Vec<u8>)>),
}

#[derive(Debug)]
pub(crate) struct FrameBuffer {
    target: u8,
    tx: Vec<u8>,
    overflow: bool,
    held: Option<(u8, Vec<u8>)>,
    rx: VecDeque<u8>,
    deferred: Option<u8>,
}

impl FrameBuffer {
    pub(crate) fn new() -> Self {
        Self {
            target: 0,
            tx: Vec::with_capacity(MAX_FRAME),
            overflow: false,
            held: None,
            rx: VecDeque::with_capacity(MAX_FRAME),
            deferred: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.tx.clear();
        self.rx.clear();
        self.held = None;
        self.overflow = false;
        self.deferred = None;
    }

    /// Starts a frame. Returns the held frame, which the caller must send.
    pub(crate) fn open(&mut self, address: u8) -> Option<(u8, Vec<u8>)> {
        self.target = address;
        self.tx.clear();
        self.overflow = false;
        self.held.take()
    }

    /// Queues one byte; false once the frame is full.
    pub(crate) fn push(&mut self, byte: u8) -> bool {
        if self.tx.len() >= MAX_FRAME {
            self.overflow = true;
            return false;
        }
        self.tx.push(byte);
        true
    }

    /// Records the status of sending a held frame on its own.
    pub(crate) fn settle_held(&mut self, address: u8, code: u8) {
        if code != status::SUCCESS {
            warn!(
                "Held frame to 0x{:02X} not delivered: status {}",
                address, code
            );
            self.deferred.get_or_insert(code);
        }
    }

    /// Ends the frame. A pending held-frame failure is reported instead of
    /// sending the new frame.
    pub(crate) fn close(&mut self, send_stop: bool) -> Closed {
        let frame = std::mem::take(&mut self.tx);
        if std::mem::take(&mut self.overflow) {
            return Closed::Done(status::DATA_TOO_LONG);
        }
        if let Some(code) = self.deferred.take() {
            return Closed::Done(code);
        }
        if !send_stop && !frame.is_empty() {
            self.held = Some((self.target, frame));
            return Closed::Done(status::SUCCESS);
        }
        Closed::Send(self.target, frame)
    }

    pub(crate) fn plan_read(&mut self, address: u8) -> ReadPlan {
        self.rx.clear();
        match self.held.take() {
            Some((held_addr, frame)) if held_addr == address => ReadPlan::Combined(frame),
            held => ReadPlan::Plain(held),
        }
    }

    pub(crate) fn fill(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    pub(crate) fn pop(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_with_stop_is_sent() {
        let mut frames = FrameBuffer::new();
        assert_eq!(frames.open(0x20), None);
        assert!(frames.push(0x12));
        assert!(frames.push(0x34));
        assert_eq!(frames.close(true), Closed::Send(0x20, vec![0x12, 0x34]));
    }

    #[test]
    fn test_empty_frame_without_stop_is_sent() {
        let mut frames = FrameBuffer::new();
        frames.open(0x20);
        assert_eq!(frames.close(false), Closed::Send(0x20, vec![]));
    }

    #[test]
    fn test_overflow() {
        let mut frames = FrameBuffer::new();
        frames.open(0x50);
        for i in 0..MAX_FRAME as u8 {
            assert!(frames.push(i));
        }
        assert!(!frames.push(0xFF));
        assert_eq!(frames.close(true), Closed::Done(status::DATA_TOO_LONG));

        frames.open(0x50);
        assert_eq!(frames.close(true), Closed::Send(0x50, vec![]));
    }

    #[test]
    fn test_held_frame_merges_with_read_from_same_address() {
        let mut frames = FrameBuffer::new();
        frames.open(0x7C);
        frames.push(0xA0);
        assert_eq!(frames.close(false), Closed::Done(status::SUCCESS));
        assert_eq!(frames.plan_read(0x7C), ReadPlan::Combined(vec![0xA0]));
        assert_eq!(frames.plan_read(0x7C), ReadPlan::Plain(None));
    }

    #[test]
    fn test_held_frame_handed_back_for_other_address() {
        let mut frames = FrameBuffer::new();
        frames.open(0x20);
        frames.push(0x01);
        frames.close(false);
        assert_eq!(frames.plan_read(0x21), ReadPlan::Plain(Some((0x20, vec![0x01]))));

        frames.open(0x20);
        frames.push(0x02);
        frames.close(false);
        assert_eq!(frames.open(0x21), Some((0x20, vec![0x02])));
    }

    #[test]
    fn test_failed_held_frame_reported_by_next_close() {
        let mut frames = FrameBuffer::new();
        frames.open(0x20);
        frames.push(0x01);
        frames.close(false);

        let (address, _) = frames.open(0x21).unwrap();
        frames.settle_held(address, status::NACK_ADDRESS);
        frames.push(0x02);
        assert_eq!(frames.close(true), Closed::Done(status::NACK_ADDRESS));

        frames.open(0x21);
        frames.push(0x02);
        assert_eq!(frames.close(true), Closed::Send(0x21, vec![0x02]));
    }

    #[test]
    fn test_delivered_held_frame_leaves_no_status() {
        let mut frames = FrameBuffer::new();
        frames.settle_held(0x20, status::SUCCESS);
        frames.open(0x21);
        assert_eq!(frames.close(true), Closed::Send(0x21, vec![]));
    }

    #[test]
    fn test_reset_drops_pending_state() {
        let mut frames = FrameBuffer::new();
        frames.open(0x20);
        frames.push(0x01);
        frames.close(false);
        frames.fill(&[1, 2]);
        frames.settle_held(0x20, status::TIMEOUT);

        frames.reset();
        assert_eq!(frames.pop(), None);
        assert_eq!(frames.open(0x20), None);
        assert_eq!(frames.close(true), Closed::Send(0x20, vec![]));
    }
}
