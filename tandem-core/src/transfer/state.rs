//! Per-direction transfer bookkeeping
//!
//! One [`TransferState`] tracks the send side and one the receive side. The
//! foreground starts and cancels transfers; the interrupt handler moves bytes
//! and completes them.
//!
//! ```text
//!        begin()               last byte moved
//!   Idle ────────► Busy ──────────────────────► Idle
//!    ▲               │
//!    └───────────────┘
//!         cancel()
//! ```
//!
//! `remaining` only ever decreases while busy, and `total` is fixed when the
//! transfer begins.

use crate::error::{Error, Result};

/// Whether a direction has a transfer outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    #[default]
    Idle,
    Busy,
}

/// State of one transfer direction over a buffer `B`
#[derive(Debug)]
pub struct TransferState<B> {
    status: Status,
    buffer: Option<B>,
    /// Index of the next byte to move
    cursor: usize,
    remaining: usize,
    total: usize,
}

impl<B> Default for TransferState<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> TransferState<B> {
    pub const fn new() -> Self {
        Self {
            status: Status::Idle,
            buffer: None,
            cursor: 0,
            remaining: 0,
            total: 0,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status == Status::Busy
    }

    /// Bytes still to move
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Bytes the interrupt path was asked to move when the transfer began
    pub fn total(&self) -> usize {
        self.total
    }

    /// Bytes moved so far by the interrupt path
    ///
    /// Fails with [`Error::NoTransferInProgress`] when idle.
    pub fn transferred(&self) -> Result<usize> {
        if !self.is_busy() {
            return Err(Error::NoTransferInProgress);
        }
        Ok(self.total - self.remaining)
    }

    /// Hand `len` bytes of `buffer`, starting at `start`, to the interrupt path
    ///
    /// The busy flag is set last; everything the handler reads is in place
    /// before it can see the transfer.
    pub(crate) fn begin(&mut self, buffer: B, start: usize, len: usize) {
        self.buffer = Some(buffer);
        self.cursor = start;
        self.remaining = len;
        self.total = len;
        self.status = Status::Busy;
    }

    /// Stop tracking the transfer; the buffer stays parked for reclaim
    pub(crate) fn cancel(&mut self) {
        self.status = Status::Idle;
        self.remaining = 0;
    }

    pub(crate) fn complete(&mut self) {
        self.status = Status::Idle;
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.remaining == 0
    }

    /// Keep a buffer that never went busy so the caller can reclaim it
    pub(crate) fn park(&mut self, buffer: B) {
        self.buffer = Some(buffer);
        self.cursor = 0;
        self.remaining = 0;
        self.total = 0;
    }

    /// Take the buffer back once the transfer is no longer in flight
    pub(crate) fn take_buffer(&mut self) -> Option<B> {
        if self.is_busy() {
            return None;
        }
        self.buffer.take()
    }
}

impl<B: AsRef<[u8]>> TransferState<B> {
    /// Next byte to transmit, advancing the cursor
    pub(crate) fn take_next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        let byte = *self.buffer.as_ref()?.as_ref().get(self.cursor)?;
        self.cursor += 1;
        self.remaining -= 1;
        Some(byte)
    }
}

impl<B: AsMut<[u8]>> TransferState<B> {
    /// Store a received byte, advancing the cursor
    ///
    /// Returns `false` if there was nowhere to put it.
    pub(crate) fn put(&mut self, byte: u8) -> bool {
        if self.remaining == 0 {
            return false;
        }
        let Some(slot) = self
            .buffer
            .as_mut()
            .and_then(|buffer| buffer.as_mut().get_mut(self.cursor))
        else {
            return false;
        };
        *slot = byte;
        self.cursor += 1;
        self.remaining -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_has_no_progress() {
        let state: TransferState<&[u8]> = TransferState::new();
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.transferred(), Err(Error::NoTransferInProgress));
    }

    #[test]
    fn test_send_progress() {
        let data = [1u8, 2, 3];
        let mut state = TransferState::new();
        state.begin(&data[..], 0, data.len());

        assert!(state.is_busy());
        assert_eq!(state.take_next(), Some(1));
        assert_eq!(state.transferred(), Ok(1));
        assert_eq!(state.take_next(), Some(2));
        assert_eq!(state.take_next(), Some(3));
        assert!(state.is_drained());
        assert_eq!(state.take_next(), None);
        assert_eq!(state.transferred(), Ok(3));
    }

    #[test]
    fn test_receive_from_offset() {
        let mut buffer = [0u8; 4];
        let mut state = TransferState::new();
        state.begin(&mut buffer[..], 2, 2);

        assert_eq!(state.total(), 2);
        assert!(state.put(0xAA));
        assert!(state.put(0xBB));
        assert!(!state.put(0xCC));
        state.complete();

        let buffer = state.take_buffer().unwrap();
        assert_eq!(buffer, &[0, 0, 0xAA, 0xBB]);
    }

    #[test]
    fn test_buffer_held_while_busy() {
        let data = [0u8; 2];
        let mut state = TransferState::new();
        state.begin(&data[..], 0, 2);
        assert!(state.take_buffer().is_none());

        state.cancel();
        assert_eq!(state.remaining(), 0);
        assert!(state.take_buffer().is_some());
    }

    #[test]
    fn test_park_keeps_buffer_idle() {
        let mut buffer = [7u8; 3];
        let mut state = TransferState::new();
        state.park(&mut buffer[..]);

        assert!(!state.is_busy());
        assert_eq!(state.take_buffer().map(|b| b.len()), Some(3));
    }
}
