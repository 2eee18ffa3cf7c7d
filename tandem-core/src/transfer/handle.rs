//! Per-instance transfer handle
//!
//! Foreground side of the engine. Requests are recorded here and the
//! interrupt handler ([`Handle::on_interrupt`]) moves the bytes.
//!
//! Foreground code touches state the handler also reads in two ways only:
//! while the direction is idle (flipping it busy last and arming the
//! interrupt after), or inside [`critical::masked`] with the receive source
//! masked.

use tandem_hal::{InterruptSources, UartHardware};

use super::events::{TransferCallback, TransferEvent};
use super::state::TransferState;
use crate::critical;
use crate::error::{Error, Result};
use crate::ring_buffer::RingBuffer;

/// Receive sources armed whenever the receive path is live
pub(super) const RX_SOURCES: InterruptSources =
    InterruptSources::RX_READY.union(InterruptSources::HARDWARE_OVERRUN);

/// Transfer state for one peripheral instance
///
/// Buffers handed to the handle stay borrowed for `'d`; a filled receive
/// buffer comes back through [`take_receive_buffer`](Self::take_receive_buffer)
/// and ring storage through [`stop_ring_buffer`](Self::stop_ring_buffer).
pub struct Handle<'d, C> {
    pub(super) tx: TransferState<&'d [u8]>,
    pub(super) rx: TransferState<&'d mut [u8]>,
    pub(super) rx_ring: Option<RingBuffer<'d>>,
    pub(super) callback: C,
}

impl<'d, C: TransferCallback> Handle<'d, C> {
    /// Create an idle handle with no ring buffer
    pub const fn new(callback: C) -> Self {
        Self {
            tx: TransferState::new(),
            rx: TransferState::new(),
            rx_ring: None,
            callback,
        }
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Queue `data` for interrupt-driven transmission
    ///
    /// Re-enables the transmitter and arms `TX_READY`; the handler writes one
    /// byte per interrupt and reports [`TransferEvent::TxIdle`] after the
    /// last.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `data` is empty
    /// - [`Error::TxBusy`] if a send is already outstanding
    pub fn send_nonblocking<H>(&mut self, hw: &mut H, data: &'d [u8]) -> Result<()>
    where
        H: UartHardware + ?Sized,
    {
        if data.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if self.tx.is_busy() {
            return Err(Error::TxBusy);
        }

        self.tx.begin(data, 0, data.len());
        hw.set_tx_enabled(true);
        hw.enable_interrupts(InterruptSources::TX_READY);
        trace!("send queued, {} bytes", data.len());
        Ok(())
    }

    /// Receive into `buffer`, serving what the ring buffer already holds first
    ///
    /// Returns the number of bytes copied out of the ring buffer before
    /// returning.
    ///
    /// Without a ring buffer the whole buffer is filled by interrupts and
    /// [`TransferEvent::RxIdle`] is reported from the handler.
    ///
    /// With a ring buffer, buffered bytes are copied first. If they fill the
    /// request, the direction never goes busy and `RxIdle` is reported
    /// **from this call**, in the caller's context, before it returns.
    /// Otherwise the rest is filled by interrupts and
    /// [`get_receive_count`](Self::get_receive_count) counts only those bytes.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `buffer` is empty
    /// - [`Error::RxBusy`] if a receive is already outstanding
    pub fn receive_nonblocking<H>(&mut self, hw: &mut H, buffer: &'d mut [u8]) -> Result<usize>
    where
        H: UartHardware + ?Sized,
    {
        if buffer.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if self.rx.is_busy() {
            return Err(Error::RxBusy);
        }

        let requested = buffer.len();
        let Some(ring) = self.rx_ring.as_mut() else {
            self.rx.begin(buffer, 0, requested);
            hw.enable_interrupts(RX_SOURCES);
            return Ok(0);
        };

        let rx = &mut self.rx;
        let copied = critical::masked(hw, InterruptSources::RX_READY, |_| {
            let copied = ring.pop_into(buffer);
            if copied == requested {
                rx.park(buffer);
            } else {
                rx.begin(buffer, copied, requested - copied);
            }
            copied
        });

        if copied == requested {
            self.callback
                .on_event(TransferEvent::RxIdle, self.rx_ring.as_mut());
        }
        Ok(copied)
    }

    /// Stop an outstanding send and disable the transmitter
    ///
    /// Bytes already written are not recalled. Safe to call when idle.
    pub fn abort_send<H>(&mut self, hw: &mut H)
    where
        H: UartHardware + ?Sized,
    {
        hw.disable_interrupts(InterruptSources::TX_READY);
        hw.set_tx_enabled(false);
        self.tx.cancel();
    }

    /// Stop an outstanding receive
    ///
    /// With a ring buffer installed the receive interrupt stays armed and
    /// later bytes keep landing in the ring. Safe to call when idle.
    pub fn abort_receive<H>(&mut self, hw: &mut H)
    where
        H: UartHardware + ?Sized,
    {
        if self.rx_ring.is_none() {
            hw.disable_interrupts(RX_SOURCES);
        }
        self.rx.cancel();
    }

    /// Bytes the interrupt path has sent for the outstanding request
    pub fn get_send_count(&self) -> Result<usize> {
        self.tx.transferred()
    }

    /// Bytes the interrupt path has received for the outstanding request
    pub fn get_receive_count(&self) -> Result<usize> {
        self.rx.transferred()
    }

    /// Install a background ring buffer over `storage` and arm reception
    ///
    /// From here on, bytes arriving with no receive outstanding are kept in
    /// the ring. An already installed ring is replaced and its contents
    /// dropped.
    ///
    /// Fails with [`Error::InvalidArgument`] if `storage` is shorter than
    /// [`RingBuffer::MIN_STORAGE`].
    pub fn start_ring_buffer<H>(&mut self, hw: &mut H, storage: &'d mut [u8]) -> Result<()>
    where
        H: UartHardware + ?Sized,
    {
        let ring = RingBuffer::new(storage)?;
        let capacity = ring.capacity();

        let rx_ring = &mut self.rx_ring;
        let replaced = critical::masked(hw, InterruptSources::RX_READY, |_| {
            rx_ring.replace(ring).is_some()
        });
        if replaced {
            debug!("ring buffer replaced");
        }

        hw.enable_interrupts(RX_SOURCES);
        trace!("ring buffer started, capacity {}", capacity);
        Ok(())
    }

    /// Remove the ring buffer and hand its storage back
    ///
    /// An outstanding receive keeps running; reception is only disarmed if
    /// nothing is outstanding.
    pub fn stop_ring_buffer<H>(&mut self, hw: &mut H) -> Option<&'d mut [u8]>
    where
        H: UartHardware + ?Sized,
    {
        let rx_ring = &mut self.rx_ring;
        let ring = critical::masked(hw, InterruptSources::RX_READY, |_| rx_ring.take())?;

        if !self.rx.is_busy() {
            hw.disable_interrupts(RX_SOURCES);
        }
        Some(ring.into_storage())
    }

    /// Bytes waiting in the ring buffer, zero if none is installed
    pub fn ring_buffer_len<H>(&self, hw: &mut H) -> usize
    where
        H: UartHardware + ?Sized,
    {
        critical::masked(hw, InterruptSources::RX_READY, |_| {
            self.rx_ring.as_ref().map_or(0, RingBuffer::len)
        })
    }

    pub fn has_ring_buffer(&self) -> bool {
        self.rx_ring.is_some()
    }

    pub fn is_send_busy(&self) -> bool {
        self.tx.is_busy()
    }

    pub fn is_receive_busy(&self) -> bool {
        self.rx.is_busy()
    }

    /// Reclaim the last receive buffer once reception has finished
    ///
    /// `None` while the receive is still outstanding or if the buffer was
    /// already taken.
    pub fn take_receive_buffer(&mut self) -> Option<&'d mut [u8]> {
        self.rx.take_buffer()
    }
}
