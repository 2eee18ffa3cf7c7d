//! Asynchronous notifications delivered from the interrupt path

use crate::ring_buffer::RingBuffer;

/// Event reported to the application callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// Last byte of a send was written to the transmit register
    TxIdle,
    /// Receive buffer filled
    RxIdle,
    /// Peripheral reported a receive overrun
    RxError,
    /// A byte arrived with the ring buffer full; one byte is about to be
    /// evicted unless the callback drains the ring
    RxRingBufferOverrun,
}

/// Application hook for transfer events
///
/// Called from interrupt context for everything except the receive that
/// completes immediately from the ring buffer, which is reported from the
/// caller's own context. Keep it short and never call back into the engine.
///
/// `rx_ring` is the background ring buffer, when one is installed, for the
/// events the receive path raises ([`TransferEvent::RxIdle`] and
/// [`TransferEvent::RxRingBufferOverrun`]), so the callback can drain it.
/// It is always `None` for [`TransferEvent::TxIdle`] and
/// [`TransferEvent::RxError`]: those fire while the foreground may hold the
/// ring under a receive-only mask.
pub trait TransferCallback {
    fn on_event(&mut self, event: TransferEvent, rx_ring: Option<&mut RingBuffer<'_>>);
}

/// Callback that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallback;

impl TransferCallback for NoCallback {
    fn on_event(&mut self, _event: TransferEvent, _rx_ring: Option<&mut RingBuffer<'_>>) {}
}

/// Adapts a closure that only needs the event
pub struct FnCallback<F>(pub F);

impl<F: FnMut(TransferEvent)> TransferCallback for FnCallback<F> {
    fn on_event(&mut self, event: TransferEvent, _rx_ring: Option<&mut RingBuffer<'_>>) {
        (self.0)(event)
    }
}
