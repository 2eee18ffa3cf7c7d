//! Interrupt side of the engine
//!
//! [`Handle::on_interrupt`] is the only code that runs in interrupt context.
//! It never blocks and moves at most one byte per direction per call.

use tandem_hal::{InterruptSources, StatusFlags, UartHardware};

use super::events::{TransferCallback, TransferEvent};
use super::handle::{Handle, RX_SOURCES};

impl<'d, C: TransferCallback> Handle<'d, C> {
    /// Service the peripheral's interrupt
    ///
    /// Call from the instance's interrupt vector, or through
    /// [`Registry::on_interrupt`](crate::registry::Registry::on_interrupt).
    /// Status and the armed sources are sampled once; then, in order:
    ///
    /// 1. A hardware overrun is cleared and reported as
    ///    [`TransferEvent::RxError`]. Reception carries on.
    /// 2. If `RX_READY` is armed, one received byte goes to the outstanding
    ///    receive, or else to the ring buffer.
    /// 3. If `TX_READY` is armed, one byte of the outstanding send is
    ///    written.
    ///
    /// A source the foreground has masked is never serviced, even when the
    /// call was triggered by another one. The ring buffer is handed to the
    /// callback only for events raised by the receive path.
    pub fn on_interrupt<H>(&mut self, hw: &mut H)
    where
        H: UartHardware + ?Sized,
    {
        let status = hw.status();
        let armed = hw.enabled_interrupts();

        if status.contains(StatusFlags::HARDWARE_OVERRUN) {
            hw.clear_status(StatusFlags::HARDWARE_OVERRUN);
            warn!("receive overrun");
            self.callback.on_event(TransferEvent::RxError, None);
        }

        if status.contains(StatusFlags::RX_READY)
            && armed.contains(InterruptSources::RX_READY)
            && (self.rx.is_busy() || self.rx_ring.is_some())
        {
            let byte = hw.read_data();
            self.receive_byte(hw, byte);
        }

        if status.contains(StatusFlags::TX_READY)
            && armed.contains(InterruptSources::TX_READY)
            && self.tx.is_busy()
        {
            self.transmit_byte(hw);
        }
    }

    fn receive_byte<H>(&mut self, hw: &mut H, byte: u8)
    where
        H: UartHardware + ?Sized,
    {
        if self.rx.is_busy() {
            self.rx.put(byte);
            if self.rx.is_drained() {
                if self.rx_ring.is_none() {
                    hw.disable_interrupts(RX_SOURCES);
                }
                self.rx.complete();
                trace!("receive complete, {} bytes", self.rx.total());
                self.callback
                    .on_event(TransferEvent::RxIdle, self.rx_ring.as_mut());
            }
            return;
        }

        if self.rx_ring.as_ref().is_some_and(|ring| ring.is_full()) {
            self.callback
                .on_event(TransferEvent::RxRingBufferOverrun, self.rx_ring.as_mut());
        }
        if let Some(ring) = self.rx_ring.as_mut() {
            if let Some(evicted) = ring.push(byte) {
                debug!("ring buffer full, dropped {=u8:#x}", evicted);
            }
        }
    }

    fn transmit_byte<H>(&mut self, hw: &mut H)
    where
        H: UartHardware + ?Sized,
    {
        if let Some(byte) = self.tx.take_next() {
            hw.write_data(byte);
        }
        if self.tx.is_drained() {
            hw.disable_interrupts(InterruptSources::TX_READY);
            self.tx.complete();
            trace!("send complete, {} bytes", self.tx.total());
            self.callback.on_event(TransferEvent::TxIdle, None);
        }
    }
}
