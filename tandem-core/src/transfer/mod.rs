//! Interrupt-driven transfer engine
//!
//! A [`Handle`] per peripheral instance holds one send and one receive
//! request plus an optional background [`RingBuffer`](crate::ring_buffer::RingBuffer).
//! The foreground queues requests and returns at once; [`Handle::on_interrupt`]
//! moves bytes and reports completions through a [`TransferCallback`].

mod dispatch;
pub mod events;
pub mod handle;
pub mod state;

pub use events::{FnCallback, NoCallback, TransferCallback, TransferEvent};
pub use handle::Handle;
pub use state::{Status, TransferState};

#[cfg(test)]
pub(crate) mod test_support {
    use heapless::Vec;
    use tandem_hal::MockUart;

    use super::{Handle, TransferCallback, TransferEvent};
    use crate::ring_buffer::RingBuffer;

    /// Callback that records every event
    #[derive(Debug, Default)]
    pub struct Recorder {
        events: Vec<TransferEvent, 16>,
    }

    impl Recorder {
        pub fn events(&self) -> &[TransferEvent] {
            &self.events
        }
    }

    impl TransferCallback for Recorder {
        fn on_event(&mut self, event: TransferEvent, _rx_ring: Option<&mut RingBuffer<'_>>) {
            self.events.push(event).unwrap();
        }
    }

    /// Run the interrupt handler while the mock has an armed source pending
    ///
    /// Returns the number of invocations.
    pub fn pump<C: TransferCallback>(
        handle: &mut Handle<'_, C>,
        hw: &mut MockUart,
        limit: usize,
    ) -> usize {
        let mut calls = 0;
        while calls < limit && hw.interrupt_pending() {
            handle.on_interrupt(hw);
            calls += 1;
        }
        calls
    }
}
