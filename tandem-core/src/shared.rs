//! Reaching a handle from both execution contexts
//!
//! Every engine entry point takes `&mut self`, including the interrupt
//! handler. There are two ways to give both contexts that access:
//!
//! - Let a framework with priority-ceiling locks own the [`Handle`] or
//!   [`Registry`] and hand out `&mut` (the lock masks the vector while
//!   foreground code runs).
//! - Put it in a `static` [`Shared`] and call through it from `main` and
//!   from the vector.
//!
//! [`Shared`] is a blocking mutex around the value. With the default
//! [`CriticalSectionRawMutex`] every call through it runs inside a global
//! critical section, so other interrupts wait for the length of one engine
//! call. Engine calls never block: the longest is a receive that drains the
//! ring buffer, bounded by the receive buffer length. If that latency is too
//! much, use the first option.
//!
//! Inside a call the engine still masks the peripheral's own sources around
//! ring access ([`critical::masked`](crate::critical::masked)); that keeps
//! the hardware from being serviced mid-section when the caller owns the
//! handle directly.
//!
//! ```ignore
//! static UART0: Shared<Handle<'static, Events>> = Shared::new(Handle::new(Events::new()));
//!
//! #[interrupt]
//! fn UART0_IRQ() {
//!     let _ = UART0.on_interrupt(&mut board::uart0());
//! }
//!
//! fn main() {
//!     UART0.lock(|handle| handle.send_nonblocking(&mut board::uart0(), b"hello"))?;
//! }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::UartHardware;

use crate::error::{Error, Result};
use crate::registry::{InstanceId, Registry};
use crate::transfer::{Handle, TransferCallback};

/// Engine state shareable between the foreground and an interrupt vector
pub struct Shared<T, M: RawMutex = CriticalSectionRawMutex> {
    inner: Mutex<M, RefCell<T>>,
}

impl<T, M: RawMutex> Shared<T, M> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access
    ///
    /// Fails with [`Error::Reentered`] when called from inside another
    /// `lock` on the same value, such as from a transfer callback.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.inner.lock(|cell| {
            let mut value = cell.try_borrow_mut().map_err(|_| Error::Reentered)?;
            Ok(f(&mut value))
        })
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<'d, C: TransferCallback, M: RawMutex> Shared<Handle<'d, C>, M> {
    /// Service the interrupt; call from the instance's vector
    pub fn on_interrupt<H>(&self, hw: &mut H) -> Result<()>
    where
        H: UartHardware + ?Sized,
    {
        self.lock(|handle| handle.on_interrupt(hw))
    }
}

impl<'d, C: TransferCallback, M: RawMutex, const N: usize> Shared<Registry<'d, C, N>, M> {
    /// Service the interrupt of instance `id`
    pub fn on_interrupt<H>(&self, id: InstanceId, hw: &mut H) -> Result<()>
    where
        H: UartHardware + ?Sized,
    {
        self.lock(|registry| registry.on_interrupt(id, hw))?
    }
}
