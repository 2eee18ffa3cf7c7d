//! Instance to handle lookup
//!
//! Boards with several UARTs route each interrupt vector to the handle of
//! its instance. The registry is owned by the caller and passed by reference
//! to wherever the vectors are serviced; there is no global table.

use heapless::LinearMap;
use tandem_hal::UartHardware;

use crate::error::{Error, Result};
use crate::transfer::{Handle, TransferCallback};

/// Peripheral instance number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InstanceId(pub u8);

/// Fixed-capacity table of up to `N` handles
pub struct Registry<'d, C, const N: usize> {
    handles: LinearMap<InstanceId, Handle<'d, C>, N>,
}

impl<'d, C: TransferCallback, const N: usize> Default for Registry<'d, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, C: TransferCallback, const N: usize> Registry<'d, C, N> {
    pub const fn new() -> Self {
        Self {
            handles: LinearMap::new(),
        }
    }

    /// Register a fresh handle for `id`
    ///
    /// # Errors
    /// - [`Error::InstanceInUse`] if `id` already has a handle
    /// - [`Error::RegistryFull`] if all `N` slots are taken
    pub fn create_handle(&mut self, id: InstanceId, callback: C) -> Result<&mut Handle<'d, C>> {
        if self.handles.contains_key(&id) {
            return Err(Error::InstanceInUse);
        }
        self.handles
            .insert(id, Handle::new(callback))
            .map_err(|_| Error::RegistryFull)?;
        debug!("registered instance {}", id.0);

        self.handles.get_mut(&id).ok_or(Error::UnknownInstance)
    }

    pub fn handle(&self, id: InstanceId) -> Option<&Handle<'d, C>> {
        self.handles.get(&id)
    }

    pub fn handle_mut(&mut self, id: InstanceId) -> Option<&mut Handle<'d, C>> {
        self.handles.get_mut(&id)
    }

    /// Remove and return the handle for `id`
    ///
    /// Outstanding transfers are dropped with it; disarm the peripheral
    /// first.
    pub fn release(&mut self, id: InstanceId) -> Option<Handle<'d, C>> {
        self.handles.remove(&id)
    }

    /// Forward an interrupt to the handle registered for `id`
    ///
    /// Fails with [`Error::UnknownInstance`] if nothing is registered.
    pub fn on_interrupt<H>(&mut self, id: InstanceId, hw: &mut H) -> Result<()>
    where
        H: UartHardware + ?Sized,
    {
        let handle = self.handles.get_mut(&id).ok_or(Error::UnknownInstance)?;
        handle.on_interrupt(hw);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn is_registered(&self, id: InstanceId) -> bool {
        self.handles.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::test_support::Recorder;
    use crate::transfer::TransferEvent;
    use tandem_hal::MockUart;

    const UART0: InstanceId = InstanceId(0);
    const UART1: InstanceId = InstanceId(1);

    #[test]
    fn test_create_and_lookup() {
        let mut registry: Registry<'_, Recorder, 2> = Registry::new();
        assert!(registry.is_empty());

        registry.create_handle(UART0, Recorder::default()).unwrap();
        assert!(registry.is_registered(UART0));
        assert!(!registry.is_registered(UART1));
        assert_eq!(registry.len(), 1);
        assert!(registry.handle(UART0).is_some());
    }

    #[test]
    fn test_duplicate_instance_rejected() {
        let mut registry: Registry<'_, Recorder, 2> = Registry::new();
        registry.create_handle(UART0, Recorder::default()).unwrap();

        assert_eq!(
            registry.create_handle(UART0, Recorder::default()).err(),
            Some(Error::InstanceInUse)
        );
    }

    #[test]
    fn test_full_registry() {
        let mut registry: Registry<'_, Recorder, 1> = Registry::new();
        registry.create_handle(UART0, Recorder::default()).unwrap();

        assert_eq!(
            registry.create_handle(UART1, Recorder::default()).err(),
            Some(Error::RegistryFull)
        );
    }

    #[test]
    fn test_release_frees_slot() {
        let mut registry: Registry<'_, Recorder, 1> = Registry::new();
        registry.create_handle(UART0, Recorder::default()).unwrap();

        assert!(registry.release(UART0).is_some());
        assert!(registry.release(UART0).is_none());
        assert!(registry.create_handle(UART1, Recorder::default()).is_ok());
    }

    #[test]
    fn test_dispatch_routes_by_instance() {
        let mut hw0 = MockUart::new();
        let mut hw1 = MockUart::new();
        let data = [0xAAu8];
        let mut registry: Registry<'_, Recorder, 2> = Registry::new();

        registry.create_handle(UART0, Recorder::default()).unwrap();
        registry
            .create_handle(UART1, Recorder::default())
            .unwrap()
            .send_nonblocking(&mut hw1, &data)
            .unwrap();

        registry.on_interrupt(UART0, &mut hw0).unwrap();
        registry.on_interrupt(UART1, &mut hw1).unwrap();

        assert!(hw0.sent().is_empty());
        assert_eq!(hw1.sent(), &[0xAA]);
        let events = |id| registry.handle(id).map(|h| h.callback().events().len());
        assert_eq!(events(UART0), Some(0));
        assert_eq!(events(UART1), Some(1));
        assert_eq!(
            registry.handle(UART1).unwrap().callback().events(),
            &[TransferEvent::TxIdle]
        );
    }

    #[test]
    fn test_unknown_instance() {
        let mut hw = MockUart::new();
        let mut registry: Registry<'_, Recorder, 2> = Registry::new();

        assert_eq!(
            registry.on_interrupt(InstanceId(7), &mut hw),
            Err(Error::UnknownInstance)
        );
    }
}
