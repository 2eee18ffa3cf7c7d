//! Foreground critical sections
//!
//! The interrupt handler and foreground code share per-instance state. The
//! foreground side excludes the handler by masking the interrupt sources the
//! handler would act on, rather than masking interrupts globally. Only the
//! sources that were armed on entry are re-armed on exit, so a section never
//! arms something the caller had left off.

use core::sync::atomic::{compiler_fence, Ordering};

use tandem_hal::{InterruptSources, UartHardware};

/// Run `f` with `sources` masked on `hw`
pub fn masked<H, R>(hw: &mut H, sources: InterruptSources, f: impl FnOnce(&mut H) -> R) -> R
where
    H: UartHardware + ?Sized,
{
    let armed = hw.enabled_interrupts() & sources;
    hw.disable_interrupts(armed);
    compiler_fence(Ordering::SeqCst);

    let result = f(hw);

    compiler_fence(Ordering::SeqCst);
    hw.enable_interrupts(armed);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_hal::MockUart;

    #[test]
    fn test_masks_and_restores() {
        let mut hw = MockUart::new();
        hw.enable_interrupts(InterruptSources::RX_READY | InterruptSources::TX_READY);

        let inside = masked(&mut hw, InterruptSources::RX_READY, |hw| hw.enabled_interrupts());

        assert_eq!(inside, InterruptSources::TX_READY);
        assert_eq!(
            hw.enabled_interrupts(),
            InterruptSources::RX_READY | InterruptSources::TX_READY
        );
    }

    #[test]
    fn test_does_not_arm_unarmed_sources() {
        let mut hw = MockUart::new();
        masked(&mut hw, InterruptSources::RX_READY, |_| ());
        assert!(hw.enabled_interrupts().is_empty());
    }
}
