//! Peripheral capability set
//!
//! The transfer engine never touches registers itself. Chip-specific HALs
//! implement [`UartHardware`] over their register block and the engine
//! drives everything through it, including from interrupt context.
//!
//! Flag bit positions are this crate's own encoding; implementations map
//! them onto whatever their status and interrupt-enable registers use.

use bitflags::bitflags;

use crate::uart::UartConfig;

bitflags! {
    /// Peripheral status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u32 {
        /// A received byte is waiting in the data register
        const RX_READY = 1 << 0;
        /// Receiver is idle
        const RX_IDLE = 1 << 1;
        /// Data register can accept another byte
        const TX_READY = 1 << 2;
        /// Transmitter has shifted out everything, line is idle
        const TX_IDLE = 1 << 3;
        /// A byte arrived before the previous one was read
        const HARDWARE_OVERRUN = 1 << 8;
        /// Stop bit missing on the last received character
        const FRAMING_ERROR = 1 << 13;
        /// Parity mismatch on the last received character
        const PARITY_ERROR = 1 << 14;
        /// Noise detected while sampling the last received character
        const NOISE_ERROR = 1 << 15;
    }
}

bitflags! {
    /// Interrupt sources that can be armed on the peripheral
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptSources: u32 {
        /// Fires while a received byte is waiting
        const RX_READY = 1 << 0;
        /// Fires while the data register can take a byte
        const TX_READY = 1 << 2;
        /// Fires on a receive overrun
        const HARDWARE_OVERRUN = 1 << 8;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusFlags({=u32:#x})", self.bits());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptSources {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptSources({=u32:#x})", self.bits());
    }
}

/// Baud generator setting handed to the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DivisorSetting {
    /// Divisor register value (divide ratio minus one)
    pub divisor: u16,
    /// Oversample register value (ratio minus one), if the peripheral has one
    pub oversample: Option<u8>,
}

/// Capability set of a serial peripheral
///
/// Every method must be callable from interrupt context: no blocking, no
/// allocation. Reading the data register is expected to consume the byte
/// and drop `RX_READY` when nothing else is waiting.
pub trait UartHardware {
    /// Snapshot of the status flags
    fn status(&self) -> StatusFlags;

    /// Clear latched status flags (write-one-to-clear on most parts)
    fn clear_status(&mut self, flags: StatusFlags);

    /// Arm the given interrupt sources
    fn enable_interrupts(&mut self, sources: InterruptSources);

    /// Disarm the given interrupt sources
    fn disable_interrupts(&mut self, sources: InterruptSources);

    /// Currently armed interrupt sources
    fn enabled_interrupts(&self) -> InterruptSources;

    /// Read one byte from the receive data register
    fn read_data(&mut self) -> u8;

    /// Write one byte to the transmit data register
    fn write_data(&mut self, byte: u8);

    /// Enable or disable the transmitter
    fn set_tx_enabled(&mut self, enabled: bool);

    /// Enable or disable the receiver
    fn set_rx_enabled(&mut self, enabled: bool);

    /// Enable or disable the whole peripheral
    fn set_enabled(&mut self, enabled: bool);

    /// Apply frame format, clocking mode and loopback
    fn configure_frame(&mut self, config: &UartConfig);

    /// Program the baud generator
    fn set_divisor(&mut self, setting: DivisorSetting);
}

impl<T: UartHardware + ?Sized> UartHardware for &mut T {
    fn status(&self) -> StatusFlags {
        (**self).status()
    }

    fn clear_status(&mut self, flags: StatusFlags) {
        (**self).clear_status(flags)
    }

    fn enable_interrupts(&mut self, sources: InterruptSources) {
        (**self).enable_interrupts(sources)
    }

    fn disable_interrupts(&mut self, sources: InterruptSources) {
        (**self).disable_interrupts(sources)
    }

    fn enabled_interrupts(&self) -> InterruptSources {
        (**self).enabled_interrupts()
    }

    fn read_data(&mut self) -> u8 {
        (**self).read_data()
    }

    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }

    fn set_tx_enabled(&mut self, enabled: bool) {
        (**self).set_tx_enabled(enabled)
    }

    fn set_rx_enabled(&mut self, enabled: bool) {
        (**self).set_rx_enabled(enabled)
    }

    fn set_enabled(&mut self, enabled: bool) {
        (**self).set_enabled(enabled)
    }

    fn configure_frame(&mut self, config: &UartConfig) {
        (**self).configure_frame(config)
    }

    fn set_divisor(&mut self, setting: DivisorSetting) {
        (**self).set_divisor(setting)
    }
}
