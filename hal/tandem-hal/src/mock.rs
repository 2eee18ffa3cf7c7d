//! Simulated serial peripheral
//!
//! [`MockUart`] behaves like a single-byte-register UART: bytes fed into its
//! receive queue show up one at a time behind `RX_READY`, transmitted bytes
//! land in a log, and error flags stay latched until cleared. Tests drive the
//! interrupt path by calling the dispatcher while [`MockUart::interrupt_pending`]
//! reports an armed source.

use heapless::{Deque, Vec};

use crate::hardware::{DivisorSetting, InterruptSources, StatusFlags, UartHardware};
use crate::uart::UartConfig;

/// Bytes the receive side can hold before it latches an overrun
pub const RX_QUEUE_DEPTH: usize = 64;

/// Bytes the transmit log keeps
pub const TX_LOG_DEPTH: usize = 256;

/// Flags that stay set until explicitly cleared
const LATCHED: StatusFlags = StatusFlags::HARDWARE_OVERRUN
    .union(StatusFlags::FRAMING_ERROR)
    .union(StatusFlags::PARITY_ERROR)
    .union(StatusFlags::NOISE_ERROR);

/// Simulated UART peripheral
#[derive(Debug, Clone)]
pub struct MockUart {
    rx_queue: Deque<u8, RX_QUEUE_DEPTH>,
    tx_log: Vec<u8, TX_LOG_DEPTH>,
    latched: StatusFlags,
    tx_ready: bool,
    armed: InterruptSources,
    enabled: bool,
    tx_enabled: bool,
    rx_enabled: bool,
    frame: Option<UartConfig>,
    divisor: Option<DivisorSetting>,
}

impl Default for MockUart {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUart {
    /// Create an idle peripheral with nothing armed
    pub fn new() -> Self {
        Self {
            rx_queue: Deque::new(),
            tx_log: Vec::new(),
            latched: StatusFlags::empty(),
            tx_ready: true,
            armed: InterruptSources::empty(),
            enabled: false,
            tx_enabled: false,
            rx_enabled: false,
            frame: None,
            divisor: None,
        }
    }

    /// Queue bytes as if they arrived on the line
    ///
    /// Bytes that do not fit latch `HARDWARE_OVERRUN` and are lost.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.rx_queue.push_back(byte).is_err() {
                self.latched |= StatusFlags::HARDWARE_OVERRUN;
            }
        }
    }

    /// Latch error flags as if the line produced them
    pub fn raise(&mut self, flags: StatusFlags) {
        self.latched |= flags & LATCHED;
    }

    /// Control whether the transmit register reports room
    pub fn set_tx_ready(&mut self, ready: bool) {
        self.tx_ready = ready;
    }

    /// Everything written to the transmit register so far
    pub fn sent(&self) -> &[u8] {
        &self.tx_log
    }

    /// Forget the transmit log
    pub fn clear_sent(&mut self) {
        self.tx_log.clear();
    }

    /// Bytes still waiting in the receive queue
    pub fn pending_rx(&self) -> usize {
        self.rx_queue.len()
    }

    /// Whether an armed source currently has its condition raised
    pub fn interrupt_pending(&self) -> bool {
        let status = self.status();
        (self.armed.contains(InterruptSources::RX_READY) && status.contains(StatusFlags::RX_READY))
            || (self.armed.contains(InterruptSources::TX_READY)
                && status.contains(StatusFlags::TX_READY))
            || (self.armed.contains(InterruptSources::HARDWARE_OVERRUN)
                && status.contains(StatusFlags::HARDWARE_OVERRUN))
    }

    /// Whether the peripheral is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the transmitter is enabled
    pub fn is_tx_enabled(&self) -> bool {
        self.tx_enabled
    }

    /// Whether the receiver is enabled
    pub fn is_rx_enabled(&self) -> bool {
        self.rx_enabled
    }

    /// Last frame configuration applied
    pub fn frame(&self) -> Option<&UartConfig> {
        self.frame.as_ref()
    }

    /// Last baud generator setting applied
    pub fn divisor(&self) -> Option<DivisorSetting> {
        self.divisor
    }
}

impl UartHardware for MockUart {
    fn status(&self) -> StatusFlags {
        let mut status = self.latched;
        if self.rx_queue.is_empty() {
            status |= StatusFlags::RX_IDLE;
        } else {
            status |= StatusFlags::RX_READY;
        }
        if self.tx_ready {
            status |= StatusFlags::TX_READY | StatusFlags::TX_IDLE;
        }
        status
    }

    fn clear_status(&mut self, flags: StatusFlags) {
        self.latched.remove(flags & LATCHED);
    }

    fn enable_interrupts(&mut self, sources: InterruptSources) {
        self.armed |= sources;
    }

    fn disable_interrupts(&mut self, sources: InterruptSources) {
        self.armed.remove(sources);
    }

    fn enabled_interrupts(&self) -> InterruptSources {
        self.armed
    }

    fn read_data(&mut self) -> u8 {
        self.rx_queue.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        // Log saturates; tests never send more than its depth
        let _ = self.tx_log.push(byte);
    }

    fn set_tx_enabled(&mut self, enabled: bool) {
        self.tx_enabled = enabled;
    }

    fn set_rx_enabled(&mut self, enabled: bool) {
        self.rx_enabled = enabled;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn configure_frame(&mut self, config: &UartConfig) {
        self.frame = Some(*config);
    }

    fn set_divisor(&mut self, setting: DivisorSetting) {
        self.divisor = Some(setting);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_raises_rx_ready() {
        let mut uart = MockUart::new();
        assert!(!uart.status().contains(StatusFlags::RX_READY));

        uart.feed(&[0x41, 0x42]);
        assert!(uart.status().contains(StatusFlags::RX_READY));
        assert_eq!(uart.read_data(), 0x41);
        assert_eq!(uart.read_data(), 0x42);
        assert!(!uart.status().contains(StatusFlags::RX_READY));
    }

    #[test]
    fn test_queue_overflow_latches_overrun() {
        let mut uart = MockUart::new();
        let bytes = [0u8; RX_QUEUE_DEPTH + 1];
        uart.feed(&bytes);

        assert_eq!(uart.pending_rx(), RX_QUEUE_DEPTH);
        assert!(uart.status().contains(StatusFlags::HARDWARE_OVERRUN));

        uart.clear_status(StatusFlags::HARDWARE_OVERRUN);
        assert!(!uart.status().contains(StatusFlags::HARDWARE_OVERRUN));
    }

    #[test]
    fn test_pending_requires_armed_source() {
        let mut uart = MockUart::new();
        uart.feed(&[1]);
        assert!(!uart.interrupt_pending());

        uart.enable_interrupts(InterruptSources::RX_READY);
        assert!(uart.interrupt_pending());

        uart.disable_interrupts(InterruptSources::RX_READY);
        assert!(!uart.interrupt_pending());
    }

    #[test]
    fn test_raise_ignores_live_flags() {
        let mut uart = MockUart::new();
        uart.raise(StatusFlags::RX_READY | StatusFlags::PARITY_ERROR);

        let status = uart.status();
        assert!(status.contains(StatusFlags::PARITY_ERROR));
        assert!(!status.contains(StatusFlags::RX_READY));
    }
}
