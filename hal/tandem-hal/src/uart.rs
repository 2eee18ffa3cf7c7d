//! UART serial communication abstractions
//!
//! Line configuration types plus the polled transmit/receive traits.
//! The peripheral capability set used by the interrupt-driven engine lives
//! in [`crate::hardware`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Polled byte sink
///
/// Spins on the transmit-ready flag for each byte instead of using the
/// interrupt path. Never call it on a direction that has a non-blocking send
/// outstanding.
pub trait UartTx {
    type Error;

    /// Push every byte of `data` into the transmit register, then wait for
    /// the line to go idle
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Wait until the transmitter has shifted out everything it was given
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Polled byte source
///
/// Fills the caller's buffer a byte at a time, checking the line error flags
/// after each one. The first error ends the read; every byte read so far,
/// including the one that carried the error, stays in the buffer.
pub trait UartRx {
    type Error;

    /// Fill all of `buf`, returning its length
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Wait for one byte
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8; 1];
        self.read_blocking(&mut byte)?;
        Ok(byte[0])
    }
}

/// Both polled directions on one peripheral
pub trait Uart: UartTx + UartRx {}

impl<T: UartTx + UartRx> Uart for T {}

/// UART line configuration
///
/// The defaults describe a quiet 9600 8N1 asynchronous port with both
/// directions left disabled until the application asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second (0 leaves the divisor untouched)
    pub baudrate: u32,
    /// Number of data bits per character
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Synchronous (clocked) operation
    pub sync_mode: SyncMode,
    /// Internal loopback of TX onto RX
    pub loopback: bool,
    /// Enable the transmitter after configuration
    pub enable_tx: bool,
    /// Enable the receiver after configuration
    pub enable_rx: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            sync_mode: SyncMode::Disabled,
            loopback: false,
            enable_tx: false,
            enable_rx: false,
        }
    }
}

impl UartConfig {
    /// Default configuration at the given baud rate with both directions on
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            enable_tx: true,
            enable_rx: true,
            ..Self::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Seven,
    #[default]
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Clocking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyncMode {
    /// Asynchronous UART framing (oversampled receive clock)
    #[default]
    Disabled,
    /// Synchronous, clock supplied by the remote end
    Slave,
    /// Synchronous, this peripheral drives the clock
    Master,
}

impl SyncMode {
    /// Whether the divisor is programmed directly without oversampling
    pub fn is_synchronous(self) -> bool {
        !matches!(self, SyncMode::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert!(!config.enable_tx);
        assert!(!config.enable_rx);
        assert!(!config.sync_mode.is_synchronous());
    }

    #[test]
    fn test_with_baudrate_enables_both_directions() {
        let config = UartConfig::with_baudrate(115_200);
        assert_eq!(config.baudrate, 115_200);
        assert!(config.enable_tx && config.enable_rx);
    }

    #[test]
    fn test_sync_modes() {
        assert!(SyncMode::Master.is_synchronous());
        assert!(SyncMode::Slave.is_synchronous());
    }
}
