//! Polled transmit and receive
//!
//! Busy-wait counterparts to the interrupt-driven engine, for bring-up,
//! panic paths and simple tools. They must not run on a direction the
//! interrupt path is using.

use core::hint::spin_loop;

use tandem_hal::{StatusFlags, UartHardware, UartRx, UartTx};

use crate::error::{Error, Result};

/// Receive line errors in the order they are reported
const LINE_ERRORS: [(StatusFlags, Error); 4] = [
    (StatusFlags::FRAMING_ERROR, Error::FramingError),
    (StatusFlags::PARITY_ERROR, Error::ParityError),
    (StatusFlags::NOISE_ERROR, Error::NoiseError),
    (StatusFlags::HARDWARE_OVERRUN, Error::HardwareOverrun),
];

fn wait_for<H: UartHardware + ?Sized>(hw: &H, flag: StatusFlags) {
    while !hw.status().contains(flag) {
        spin_loop();
    }
}

/// Wait until the transmitter has shifted out its last byte
pub fn wait_tx_idle<H: UartHardware + ?Sized>(hw: &H) {
    wait_for(hw, StatusFlags::TX_IDLE);
}

/// Write every byte of `data`, then wait for the line to go idle
pub fn write_blocking<H: UartHardware + ?Sized>(hw: &mut H, data: &[u8]) {
    for &byte in data {
        wait_for(hw, StatusFlags::TX_READY);
        hw.write_data(byte);
    }
    wait_tx_idle(hw);
}

/// Fill `buf` from the receiver
///
/// Line errors are checked after each byte. The first one found is cleared
/// and returned; the byte that carried it is already stored in `buf`.
pub fn read_blocking<H: UartHardware + ?Sized>(hw: &mut H, buf: &mut [u8]) -> Result<()> {
    for slot in buf.iter_mut() {
        wait_for(hw, StatusFlags::RX_READY);
        *slot = hw.read_data();
        check_line_errors(hw)?;
    }
    Ok(())
}

fn check_line_errors<H: UartHardware + ?Sized>(hw: &mut H) -> Result<()> {
    let status = hw.status();
    for (flag, error) in LINE_ERRORS {
        if status.contains(flag) {
            hw.clear_status(flag);
            return Err(error);
        }
    }
    Ok(())
}

/// Polled serial port over a peripheral
///
/// Implements the HAL's blocking traits and `embedded-io`, so protocol
/// code written against either can run on any [`UartHardware`].
#[derive(Debug)]
pub struct Blocking<H> {
    hw: H,
}

impl<H: UartHardware> Blocking<H> {
    pub fn new(hw: H) -> Self {
        Self { hw }
    }

    pub fn inner(&self) -> &H {
        &self.hw
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn into_inner(self) -> H {
        self.hw
    }
}

impl<H: UartHardware> UartTx for Blocking<H> {
    type Error = Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<()> {
        write_blocking(&mut self.hw, data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        wait_tx_idle(&self.hw);
        Ok(())
    }
}

impl<H: UartHardware> UartRx for Blocking<H> {
    type Error = Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_blocking(&mut self.hw, buf)?;
        Ok(buf.len())
    }
}

impl<H> embedded_io::ErrorType for Blocking<H> {
    type Error = Error;
}

impl<H: UartHardware> embedded_io::Read for Blocking<H> {
    /// Wait for one byte, then take whatever else is already waiting
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        wait_for(&self.hw, StatusFlags::RX_READY);
        let mut count = 0;
        while count < buf.len() && self.hw.status().contains(StatusFlags::RX_READY) {
            buf[count] = self.hw.read_data();
            count += 1;
            check_line_errors(&mut self.hw)?;
        }
        Ok(count)
    }
}

impl<H: UartHardware> embedded_io::Write for Blocking<H> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        write_blocking(&mut self.hw, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        wait_tx_idle(&self.hw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_hal::MockUart;

    #[test]
    fn test_write_blocking() {
        let mut hw = MockUart::new();
        write_blocking(&mut hw, b"AT\r\n");
        assert_eq!(hw.sent(), b"AT\r\n");
    }

    #[test]
    fn test_read_blocking() {
        let mut hw = MockUart::new();
        hw.feed(&[1, 2, 3]);
        let mut buf = [0u8; 3];

        read_blocking(&mut hw, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(hw.pending_rx(), 0);
    }

    #[test]
    fn test_line_errors_in_priority_order() {
        let mut hw = MockUart::new();
        hw.feed(&[0x10, 0x20, 0x30, 0x40, 0x50]);
        hw.raise(
            StatusFlags::HARDWARE_OVERRUN
                | StatusFlags::NOISE_ERROR
                | StatusFlags::PARITY_ERROR
                | StatusFlags::FRAMING_ERROR,
        );
        let mut byte = [0u8; 1];

        assert_eq!(read_blocking(&mut hw, &mut byte), Err(Error::FramingError));
        assert_eq!(byte, [0x10]);
        assert_eq!(read_blocking(&mut hw, &mut byte), Err(Error::ParityError));
        assert_eq!(read_blocking(&mut hw, &mut byte), Err(Error::NoiseError));
        assert_eq!(read_blocking(&mut hw, &mut byte), Err(Error::HardwareOverrun));
        assert_eq!(read_blocking(&mut hw, &mut byte), Ok(()));
        assert_eq!(byte, [0x50]);
    }

    #[test]
    fn test_error_stops_read_early() {
        let mut hw = MockUart::new();
        hw.feed(&[1, 2, 3]);
        hw.raise(StatusFlags::PARITY_ERROR);
        let mut buf = [0u8; 3];

        assert_eq!(read_blocking(&mut hw, &mut buf), Err(Error::ParityError));
        assert_eq!(buf, [1, 0, 0]);
        assert_eq!(hw.pending_rx(), 2);
    }

    #[test]
    fn test_hal_traits() {
        let mut hw = MockUart::new();
        hw.feed(&[0x7E]);
        let mut port = Blocking::new(hw);

        UartTx::write_blocking(&mut port, &[1, 2]).unwrap();
        UartTx::flush(&mut port).unwrap();
        assert_eq!(port.read_byte(), Ok(0x7E));
        assert_eq!(port.into_inner().sent(), &[1, 2]);
    }

    #[test]
    fn test_embedded_io() {
        use embedded_io::{Read, Write};

        let mut hw = MockUart::new();
        hw.feed(b"ok");
        let mut port = Blocking::new(hw);

        port.write_all(b"ping").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(port.read(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"ok");
        assert_eq!(port.read(&mut []), Ok(0));
        assert_eq!(port.inner().sent(), b"ping");
    }
}
