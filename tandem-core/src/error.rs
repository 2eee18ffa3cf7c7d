//! Error taxonomy
//!
//! Every synchronous API returns these. Asynchronous faults are not errors:
//! they reach the application as [`TransferEvent`](crate::transfer::TransferEvent)s
//! through the callback.

use core::fmt;

/// Errors returned by the transfer engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Malformed request (empty buffer, undersized storage, zero clock or baud)
    InvalidArgument,
    /// A send is already outstanding
    TxBusy,
    /// A receive is already outstanding
    RxBusy,
    /// Progress queried on an idle direction
    NoTransferInProgress,
    /// No divisor setting reaches the requested baud rate
    BaudrateNotSupported,
    /// Stop bit missing on a blocking read
    FramingError,
    /// Parity mismatch on a blocking read
    ParityError,
    /// Line noise on a blocking read
    NoiseError,
    /// Receive overrun on a blocking read
    HardwareOverrun,
    /// Instance already has a handle
    InstanceInUse,
    /// Registry has no free slot
    RegistryFull,
    /// No handle registered for the instance
    UnknownInstance,
    /// Shared engine state entered again while already in use
    Reentered,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidArgument => "invalid argument",
            Error::TxBusy => "transmit busy",
            Error::RxBusy => "receive busy",
            Error::NoTransferInProgress => "no transfer in progress",
            Error::BaudrateNotSupported => "baud rate not supported",
            Error::FramingError => "framing error",
            Error::ParityError => "parity error",
            Error::NoiseError => "noise error",
            Error::HardwareOverrun => "hardware overrun",
            Error::InstanceInUse => "instance already registered",
            Error::RegistryFull => "registry full",
            Error::UnknownInstance => "unknown instance",
            Error::Reentered => "engine re-entered",
        };
        f.write_str(msg)
    }
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::InvalidArgument => embedded_io::ErrorKind::InvalidInput,
            Error::FramingError | Error::ParityError | Error::NoiseError => {
                embedded_io::ErrorKind::InvalidData
            }
            Error::BaudrateNotSupported => embedded_io::ErrorKind::Unsupported,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;
