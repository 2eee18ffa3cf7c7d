//! Board-agnostic interrupt-driven serial transfer engine
//!
//! This crate contains all transfer logic that does not depend on a
//! specific chip. It talks to the peripheral only through
//! [`tandem_hal::UartHardware`]:
//!
//! - Background receive ring buffer
//! - Baud rate divisor search
//! - Per-instance send/receive state and the interrupt handler
//! - Instance registry for multi-UART boards
//! - A lock wrapper for reaching a handle from an interrupt vector
//! - Polled read/write and peripheral bring-up
//!
//! # Execution contexts
//!
//! Requests are made from the foreground and return at once. The interrupt
//! handler ([`Handle::on_interrupt`]) moves one byte per direction per call
//! and reports completions through a [`TransferCallback`]. State shared
//! between the two is protected by masking the peripheral's own interrupt
//! sources ([`critical::masked`]) inside each call. How a vector gets at
//! the handle is up to the integration; [`shared`] describes the options
//! and provides [`Shared`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod baud;
pub mod blocking;
pub mod critical;
pub mod error;
pub mod init;
pub mod registry;
pub mod ring_buffer;
pub mod shared;
pub mod transfer;

pub use baud::{solve_baud, BaudPolicy, BaudRateSolver, DivisorConfig, OversampleMode};
pub use blocking::Blocking;
pub use error::{Error, Result};
pub use registry::{InstanceId, Registry};
pub use ring_buffer::RingBuffer;
pub use shared::Shared;
pub use transfer::{FnCallback, Handle, NoCallback, TransferCallback, TransferEvent};
