//! Tandem Hardware Abstraction Layer
//!
//! This crate defines the hardware boundary of the Tandem serial transfer
//! engine. Chip-specific HALs implement these traits over their register
//! blocks; the engine in `tandem-core` only ever talks to the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-core (transfer engine)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip HAL     │       │  mock (tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`hardware::UartHardware`] - Register-level capability set for the engine
//! - [`uart::UartTx`], [`uart::UartRx`] - Blocking serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod hardware;
#[cfg(feature = "mock")]
pub mod mock;
pub mod uart;

// Re-export key types at crate root for convenience
pub use hardware::{DivisorSetting, InterruptSources, StatusFlags, UartHardware};
#[cfg(feature = "mock")]
pub use mock::MockUart;
pub use uart::{DataBits, Parity, StopBits, SyncMode, Uart, UartConfig, UartRx, UartTx};
