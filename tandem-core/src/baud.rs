//! Baud rate divisor search
//!
//! Maps a source clock and target baud rate onto a divisor (and, where the
//! peripheral has one, an oversample ratio). Pure arithmetic: the result is
//! handed to [`UartHardware::set_divisor`](tandem_hal::UartHardware::set_divisor)
//! by the caller.
//!
//! # Modes
//!
//! - Synchronous: the divisor alone sets the bit clock, `clock / baud`.
//! - Asynchronous, programmable oversample: oversample register values 15
//!   down to 8 (ratios 16 down to 9) are tried and the pair with the smallest
//!   absolute baud error wins. Ties go to the larger ratio.
//! - Asynchronous, fixed oversample: ratio 16, `(clock >> 4) / baud`.
//!
//! Results more than 3% off target are a soft fault. [`BaudPolicy`] decides
//! whether that is logged and accepted or rejected.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tandem_hal::DivisorSetting;

use crate::error::{Error, Result};

/// Largest value the divisor register holds
pub const MAX_DIVISOR: u32 = 0xFFFF;

/// Highest oversample register value tried (ratio 16)
pub const OVERSAMPLE_MAX: u8 = 15;

/// Lowest oversample register value tried (ratio 9)
pub const OVERSAMPLE_MIN: u8 = 8;

/// Allowed deviation from the target baud rate, in percent
pub const TOLERANCE_PERCENT: u32 = 3;

/// What to do when the best divisor misses the target by more than
/// [`TOLERANCE_PERCENT`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BaudPolicy {
    /// Reject with [`Error::BaudrateNotSupported`]
    Strict,
    /// Log a warning and use the closest match
    #[default]
    Permissive,
}

/// Oversampling capability of the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OversampleMode {
    /// Oversample ratio is programmable (9 to 16)
    #[default]
    Programmable,
    /// Oversample ratio is fixed at 16
    Fixed,
}

/// Solved baud generator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DivisorConfig {
    /// Divisor register value (divide ratio minus one)
    pub divisor: u16,
    /// Oversample register value (ratio minus one), when programmable
    pub oversample: Option<u8>,
    /// Requested baud rate
    pub target_baud: u32,
    /// Baud rate this setting actually produces
    pub achieved_baud: u32,
}

impl DivisorConfig {
    /// Setting to program into the hardware
    pub fn setting(&self) -> DivisorSetting {
        DivisorSetting {
            divisor: self.divisor,
            oversample: self.oversample,
        }
    }

    /// Absolute distance from the target, in baud
    pub fn deviation(&self) -> u32 {
        self.achieved_baud.abs_diff(self.target_baud)
    }

    /// Relative error in parts per million
    pub fn error_ppm(&self) -> u32 {
        if self.target_baud == 0 {
            return 0;
        }
        (u64::from(self.deviation()) * 1_000_000 / u64::from(self.target_baud)) as u32
    }

    /// Whether the error is within [`TOLERANCE_PERCENT`]
    pub fn within_tolerance(&self) -> bool {
        u64::from(self.deviation()) * 100
            <= u64::from(self.target_baud) * u64::from(TOLERANCE_PERCENT)
    }
}

/// Divisor search configured for one kind of peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaudRateSolver {
    pub oversample: OversampleMode,
    pub policy: BaudPolicy,
}

impl BaudRateSolver {
    pub const fn new(oversample: OversampleMode, policy: BaudPolicy) -> Self {
        Self { oversample, policy }
    }

    /// Find the divisor setting closest to `target_baud`
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for a zero clock or baud rate
    /// - [`Error::BaudrateNotSupported`] if no setting fits the registers, or
    ///   the best one is out of tolerance under [`BaudPolicy::Strict`]
    pub fn solve(
        &self,
        source_clock_hz: u32,
        target_baud: u32,
        synchronous: bool,
    ) -> Result<DivisorConfig> {
        if source_clock_hz == 0 || target_baud == 0 {
            return Err(Error::InvalidArgument);
        }

        let config = if synchronous {
            solve_synchronous(source_clock_hz, target_baud)?
        } else {
            match self.oversample {
                OversampleMode::Programmable => solve_programmable(source_clock_hz, target_baud)?,
                OversampleMode::Fixed => solve_fixed(source_clock_hz, target_baud)?,
            }
        };

        if !synchronous && !config.within_tolerance() {
            warn!(
                "baud {} unreachable from {} Hz, closest {} ({} ppm off)",
                target_baud,
                source_clock_hz,
                config.achieved_baud,
                config.error_ppm()
            );
            if self.policy == BaudPolicy::Strict {
                return Err(Error::BaudrateNotSupported);
            }
        }

        Ok(config)
    }
}

/// Solve with a programmable-oversample, permissive solver
pub fn solve_baud(source_clock_hz: u32, target_baud: u32, synchronous: bool) -> Result<DivisorConfig> {
    BaudRateSolver::default().solve(source_clock_hz, target_baud, synchronous)
}

/// Turn a divide ratio into a register value, if it fits
fn divisor_for(ratio: u64) -> Option<u16> {
    if ratio == 0 || ratio - 1 > u64::from(MAX_DIVISOR) {
        return None;
    }
    Some((ratio - 1) as u16)
}

fn solve_synchronous(clock: u32, baud: u32) -> Result<DivisorConfig> {
    let ratio = clock / baud;
    let divisor = divisor_for(u64::from(ratio)).ok_or(Error::BaudrateNotSupported)?;
    Ok(DivisorConfig {
        divisor,
        oversample: None,
        target_baud: baud,
        achieved_baud: clock / ratio,
    })
}

fn solve_programmable(clock: u32, baud: u32) -> Result<DivisorConfig> {
    let clock = u64::from(clock);
    let mut best: Option<DivisorConfig> = None;

    for osr in (OVERSAMPLE_MIN..=OVERSAMPLE_MAX).rev() {
        let oversample = u64::from(osr) + 1;
        let denominator = oversample * u64::from(baud);
        let ratio = (clock + denominator / 2) / denominator;
        let Some(divisor) = divisor_for(ratio) else {
            continue;
        };

        let candidate = DivisorConfig {
            divisor,
            oversample: Some(osr),
            target_baud: baud,
            achieved_baud: (clock / (oversample * ratio)) as u32,
        };
        if best.map_or(true, |b| candidate.deviation() < b.deviation()) {
            best = Some(candidate);
        }
    }

    best.ok_or(Error::BaudrateNotSupported)
}

fn solve_fixed(clock: u32, baud: u32) -> Result<DivisorConfig> {
    let sample_clock = clock >> 4;
    let ratio = sample_clock / baud;
    let divisor = divisor_for(u64::from(ratio)).ok_or(Error::BaudrateNotSupported)?;
    Ok(DivisorConfig {
        divisor,
        oversample: None,
        target_baud: baud,
        achieved_baud: sample_clock / ratio,
    })
}
