//! Peripheral bring-up and teardown

use tandem_hal::{InterruptSources, UartConfig, UartHardware};

use crate::baud::{BaudRateSolver, DivisorConfig};
use crate::blocking::wait_tx_idle;
use crate::error::{Error, Result};

/// Configure and enable a peripheral
///
/// The divisor is solved before any register is touched, so a rejected baud
/// rate leaves the peripheral as it was. A `baudrate` of 0 keeps the current
/// divisor. Returns the divisor that was applied, if any.
///
/// # Errors
/// - [`Error::InvalidArgument`] if `clock_hz` is zero
/// - [`Error::BaudrateNotSupported`] from the solver
pub fn init<H>(
    hw: &mut H,
    config: &UartConfig,
    clock_hz: u32,
    solver: &BaudRateSolver,
) -> Result<Option<DivisorConfig>>
where
    H: UartHardware + ?Sized,
{
    if clock_hz == 0 {
        return Err(Error::InvalidArgument);
    }

    let divisor = match config.baudrate {
        0 => None,
        baud => Some(solver.solve(clock_hz, baud, config.sync_mode.is_synchronous())?),
    };

    hw.configure_frame(config);
    if let Some(divisor) = &divisor {
        hw.set_divisor(divisor.setting());
        debug!(
            "baud {} (divisor {}, achieved {})",
            divisor.target_baud,
            divisor.divisor,
            divisor.achieved_baud
        );
    }
    hw.set_enabled(true);
    hw.set_tx_enabled(config.enable_tx);
    hw.set_rx_enabled(config.enable_rx);

    Ok(divisor)
}

/// Change the baud rate of a running peripheral
pub fn set_baud_rate<H>(
    hw: &mut H,
    baud: u32,
    clock_hz: u32,
    synchronous: bool,
    solver: &BaudRateSolver,
) -> Result<DivisorConfig>
where
    H: UartHardware + ?Sized,
{
    let divisor = solver.solve(clock_hz, baud, synchronous)?;
    hw.set_divisor(divisor.setting());
    Ok(divisor)
}

/// Let the transmitter finish, then shut the peripheral down
pub fn deinit<H>(hw: &mut H)
where
    H: UartHardware + ?Sized,
{
    wait_tx_idle(hw);
    hw.disable_interrupts(InterruptSources::all());
    hw.set_tx_enabled(false);
    hw.set_rx_enabled(false);
    hw.set_enabled(false);
}
