use std::time::Duration;

use snafu::Snafu;

/// Errors surfaced by the credit controller.
///
/// Arithmetic edge cases (credit that would go negative or overflow) are not errors; the
/// ledger saturates instead.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum BurstError {
    /// The configured period was zero.
    #[snafu(display("burst period must be greater than zero"))]
    ZeroPeriod,

    /// The configured period is too long to schedule a tick on this clock.
    #[snafu(display("burst period of {:?} cannot be scheduled", period))]
    PeriodTooLong { period: Duration },

    /// `run` was called on a controller that had already been started.
    #[snafu(display("credit controller already started"))]
    AlreadyStarted,

    /// `run` was called on a controller that was stopped before it ever ran.
    #[snafu(display("credit controller was stopped before it started"))]
    Stopped,
}
