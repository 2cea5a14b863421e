//! Grant a quota stream extra headroom from credit banked in earlier periods.

mod controller;
mod error;
pub mod internal_event;
mod ledger;
mod sink;

use std::time::{Duration, Instant};

use bon::Builder;
use serde::{Deserialize, Deserializer};

pub use controller::{ControllerState, CreditController};
pub use error::BurstError;
pub use ledger::{CreditLedger, Settlement};
pub use sink::QuotaSink;

/// Configuration of a credit controller.
///
/// All three values are fixed for the lifetime of a controller.
///
/// | Parameter | Default | Description |
/// |-----------|---------|-------------|
/// | `period` | required | Time between quota recalculations. Must be non-zero. |
/// | `base_quota` | required | Steady-state allotment per period. Unused allotment is banked as credit. |
/// | `burst_cap` | 0 | Most credit a single period may spend on top of `base_quota`. `0` disables bursting. |
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use credit_burst::burst::BurstSettings;
///
/// let settings = BurstSettings::builder()
///     .period(Duration::from_millis(100))
///     .base_quota(10)
///     .burst_cap(5)
///     .build();
/// assert_eq!(settings.credit_ceiling(), u64::MAX - 10);
/// ```
///
/// Settings can also be loaded from configuration, where the period is given in milliseconds:
///
/// ```json
/// { "period_ms": 100, "base_quota": 10, "burst_cap": 5 }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BurstSettings {
    /// Duration between quota recalculations.
    #[serde(rename = "period_ms", deserialize_with = "deserialize_millis")]
    pub(super) period: Duration,

    /// Steady-state allotment per period.
    pub(super) base_quota: u64,

    /// Maximum extra quota a single period may draw from credit.
    ///
    /// This bounds what is *spent* per period, not what is *saved*: credit keeps accumulating
    /// past `burst_cap` up to [`BurstSettings::credit_ceiling`].
    #[serde(default)]
    #[builder(default)]
    pub(super) burst_cap: u64,
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl BurstSettings {
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn base_quota(&self) -> u64 {
        self.base_quota
    }

    pub fn burst_cap(&self) -> u64 {
        self.burst_cap
    }

    /// Highest credit balance the ledger will hold.
    ///
    /// Chosen so that banking a full period's quota on top of it can never overflow.
    pub const fn credit_ceiling(&self) -> u64 {
        u64::MAX - self.base_quota
    }

    pub fn validate(&self) -> Result<(), BurstError> {
        snafu::ensure!(!self.period.is_zero(), error::ZeroPeriodSnafu);
        snafu::ensure!(
            Instant::now().checked_add(self.period).is_some(),
            error::PeriodTooLongSnafu {
                period: self.period
            }
        );
        Ok(())
    }
}
