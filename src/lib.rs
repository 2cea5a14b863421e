//! Periodic credit-based quota bursting.
//!
//! A [`CreditController`](burst::CreditController) lets a consumer exceed its steady-state
//! quota for a period by spending credit banked during earlier periods of under-use, while
//! capping what any single period may draw at a configured burst ceiling.
//!
//! # Algorithm Overview
//!
//! Every period the controller:
//! 1. **Reads usage**: asks the [`QuotaSink`](burst::QuotaSink) how much of the last quota was consumed
//! 2. **Settles credit**: banks unused quota, or charges the overrun (at most `burst_cap`) against credit
//! 3. **Publishes**: hands `base_quota + min(credit, burst_cap)` back to the sink for the next period
//!
//! Enforcing the quota and measuring usage are left to the embedding application.
//!
//! # Basic Usage
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//! use credit_burst::burst::{BurstSettings, CreditController, QuotaSink};
//!
//! struct Limiter;
//!
//! impl QuotaSink for Limiter {
//!     fn current_period_usage(&self) -> u64 { 0 }
//!     fn set_next_period_quota(&self, _quota: u64) {}
//! }
//!
//! # async fn run() -> Result<(), credit_burst::burst::BurstError> {
//! let settings = BurstSettings::builder()
//!     .period(Duration::from_secs(1))
//!     .base_quota(100)
//!     .burst_cap(50)
//!     .build();
//! let controller = Arc::new(CreditController::new(settings, Arc::new(Limiter))?);
//! let handle = controller.clone().spawn();
//! // ...
//! controller.stop();
//! # let _ = handle.await;
//! # Ok(())
//! # }
//! ```
//!
//! # Metrics
//! Emits metrics via the `InternalEvent` trait
pub mod burst;
#[cfg(test)]
pub mod test_utils;

#[macro_use]
extern crate tracing;
