//! Observability events emitted by the credit controller.
//!
//! Each event records its metrics and logs a matching `tracing` line under the
//! `credit_burst::stats` target.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

use super::Settlement;

pub trait InternalEvent: Sized {
    fn emit(self);
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerStarted {
    pub base_quota: u64,
    pub burst_cap: u64,
    pub period: Duration,
}

impl InternalEvent for ControllerStarted {
    fn emit(self) {
        histogram!("credit_burst_published_quota").record(self.base_quota as f64);
        info!(
            target: "credit_burst::stats",
            base_quota = self.base_quota,
            burst_cap = self.burst_cap,
            period_ms = self.period.as_millis(),
            "Credit controller started"
        );
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CreditSettled(pub Settlement);

impl InternalEvent for CreditSettled {
    fn emit(self) {
        let s = self.0;
        counter!("credit_burst_ticks_total").increment(1);
        counter!("credit_burst_spent_credit_total").increment(s.charged());
        // Gauges are f64; very large balances lose precision here but not in the ledger.
        gauge!("credit_burst_credit").set(s.credit as f64);
        histogram!("credit_burst_published_quota").record(s.quota as f64);

        debug!(
            target: "credit_burst::stats",
            used = s.used,
            credit_before = s.credit_before,
            credit = s.credit,
            burst = s.burst,
            next_quota = s.quota,
            "Credit settled"
        );
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SecondStartRejected;

impl InternalEvent for SecondStartRejected {
    fn emit(self) {
        counter!("credit_burst_rejected_starts_total").increment(1);
        warn!(target: "credit_burst::stats", "Credit controller already started; rejecting second run");
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerStopped {
    pub credit: u64,
}

impl InternalEvent for ControllerStopped {
    fn emit(self) {
        gauge!("credit_burst_credit").set(self.credit as f64);
        info!(target: "credit_burst::stats", credit = self.credit, "Credit controller stopped");
    }
}
