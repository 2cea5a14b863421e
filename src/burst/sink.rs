use std::sync::Arc;

/// The embedder's side of the control loop: reports usage and receives the next quota.
///
/// Both calls are made from the controller's task while it is not holding any lock, but a tick
/// does not complete until they return, so implementations should be quick and must not block.
/// A slow sink stretches the period; a panicking sink terminates the control loop and the
/// panic surfaces through the task's `JoinHandle`.
pub trait QuotaSink: Send + Sync + 'static {
    /// Amount consumed during the period that just ended.
    ///
    /// Called exactly once per tick, before the next quota is computed.
    fn current_period_usage(&self) -> u64;

    /// Quota in effect for the upcoming period.
    ///
    /// Called once when the controller starts (with the base quota) and once per tick after.
    fn set_next_period_quota(&self, quota: u64);
}

impl<T: QuotaSink> QuotaSink for Arc<T> {
    fn current_period_usage(&self) -> u64 {
        (**self).current_period_usage()
    }

    fn set_next_period_quota(&self, quota: u64) {
        (**self).set_next_period_quota(quota)
    }
}
