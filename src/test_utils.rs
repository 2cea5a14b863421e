use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::burst::QuotaSink;

pub fn trace_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Sink that reports a settable usage and remembers every quota it was handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    usage: AtomicU64,
    published: Mutex<Vec<u64>>,
}

impl RecordingSink {
    pub fn set_usage(&self, used: u64) {
        self.usage.store(used, Ordering::SeqCst);
    }

    /// Last published quota, or 0 if nothing was published yet.
    pub fn quota(&self) -> u64 {
        self.published.lock().last().copied().unwrap_or_default()
    }

    pub fn published(&self) -> Vec<u64> {
        self.published.lock().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }
}

impl QuotaSink for RecordingSink {
    fn current_period_usage(&self) -> u64 {
        self.usage.load(Ordering::SeqCst)
    }

    fn set_next_period_quota(&self, quota: u64) {
        self.published.lock().push(quota);
    }
}
