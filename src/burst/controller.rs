use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use parking_lot::RwLock;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{
    BurstError, BurstSettings, CreditLedger, QuotaSink,
    error,
    internal_event::{
        ControllerStarted, ControllerStopped, CreditSettled, InternalEvent, SecondStartRejected,
    },
};

/// Lifecycle of a [`CreditController`]. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Created,
    Running,
    Stopped,
}

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
// Stopped after running.
const STOPPED: u8 = 2;
// Stopped without ever running.
const CANCELLED: u8 = 3;

impl ControllerState {
    const fn from_u8(value: u8) -> Self {
        match value {
            CREATED => ControllerState::Created,
            RUNNING => ControllerState::Running,
            _ => ControllerState::Stopped,
        }
    }
}

/// Periodically recomputes the quota of one stream from its banked credit.
///
/// The controller starts in [`ControllerState::Created`]. [`run`](Self::run) publishes the base
/// quota and then, once per period, settles the sink's reported usage against the credit balance
/// and publishes `base_quota + min(credit, burst_cap)` for the next period. [`stop`](Self::stop)
/// ends the loop before its next sink interaction.
///
/// The balance can be read with [`credit`](Self::credit) from any thread at any time. Readers
/// share a read lock; a tick holds the write lock only while the ledger is updated, so a reader
/// always sees the result of a completed settlement.
pub struct CreditController<S> {
    settings: BurstSettings,
    sink: Arc<S>,
    ledger: RwLock<CreditLedger>,
    state: AtomicU8,
    shutdown: CancellationToken,
}

impl<S: QuotaSink> CreditController<S> {
    /// Creates a controller with zero credit. Nothing is published until [`run`](Self::run).
    pub fn new(settings: BurstSettings, sink: Arc<S>) -> Result<Self, BurstError> {
        settings.validate()?;

        Ok(Self {
            settings,
            sink,
            ledger: RwLock::new(CreditLedger::new(&settings)),
            state: AtomicU8::new(CREATED),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn settings(&self) -> &BurstSettings {
        &self.settings
    }

    pub fn state(&self) -> ControllerState {
        ControllerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current credit balance, as of the last completed tick.
    pub fn credit(&self) -> u64 {
        self.ledger.read().credit()
    }

    /// Quota the current balance grants to the next period.
    pub fn next_quota(&self) -> u64 {
        self.ledger.read().quota()
    }

    /// Runs the control loop until [`stop`](Self::stop) is called.
    ///
    /// The returned future occupies its task for the lifetime of the controller; use
    /// [`spawn`](Self::spawn) to run it in the background. A controller runs at most once:
    /// any later call fails with [`BurstError::AlreadyStarted`], and a controller stopped
    /// before it ever ran fails with [`BurstError::Stopped`].
    pub async fn run(&self) -> Result<(), BurstError> {
        self.start()?;

        let period = self.settings.period();
        // The first settlement happens one full period after start.
        let Some(first_tick) = Instant::now().checked_add(period) else {
            self.state.store(STOPPED, Ordering::Release);
            return error::PeriodTooLongSnafu { period }.fail();
        };

        ControllerStarted {
            base_quota: self.settings.base_quota(),
            burst_cap: self.settings.burst_cap(),
            period,
        }
        .emit();
        if !self.shutdown.is_cancelled() {
            self.sink.set_next_period_quota(self.settings.base_quota());
        }

        let mut ticker = time::interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick(),
            }
        }

        self.state.store(STOPPED, Ordering::Release);
        ControllerStopped {
            credit: self.credit(),
        }
        .emit();
        Ok(())
    }

    /// Runs the control loop on a dedicated tokio task.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<Result<(), BurstError>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Asks the control loop to exit before its next sink interaction.
    ///
    /// Meant to be called exactly once; further calls have no effect. A tick already in progress
    /// completes, and no quota is published after it. A stop racing with the start of
    /// [`run`](Self::run) may still let the base quota through, but no tick follows it.
    pub fn stop(&self) {
        self.shutdown.cancel();
        let _ = self
            .state
            .compare_exchange(CREATED, CANCELLED, Ordering::AcqRel, Ordering::Acquire);
    }

    fn start(&self) -> Result<(), BurstError> {
        match self
            .state
            .compare_exchange(CREATED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(()),
            Err(CANCELLED) => error::StoppedSnafu.fail(),
            Err(_) => {
                SecondStartRejected.emit();
                error::AlreadyStartedSnafu.fail()
            }
        }
    }

    fn tick(&self) {
        let used = self.sink.current_period_usage();
        let settlement = self.ledger.write().settle(used);
        self.sink.set_next_period_quota(settlement.quota);
        CreditSettled(settlement).emit();
    }
}
