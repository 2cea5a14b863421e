// demos/simulate.rs
//
// Drains a backlog of jobs through a sink that processes at most one job per period, once with
// a plain quota and once with credit bursting, and reports how much faster bursting was.
use credit_burst::burst::{BurstError, BurstSettings, CreditController, QuotaSink};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const PERIOD: Duration = Duration::from_millis(10);

struct Backlog {
    jobs: VecDeque<u64>,
    quota: u64,
    done: Option<oneshot::Sender<()>>,
}

struct BacklogSink(Mutex<Backlog>);

impl QuotaSink for BacklogSink {
    fn current_period_usage(&self) -> u64 {
        let mut guard = self.0.lock();
        let backlog = &mut *guard;
        let Some(job) = backlog.jobs.front_mut() else {
            return 0;
        };

        let used = if *job <= backlog.quota {
            let used = *job;
            backlog.jobs.pop_front();
            used
        } else {
            *job -= backlog.quota;
            backlog.quota
        };

        if backlog.jobs.is_empty() {
            if let Some(done) = backlog.done.take() {
                let _ = done.send(());
            }
        }
        used
    }

    fn set_next_period_quota(&self, quota: u64) {
        self.0.lock().quota = quota;
    }
}

async fn drain(jobs: &[u64], base_quota: u64, burst_cap: u64) -> Result<Duration, BurstError> {
    let (tx, rx) = oneshot::channel();
    let sink = Arc::new(BacklogSink(Mutex::new(Backlog {
        jobs: jobs.iter().copied().collect(),
        quota: 0,
        done: Some(tx),
    })));
    let settings = BurstSettings::builder()
        .period(PERIOD)
        .base_quota(base_quota)
        .burst_cap(burst_cap)
        .build();
    let controller = Arc::new(CreditController::new(settings, sink)?);

    let started = Instant::now();
    let handle = controller.clone().spawn();
    let _ = rx.await;
    let elapsed = started.elapsed();

    controller.stop();
    match handle.await {
        Ok(result) => result?,
        Err(e) => tracing::error!("Control loop panicked: {}", e),
    }
    Ok(elapsed)
}

#[tokio::main]
async fn main() -> Result<(), BurstError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut rng = rand::rng();
    let cases: Vec<(&str, Vec<u64>, u64, u64)> = vec![
        ("fixed1", vec![1, 2, 3, 0, 3, 2, 1], 1, 1),
        ("fixed2", vec![1, 2, 3, 0, 3, 2, 1], 1, 2),
        ("fixed3", vec![1, 2, 3, 0, 3, 2, 1], 2, 2),
        ("fixed4", vec![1, 2, 3, 0, 3, 2, 1], 3, 3),
        ("random1", (0..10).map(|_| rng.random_range(0..5)).collect(), 4, 3),
        ("random2", (0..10).map(|_| rng.random_range(0..10)).collect(), 4, 3),
    ];

    for (name, jobs, base_quota, burst_cap) in cases {
        let without = drain(&jobs, base_quota, 0).await?;
        let with = drain(&jobs, base_quota, burst_cap).await?;
        info!(
            "[{}] {:?} quota({}) without {:?} with burst({}) {:?} -> {:.2}x faster",
            name,
            jobs,
            base_quota,
            without,
            burst_cap,
            with,
            without.as_secs_f64() / with.as_secs_f64(),
        );
    }

    Ok(())
}
