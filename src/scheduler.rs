use clap::ValueEnum;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

/// What to do with a tick that fires while the previous cycle is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverlapPolicy {
    /// Drop the tick; the next cycle starts on the following tick
    #[default]
    Skip,
    /// Run the late tick as soon as the busy cycle ends, then resume spacing
    Queue,
    /// Start a new cycle on every tick, even if others are still in flight
    Concurrent,
}

/// Runs a job immediately and then once per interval until shut down
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    policy: OverlapPolicy,
}

impl Scheduler {
    pub fn new(interval: Duration, policy: OverlapPolicy) -> Self {
        Self { interval, policy }
    }

    /// Tick until `shutdown` resolves; cycles still in flight at that point are aborted
    pub async fn run<F, Fut, S>(&self, job: F, shutdown: S)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(match self.policy {
            OverlapPolicy::Queue => MissedTickBehavior::Delay,
            OverlapPolicy::Skip | OverlapPolicy::Concurrent => MissedTickBehavior::Skip,
        });

        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            reap(&mut in_flight);
            match self.policy {
                OverlapPolicy::Skip if !in_flight.is_empty() => {
                    tracing::warn!("previous cycle still running, skipping this tick");
                }
                OverlapPolicy::Skip | OverlapPolicy::Concurrent => {
                    if !in_flight.is_empty() {
                        tracing::warn!(in_flight = in_flight.len(), "starting cycle while others are still running");
                    }
                    in_flight.spawn(job());
                }
                OverlapPolicy::Queue => {
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = job() => {}
                    }
                }
            }
        }

        in_flight.shutdown().await;
    }
}

/// Collect finished cycles, reporting any that panicked
fn reap(in_flight: &mut JoinSet<()>) {
    while let Some(result) = in_flight.try_join_next() {
        if let Err(e) = result {
            tracing::error!(error = %e, "polling cycle panicked");
        }
    }
}
