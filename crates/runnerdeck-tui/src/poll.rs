//! The poll loop: one fetch in flight at a time, driven by a fixed interval
//! and manual refresh requests.

use chrono::Utc;
use runnerdeck_core::{reconcile, MonitorTarget, Snapshot};
use runnerdeck_github::RunnerSource;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const EVENT_QUEUE_CAPACITY: usize = 16;

/// Manual trigger for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    Refresh,
}

/// What one tick produced. On `Failed` the consumer keeps whatever snapshot
/// it already has; the error is additive.
#[derive(Debug)]
pub enum PollEvent {
    Started,
    Snapshot(Snapshot),
    Failed { error: String },
}

/// Runs until the command channel closes. The caller aborts the task on
/// quit, which also cancels any in-flight fetch; no tick fires afterwards.
///
/// Triggers that arrive while a fetch is in flight are coalesced: the
/// command channel is drained and the timer reset after every fetch, so a
/// manual refresh during a tick-triggered fetch never launches a second one.
pub async fn poll_loop<S: RunnerSource>(
    source: S,
    target: MonitorTarget,
    period: Duration,
    mut commands: mpsc::Receiver<PollCommand>,
    events: mpsc::Sender<PollEvent>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if events.send(PollEvent::Started).await.is_err() {
            return;
        }
        let event = run_tick(&source, &target).await;
        while commands.try_recv().is_ok() {}
        ticker.reset();
        if events.send(event).await.is_err() {
            return;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            command = commands.recv() => match command {
                Some(PollCommand::Refresh) => debug!("manual refresh requested"),
                None => return,
            },
        }
    }
}

async fn run_tick<S: RunnerSource>(source: &S, target: &MonitorTarget) -> PollEvent {
    // The two reads are independent; run them side by side. Either failure
    // fails the whole tick, partial data is never published.
    let (runners, jobs) = tokio::join!(
        source.list_runners(target),
        source.list_active_jobs(target)
    );
    match (runners, jobs) {
        (Ok(runners), Ok(jobs)) => {
            let now = Utc::now();
            let rows = reconcile(&runners, &jobs, now);
            debug!(rows = rows.len(), "tick reconciled");
            PollEvent::Snapshot(Snapshot {
                rows,
                fetched_at: now,
            })
        }
        (Err(error), _) | (_, Err(error)) => {
            warn!(%error, "poll tick failed");
            PollEvent::Failed {
                error: error.to_string(),
            }
        }
    }
}
