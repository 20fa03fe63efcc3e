//! Fixed-period export ticker.
//!
//! Ticks fire on a fixed period regardless of how long earlier pushes take:
//! every tick runs in its own task. The first tick fires one period after
//! start.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::Exporter;

/// Cancellation handle for a running schedule.
///
/// Dropping the handle stops the ticker as well. The ticker is a plain tokio
/// task and never keeps the process alive.
pub struct ScheduleHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Stop firing new ticks. Pushes already in flight are left to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

pub fn spawn_schedule(exporter: Exporter, period: Duration) -> ScheduleHandle {
    let (stop, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_ms = period.as_millis() as u64, "metrics export scheduled");
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let exporter = exporter.clone();
                    tokio::spawn(async move {
                        exporter.run_tick().await;
                    });
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("metrics export stopped");
    });

    ScheduleHandle { stop, task }
}
