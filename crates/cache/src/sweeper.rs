//! Periodic purge of expired cache entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::store::TtlCache;

/// Owns the background sweep task; stopping or dropping it cancels the task
#[derive(Debug)]
pub struct SweepHandle {
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Cache sweeper stopped");
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start sweeping `cache` every `every` on the current tokio runtime.
///
/// The task holds only a weak reference, so it ends on its own once the
/// cache is dropped.
pub fn spawn_sweeper<V>(cache: &Arc<TtlCache<V>>, every: Duration) -> SweepHandle
where
    V: Clone + Send + Sync + 'static,
{
    let weak: Weak<TtlCache<V>> = Arc::downgrade(cache);

    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(cache) = weak.upgrade() else {
                debug!("Cache dropped, sweeper exiting");
                break;
            };

            let removed = cache.sweep_expired();
            if removed > 0 {
                info!("Cache sweep removed {} expired entries", removed);
            }
        }
    });

    SweepHandle { task: Some(task) }
}
