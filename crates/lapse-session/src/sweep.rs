//! Background sweeper task.
//!
//! Periodically evicts expired sessions from the table.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::MAX_TTL;
use crate::error::{Error, Result};
use crate::table::SessionTable;

/// Shortest period the sweeper will tick at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running sweeper. Dropping it stops the task.
#[derive(Debug)]
pub(crate) struct Sweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweeper onto the current Tokio runtime.
    ///
    /// The first sweep runs one full interval after spawning. Fails with
    /// [`Error::NoRuntime`] when called outside a runtime.
    pub(crate) fn spawn(table: Arc<SessionTable>, sweep_interval: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = sweep_interval.clamp(MIN_SWEEP_INTERVAL, MAX_TTL);

        let handle = runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        debug!("Session sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = table.sweep();
                        if evicted > 0 {
                            debug!(evicted = evicted, "Session sweep completed");
                        }
                        debug!(active_sessions = table.len(), "Session store status");
                    }
                }
            }
        });

        Ok(Self { cancel, handle })
    }

    /// Signal the task to stop. Idempotent.
    pub(crate) fn stop(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpiryPolicy;
    use crate::id::SessionId;
    use tokio::time::sleep;

    fn table(ttl_secs: u64) -> Arc<SessionTable> {
        Arc::new(SessionTable::new(
            Duration::from_secs(ttl_secs),
            ExpiryPolicy::Physical,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_expired() {
        let table = table(2);
        table.insert(SessionId::from("s1")).unwrap();
        let _sweeper = Sweeper::spawn(Arc::clone(&table), Duration::from_secs(1)).unwrap();

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(table.len(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(table.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_sweeping() {
        let table = table(1);
        table.insert(SessionId::from("s1")).unwrap();
        let sweeper = Sweeper::spawn(Arc::clone(&table), Duration::from_secs(1)).unwrap();

        sweeper.stop();
        sleep(Duration::from_secs(5)).await;

        assert!(!sweeper.is_running());
        assert_eq!(table.len(), 1, "stopped sweeper must not evict");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let table = table(1);
        let sweeper = Sweeper::spawn(Arc::clone(&table), Duration::from_secs(1)).unwrap();
        drop(sweeper);

        sleep(Duration::from_secs(2)).await;
        // Only the test's handle remains once the task has exited
        assert_eq!(Arc::strong_count(&table), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let table = table(1);
        table.insert(SessionId::from("s1")).unwrap();
        let _sweeper = Sweeper::spawn(Arc::clone(&table), Duration::ZERO).unwrap();

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let result = Sweeper::spawn(table(1), Duration::from_secs(1));
        assert!(matches!(result, Err(Error::NoRuntime)));
    }
}
