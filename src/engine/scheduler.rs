use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use crate::config::DEBUG_FLAGS;
use crate::data::SeriesFetcher;

use super::core::BreakoutEngine;
use super::messages::TickReport;

/// Serialises ticks coming from a timer. A tick that fires while the previous
/// one still holds the engine is dropped, never queued.
#[derive(Clone)]
pub struct TickScheduler {
    engine: Arc<Mutex<BreakoutEngine>>,
    dropped: Arc<AtomicU64>,
}

impl TickScheduler {
    pub fn new(engine: BreakoutEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs a tick unless one is already in progress.
    pub fn try_tick(
        &self,
        fetcher: &dyn SeriesFetcher,
        tick_ts: DateTime<Utc>,
    ) -> Option<TickReport> {
        let mut engine = match self.engine.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if DEBUG_FLAGS.print_dropped_ticks {
                    log::warn!(
                        "Tick @ {} dropped: previous tick still running ({} dropped so far)",
                        tick_ts.format("%H:%M:%S"),
                        dropped
                    );
                }
                return None;
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                // A panic mid-tick leaves at worst a partially updated registry
                log::error!("Engine lock poisoned by an earlier tick, continuing");
                poisoned.into_inner()
            }
        };
        Some(engine.run_tick(fetcher, tick_ts))
    }

    /// Shared handle for callers that need to inspect or reconfigure the engine.
    pub fn engine(&self) -> Arc<Mutex<BreakoutEngine>> {
        Arc::clone(&self.engine)
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::data::InMemoryFetcher;

    #[test]
    fn overlapping_tick_is_dropped() {
        let engine = BreakoutEngine::new(EngineConfig::default()).unwrap();
        let scheduler = TickScheduler::new(engine);
        let fetcher = InMemoryFetcher::new();

        let handle = scheduler.engine();
        let held = handle.lock().unwrap();
        assert!(scheduler.try_tick(&fetcher, Utc::now()).is_none());
        assert_eq!(scheduler.dropped_ticks(), 1);
        drop(held);

        assert!(scheduler.try_tick(&fetcher, Utc::now()).is_some());
        assert_eq!(handle.lock().unwrap().ticks_run(), 1);
    }

    #[test]
    fn poisoned_engine_keeps_ticking() {
        let engine = BreakoutEngine::new(EngineConfig::default()).unwrap();
        let scheduler = TickScheduler::new(engine);
        let fetcher = InMemoryFetcher::new();

        let handle = scheduler.engine();
        let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = handle.lock().unwrap();
            panic!("tick crashed while holding the engine");
        }));
        assert!(crashed.is_err());
        assert!(handle.is_poisoned());

        let report = scheduler.try_tick(&fetcher, Utc::now());
        assert!(report.is_some());
        assert_eq!(scheduler.dropped_ticks(), 0);
    }
}
