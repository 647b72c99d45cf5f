//! Simulated market ticks arriving at irregular intervals.
//!
//! Each tick is what a chart redraw would be: the moment a new price lands
//! and one beat should sound.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::params::TickerConfig;

/// Sequence of gaps between ticks: `min_interval + uniform[0, jitter)`
pub struct TickSchedule {
    min_interval_ms: u64,
    jitter_ms: u64,
    rng: StdRng,
}

impl TickSchedule {
    pub fn new(config: &TickerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            min_interval_ms: config.min_interval_ms,
            jitter_ms: config.jitter_ms,
            rng,
        }
    }

    /// Gap until the next tick
    pub fn next_interval(&mut self) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            self.rng.random_range(0..self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.min_interval_ms.saturating_add(jitter))
    }
}

/// Background thread firing `on_tick` on the schedule until stopped
pub struct Ticker {
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<u64>>,
}

/// Granularity at which a sleeping ticker notices cancellation
const CANCEL_POLL: Duration = Duration::from_millis(10);

impl Ticker {
    pub fn spawn<F>(config: &TickerConfig, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let mut schedule = TickSchedule::new(config);
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            let mut ticks = 0u64;
            loop {
                // Measured as elapsed time so very long gaps cannot overflow an Instant
                let gap = schedule.next_interval();
                let started = Instant::now();
                loop {
                    if cancel_flag.load(Ordering::Acquire) {
                        return ticks;
                    }
                    let elapsed = started.elapsed();
                    if elapsed >= gap {
                        break;
                    }
                    thread::sleep((gap - elapsed).min(CANCEL_POLL));
                }
                on_tick();
                ticks += 1;
                log::debug!("Tick {}", ticks);
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop ticking, returning how many ticks fired
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.cancel.store(true, Ordering::Release);
        self.handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}
