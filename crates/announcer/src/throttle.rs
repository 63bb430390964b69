//! Single-flight announcement throttle

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Result of a trigger request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Gate was free; the announcement ran and a cooldown started
    Accepted,
    /// A cooldown was in progress; the request was discarded
    Dropped,
}

/// Counters since the throttle was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleStats {
    pub accepted: u64,
    pub dropped: u64,
}

struct Gate {
    busy: AtomicBool,
    /// Current cycle; bumped by every accepted trigger and every cancel
    generation: AtomicU64,
    accepted: AtomicU64,
    dropped: AtomicU64,
    cooldown_task: Mutex<Option<JoinHandle<()>>>,
    idle: Notify,
}

impl Gate {
    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.cooldown_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self) {
        self.busy.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }

    /// Release only if `generation` is still the current cycle
    fn expire(&self, generation: u64) {
        let _slot = self.lock_task();
        if self.generation.load(Ordering::Acquire) == generation {
            self.release();
        } else {
            debug!("Stale cooldown {} ignored", generation);
        }
    }
}

/// At most one announcement cycle per cooldown window.
///
/// The busy flag is claimed with a compare-and-set, so concurrent triggers
/// cannot both start a cycle. The cooldown runs on a spawned task and never
/// blocks the caller.
#[derive(Clone)]
pub struct AnnouncementThrottle {
    gate: Arc<Gate>,
    runtime: Handle,
}

impl AnnouncementThrottle {
    /// Create a throttle whose cooldown timers run on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self {
            gate: Arc::new(Gate {
                busy: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                accepted: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
                cooldown_task: Mutex::new(None),
                idle: Notify::new(),
            }),
            runtime,
        }
    }

    /// Run `announce` unless a cooldown is active, then hold the gate for `cooldown`
    pub fn trigger<F>(&self, cooldown: Duration, announce: F) -> TriggerOutcome
    where
        F: FnOnce(),
    {
        // Claim and number the cycle atomically with respect to `cancel`
        let generation = {
            let _slot = self.gate.lock_task();
            if self
                .gate
                .busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                self.gate.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("announcer.dropped").increment(1);
                debug!("Announcement dropped: cooldown active");
                return TriggerOutcome::Dropped;
            }
            self.gate.generation.fetch_add(1, Ordering::AcqRel) + 1
        };

        // Cooldown is measured from the start of the cycle
        let deadline = Instant::now() + cooldown;
        self.gate.accepted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("announcer.accepted").increment(1);

        announce();

        let gate = Arc::clone(&self.gate);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            gate.expire(generation);
        });

        let mut slot = self.gate.lock_task();
        if self.gate.generation.load(Ordering::Acquire) == generation {
            *slot = Some(task);
        } else {
            // Cancelled while announcing; a newer cycle may own the slot
            task.abort();
        }
        drop(slot);

        debug!("Announcement accepted, cooldown {}ms", cooldown.as_millis());
        TriggerOutcome::Accepted
    }

    /// Abort a pending cooldown and free the gate. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.gate.lock_task();
        self.gate.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(task) = slot.take() {
            task.abort();
        }
        let was_busy = self.is_busy();
        self.gate.release();
        drop(slot);

        if was_busy {
            info!("Announcement cooldown cancelled");
        }
        was_busy
    }

    pub fn is_busy(&self) -> bool {
        self.gate.busy.load(Ordering::Acquire)
    }

    /// Wait until no cooldown is active
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.gate.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }

    pub fn stats(&self) -> ThrottleStats {
        ThrottleStats {
            accepted: self.gate.accepted.load(Ordering::Relaxed),
            dropped: self.gate.dropped.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for AnnouncementThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnouncementThrottle")
            .field("busy", &self.is_busy())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;

    const DIRECTION_COOLDOWN: Duration = Duration::from_millis(2200);

    #[tokio::test(start_paused = true)]
    async fn test_second_trigger_dropped_during_cooldown() {
        let throttle = AnnouncementThrottle::new(Handle::current());
        let calls = AtomicUsize::new(0);

        let first = throttle.trigger(DIRECTION_COOLDOWN, || {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = throttle.trigger(DIRECTION_COOLDOWN, || {
            calls.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(first, TriggerOutcome::Accepted);
        assert_eq!(second, TriggerOutcome::Dropped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(throttle.stats(), ThrottleStats { accepted: 1, dropped: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_after_cooldown_accepted() {
        let throttle = AnnouncementThrottle::new(Handle::current());
        let calls = AtomicUsize::new(0);

        throttle.trigger(DIRECTION_COOLDOWN, || {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(2300)).await;
        assert!(!throttle.is_busy());

        let outcome = throttle.trigger(DIRECTION_COOLDOWN, || {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(outcome, TriggerOutcome::Accepted);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorter_cooldown() {
        let throttle = AnnouncementThrottle::new(Handle::current());
        let threat = Duration::from_millis(1500);

        throttle.trigger(threat, || {});
        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(throttle.is_busy());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(throttle.trigger(threat, || {}), TriggerOutcome::Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_releases_gate() {
        let throttle = AnnouncementThrottle::new(Handle::current());

        throttle.trigger(DIRECTION_COOLDOWN, || {});
        assert!(throttle.is_busy());
        assert!(throttle.cancel());
        assert!(!throttle.is_busy());
        assert!(!throttle.cancel());

        assert_eq!(throttle.trigger(DIRECTION_COOLDOWN, || {}), TriggerOutcome::Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_announce_keeps_newer_cycle() {
        let throttle = AnnouncementThrottle::new(Handle::current());
        let mut inner = None;

        let outer = throttle.trigger(Duration::from_millis(100), || {
            throttle.cancel();
            inner = Some(throttle.trigger(DIRECTION_COOLDOWN, || {}));
        });
        assert_eq!(outer, TriggerOutcome::Accepted);
        assert_eq!(inner, Some(TriggerOutcome::Accepted));

        // The first cycle's timer must not end the second cycle's cooldown
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(throttle.is_busy());
        assert_eq!(throttle.trigger(DIRECTION_COOLDOWN, || {}), TriggerOutcome::Dropped);

        // The second cycle's cooldown is still the one held for cancellation
        assert!(throttle.cancel());
        assert!(!throttle.is_busy());
        assert_eq!(throttle.trigger(DIRECTION_COOLDOWN, || {}), TriggerOutcome::Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_after_cancel_is_ignored() {
        let throttle = AnnouncementThrottle::new(Handle::current());

        throttle.trigger(Duration::from_millis(500), || {});
        throttle.cancel();
        throttle.trigger(DIRECTION_COOLDOWN, || {});

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(throttle.is_busy());
        tokio::time::sleep(Duration::from_millis(1700)).await;
        assert!(!throttle.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_idle() {
        let throttle = AnnouncementThrottle::new(Handle::current());
        throttle.wait_idle().await;

        let started = Instant::now();
        throttle.trigger(DIRECTION_COOLDOWN, || {});
        throttle.wait_idle().await;
        assert!(started.elapsed() >= DIRECTION_COOLDOWN);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_triggers_single_flight() {
        let throttle = AnnouncementThrottle::new(Handle::current());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let throttle = throttle.clone();
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    throttle.trigger(Duration::from_secs(60), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        let accepted = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|o| *o == TriggerOutcome::Accepted)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(throttle.stats().dropped, 7);
        throttle.cancel();
    }
}
