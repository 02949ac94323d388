//! Counts connections that are still being served.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shared counter of live connection workers.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    inner: Arc<(Mutex<usize>, Condvar)>,
}

impl InFlight {
    /// Registers one worker; the returned guard deregisters it on drop.
    pub(crate) fn enter(&self) -> InFlightGuard {
        let (count, _) = &*self.inner;
        *count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        InFlightGuard {
            tracker: self.clone(),
        }
    }

    /// Number of live workers.
    pub(crate) fn current(&self) -> usize {
        let (count, _) = &*self.inner;
        *count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until no worker is live or `timeout` passes. Returns how many
    /// workers were still live when it returned.
    pub(crate) fn wait_idle(&self, timeout: Duration) -> usize {
        let (count, idle) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut live = count.lock().unwrap_or_else(PoisonError::into_inner);
        while *live > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            live = idle
                .wait_timeout(live, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *live
    }

    fn leave(&self) {
        let (count, idle) = &*self.inner;
        let mut live = count.lock().unwrap_or_else(PoisonError::into_inner);
        *live = live.saturating_sub(1);
        if *live == 0 {
            idle.notify_all();
        }
    }
}

/// Deregisters a worker when dropped, including on unwind.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    tracker: InFlight,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.tracker.leave();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn idle_tracker_returns_immediately() {
        let tracker = InFlight::default();
        assert_eq!(tracker.wait_idle(Duration::from_secs(5)), 0);
    }

    #[test]
    fn wait_returns_when_last_worker_leaves() {
        let tracker = InFlight::default();
        let guard = tracker.enter();
        assert_eq!(tracker.current(), 1);

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(guard);
        });
        assert_eq!(tracker.wait_idle(Duration::from_secs(5)), 0);
        worker.join().expect("worker thread");
    }

    #[test]
    fn wait_gives_up_after_timeout() {
        let tracker = InFlight::default();
        let _guard = tracker.enter();
        assert_eq!(tracker.wait_idle(Duration::from_millis(20)), 1);
    }
}
