//! # Pulse Counter Module
//!
//! Rolling-window accumulation of Geiger tube pulse events into a
//! counts-per-minute (CPM) rate.
//!
//! This module handles:
//! - Atomic pulse counting safe from any context (detector callbacks, tasks)
//! - A fixed-capacity ring of closed buckets spanning the CPM window
//! - Window rotation and CPM derivation once per reporting tick
//!
//! The shared-mutable surface is exactly one `AtomicU32` (the open bucket).
//! [`PulseHandle::count`] increments it; [`PulseCounter::sample`] swaps it to
//! zero. The swap is a single atomic step, so an increment racing a rotation
//! lands in exactly one bucket; it is never lost and never double-counted.
//! The historical ring is owned by the sampler alone and needs no lock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Seconds per minute, the CPM normalization base
const SECONDS_PER_MINUTE: u32 = 60;

/// Accumulates pulse events over a rolling window and derives CPM.
///
/// All storage is sized at construction; steady-state operation performs no
/// allocation. One `PulseCounter` owns the window; any number of cloned
/// [`PulseHandle`]s feed it.
pub struct PulseCounter {
    /// Open bucket, incremented by handles until the next rotation
    open: Arc<AtomicU32>,
    /// Closed buckets covering the window, oldest evicted on rotation
    ring: Vec<u32>,
    /// Next ring slot to overwrite
    slot: usize,
    /// Total window span in seconds
    window_seconds: u32,
}

impl PulseCounter {
    /// Create a counter with the given window span and bucket count.
    ///
    /// # Arguments
    ///
    /// * `window_seconds` - Rolling window span; must divide 60 so CPM scales
    ///   to an exact integer
    /// * `buckets` - Number of ring buckets; must divide `window_seconds`
    ///
    /// # Panics
    ///
    /// Panics at construction time on a zero or non-dividing geometry.
    /// [`crate::config::Config::validate`] enforces the same constraints, so
    /// a validated configuration never trips these.
    ///
    /// # Examples
    ///
    /// ```
    /// use geiger_logger::counter::PulseCounter;
    ///
    /// // 60-second window split into twelve 5-second buckets
    /// let counter = PulseCounter::new(60, 12);
    /// assert_eq!(counter.bucket_duration().as_secs(), 5);
    /// ```
    pub fn new(window_seconds: u32, buckets: usize) -> Self {
        assert!(window_seconds > 0 && buckets > 0, "window geometry must be non-zero");
        assert!(
            SECONDS_PER_MINUTE % window_seconds == 0,
            "window_seconds must divide 60"
        );
        assert!(
            window_seconds as usize % buckets == 0,
            "buckets must divide window_seconds"
        );

        Self {
            open: Arc::new(AtomicU32::new(0)),
            ring: vec![0; buckets],
            slot: 0,
            window_seconds,
        }
    }

    /// Get a cloneable handle for feeding pulse events into the open bucket.
    pub fn handle(&self) -> PulseHandle {
        PulseHandle {
            open: Arc::clone(&self.open),
        }
    }

    /// Rotate the window and return the CPM at the moment of the call.
    ///
    /// Closes the open bucket with a single atomic swap, pushes it into the
    /// ring (evicting the oldest bucket), and returns the window sum scaled
    /// to counts per minute. Called once per reporting tick; zero events in
    /// the window yields CPM = 0, which is a valid measurement, not an error.
    ///
    /// # Returns
    ///
    /// * `u32` - Counts per minute over the rolling window
    pub fn sample(&mut self) -> u32 {
        let closed = self.open.swap(0, Ordering::AcqRel);

        self.ring[self.slot] = closed;
        self.slot = (self.slot + 1) % self.ring.len();

        let total: u32 = self.ring.iter().sum();
        total * (SECONDS_PER_MINUTE / self.window_seconds)
    }

    /// Duration of one bucket; the reporting tick period.
    pub fn bucket_duration(&self) -> Duration {
        Duration::from_secs((self.window_seconds as usize / self.ring.len()) as u64)
    }

    /// Total window span in seconds.
    pub fn window_seconds(&self) -> u32 {
        self.window_seconds
    }
}

/// Handle for recording pulse events.
///
/// `count()` performs exactly one atomic increment: it never allocates,
/// never blocks, and never iterates, so it is safe to call from any context
/// at arbitrary times relative to [`PulseCounter::sample`]. Counting is
/// best-effort and monotonic within a window.
#[derive(Clone)]
pub struct PulseHandle {
    open: Arc<AtomicU32>,
}

impl PulseHandle {
    /// Record one detected pulse.
    #[inline]
    pub fn count(&self) {
        self.open.fetch_add(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PulseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseHandle")
            .field("open", &self.open.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_events_yields_zero_cpm() {
        let mut counter = PulseCounter::new(60, 12);
        assert_eq!(counter.sample(), 0, "empty window must be CPM 0, not an error");
    }

    #[test]
    fn test_full_minute_window_cpm_equals_count() {
        let mut counter = PulseCounter::new(60, 12);
        let handle = counter.handle();

        for _ in 0..37 {
            handle.count();
        }

        // 60-second window: CPM is exactly the window count
        assert_eq!(counter.sample(), 37);
    }

    #[test]
    fn test_sub_minute_window_scales_to_cpm() {
        // 30-second window scales by 60/30 = 2
        let mut counter = PulseCounter::new(30, 6);
        let handle = counter.handle();

        for _ in 0..12 {
            handle.count();
        }

        assert_eq!(counter.sample(), 24);
    }

    #[test]
    fn test_counts_accumulate_across_buckets() {
        let mut counter = PulseCounter::new(60, 4);
        let handle = counter.handle();

        // 5 counts in each of three consecutive buckets
        for _ in 0..3 {
            for _ in 0..5 {
                handle.count();
            }
            counter.sample();
        }

        handle.count();
        assert_eq!(counter.sample(), 16);
    }

    #[test]
    fn test_old_buckets_are_evicted() {
        let mut counter = PulseCounter::new(60, 4);
        let handle = counter.handle();

        for _ in 0..100 {
            handle.count();
        }
        counter.sample();

        // Rotate the burst bucket out of the four-slot ring
        for _ in 0..4 {
            counter.sample();
        }

        assert_eq!(counter.sample(), 0, "window must forget counts older than its span");
    }

    #[test]
    fn test_cloned_handles_feed_one_bucket() {
        let mut counter = PulseCounter::new(60, 12);
        let a = counter.handle();
        let b = a.clone();

        a.count();
        b.count();
        b.count();

        assert_eq!(counter.sample(), 3);
    }

    #[test]
    fn test_no_counts_lost_across_concurrent_rotation() {
        use std::thread;

        let mut counter = PulseCounter::new(60, 12);
        let handle = counter.handle();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let h = handle.clone();
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        h.count();
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        // Every increment landed before the rotation, so the full-minute
        // window sum must conserve all 40,000 of them.
        assert_eq!(counter.sample(), 40_000);
    }

    #[test]
    fn test_bucket_duration() {
        let counter = PulseCounter::new(60, 12);
        assert_eq!(counter.bucket_duration(), Duration::from_secs(5));

        let counter = PulseCounter::new(30, 6);
        assert_eq!(counter.bucket_duration(), Duration::from_secs(5));
    }

    #[test]
    #[should_panic(expected = "window_seconds must divide 60")]
    fn test_rejects_window_not_dividing_minute() {
        let _ = PulseCounter::new(45, 9);
    }

    #[test]
    #[should_panic(expected = "buckets must divide window_seconds")]
    fn test_rejects_buckets_not_dividing_window() {
        let _ = PulseCounter::new(60, 7);
    }
}
