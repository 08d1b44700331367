/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hdrhistogram::Histogram as HdrEngine;
use log::{debug, trace};

use crate::{Histogram, HistogramError, HistogramExport, Sample};

/// A HDR histogram that can be shared between threads.
///
/// Every operation, including the read only ones, holds the internal lock for
/// its whole duration, so statistics are always computed from a state that can
/// not change in between.
///
/// If `reset_on_snapshot` is set, each snapshot clears the live counts in the
/// same critical section it copies them in. This is only useful if there is a
/// single reporter taking snapshots.
pub struct HdrHistogram {
    inner: Mutex<HdrEngine<u64>>,
    reset_on_snapshot: bool,
}

impl HdrHistogram {
    pub fn new(
        reset_on_snapshot: bool,
        min_value: u64,
        max_value: u64,
        sigfig: u8,
    ) -> Result<Self, HistogramError> {
        let inner = HdrEngine::new_with_bounds(min_value, max_value, sigfig)?;
        Ok(HdrHistogram::with_engine(inner, reset_on_snapshot))
    }

    /// Create a detached histogram from exported state.
    pub fn import(data: &HistogramExport) -> Result<Self, HistogramError> {
        let inner = data.to_histogram()?;
        Ok(HdrHistogram::with_engine(inner, false))
    }

    fn with_engine(inner: HdrEngine<u64>, reset_on_snapshot: bool) -> Self {
        HdrHistogram {
            inner: Mutex::new(inner),
            reset_on_snapshot,
        }
    }

    // no guarded operation can leave the engine half updated
    fn lock_engine(&self) -> MutexGuard<'_, HdrEngine<u64>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one value, returning the engine error if it can not be stored.
    pub fn record(&self, value: u64) -> Result<(), HistogramError> {
        self.lock_engine().record(value)?;
        Ok(())
    }

    /// Copy out the current state by value.
    pub fn export(&self) -> HistogramExport {
        HistogramExport::from_histogram(&self.lock_engine())
    }

    /// Take a detached copy of the current state.
    ///
    /// The live counts are cleared in the same critical section if this
    /// histogram resets on snapshot.
    pub fn detach(&self) -> HdrHistogram {
        let mut inner = self.lock_engine();
        let data = HistogramExport::from_histogram(&inner);
        let mut copy = HdrEngine::<u64>::new_from(&*inner);
        // same bucket layout, all exported values are in range
        let _ = data.replay_into(&mut copy);
        if self.reset_on_snapshot {
            inner.reset();
            trace!("histogram reset after snapshot of {} values", copy.len());
        }
        drop(inner);

        HdrHistogram::with_engine(copy, false)
    }

    #[inline]
    pub fn reset_on_snapshot(&self) -> bool {
        self.reset_on_snapshot
    }

    pub fn low(&self) -> u64 {
        self.lock_engine().low()
    }

    pub fn high(&self) -> u64 {
        self.lock_engine().high()
    }

    pub fn sigfig(&self) -> u8 {
        self.lock_engine().sigfig()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_engine().is_empty()
    }
}

impl Histogram for HdrHistogram {
    fn clear(&self) {
        self.lock_engine().reset();
    }

    fn count(&self) -> u64 {
        self.lock_engine().len()
    }

    fn max(&self) -> u64 {
        self.lock_engine().max()
    }

    fn min(&self) -> u64 {
        self.lock_engine().min()
    }

    fn mean(&self) -> f64 {
        self.lock_engine().mean()
    }

    fn std_dev(&self) -> f64 {
        self.lock_engine().stdev()
    }

    fn variance(&self) -> f64 {
        let std_dev = self.lock_engine().stdev();
        std_dev * std_dev
    }

    fn percentile(&self, quantile: f64) -> f64 {
        self.lock_engine().value_at_quantile(quantile) as f64
    }

    fn percentiles(&self, quantiles: &[f64]) -> Vec<f64> {
        let inner = self.lock_engine();
        quantiles
            .iter()
            .map(|q| inner.value_at_quantile(*q) as f64)
            .collect()
    }

    fn try_sample(&self) -> Result<Arc<dyn Sample>, HistogramError> {
        Err(HistogramError::Unsupported("sample"))
    }

    fn snapshot(&self) -> Box<dyn Histogram> {
        Box::new(self.detach())
    }

    fn sum(&self) -> u64 {
        // the exact sum can not be reproduced from buckets
        0
    }

    fn update(&self, value: u64) {
        if let Err(e) = self.record(value) {
            debug!("histogram dropped value {value}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn new_hist(reset_on_snapshot: bool) -> HdrHistogram {
        HdrHistogram::new(reset_on_snapshot, 1, 100_000, 3).unwrap()
    }

    #[test]
    fn invalid_params() {
        assert!(matches!(
            HdrHistogram::new(false, 0, 100, 3),
            Err(HistogramError::Creation(_))
        ));
        assert!(matches!(
            HdrHistogram::new(false, 1, 100, 6),
            Err(HistogramError::Creation(_))
        ));
        assert!(matches!(
            HdrHistogram::new(false, 100, 10, 3),
            Err(HistogramError::Creation(_))
        ));
    }

    #[test]
    fn empty() {
        let h = new_hist(false);
        assert!(h.is_empty());
        assert_eq!(h.count(), 0);
        assert_eq!(h.min(), 0);
        assert_eq!(h.max(), 0);
        assert_eq!(h.mean(), 0.0);
        assert_eq!(h.std_dev(), 0.0);
        assert_eq!(h.variance(), 0.0);
    }

    #[test]
    fn basic_stats() {
        let h = new_hist(false);
        for v in 1..=100 {
            h.update(v);
        }
        assert_eq!(h.count(), 100);
        assert_eq!(h.min(), 1);
        assert_eq!(h.max(), 100);
        assert!((h.mean() - 50.5).abs() < 0.5);

        let p50 = h.percentile(0.5);
        assert!((p50 - 50.0).abs() <= 50.0 * 0.001);
        assert_eq!(h.percentile(1.0), 100.0);
    }

    #[test]
    fn variance_is_squared_std_dev() {
        let h = new_hist(false);
        for v in [3, 17, 17, 250, 4096, 50_000, 99_000] {
            h.update(v);
        }
        let std_dev = h.std_dev();
        assert!(std_dev > 0.0);
        assert_eq!(h.variance(), std_dev * std_dev);
    }

    #[test]
    fn percentiles_keep_order() {
        let h = new_hist(false);
        for v in 1..=1000 {
            h.update(v);
        }
        let qs = [0.99, 0.5, 0.0, 0.9, 0.5];
        let values = h.percentiles(&qs);
        assert_eq!(values.len(), qs.len());
        for (q, v) in qs.iter().zip(values.iter()) {
            assert_eq!(*v, h.percentile(*q));
        }
        assert!(values[0] > values[1]);
        assert_eq!(values[1], values[4]);

        assert!(h.percentiles(&[]).is_empty());
    }

    #[test]
    fn sum_is_zero() {
        let h = new_hist(false);
        assert_eq!(h.sum(), 0);
        for v in 1..=10 {
            h.update(v * 1000);
        }
        assert_eq!(h.sum(), 0);
        assert_eq!(h.snapshot().sum(), 0);
    }

    #[test]
    fn sample_unsupported() {
        let h = new_hist(false);
        h.update(1);
        match h.try_sample() {
            Err(e) => assert!(e.is_unsupported()),
            Ok(_) => panic!("hdr histogram should have no sample"),
        }
    }

    #[test]
    #[should_panic(expected = "sample called on a histogram")]
    fn sample_panics() {
        let h = new_hist(false);
        let _ = h.sample();
    }

    #[test]
    #[should_panic(expected = "sample called on a histogram")]
    fn snapshot_sample_panics() {
        let h = new_hist(true);
        let _ = h.snapshot().sample();
    }

    #[test]
    fn out_of_range() {
        let h = new_hist(false);
        h.update(10);
        let r = h.record(1 << 40);
        assert!(matches!(r, Err(HistogramError::Record(_))));
        h.update(1 << 40);
        assert_eq!(h.count(), 1);
        assert_eq!(h.max(), 10);
    }

    #[test]
    fn clear() {
        let h = new_hist(false);
        for v in 1..=10 {
            h.update(v);
        }
        h.clear();
        assert_eq!(h.count(), 0);
        h.update(42);
        assert_eq!(h.count(), 1);
        assert_eq!(h.min(), 42);
    }

    #[test]
    fn snapshot_with_reset() {
        let h = new_hist(true);
        assert!(h.reset_on_snapshot());
        for v in 1..=10 {
            h.update(v);
        }
        let snap = h.snapshot();
        assert_eq!(snap.count(), 10);
        assert_eq!(snap.min(), 1);
        assert_eq!(snap.max(), 10);
        assert_eq!(h.count(), 0);

        // a snapshot never resets anything
        let snap2 = snap.snapshot();
        assert_eq!(snap.count(), 10);
        assert_eq!(snap2.count(), 10);
    }

    #[test]
    fn snapshot_without_reset() {
        let h = new_hist(false);
        for v in 1..=10 {
            h.update(v);
        }
        let snap = h.snapshot();
        assert_eq!(snap.count(), 10);
        assert_eq!(h.count(), 10);
    }

    #[test]
    fn snapshot_is_detached() {
        let h = new_hist(false);
        for v in 1..=100 {
            h.update(v);
        }
        let snap = h.detach();
        assert!(!snap.reset_on_snapshot());
        assert_eq!(snap.low(), h.low());
        assert_eq!(snap.high(), h.high());
        assert_eq!(snap.sigfig(), h.sigfig());

        let p90 = snap.percentile(0.9);
        let mean = snap.mean();
        for _ in 0..100 {
            h.update(90_000);
        }
        h.clear();
        h.update(5);

        assert_eq!(snap.count(), 100);
        assert_eq!(snap.max(), 100);
        assert_eq!(snap.percentile(0.9), p90);
        assert_eq!(snap.mean(), mean);
    }

    #[test]
    fn snapshot_same_stats() {
        let h = new_hist(false);
        for v in [1, 2, 3, 500, 501, 77_777, 99_000, 99_000] {
            h.update(v);
        }
        let snap = h.snapshot();
        assert_eq!(snap.count(), h.count());
        assert_eq!(snap.min(), h.min());
        assert_eq!(snap.max(), h.max());
        assert_eq!(snap.mean(), h.mean());
        assert_eq!(snap.std_dev(), h.std_dev());
        let qs = [0.1, 0.5, 0.75, 0.99, 1.0];
        assert_eq!(snap.percentiles(&qs), h.percentiles(&qs));
    }

    #[test]
    fn export_import() {
        let h = new_hist(true);
        for v in 1..=50 {
            h.update(v * 10);
        }
        let data = h.export();
        assert_eq!(data.total_count(), 50);
        // export never resets
        assert_eq!(h.count(), 50);

        let copy = HdrHistogram::import(&data).unwrap();
        assert!(!copy.reset_on_snapshot());
        assert_eq!(copy.count(), 50);
        assert_eq!(copy.min(), 10);
        assert_eq!(copy.max(), 500);
        assert_eq!(copy.export(), data);
    }

    #[test]
    fn trait_object() {
        let h: Arc<dyn Histogram> = Arc::new(new_hist(false));
        h.update(7);
        h.update(9);
        assert_eq!(h.count(), 2);
        let snap: Box<dyn Histogram> = h.snapshot();
        assert_eq!(snap.min(), 7);
        assert_eq!(snap.max(), 9);
    }

    #[test]
    fn concurrent_update() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 10_000;

        let h = new_hist(false);
        thread::scope(|s| {
            for t in 0..THREADS {
                let h = &h;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        h.update(1 + (t * PER_THREAD + i) % 100_000);
                    }
                });
            }
        });
        assert_eq!(h.count(), THREADS * PER_THREAD);
        assert_eq!(h.min(), 1);
    }

    #[test]
    fn concurrent_snapshot_reset() {
        const THREADS: u64 = 4;
        const PER_THREAD: u64 = 20_000;

        let h = new_hist(true);
        let mut snapshot_total = 0;
        thread::scope(|s| {
            let workers = (0..THREADS)
                .map(|_| {
                    let h = &h;
                    s.spawn(move || {
                        for i in 0..PER_THREAD {
                            h.update(1 + i % 1000);
                        }
                    })
                })
                .collect::<Vec<_>>();

            while workers.iter().any(|w| !w.is_finished()) {
                snapshot_total += h.snapshot().count();
                thread::yield_now();
            }
        });
        snapshot_total += h.snapshot().count();

        assert_eq!(snapshot_total, THREADS * PER_THREAD);
        assert_eq!(h.count(), 0);
    }
}
