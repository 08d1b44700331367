/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use portable_atomic::AtomicF64;

use crate::{Histogram, Quantile};

/// Summary of the last reported histogram snapshot.
///
/// Written by a single reporter, read lock free by any number of exporters.
pub struct HistogramStats {
    count: AtomicU64,
    min: AtomicU64,
    max: AtomicU64,
    mean: AtomicF64,
    std_dev: AtomicF64,
    quantiles: Vec<Quantile>,
    quantile_values: Vec<AtomicF64>,
}

impl HistogramStats {
    pub fn new() -> Self {
        HistogramStats {
            count: AtomicU64::new(0),
            min: AtomicU64::new(0),
            max: AtomicU64::new(0),
            mean: AtomicF64::new(0.0),
            std_dev: AtomicF64::new(0.0),
            quantiles: Vec::with_capacity(8),
            quantile_values: Vec::with_capacity(8),
        }
    }

    pub fn with_quantiles<'a, T>(quantiles: T) -> Self
    where
        T: IntoIterator<Item = &'a Quantile>,
    {
        quantiles
            .into_iter()
            .fold(HistogramStats::new(), |stats, q| stats.with_quantile(q.clone()))
    }

    pub fn with_quantile(mut self, quantile: Quantile) -> Self {
        self.quantiles.push(quantile);
        self.quantile_values.push(AtomicF64::new(0.0));
        self
    }

    pub fn quantiles(&self) -> &[Quantile] {
        &self.quantiles
    }

    /// Read all statistics of `histogram`, which should be a snapshot.
    pub fn update(&self, histogram: &dyn Histogram) {
        self.count.store(histogram.count(), Ordering::Relaxed);
        self.min.store(histogram.min(), Ordering::Relaxed);
        self.max.store(histogram.max(), Ordering::Relaxed);
        self.mean.store(histogram.mean(), Ordering::Relaxed);
        self.std_dev.store(histogram.std_dev(), Ordering::Relaxed);

        let qs = self.quantiles.iter().map(|q| q.value()).collect::<Vec<_>>();
        let values = histogram.percentiles(&qs);
        for (slot, v) in self.quantile_values.iter().zip(values) {
            slot.store(v, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn foreach_stat<F>(&self, mut call: F)
    where
        F: FnMut(Option<f64>, &str, f64),
    {
        call(None, "count", self.count.load(Ordering::Relaxed) as f64);
        call(None, "min", self.min.load(Ordering::Relaxed) as f64);
        call(None, "max", self.max.load(Ordering::Relaxed) as f64);
        call(None, "mean", self.mean.load(Ordering::Relaxed));
        call(None, "stddev", self.std_dev.load(Ordering::Relaxed));
        for (q, v) in self.quantiles.iter().zip(self.quantile_values.iter()) {
            call(Some(q.value()), q.as_str(), v.load(Ordering::Relaxed));
        }
    }
}

impl Default for HistogramStats {
    fn default() -> Self {
        HistogramStats::new()
            .with_quantile(Quantile::PCT50)
            .with_quantile(Quantile::PCT80)
            .with_quantile(Quantile::PCT90)
            .with_quantile(Quantile::PCT95)
            .with_quantile(Quantile::PCT99)
    }
}
