/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use crate::HistogramError;

/// A uniform reservoir of raw observations.
///
/// Registries that expect random sampling ask a histogram for its sample,
/// quantile based histograms have none to give.
pub trait Sample: Send + Sync {
    fn clear(&self);
    fn count(&self) -> u64;
    /// Number of values currently held in the reservoir.
    fn size(&self) -> usize;
    fn values(&self) -> Vec<u64>;
    fn update(&self, value: u64);
}

/// The generic statistical histogram capability.
///
/// Every method must be callable concurrently from many threads. Statistics
/// are computed from the recorded state at call time.
pub trait Histogram: Send + Sync {
    /// Drop all recorded observations.
    fn clear(&self);

    /// Total number of recorded observations.
    fn count(&self) -> u64;

    fn max(&self) -> u64;

    fn min(&self) -> u64;

    fn mean(&self) -> f64;

    fn std_dev(&self) -> f64;

    fn variance(&self) -> f64;

    /// Value at `quantile`, which should be in the range `[0, 1]`.
    fn percentile(&self, quantile: f64) -> f64;

    /// Batched form of [`Histogram::percentile`].
    ///
    /// The returned values keep the order and length of `quantiles`.
    fn percentiles(&self, quantiles: &[f64]) -> Vec<f64>;

    /// Get the underlying reservoir sample, if this histogram keeps one.
    fn try_sample(&self) -> Result<Arc<dyn Sample>, HistogramError>;

    /// Get the underlying reservoir sample.
    ///
    /// # Panics
    ///
    /// Panics if the histogram keeps no reservoir, see
    /// [`Histogram::try_sample`] for the non panicking form.
    fn sample(&self) -> Arc<dyn Sample> {
        match self.try_sample() {
            Ok(sample) => sample,
            Err(e) => panic!("{e}"),
        }
    }

    /// Take a detached point-in-time copy of this histogram.
    fn snapshot(&self) -> Box<dyn Histogram>;

    /// Sum of all recorded observations, `0` if it can not be reproduced.
    fn sum(&self) -> u64;

    /// Record one observation.
    fn update(&self, value: u64);
}
