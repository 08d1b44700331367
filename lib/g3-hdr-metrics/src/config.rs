/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::{HdrHistogram, HistogramError, HistogramStats, Quantile, SnapshotRefresher};

/// Construction parameters of a [`HdrHistogram`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HdrHistogramConfig {
    reset_on_snapshot: bool,
    min_value: u64,
    max_value: u64,
    significant_figures: u8,
}

impl HdrHistogramConfig {
    pub fn new(min_value: u64, max_value: u64, significant_figures: u8) -> Self {
        HdrHistogramConfig {
            reset_on_snapshot: false,
            min_value,
            max_value,
            significant_figures,
        }
    }

    #[inline]
    pub fn set_reset_on_snapshot(&mut self, reset: bool) {
        self.reset_on_snapshot = reset;
    }

    #[inline]
    pub fn set_min_value(&mut self, v: u64) {
        self.min_value = v;
    }

    #[inline]
    pub fn set_max_value(&mut self, v: u64) {
        self.max_value = v;
    }

    #[inline]
    pub fn set_significant_figures(&mut self, sigfig: u8) {
        self.significant_figures = sigfig;
    }

    #[inline]
    pub fn reset_on_snapshot(&self) -> bool {
        self.reset_on_snapshot
    }

    #[inline]
    pub fn min_value(&self) -> u64 {
        self.min_value
    }

    #[inline]
    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    #[inline]
    pub fn significant_figures(&self) -> u8 {
        self.significant_figures
    }

    pub fn build(&self) -> Result<HdrHistogram, HistogramError> {
        HdrHistogram::new(
            self.reset_on_snapshot,
            self.min_value,
            self.max_value,
            self.significant_figures,
        )
    }
}

impl Default for HdrHistogramConfig {
    /// 1us to 1h if values are microseconds.
    fn default() -> Self {
        HdrHistogramConfig::new(1, 3_600_000_000, 3)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramMetricsConfig {
    histogram: HdrHistogramConfig,
    quantile_list: BTreeSet<Quantile>,
    rotate_interval: Duration,
}

impl HistogramMetricsConfig {
    pub fn with_rotate(dur: Duration) -> Self {
        HistogramMetricsConfig {
            histogram: HdrHistogramConfig::default(),
            quantile_list: BTreeSet::new(),
            rotate_interval: dur,
        }
    }

    #[inline]
    pub fn set_histogram_config(&mut self, config: HdrHistogramConfig) {
        self.histogram = config;
    }

    #[inline]
    pub fn set_quantile_list(&mut self, list: BTreeSet<Quantile>) {
        self.quantile_list = list;
    }

    #[inline]
    pub fn set_rotate_interval(&mut self, dur: Duration) {
        self.rotate_interval = dur;
    }

    #[inline]
    pub fn histogram_config(&self) -> &HdrHistogramConfig {
        &self.histogram
    }

    #[inline]
    pub fn quantile_list(&self) -> &BTreeSet<Quantile> {
        &self.quantile_list
    }

    #[inline]
    pub fn rotate_interval(&self) -> Duration {
        self.rotate_interval
    }

    /// Build a rotating histogram and spawn its refresh task.
    ///
    /// The histogram always resets on snapshot, so the returned stats cover the
    /// last non-empty rotate interval.
    pub fn build_spawned(
        &self,
        handle: Option<Handle>,
    ) -> Result<(Arc<HdrHistogram>, Arc<HistogramStats>), HistogramError> {
        let mut histogram_config = self.histogram.clone();
        histogram_config.set_reset_on_snapshot(true);
        let histogram = Arc::new(histogram_config.build()?);

        let stats = if self.quantile_list.is_empty() {
            Arc::new(HistogramStats::default())
        } else {
            Arc::new(HistogramStats::with_quantiles(&self.quantile_list))
        };
        SnapshotRefresher::new(&histogram, self.rotate_interval)
            .spawn(Arc::clone(&stats), handle);
        Ok((histogram, stats))
    }
}

impl Default for HistogramMetricsConfig {
    fn default() -> Self {
        HistogramMetricsConfig::with_rotate(Duration::from_secs(4))
    }
}
