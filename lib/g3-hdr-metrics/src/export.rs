/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use hdrhistogram::Histogram;

use crate::HistogramError;

/// Value copy of the full state of a HDR histogram.
///
/// Holds the bounds and precision of the source together with the ordered
/// list of non-empty buckets. Each bucket is keyed by its highest equivalent
/// value, so replaying it into a histogram with the same layout lands every
/// count in the same bucket it was exported from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramExport {
    low: u64,
    high: u64,
    sigfig: u8,
    counts: Box<[(u64, u64)]>,
}

impl HistogramExport {
    pub fn from_histogram(histogram: &Histogram<u64>) -> Self {
        let counts = histogram
            .iter_recorded()
            .map(|v| (v.value_iterated_to(), v.count_at_value()))
            .collect::<Vec<_>>();
        HistogramExport {
            low: histogram.low(),
            high: histogram.high(),
            sigfig: histogram.sigfig(),
            counts: counts.into_boxed_slice(),
        }
    }

    /// Build a new, independent histogram holding the exported state.
    pub fn to_histogram(&self) -> Result<Histogram<u64>, HistogramError> {
        let mut histogram = Histogram::new_with_bounds(self.low, self.high, self.sigfig)?;
        self.replay_into(&mut histogram)?;
        Ok(histogram)
    }

    /// Add the exported counts to `histogram`.
    ///
    /// `histogram` should share the bucket layout of the source, or some of
    /// the values may be out of its range.
    pub(crate) fn replay_into(&self, histogram: &mut Histogram<u64>) -> Result<(), HistogramError> {
        for &(value, count) in self.counts.iter() {
            histogram.record_n(value, count)?;
        }
        Ok(())
    }

    #[inline]
    pub fn low(&self) -> u64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> u64 {
        self.high
    }

    #[inline]
    pub fn sigfig(&self) -> u8 {
        self.sigfig
    }

    /// Non-empty buckets as `(highest equivalent value, count)`, ascending.
    #[inline]
    pub fn counts(&self) -> &[(u64, u64)] {
        &self.counts
    }

    pub fn total_count(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
