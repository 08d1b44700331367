/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Weak};
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::{Histogram, HistogramStats};

/// Periodically snapshot a live histogram into [`HistogramStats`].
///
/// Only a weak reference is kept, the refresh task ends after the histogram
/// is dropped. Use it with a histogram that resets on snapshot to get per
/// interval statistics.
pub struct SnapshotRefresher<H: Histogram + ?Sized> {
    histogram: Weak<H>,
    interval: Duration,
}

impl<H> SnapshotRefresher<H>
where
    H: Histogram + ?Sized + 'static,
{
    pub fn new(histogram: &Arc<H>, interval: Duration) -> Self {
        SnapshotRefresher {
            histogram: Arc::downgrade(histogram),
            interval,
        }
    }

    pub fn spawn(self, stats: Arc<HistogramStats>, handle: Option<Handle>) -> JoinHandle<()> {
        let handle = handle.unwrap_or_else(Handle::current);
        handle.spawn(async move {
            let mut interval = tokio::time::interval(self.interval);

            loop {
                interval.tick().await;

                let Some(histogram) = self.histogram.upgrade() else {
                    debug!("histogram dropped, quit snapshot refresh");
                    break;
                };
                let snapshot = histogram.snapshot();
                drop(histogram);

                if snapshot.count() > 0 {
                    stats.update(snapshot.as_ref());
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HdrHistogram;

    #[tokio::test]
    async fn refresh_and_quit() {
        let h = Arc::new(HdrHistogram::new(true, 1, 100_000, 3).unwrap());
        let stats = Arc::new(HistogramStats::default());
        let task = SnapshotRefresher::new(&h, Duration::from_millis(10))
            .spawn(Arc::clone(&stats), None);

        for v in 1..=20 {
            h.update(v);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stats.count(), 20);
        assert_eq!(h.count(), 0);

        drop(h);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.count(), 20);
    }

    #[tokio::test]
    async fn refresh_dyn_histogram() {
        let h: Arc<dyn Histogram> = Arc::new(HdrHistogram::new(false, 1, 1000, 2).unwrap());
        let stats = Arc::new(HistogramStats::default());
        let task = SnapshotRefresher::new(&h, Duration::from_millis(10))
            .spawn(Arc::clone(&stats), Some(Handle::current()));

        h.update(5);
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.update(6);
        tokio::time::sleep(Duration::from_millis(50)).await;
        // no reset, every snapshot holds all values
        assert_eq!(stats.count(), 2);
        assert_eq!(h.count(), 2);

        drop(h);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
