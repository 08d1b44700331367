/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::HistogramError;

mod metrics;
pub use metrics::{Histogram, Sample};

mod export;
pub use export::HistogramExport;

mod sync;
pub use sync::HdrHistogram;

mod quantile;
pub use quantile::{Quantile, QuantileParseError};

mod stats;
pub use stats::HistogramStats;

mod rotating;
pub use rotating::SnapshotRefresher;

mod config;
pub use config::{HdrHistogramConfig, HistogramMetricsConfig};

#[cfg(feature = "yaml")]
mod yaml;
