/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use hdrhistogram::{CreationError, RecordError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("invalid histogram parameters: {0}")]
    Creation(#[from] CreationError),
    #[error("histogram rejected value: {0}")]
    Record(#[from] RecordError),
    /// The called operation is not provided by this histogram implementation.
    ///
    /// This is a programming error: the caller picked the wrong kind of
    /// histogram, there is nothing to recover at runtime.
    #[error("{0} called on a histogram that does not support it")]
    Unsupported(&'static str),
}

impl HistogramError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, HistogramError::Unsupported(_))
    }
}
