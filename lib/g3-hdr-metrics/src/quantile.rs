/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuantileParseError {
    #[error("invalid decimal value: {0}")]
    InvalidDecimal(#[from] rust_decimal::Error),
    #[error("value {0} is not in range [0, 1]")]
    OutOfRange(Decimal),
    #[error("value {0} can not be converted to f64")]
    NotConvertible(Decimal),
}

/// A quantile in range `[0, 1]` that keeps its decimal text form.
#[derive(Clone, Debug)]
pub struct Quantile {
    decimal: Decimal,
    value: f64,
    name: Cow<'static, str>,
}

impl Quantile {
    pub const PCT50: Quantile =
        Quantile::new_const(Decimal::from_parts(5, 0, 0, false, 1), 0.5, "0.5");
    pub const PCT80: Quantile =
        Quantile::new_const(Decimal::from_parts(8, 0, 0, false, 1), 0.8, "0.8");
    pub const PCT90: Quantile =
        Quantile::new_const(Decimal::from_parts(9, 0, 0, false, 1), 0.9, "0.9");
    pub const PCT95: Quantile =
        Quantile::new_const(Decimal::from_parts(95, 0, 0, false, 2), 0.95, "0.95");
    pub const PCT99: Quantile =
        Quantile::new_const(Decimal::from_parts(99, 0, 0, false, 2), 0.99, "0.99");
    pub const PCT999: Quantile =
        Quantile::new_const(Decimal::from_parts(999, 0, 0, false, 3), 0.999, "0.999");

    const fn new_const(decimal: Decimal, value: f64, name: &'static str) -> Self {
        Quantile {
            decimal,
            value,
            name: Cow::Borrowed(name),
        }
    }

    fn from_decimal(decimal: Decimal) -> Result<Self, QuantileParseError> {
        if decimal < Decimal::ZERO || decimal > Decimal::ONE {
            return Err(QuantileParseError::OutOfRange(decimal));
        }
        let decimal = decimal.normalize();
        let value = decimal
            .to_f64()
            .ok_or(QuantileParseError::NotConvertible(decimal))?;
        Ok(Quantile {
            decimal,
            value,
            name: Cow::Owned(decimal.to_string()),
        })
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl FromStr for Quantile {
    type Err = QuantileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        Quantile::from_decimal(decimal)
    }
}

impl TryFrom<f64> for Quantile {
    type Error = QuantileParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let decimal = Decimal::try_from(value)?;
        Quantile::from_decimal(decimal)
    }
}

impl fmt::Display for Quantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Quantile {
    fn eq(&self, other: &Self) -> bool {
        self.decimal == other.decimal
    }
}

impl Eq for Quantile {}

impl Hash for Quantile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.decimal.normalize().hash(state);
    }
}

impl PartialOrd for Quantile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.decimal.cmp(&other.decimal)
    }
}
