/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use crate::{HdrHistogramConfig, HistogramMetricsConfig, Quantile};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

fn as_u64(v: &Yaml) -> anyhow::Result<u64> {
    match v {
        Yaml::String(s) => Ok(u64::from_str(s)?),
        Yaml::Integer(i) => Ok(u64::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u64' should be 'string' or 'integer'"
        )),
    }
}

fn as_u8(v: &Yaml) -> anyhow::Result<u8> {
    match v {
        Yaml::String(s) => Ok(u8::from_str(s)?),
        Yaml::Integer(i) => Ok(u8::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u8' should be 'string' or 'integer'"
        )),
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                let u = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(u))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

fn as_quantile(value: &Yaml) -> anyhow::Result<Quantile> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => {
            Quantile::from_str(s).map_err(|e| anyhow!("invalid quantile value: {e}"))
        }
        Yaml::Integer(i) => {
            Quantile::from_str(&i.to_string()).map_err(|e| anyhow!("invalid quantile value: {e}"))
        }
        _ => Err(anyhow!(
            "yaml value type for 'quantile' should be 'str' or 'float'"
        )),
    }
}

fn as_quantile_list(value: &Yaml) -> anyhow::Result<BTreeSet<Quantile>> {
    let mut set = BTreeSet::new();
    match value {
        Yaml::String(s) => {
            for v in s.split(',') {
                let q = Quantile::from_str(v.trim())
                    .map_err(|e| anyhow!("invalid quantile string {v}: {e}"))?;
                set.insert(q);
            }
        }
        Yaml::Array(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let q =
                    as_quantile(v).context(format!("invalid quantile value for element #{i}"))?;
                set.insert(q);
            }
        }
        _ => {
            return Err(anyhow!(
                "the yaml value type for 'histogram quantile list' should be 'seq' or 'str'"
            ));
        }
    }
    Ok(set)
}

impl HdrHistogramConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!(
                "yaml value type for 'hdr histogram config' should be 'map'"
            ));
        };

        let mut config = HdrHistogramConfig::default();
        foreach_kv(map, |k, v| match normalize_key(k).as_str() {
            "reset_on_snapshot" | "snapshot_resets" => {
                let reset = as_bool(v).context(format!("invalid bool value for key {k}"))?;
                config.set_reset_on_snapshot(reset);
                Ok(())
            }
            "min_value" | "min" => {
                let min = as_u64(v).context(format!("invalid u64 value for key {k}"))?;
                config.set_min_value(min);
                Ok(())
            }
            "max_value" | "max" => {
                let max = as_u64(v).context(format!("invalid u64 value for key {k}"))?;
                config.set_max_value(max);
                Ok(())
            }
            "significant_figures" | "sigfig" => {
                let sigfig = as_u8(v).context(format!("invalid u8 value for key {k}"))?;
                config.set_significant_figures(sigfig);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }
}

impl HistogramMetricsConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = HistogramMetricsConfig::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "quantile" => {
                    let quantile_list = as_quantile_list(v)
                        .context(format!("invalid quantile list value for key {k}"))?;
                    config.set_quantile_list(quantile_list);
                    Ok(())
                }
                "rotate" => {
                    let rotate = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    config.set_rotate_interval(rotate);
                    Ok(())
                }
                "histogram" => {
                    let histogram = HdrHistogramConfig::parse_yaml(v)
                        .context(format!("invalid hdr histogram config value for key {k}"))?;
                    config.set_histogram_config(histogram);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            let rotate = as_duration(value).context(
                "the value for simplified form of histogram metrics config map should be humanize duration",
            )?;
            Ok(HistogramMetricsConfig::with_rotate(rotate))
        }
    }
}
