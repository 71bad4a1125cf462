// Copyright 2024 Viktor Reusch
//
// This file is part of shealth_gpx.
//
// shealth_gpx is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// shealth_gpx is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with shealth_gpx. If not, see <https://www.gnu.org/licenses/>.

//! Samples as they appear in the exported exercise documents.

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Type of an exported exercise file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Live metrics such as the heart rate.
    LiveData,
    /// GPS positions.
    LocationData,
}

impl SourceKind {
    /// Tag used in the file names of the export.
    pub fn tag(self) -> &'static str {
        match self {
            SourceKind::LiveData => "live_data",
            SourceKind::LocationData => "location_data",
        }
    }

    /// Look up the kind belonging to a file name `tag`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "live_data" => Some(SourceKind::LiveData),
            "location_data" => Some(SourceKind::LocationData),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One timestamped record of a source file.
///
/// For the measured values, the outer `Option` tells whether the key is in
/// the document and the inner one holds its value. A key which is `null` or
/// has an unexpected JSON type is present without a value, so it still
/// replaces an earlier value when samples are merged. Unexpected types never
/// fail the whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    ///
    /// Only integral values are accepted, anything else is absent.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub start_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<Option<f64>>,
    /// Meters above sea level.
    #[serde(default, deserialize_with = "lenient_number")]
    pub altitude: Option<Option<f64>>,
    /// Beats per minute.
    #[serde(default, deserialize_with = "lenient_number")]
    pub heart_rate: Option<Option<f64>>,
}

/// Decode a complete source document, a JSON list of samples.
pub fn decode_samples(source: impl Read) -> serde_json::Result<Vec<Sample>> {
    serde_json::from_reader(source)
}

/// Only called for keys in the document, which makes the outer `Option`
/// always `Some`.
fn lenient_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<f64>>, D::Error> {
    Ok(Some(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        _ => None,
    }))
}

fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Convert `value` if it is a whole number within the range of `i64`.
fn integral(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// How numeric fields equal to zero are treated.
///
/// The export writes missing values inconsistently, so by default a zero is
/// taken to mean "not recorded". This also drops genuine zeros, e.g. points on
/// the equator or the prime meridian, or altitude at sea level. [`Keep`]
/// treats every present value as valid.
///
/// [`Keep`]: ZeroValues::Keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroValues {
    /// A zero counts as absent.
    #[default]
    Skip,
    /// A zero is a regular value.
    Keep,
}

impl ZeroValues {
    /// Filter `value` according to this policy.
    pub fn apply(self, value: Option<f64>) -> Option<f64> {
        match self {
            ZeroValues::Skip => value.filter(|v| *v != 0.0),
            ZeroValues::Keep => value,
        }
    }
}
