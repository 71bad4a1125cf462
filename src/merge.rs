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

//! Merging of samples from several source files into one track.

use std::collections::BTreeMap;
use std::slice;

use crate::sample::Sample;

/// Union of all samples of an activity sharing one `start_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    /// Milliseconds since the Unix epoch; never zero.
    pub start_time: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub heart_rate: Option<f64>,
}

impl MergedRecord {
    fn new(start_time: i64) -> Self {
        Self {
            start_time,
            latitude: None,
            longitude: None,
            altitude: None,
            heart_rate: None,
        }
    }

    /// Overwrite the fields present in `sample`, keeping all others.
    ///
    /// A field which is present without a value clears the merged one.
    fn absorb(&mut self, sample: &Sample) {
        self.latitude = sample.latitude.unwrap_or(self.latitude);
        self.longitude = sample.longitude.unwrap_or(self.longitude);
        self.altitude = sample.altitude.unwrap_or(self.altitude);
        self.heart_rate = sample.heart_rate.unwrap_or(self.heart_rate);
    }
}

/// Merged records of one activity in ascending `start_time` order.
///
/// Every `start_time` occurs at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    records: Vec<MergedRecord>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The earliest record, which anchors the document time.
    pub fn first(&self) -> Option<&MergedRecord> {
        self.records.first()
    }

    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn iter(&self) -> slice::Iter<'_, MergedRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a MergedRecord;
    type IntoIter = slice::Iter<'a, MergedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Merge the samples of all `sources` into a [`Track`].
///
/// Sources are processed in the given order. Samples sharing a `start_time`
/// are combined field by field, where a later sample overwrites the fields it
/// carries, including fields it carries as `null`. Samples without a `start_time`, or with a zero one, are dropped.
///
/// # Example
/// ```
/// # use shealth_gpx::{merge, Sample};
/// #
/// let location = vec![Sample {
///     start_time: Some(2000),
///     latitude: Some(Some(48.858222)),
///     longitude: Some(Some(2.2945)),
///     ..Default::default()
/// }];
/// let live = vec![
///     Sample {
///         start_time: Some(2000),
///         heart_rate: Some(Some(120.0)),
///         ..Default::default()
///     },
///     Sample {
///         start_time: Some(1000),
///         heart_rate: Some(Some(110.0)),
///         ..Default::default()
///     },
/// ];
///
/// let track = merge(&[location, live]);
///
/// assert_eq!(track.len(), 2);
/// assert_eq!(track.records()[0].start_time, 1000);
/// assert_eq!(track.records()[1].latitude, Some(48.858222));
/// assert_eq!(track.records()[1].heart_rate, Some(120.0));
/// ```
pub fn merge<S: AsRef<[Sample]>>(sources: &[S]) -> Track {
    let mut records: BTreeMap<i64, MergedRecord> = BTreeMap::new();
    for sample in sources.iter().flat_map(|source| source.as_ref()) {
        let Some(start_time) = sample.start_time.filter(|t| *t != 0) else {
            continue;
        };
        records
            .entry(start_time)
            .or_insert_with(|| MergedRecord::new(start_time))
            .absorb(sample);
    }

    Track {
        records: records.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::decode_samples;

    fn at(start_time: i64) -> Sample {
        Sample {
            start_time: Some(start_time),
            ..Default::default()
        }
    }

    fn times(track: &Track) -> Vec<i64> {
        track.iter().map(|r| r.start_time).collect()
    }

    #[test]
    fn no_sources_yield_empty_track() {
        let track = merge::<Vec<Sample>>(&[]);
        assert!(track.is_empty());
        assert!(track.first().is_none());
    }

    #[test]
    fn output_is_sorted_regardless_of_interleaving() {
        let first = vec![at(5000), at(1000), at(3000)];
        let second = vec![at(4000), at(2000), at(6000)];

        let track = merge(&[first, second]);

        assert_eq!(times(&track), [1000, 2000, 3000, 4000, 5000, 6000]);
    }

    #[test]
    fn later_source_wins_on_conflicts() {
        let first = vec![Sample {
            heart_rate: Some(Some(100.0)),
            altitude: Some(Some(12.0)),
            ..at(1000)
        }];
        let second = vec![Sample {
            heart_rate: Some(Some(140.0)),
            ..at(1000)
        }];

        let track = merge(&[first.clone(), second.clone()]);
        assert_eq!(track.len(), 1);
        assert_eq!(track.records()[0].heart_rate, Some(140.0));
        // Fields missing in the later sample survive.
        assert_eq!(track.records()[0].altitude, Some(12.0));

        let track = merge(&[second, first]);
        assert_eq!(track.records()[0].heart_rate, Some(100.0));
    }

    #[test]
    fn later_null_clears_earlier_value() {
        let first = decode_samples(r#"[{"start_time": 1000, "altitude": 12.0}]"#.as_bytes());
        let second = decode_samples(
            r#"[{"start_time": 1000, "altitude": null, "latitude": "n/a"}]"#.as_bytes(),
        );
        let earlier = vec![Sample {
            latitude: Some(Some(1.0)),
            heart_rate: Some(Some(95.0)),
            ..at(1000)
        }];

        let track = merge(&[earlier, first.unwrap(), second.unwrap()]);

        assert_eq!(track.len(), 1);
        assert_eq!(track.records()[0].altitude, None);
        assert_eq!(track.records()[0].latitude, None);
        assert_eq!(track.records()[0].heart_rate, Some(95.0));
    }

    #[test]
    fn duplicates_within_one_source_collapse() {
        let source = vec![
            Sample {
                latitude: Some(Some(1.0)),
                ..at(1000)
            },
            Sample {
                longitude: Some(Some(2.0)),
                ..at(1000)
            },
        ];

        let track = merge(&[source]);

        assert_eq!(track.len(), 1);
        assert_eq!(track.records()[0].latitude, Some(1.0));
        assert_eq!(track.records()[0].longitude, Some(2.0));
    }

    #[test]
    fn samples_without_start_time_are_dropped() {
        let source = vec![
            Sample {
                latitude: Some(Some(1.0)),
                ..Default::default()
            },
            Sample {
                latitude: Some(Some(2.0)),
                ..at(0)
            },
            at(1000),
        ];

        let track = merge(&[source]);

        assert_eq!(times(&track), [1000]);
        assert_eq!(track.records()[0].latitude, None);
    }

    #[test]
    fn merging_a_source_twice_is_idempotent() {
        let source: Vec<Sample> = (1..=20)
            .map(|i| Sample {
                latitude: Some(Some(50.0 + i as f64)),
                heart_rate: Some(Some(90.0 + i as f64)),
                ..at(i * 1000)
            })
            .collect();

        let once = merge(&[source.clone()]);
        let twice = merge(&[source.clone(), source]);

        assert_eq!(once, twice);
    }

    #[test]
    fn negative_start_times_sort_numerically() {
        let track = merge(&[vec![at(10), at(-5), at(2)]]);
        assert_eq!(times(&track), [-5, 2, 10]);
    }
}
