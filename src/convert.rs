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

//! Conversion of one activity from its source files to a GPX document.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;
use crate::merge::merge;
use crate::render::write_gpx;
use crate::sample::{decode_samples, Sample, SourceKind, ZeroValues};

/// Tracks with fewer merged records are rejected as noise.
pub const MIN_RECORDS: usize = 100;
/// File extension of written documents.
pub const OUTPUT_EXTENSION: &str = "gpx";

/// Result of converting one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A document with `points` trackpoints was written.
    Converted { points: usize },
    /// The merged track has only `records` records.
    TooSmall { records: usize },
    /// No location data is available.
    Invalid,
}

/// Conversion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Minimum number of merged records for a track to be converted.
    pub min_records: usize,
    pub zero_values: ZeroValues,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_records: MIN_RECORDS,
            zero_values: ZeroValues::default(),
        }
    }
}

/// A decoded source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub kind: SourceKind,
    pub samples: Vec<Sample>,
}

impl SourceFile {
    /// Decode an in-memory JSON document.
    pub fn from_json(kind: SourceKind, json: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            kind,
            samples: serde_json::from_slice(json)?,
        })
    }
}

/// A source file on disk, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub path: PathBuf,
}

impl SourceDescriptor {
    /// Read and decode the file.
    pub fn load(&self) -> Result<SourceFile, Error> {
        let file = File::open(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })?;
        let samples = decode_samples(BufReader::new(file)).map_err(|source| {
            // serde_json reports I/O failures through its own error type.
            if source.is_io() {
                Error::Read {
                    path: self.path.clone(),
                    source: io::Error::from(source),
                }
            } else {
                Error::Parse {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        Ok(SourceFile {
            kind: self.kind,
            samples,
        })
    }
}

/// One recorded exercise and all of its known source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Unique identifier of the recording session.
    pub id: String,
    pub files: Vec<SourceDescriptor>,
}

/// Check whether any of `kinds` provides positions.
fn has_location(mut kinds: impl Iterator<Item = SourceKind>) -> bool {
    kinds.any(|kind| kind == SourceKind::LocationData)
}

/// Convert decoded `sources` and write the GPX document to `sink`.
///
/// Nothing is written to `sink` unless the outcome is
/// [`Outcome::Converted`]. Sources are merged in the given order, so later
/// sources win on conflicting fields.
///
/// # Example
/// ```
/// # use shealth_gpx::{convert_sources, Options, Outcome, Sample, SourceFile, SourceKind};
/// #
/// let samples = (1..=150)
///     .map(|i| Sample {
///         start_time: Some(i * 1000),
///         latitude: Some(Some(48.858222)),
///         longitude: Some(Some(2.2945)),
///         ..Default::default()
///     })
///     .collect();
/// let sources = [SourceFile { kind: SourceKind::LocationData, samples }];
/// let mut sink = vec![];
///
/// let outcome = convert_sources(&sources, &Options::default(), &mut sink)
///     .expect("conversion failed");
///
/// assert_eq!(outcome, Outcome::Converted { points: 150 });
/// assert!(String::from_utf8(sink).unwrap().contains("<trkseg>"));
/// ```
pub fn convert_sources(
    sources: &[SourceFile],
    options: &Options,
    sink: impl io::Write,
) -> Result<Outcome, Error> {
    if !has_location(sources.iter().map(|source| source.kind)) {
        return Ok(Outcome::Invalid);
    }

    let samples: Vec<&[Sample]> = sources.iter().map(|s| s.samples.as_slice()).collect();
    let track = merge(&samples);
    if track.len() < options.min_records {
        return Ok(Outcome::TooSmall {
            records: track.len(),
        });
    }

    let points = write_gpx(&track, options.zero_values, sink)?;
    Ok(Outcome::Converted { points })
}

/// Converts activities from disk into GPX files inside an output directory.
#[derive(Debug, Clone)]
pub struct Converter {
    output_dir: PathBuf,
    options: Options,
}

impl Converter {
    pub fn new(output_dir: impl Into<PathBuf>, options: Options) -> Self {
        Self {
            output_dir: output_dir.into(),
            options,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Path of the document written for `activity_id`.
    pub fn output_path(&self, activity_id: &str) -> PathBuf {
        self.output_dir.join(format!("{activity_id}.{OUTPUT_EXTENSION}"))
    }

    /// Convert `activity` and store the document on success.
    ///
    /// Source files are only read if location data is among them. The
    /// document is assembled in memory first, so a failed or rejected
    /// conversion never leaves a file behind. The output directory is created
    /// when needed.
    pub fn convert(&self, activity: &Activity) -> Result<Outcome, Error> {
        if !has_location(activity.files.iter().map(|file| file.kind)) {
            return Ok(Outcome::Invalid);
        }

        let sources = activity
            .files
            .iter()
            .map(SourceDescriptor::load)
            .collect::<Result<Vec<_>, _>>()?;

        let mut document = vec![];
        let outcome = convert_sources(&sources, &self.options, &mut document)?;
        drop(sources);

        if let Outcome::Converted { .. } = outcome {
            fs::create_dir_all(&self.output_dir).map_err(|source| Error::Write {
                path: self.output_dir.clone(),
                source,
            })?;
            let path = self.output_path(&activity.id);
            debug!("Writing {}", path.display());
            fs::write(&path, document).map_err(|source| Error::Write { path, source })?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(count: i64) -> SourceFile {
        SourceFile {
            kind: SourceKind::LocationData,
            samples: (1..=count)
                .map(|i| Sample {
                    start_time: Some(i * 1000),
                    latitude: Some(Some(37.0 + i as f64 * 1e-4)),
                    longitude: Some(Some(-122.0)),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn live(count: i64) -> SourceFile {
        SourceFile {
            kind: SourceKind::LiveData,
            samples: (1..=count)
                .map(|i| Sample {
                    start_time: Some(i * 1000),
                    heart_rate: Some(Some(120.0)),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn convert(sources: &[SourceFile]) -> (Outcome, Vec<u8>) {
        let mut sink = vec![];
        let outcome = convert_sources(sources, &Options::default(), &mut sink).unwrap();
        (outcome, sink)
    }

    #[test]
    fn location_and_live_data_are_combined() {
        let (outcome, sink) = convert(&[location(150), live(150)]);

        assert_eq!(outcome, Outcome::Converted { points: 150 });
        let gpx = String::from_utf8(sink).unwrap();
        assert_eq!(gpx.matches("<trkpt ").count(), 150);
        assert_eq!(gpx.matches("<gpxtpx:hr>120</gpxtpx:hr>").count(), 150);
    }

    #[test]
    fn short_tracks_are_too_small() {
        let (outcome, sink) = convert(&[location(50)]);
        assert_eq!(outcome, Outcome::TooSmall { records: 50 });
        assert!(sink.is_empty());
    }

    #[test]
    fn live_records_count_towards_size() {
        // 50 positions plus 60 heart rate samples at other times.
        let mut heart = live(110);
        heart.samples.drain(..50);
        let (outcome, _) = convert(&[location(50), heart]);
        assert_eq!(outcome, Outcome::Converted { points: 50 });
    }

    #[test]
    fn missing_location_is_invalid() {
        assert_eq!(convert(&[live(500)]).0, Outcome::Invalid);
        assert_eq!(convert(&[live(500), live(500)]).0, Outcome::Invalid);
        assert_eq!(convert(&[]).0, Outcome::Invalid);
    }

    #[test]
    fn custom_minimum() {
        let options = Options {
            min_records: 10,
            ..Default::default()
        };
        let outcome = convert_sources(&[location(10)], &options, io::sink()).unwrap();
        assert_eq!(outcome, Outcome::Converted { points: 10 });
    }

    #[test]
    fn in_memory_documents() {
        let source = SourceFile::from_json(
            SourceKind::LocationData,
            br#"[{"start_time": 1000, "latitude": 1.5, "longitude": 2.5}]"#,
        )
        .unwrap();
        assert_eq!(source.samples.len(), 1);

        assert!(matches!(
            SourceFile::from_json(SourceKind::LiveData, b"nope"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn invalid_activities_are_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let converter = Converter::new(dir.path().join("out"), Options::default());
        let activity = Activity {
            id: "abc".to_string(),
            files: vec![SourceDescriptor {
                kind: SourceKind::LiveData,
                path: dir.path().join("does-not-exist.json"),
            }],
        };

        assert_eq!(converter.convert(&activity).unwrap(), Outcome::Invalid);
        assert!(!converter.output_dir().exists());
    }

    #[test]
    fn unreadable_sources_fail() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "[{]").unwrap();
        let converter = Converter::new(dir.path().join("out"), Options::default());

        let missing = Activity {
            id: "missing".to_string(),
            files: vec![SourceDescriptor {
                kind: SourceKind::LocationData,
                path: dir.path().join("does-not-exist.json"),
            }],
        };
        assert!(matches!(converter.convert(&missing), Err(Error::Read { .. })));

        let malformed = Activity {
            id: "malformed".to_string(),
            files: vec![SourceDescriptor {
                kind: SourceKind::LocationData,
                path: broken,
            }],
        };
        assert!(matches!(converter.convert(&malformed), Err(Error::Parse { .. })));
        assert!(!converter.output_path("malformed").exists());
    }

    #[test]
    fn output_is_named_after_activity() {
        let converter = Converter::new("output", Options::default());
        assert_eq!(
            converter.output_path("f00-ba4"),
            Path::new("output").join("f00-ba4.gpx")
        );
    }
}
