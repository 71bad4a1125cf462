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

//! Library for converting [Samsung Health](https://www.samsung.com/global/galaxy/apps/samsung-health/)
//! exercise exports to [GPX](https://www.topografix.com/gpx.asp).
//!
//! An exercise is exported as up to two JSON files: `location_data` holding
//! GPS positions and `live_data` holding metrics such as the heart rate. Both
//! are lists of samples keyed by `start_time`. The samples are merged into one
//! ordered [`Track`] with [`merge`] and rendered as a GPX track with heart
//! rate extensions by [`render::write_gpx`].
//!
//! Use [`convert_sources`] for documents already in memory, [`Converter`] for
//! a single activity on disk, and [`batch::run`] for a whole unpacked export.

pub mod batch;
pub mod convert;
mod error;
pub mod merge;
pub mod render;
pub mod sample;
pub mod scan;

pub use batch::Summary;
pub use convert::{
    convert_sources, Activity, Converter, Options, Outcome, SourceDescriptor, SourceFile,
    MIN_RECORDS,
};
pub use error::Error;
pub use merge::{merge, MergedRecord, Track};
pub use sample::{Sample, SourceKind, ZeroValues};
