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

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error returned from conversions and batch runs.
///
/// Activities that are rejected for missing location data or for being too
/// short are not errors; see [`Outcome`](crate::Outcome).
#[derive(Error, Debug)]
pub enum Error {
    /// A source file could not be opened or read.
    #[error("reading {} failed: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    /// A source file is not a JSON list of samples.
    #[error("parsing {} failed: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// An in-memory document is not a JSON list of samples.
    #[error("parsing samples failed: {0}")]
    Json(#[from] serde_json::Error),
    /// A GPX document could not be stored.
    #[error("writing {} failed: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    /// GPX emission failed.
    #[error("writing GPX failed: {0}")]
    Xml(#[from] xml::writer::Error),
    /// A `start_time` lies outside the representable calendar range.
    #[error("timestamp {0} ms is out of range")]
    Timestamp(i64),
    /// The export does not contain the exercise directory.
    #[error("missing directory with exercises at {}", .0.display())]
    MissingExport(PathBuf),
    /// The export root is not a directory.
    #[error("directory {} does not exist", .0.display())]
    NotADirectory(PathBuf),
}
