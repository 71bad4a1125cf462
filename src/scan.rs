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

//! Discovery of exercise files inside an unpacked Samsung Health export.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::convert::{Activity, SourceDescriptor};
use crate::error::Error;
use crate::sample::SourceKind;

/// Location of the exercise files relative to the export root.
pub const EXERCISE_DIR: &str = "jsons/com.samsung.shealth.exercise";
/// Marks the end of the activity identifier in a file name.
const ID_SEPARATOR: &str = ".com.samsung";
/// An activity is dispatched as soon as this many files are known.
const COMPLETE_FILES: usize = 2;

static EXERCISE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.com\.samsung\.health\.exercise\.(live_data|location_data)\.json$")
        .expect("exercise file pattern is valid")
});

/// Resolve the exercise directory of the export at `export_root`.
pub fn exercise_dir(export_root: &Path) -> Result<PathBuf, Error> {
    if !export_root.is_dir() {
        return Err(Error::NotADirectory(export_root.to_path_buf()));
    }
    let dir = export_root.join(EXERCISE_DIR);
    if !dir.is_dir() {
        return Err(Error::MissingExport(dir));
    }
    Ok(dir)
}

/// Split an exercise `file_name` into activity identifier and kind.
///
/// ```
/// # use shealth_gpx::{scan::classify, SourceKind};
/// #
/// assert_eq!(
///     classify("0d3e.com.samsung.health.exercise.live_data.json"),
///     Some(("0d3e", SourceKind::LiveData))
/// );
/// assert_eq!(classify("0d3e.com.samsung.health.exercise.json"), None);
/// ```
pub fn classify(file_name: &str) -> Option<(&str, SourceKind)> {
    let captures = EXERCISE_FILE.captures(file_name)?;
    let kind = SourceKind::from_tag(captures.get(1)?.as_str())?;
    let end = file_name.find(ID_SEPARATOR)?;
    Some((&file_name[..end], kind))
}

/// Walk `dir` recursively and yield every exercise file, in file name order.
///
/// Entries which cannot be read are logged and skipped.
pub fn exercise_files(dir: &Path) -> impl Iterator<Item = (String, SourceDescriptor)> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Error accessing entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let (id, kind) = classify(entry.file_name().to_str()?)?;
            debug!("Found {} for {}", kind, id);
            Some((
                id.to_string(),
                SourceDescriptor {
                    kind,
                    path: entry.path().to_path_buf(),
                },
            ))
        })
}

/// Activities whose source files are still being collected.
///
/// Activities are kept in the order they were first seen.
#[derive(Debug, Default)]
pub struct Registry {
    pending: IndexMap<String, Vec<SourceDescriptor>>,
}

impl Registry {
    /// Add a source file of activity `id`.
    ///
    /// Once the activity has all of its files, it is removed from the
    /// registry and returned.
    pub fn register(&mut self, id: &str, file: SourceDescriptor) -> Option<Activity> {
        let files = self.pending.entry(id.to_string()).or_default();
        files.push(file);
        if files.len() < COMPLETE_FILES {
            return None;
        }

        let files = self.pending.shift_remove(id)?;
        Some(Activity {
            id: id.to_string(),
            files,
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remaining incomplete activities.
    pub fn into_activities(self) -> impl Iterator<Item = Activity> {
        self.pending
            .into_iter()
            .map(|(id, files)| Activity { id, files })
    }
}
