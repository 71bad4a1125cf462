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

//! Conversion of a complete export.

use std::fmt;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::convert::{Activity, Converter, Outcome};
use crate::error::Error;
use crate::scan::{exercise_dir, exercise_files, Registry};

/// Length of the identifier prefix shown in progress messages.
const ID_PREFIX_LEN: usize = 8;

/// Totals of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub too_small: usize,
    pub invalid: usize,
    /// Activities whose source files could not be read or whose document
    /// could not be written.
    pub failed: usize,
}

impl Summary {
    /// Count `outcome`.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Converted { .. } => self.converted += 1,
            Outcome::TooSmall { .. } => self.too_small += 1,
            Outcome::Invalid => self.invalid += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of processed activities.
    pub fn total(&self) -> usize {
        self.converted + self.too_small + self.invalid + self.failed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted: {}, Small: {}, Invalid: {}, Failed: {}",
            self.converted, self.too_small, self.invalid, self.failed
        )
    }
}

/// Convert every activity of the export at `export_root`.
///
/// Activities are converted as soon as both of their files have been found.
/// Activities with a single file are converted after the whole export has
/// been scanned. A failing activity is logged and counted; the run continues
/// with the next one.
///
/// Fails only if the export layout is not recognized.
pub fn run(export_root: &Path, converter: &Converter) -> Result<Summary, Error> {
    let dir = exercise_dir(export_root)?;
    info!("Scanning {} for exercise files", dir.display());

    let mut summary = Summary::default();
    let mut registry = Registry::default();
    let mut found = 0;
    let mut processed = 0;

    for (id, file) in exercise_files(&dir) {
        found += 1;
        if let Some(activity) = registry.register(&id, file) {
            processed += 1;
            process(converter, &activity, processed, &mut summary);
        }
    }

    info!("Found {} exercise files, {} complete pairs", found, processed);
    info!("Processing remaining {} exercises", registry.len());
    for activity in registry.into_activities() {
        processed += 1;
        process(converter, &activity, processed, &mut summary);
    }

    Ok(summary)
}

/// Convert a single `activity` and count the result in `summary`.
fn process(converter: &Converter, activity: &Activity, ordinal: usize, summary: &mut Summary) {
    let id = activity.id.get(..ID_PREFIX_LEN).unwrap_or(&activity.id);
    debug!(
        "Processing exercise {}: {}... ({} file(s))",
        ordinal,
        id,
        activity.files.len()
    );

    match converter.convert(activity) {
        Ok(outcome) => {
            match outcome {
                Outcome::Converted { points } => {
                    info!("Save track {} with {} points", activity.id, points)
                }
                Outcome::TooSmall { records } => {
                    warn!("Empty or small track {} ({} records)", activity.id, records)
                }
                Outcome::Invalid => warn!("Skip track {}: missing location data", activity.id),
            }
            summary.record(&outcome);
        }
        Err(err) => {
            error!("Skip track {}: {}", activity.id, err);
            summary.record_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = Summary::default();
        summary.record(&Outcome::Converted { points: 3 });
        summary.record(&Outcome::Converted { points: 0 });
        summary.record(&Outcome::TooSmall { records: 1 });
        summary.record(&Outcome::Invalid);
        summary.record_failure();

        assert_eq!(
            summary,
            Summary {
                converted: 2,
                too_small: 1,
                invalid: 1,
                failed: 1,
            }
        );
        assert_eq!(summary.total(), 5);
        assert_eq!(
            summary.to_string(),
            "Converted: 2, Small: 1, Invalid: 1, Failed: 1"
        );
    }
}
