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

//! This is a WASM wrapper for `shealth_gpx`.

use shealth_gpx::{convert_sources, Options, Outcome, SourceFile, SourceKind};
use wasm_bindgen::{prelude::wasm_bindgen, JsError};

/// Convert the exported JSON documents of one exercise to GPX.
///
/// `location` is the `location_data` document, `live` the optional
/// `live_data` document. Exercises which are too short are reported as an
/// error.
#[wasm_bindgen]
pub fn convert(location: &[u8], live: Option<Vec<u8>>) -> Result<Box<[u8]>, JsError> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let mut sources = vec![SourceFile::from_json(SourceKind::LocationData, location)?];
    if let Some(live) = live {
        sources.push(SourceFile::from_json(SourceKind::LiveData, &live)?);
    }

    let mut sink = vec![];
    match convert_sources(&sources, &Options::default(), &mut sink)? {
        Outcome::Converted { .. } => Ok(sink.into_boxed_slice()),
        Outcome::TooSmall { records } => Err(JsError::new(&format!(
            "exercise is too short: {records} records"
        ))),
        Outcome::Invalid => Err(JsError::new("missing location data")),
    }
}
