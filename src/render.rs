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

//! Rendering of a [`Track`] as a GPX 1.1 document.

use std::io;

use chrono::{DateTime, Utc};
use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::error::Error;
use crate::merge::{MergedRecord, Track};
use crate::sample::ZeroValues;

/// Value of the `creator` attribute of the `<gpx>` tag.
const CREATOR: &str = "shealth_gpx";
const GPX_VERSION: &str = "1.1";
const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const GPXX_NS: &str = "http://www.garmin.com/xmlschemas/GpxExtensions/v3";
const GPXTPX_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";
const SCHEMA_LOCATION: &str = "http://www.topografix.com/GPX/1/1 \
    http://www.topografix.com/GPX/1/1/gpx.xsd \
    http://www.garmin.com/xmlschemas/GpxExtensions/v3 \
    http://www.garmin.com/xmlschemas/GpxExtensionsv3.xsd \
    http://www.garmin.com/xmlschemas/TrackPointExtension/v1 \
    http://www.garmin.com/xmlschemas/TrackPointExtensionv1.xsd";
/// Activity type written to `<trk><type>`.
const TRACK_TYPE: &str = "1";
/// Timestamps are truncated to whole seconds.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const NAME_DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `track` as a complete GPX document to `sink`.
///
/// A trackpoint is only written for records carrying both coordinates.
/// Elevation and heart rate are added when present. `zero_values` decides
/// whether a zero counts as present.
///
/// The document time and the date in the track name are taken from the
/// first record of `track`, even if that record is not written as a
/// trackpoint.
///
/// Returns the number of written trackpoints.
///
/// # Example
/// ```
/// # use shealth_gpx::{merge, render::write_gpx, Sample, ZeroValues};
/// #
/// let samples = vec![Sample {
///     start_time: Some(1_600_000_000_000),
///     latitude: Some(Some(48.858222)),
///     longitude: Some(Some(2.2945)),
///     ..Default::default()
/// }];
/// let mut sink = vec![];
///
/// let written = write_gpx(&merge(&[samples]), ZeroValues::Skip, &mut sink)
///     .expect("rendering failed");
///
/// let gpx = String::from_utf8(sink).expect("GPX data is not valid UTF-8");
/// assert_eq!(written, 1);
/// assert!(gpx.contains("<gpx"));
/// assert!(gpx.contains(r#"lat="48.858222""#));
/// assert!(gpx.contains("<time>2020-09-13T12:26:40Z</time>"));
/// ```
pub fn write_gpx(
    track: &Track,
    zero_values: ZeroValues,
    sink: impl io::Write,
) -> Result<usize, Error> {
    let start = track.first().map(|r| utc(r.start_time)).transpose()?;

    let mut writer = EmitterConfig::new().perform_indent(true).create_writer(sink);
    writer.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("UTF-8"),
        standalone: None,
    })?;
    writer.write(
        XmlEvent::start_element("gpx")
            .attr("creator", CREATOR)
            .attr("version", GPX_VERSION)
            .attr("xsi:schemaLocation", SCHEMA_LOCATION)
            .default_ns(GPX_NS)
            .ns("xsi", XSI_NS)
            .ns("gpxx", GPXX_NS)
            .ns("gpxtpx", GPXTPX_NS),
    )?;

    writer.write(XmlEvent::start_element("metadata"))?;
    if let Some(start) = start {
        text_element(&mut writer, "time", &start.format(TIME_FORMAT).to_string())?;
    }
    writer.write(XmlEvent::end_element())?;

    writer.write(XmlEvent::start_element("trk"))?;
    let name = match start {
        Some(start) => format!("Ride at {}", start.format(NAME_DATE_FORMAT)),
        None => "Ride".to_string(),
    };
    text_element(&mut writer, "name", &name)?;
    text_element(&mut writer, "type", TRACK_TYPE)?;

    writer.write(XmlEvent::start_element("trkseg"))?;
    let mut written = 0;
    for record in track {
        if write_trackpoint(&mut writer, record, zero_values)? {
            written += 1;
        }
    }
    writer.write(XmlEvent::end_element())?; // trkseg
    writer.write(XmlEvent::end_element())?; // trk
    writer.write(XmlEvent::end_element())?; // gpx

    Ok(written)
}

/// Write a single `<trkpt>` for `record`.
///
/// Returns `false` without writing anything if a coordinate is missing.
fn write_trackpoint<W: io::Write>(
    writer: &mut EventWriter<W>,
    record: &MergedRecord,
    zero_values: ZeroValues,
) -> Result<bool, Error> {
    let (Some(lat), Some(lon)) = (
        zero_values.apply(record.latitude),
        zero_values.apply(record.longitude),
    ) else {
        return Ok(false);
    };

    let (lat, lon) = (lat.to_string(), lon.to_string());
    writer.write(
        XmlEvent::start_element("trkpt")
            .attr("lat", &lat)
            .attr("lon", &lon),
    )?;

    // GPX requires this child order.
    if let Some(altitude) = zero_values.apply(record.altitude) {
        text_element(writer, "ele", &altitude.to_string())?;
    }
    let time = utc(record.start_time)?;
    text_element(writer, "time", &time.format(TIME_FORMAT).to_string())?;
    // The schema only allows whole beats per minute.
    if let Some(heart_rate) = zero_values.apply(record.heart_rate.map(f64::round)) {
        writer.write(XmlEvent::start_element("extensions"))?;
        writer.write(XmlEvent::start_element("gpxtpx:TrackPointExtension"))?;
        text_element(writer, "gpxtpx:hr", &heart_rate.to_string())?;
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())?;
    }

    writer.write(XmlEvent::end_element())?;
    Ok(true)
}

/// Write `<name>text</name>`.
fn text_element<W: io::Write>(
    writer: &mut EventWriter<W>,
    name: &str,
    text: &str,
) -> xml::writer::Result<()> {
    writer.write(XmlEvent::start_element(name))?;
    writer.write(XmlEvent::characters(text))?;
    writer.write(XmlEvent::end_element())
}

/// Convert epoch `millis` to a calendar instant.
fn utc(millis: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp_millis(millis).ok_or(Error::Timestamp(millis))
}
