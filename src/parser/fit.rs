//! FIT binary track decoding
//!
//! Only `record` messages are read. Each contributes a sample with an
//! optional timestamp and optional semicircle position. Samples missing a
//! coordinate are dropped. The track's nominal start is the earliest
//! timestamp among samples that also carry a position, which need not be the
//! first record in the file.

use crate::conversion::{fit_value_to_semicircles, semicircles_to_degrees};
use crate::error::{Result, TrackError};
use crate::parser::scratch::{decompress_to_scratch, is_gzip_path};
use crate::types::GeoPoint;
use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;
use fitparser::FitDataRecord;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::panic;
use std::path::Path;

/// One `record` message reduced to time and position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordSample {
    pub timestamp: Option<DateTime<Utc>>,
    /// Latitude in semicircles
    pub position_lat: Option<i64>,
    /// Longitude in semicircles
    pub position_long: Option<i64>,
}

impl RecordSample {
    /// Position in degrees, if both coordinates are present and in range
    pub fn point(&self) -> Option<GeoPoint> {
        let lat = semicircles_to_degrees(self.position_lat?);
        let lon = semicircles_to_degrees(self.position_long?);
        GeoPoint::new(lat, lon)
    }
}

/// Positions and start time of a decoded FIT activity
#[derive(Debug, Clone, PartialEq)]
pub struct FitTrack {
    /// Record order
    pub points: Vec<GeoPoint>,
    /// Earliest timestamp among position-bearing samples
    pub start_time: DateTime<Utc>,
}

/// Reduce decoded FIT messages to record samples
pub fn record_samples(records: &[FitDataRecord]) -> Vec<RecordSample> {
    records
        .iter()
        .filter(|record| record.kind() == MesgNum::Record)
        .map(|record| {
            let mut sample = RecordSample::default();
            for field in record.fields() {
                match field.name() {
                    "timestamp" => {
                        if let fitparser::Value::Timestamp(ts) = field.value() {
                            sample.timestamp = Some(ts.with_timezone(&Utc));
                        }
                    }
                    "position_lat" => sample.position_lat = fit_value_to_semicircles(field.value()),
                    "position_long" => {
                        sample.position_long = fit_value_to_semicircles(field.value())
                    }
                    _ => {}
                }
            }
            sample
        })
        .collect()
}

/// Build the track from samples
///
/// Fails with [`TrackError::NoTrackData`] when no sample carries both a
/// timestamp and a usable position.
pub fn resolve_samples<I>(samples: I) -> Result<FitTrack>
where
    I: IntoIterator<Item = RecordSample>,
{
    let mut points = Vec::new();
    let mut start_time: Option<DateTime<Utc>> = None;

    for sample in samples {
        let Some(point) = sample.point() else {
            continue;
        };
        points.push(point);
        if let Some(ts) = sample.timestamp {
            start_time = Some(start_time.map_or(ts, |current| current.min(ts)));
        }
    }

    let start_time = start_time.ok_or(TrackError::NoTrackData)?;
    Ok(FitTrack { points, start_time })
}

/// Decode an uncompressed FIT stream
///
/// A panic inside the FIT decoder on corrupt input is reported as
/// [`TrackError::DecodeFailure`] for this file only.
pub fn decode_fit_reader<R: Read>(reader: &mut R) -> Result<FitTrack> {
    let records = panic::catch_unwind(panic::AssertUnwindSafe(|| fitparser::from_reader(reader)))
        .map_err(|_| TrackError::DecodeFailure("FIT decoder panicked".to_string()))??;
    let samples = record_samples(&records);
    debug!(
        "FIT stream: {} messages, {} record samples",
        records.len(),
        samples.len()
    );
    resolve_samples(samples)
}

/// Decode a FIT file, inflating `.gz` inputs through a scratch file first
///
/// The scratch copy lives until this function returns and is deleted on
/// success and failure alike.
pub fn decode_fit_file(path: &Path, scratch_dir: Option<&Path>) -> Result<FitTrack> {
    if is_gzip_path(path) {
        let scratch = decompress_to_scratch(path, scratch_dir)?;
        let mut reader = BufReader::new(File::open(scratch.path())?);
        decode_fit_reader(&mut reader)
    } else {
        let mut reader = BufReader::new(File::open(path)?);
        decode_fit_reader(&mut reader)
    }
}
