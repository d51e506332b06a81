//! GPX text track decoding
//!
//! Metadata (activity name and start time) is read with a namespace-aware
//! XML pass that stops as soon as both are known. Track points are found
//! with a lenient line scan: any line containing `<trkpt` contributes one
//! point, taken from the first two double-quoted values on that line, read
//! as latitude then longitude. The scan does not parse the XML, so
//! attributes after `lat`/`lon` may appear in any order, but `lat` and `lon`
//! must be the first two quoted values.

use crate::error::{Result, TrackError};
use crate::time_key::{parse_gpx_time, NormalizedTimeKey};
use crate::types::{GeoPoint, TrackRecord, TrackSource};
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::fs;
use std::path::Path;

/// Substring identifying a track point line
pub const TRACKPOINT_MARKER: &str = "<trkpt";

/// GPX 1.1 and 1.0 namespace URIs
pub const GPX_NAMESPACES: [&[u8]; 2] = [
    b"http://www.topografix.com/GPX/1/1",
    b"http://www.topografix.com/GPX/1/0",
];

/// Activity name and canonical start time from GPX metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpxMetadata {
    pub name: String,
    pub start: NormalizedTimeKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Metadata,
    Name,
    Time,
    Other,
}

/// Elements without a namespace count as GPX, for files that omit `xmlns`
fn is_gpx_namespace(ns: &ResolveResult) -> bool {
    match ns {
        ResolveResult::Unbound => true,
        ResolveResult::Bound(Namespace(uri)) => GPX_NAMESPACES.iter().any(|known| known == uri),
        ResolveResult::Unknown(_) => false,
    }
}

fn classify(ns: &ResolveResult, local_name: &[u8]) -> Element {
    if !is_gpx_namespace(ns) {
        return Element::Other;
    }
    match local_name {
        b"metadata" => Element::Metadata,
        b"name" => Element::Name,
        b"time" => Element::Time,
        _ => Element::Other,
    }
}

/// Text being collected for one element
#[derive(Debug, Default)]
struct Capture {
    active: bool,
    text: String,
    value: Option<String>,
}

impl Capture {
    fn begin(&mut self) {
        if self.value.is_none() && !self.active {
            self.active = true;
            self.text.clear();
        }
    }

    fn push(&mut self, text: &str) {
        if self.active {
            self.text.push_str(text);
        }
    }

    fn finish(&mut self) {
        if self.active {
            self.active = false;
            self.value = Some(self.text.trim().to_string());
        }
    }
}

/// Extract the first GPX `<name>` in document order and the `<time>` that is
/// a direct child of `<metadata>`
///
/// Both are required; a file missing either is reported as
/// [`TrackError::MetadataMissing`]. Markup that cannot be read before both
/// are found is a [`TrackError::DecodeFailure`].
pub fn extract_gpx_metadata(content: &str) -> Result<GpxMetadata> {
    let mut reader = NsReader::from_str(content);
    let mut stack: Vec<Element> = Vec::new();
    let mut name = Capture::default();
    let mut time = Capture::default();

    while name.value.is_none() || time.value.is_none() {
        let (ns, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(e) => {
                let element = classify(&ns, e.local_name().as_ref());
                match element {
                    Element::Name => name.begin(),
                    Element::Time if stack.last() == Some(&Element::Metadata) => time.begin(),
                    _ => {}
                }
                stack.push(element);
            }
            Event::End(_) => match stack.pop() {
                Some(Element::Name) => name.finish(),
                Some(Element::Time) => time.finish(),
                _ => {}
            },
            Event::Text(e) if name.active || time.active => {
                let text = e.unescape()?;
                name.push(&text);
                time.push(&text);
            }
            Event::CData(e) if name.active || time.active => {
                let text = String::from_utf8_lossy(&e);
                name.push(&text);
                time.push(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let name = name
        .value
        .ok_or_else(|| TrackError::MetadataMissing("name".to_string()))?;
    let raw_time = time
        .value
        .ok_or_else(|| TrackError::MetadataMissing("metadata time".to_string()))?;

    let start = parse_gpx_time(&raw_time)
        .map(|instant| NormalizedTimeKey::from_utc(&instant))
        .ok_or_else(|| {
            TrackError::DecodeFailure(format!("invalid metadata time '{}'", raw_time))
        })?;

    Ok(GpxMetadata { name, start })
}

/// Latitude/longitude from the first two quoted values of a track point line
fn parse_trackpoint_line(line: &str) -> Option<(f64, f64)> {
    let mut quoted = line.split('"').skip(1).step_by(2);
    let lat = quoted.next()?.trim().parse::<f64>().ok()?;
    let lon = quoted.next()?.trim().parse::<f64>().ok()?;
    Some((lat, lon))
}

/// Scan GPX text for track points
///
/// A track point line without two numeric quoted values means the file does
/// not follow the one-point-per-line layout this scan relies on; the scan
/// stops and returns no points so the caller skips the file. Points outside
/// the valid coordinate ranges are dropped.
pub fn scan_trackpoints(content: &str) -> Vec<GeoPoint> {
    let mut points = Vec::new();

    for (line_number, line) in content.lines().enumerate() {
        if !line.contains(TRACKPOINT_MARKER) {
            continue;
        }
        match parse_trackpoint_line(line) {
            Some((lat, lon)) => {
                if let Some(point) = GeoPoint::new(lat, lon) {
                    points.push(point);
                } else {
                    debug!("Dropping out-of-range point ({lat}, {lon}) on line {}", line_number + 1);
                }
            }
            None => {
                warn!(
                    "Malformed trackpoint on line {}, discarding track",
                    line_number + 1
                );
                return Vec::new();
            }
        }
    }

    points
}

/// External record id: the file name without its extension
pub fn external_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Decode one GPX file into a track record with full-resolution points
pub fn decode_gpx_file(path: &Path) -> Result<TrackRecord> {
    let content = fs::read_to_string(path)?;
    decode_gpx_str(&content, external_id_from_path(path))
}

/// Decode GPX text already in memory
pub fn decode_gpx_str(content: &str, external_id: String) -> Result<TrackRecord> {
    let metadata = extract_gpx_metadata(content)?;
    let points = scan_trackpoints(content);
    debug!(
        "GPX '{}' ({}): {} points",
        metadata.name,
        external_id,
        points.len()
    );

    Ok(TrackRecord {
        source: TrackSource::Gpx,
        points,
        display_name: metadata.name,
        display_date: metadata.start.to_string(),
        external_id,
    })
}
