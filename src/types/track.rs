use super::GeoPoint;
use std::fmt;

/// Input format a track was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    /// GPX text track
    Gpx,
    /// FIT binary track, possibly gzip-compressed
    Fit,
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSource::Gpx => write!(f, "GPX"),
            TrackSource::Fit => write!(f, "FIT"),
        }
    }
}

/// One decoded activity, ready to be drawn
#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub source: TrackSource,
    /// Chronological recording order
    pub points: Vec<GeoPoint>,
    pub display_name: String,
    pub display_date: String,
    pub external_id: String,
}

impl TrackRecord {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean latitude/longitude of the track, if it has any points
    pub fn centroid(&self) -> Option<GeoPoint> {
        mean_point(self.points.iter())
    }
}

/// Arithmetic mean of a set of points
pub fn mean_point<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let (mut lat, mut lon, mut count) = (0.0, 0.0, 0usize);
    for point in points {
        lat += point.latitude();
        lon += point.longitude();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    GeoPoint::new(lat / count as f64, lon / count as f64)
}
