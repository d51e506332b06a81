//! Point density reduction
//!
//! Tracks are thinned by a fixed stride before rendering. The stride is a
//! per-format constant rather than derived from point density: GPX exports
//! are sampled more densely than FIT records, so they get the larger stride.

use crate::types::{GeoPoint, TrackSource};

/// Keep every 12th GPX point
pub const GPX_STRIDE: usize = 12;

/// Keep every 8th FIT point
pub const FIT_STRIDE: usize = 8;

/// Default stride for a track source
pub fn default_stride(source: TrackSource) -> usize {
    match source {
        TrackSource::Gpx => GPX_STRIDE,
        TrackSource::Fit => FIT_STRIDE,
    }
}

/// Every `stride`-th point starting at index 0, order preserved.
/// A stride of 0 is treated as 1.
pub fn downsample(points: &[GeoPoint], stride: usize) -> Vec<GeoPoint> {
    points.iter().step_by(stride.max(1)).copied().collect()
}
