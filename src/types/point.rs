/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting coordinates outside the valid ranges or NaN
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    /// For constants whose coordinates are known to be in range
    pub(crate) const fn from_valid(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `[lat, lon]` pair, the shape Leaflet expects for polyline vertices
    pub fn as_pair(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}
