//! Unit conversion for decoded track data

/// Degrees per FIT semicircle: 2^31 semicircles span 180 degrees
pub const DEGREES_PER_SEMICIRCLE: f64 = 180.0 / 2_147_483_648.0;

/// Convert a FIT semicircle value to decimal degrees
pub fn semicircles_to_degrees(raw: i64) -> f64 {
    raw as f64 * DEGREES_PER_SEMICIRCLE
}

/// Read an integer semicircle value out of a FIT field
pub fn fit_value_to_semicircles(value: &fitparser::Value) -> Option<i64> {
    match value {
        fitparser::Value::SInt32(v) => Some(*v as i64),
        fitparser::Value::SInt64(v) => Some(*v),
        fitparser::Value::SInt16(v) => Some(*v as i64),
        fitparser::Value::UInt32(v) => Some(*v as i64),
        fitparser::Value::Float64(v) if v.is_finite() => Some(*v as i64),
        fitparser::Value::Float32(v) if v.is_finite() => Some(*v as i64),
        _ => None,
    }
}
