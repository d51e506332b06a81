use std::fmt;

/// Errors raised while turning activity files into map layers
#[derive(Debug)]
pub enum TrackError {
    /// Neither input directory contained a matching file
    NoInputFiles,
    /// Text track lacks the activity name or start time
    MetadataMissing(String),
    /// Binary track has no sample with both a timestamp and a position
    NoTrackData,
    /// No activity export row matches the resolved start time
    UnmatchedActivity(String),
    /// Decoding succeeded but produced no usable points
    EmptyPointSet,
    /// Malformed or corrupt input
    DecodeFailure(String),
    /// I/O errors
    Io(std::io::Error),
    /// Activity export read errors
    Csv(csv::Error),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::NoInputFiles => write!(f, "No GPX or FIT files found"),
            TrackError::MetadataMissing(field) => write!(f, "Missing metadata: {}", field),
            TrackError::NoTrackData => write!(f, "No timestamped position samples"),
            TrackError::UnmatchedActivity(key) => {
                write!(f, "No activity matches start time '{}'", key)
            }
            TrackError::EmptyPointSet => write!(f, "No trackpoints"),
            TrackError::DecodeFailure(msg) => write!(f, "Decode error: {}", msg),
            TrackError::Io(err) => write!(f, "I/O error: {}", err),
            TrackError::Csv(err) => write!(f, "CSV error: {}", err),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::Io(err) => Some(err),
            TrackError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackError {
    fn from(err: std::io::Error) -> Self {
        TrackError::Io(err)
    }
}

impl From<csv::Error> for TrackError {
    fn from(err: csv::Error) -> Self {
        TrackError::Csv(err)
    }
}

impl From<fitparser::Error> for TrackError {
    fn from(err: fitparser::Error) -> Self {
        TrackError::DecodeFailure(err.to_string())
    }
}

impl From<quick_xml::Error> for TrackError {
    fn from(err: quick_xml::Error) -> Self {
        TrackError::DecodeFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
