//! FIT start time to activity export reconciliation

use crate::activities::{ActivityIndex, DuplicatePolicy};
use crate::error::{Result, TrackError};
use crate::time_key::NormalizedTimeKey;
use chrono::{DateTime, Utc};
use log::debug;

/// Metadata recovered for a FIT track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedActivity {
    pub activity_name: String,
    pub activity_id: String,
    pub display_date: String,
}

/// Look up the export row whose start time equals `start_time` at minute
/// resolution
pub fn match_activity(
    start_time: &DateTime<Utc>,
    index: &ActivityIndex,
    policy: DuplicatePolicy,
) -> Result<MatchedActivity> {
    let key = NormalizedTimeKey::from_utc(start_time);
    let entry = index
        .lookup(&key, policy)
        .ok_or_else(|| TrackError::UnmatchedActivity(key.to_string()))?;

    debug!("Matched '{}' to activity {}", key, entry.activity_id);
    Ok(MatchedActivity {
        activity_name: entry.activity_name.clone(),
        activity_id: entry.activity_id.clone(),
        display_date: key.to_string(),
    })
}
