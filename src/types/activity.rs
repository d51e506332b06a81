/// One row of the activity export, reduced to what the map needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityIndexEntry {
    pub activity_name: String,
    pub activity_id: String,
}
