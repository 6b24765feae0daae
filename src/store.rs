//! Reading and writing the synced activities file.

use std::fs;
use std::path::Path;

use crate::error::{ActivityMapError, Result};
use crate::strava::Activity;

/// Load the activities array written by a previous sync.
pub fn load_activities(path: impl AsRef<Path>) -> Result<Vec<Activity>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ActivityMapError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        ActivityMapError::parse(format!("{} is not an activities array: {}", path.display(), e))
    })
}

/// Overwrite `path` with the activities, pretty-printed with 2-space indent.
pub fn save_activities(path: impl AsRef<Path>, activities: &[Activity]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ActivityMapError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(activities)?;
    fs::write(path, json).map_err(|e| ActivityMapError::io(path, e))
}
